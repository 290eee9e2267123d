use chrono::Utc;
use teloxide::prelude::*;

use crate::messages;
use crate::prelude::*;

/// What we need to know about the invoking Telegram account.
pub struct UserProfile {
    pub tg_id: i64,
    pub username: Option<String>,
    pub lang_code: String,
}

pub fn profile_from_msg(msg: &Message) -> crate::Result<UserProfile> {
    let from = msg.from().ok_or(BotError::unknown("msg.from"))?;

    Ok(UserProfile {
        tg_id: from.id.0 as i64,
        username: from.username.clone(),
        lang_code: from.language_code.clone().unwrap_or_else(|| "es".to_owned()),
    })
}

/// Registers the account on first contact, refreshes it afterwards.
pub async fn handle_user(storage: &mut Storage, profile: &UserProfile) -> crate::Result<User> {
    let user = match storage.users.find_one_by_tg_id(profile.tg_id).await? {
        Some(mut user) => {
            user.username = profile.username.clone();
            user.lang_code = profile.lang_code.clone();
            user.last_activity_date = Utc::now();
            user
        }
        None => User {
            tg_id: profile.tg_id,
            username: profile.username.clone(),
            lang_code: profile.lang_code.clone(),
            created_date: Utc::now(),
            last_activity_date: Utc::now(),
            blocked: false,
        },
    };

    storage.users.upsert(&user).await?;
    Ok(user)
}

/// Matches `/cmd` and `/cmd@botname` as the first token of the message.
pub fn filter_command(cmd: &'static str) -> HandlerResult {
    dptree::entry().filter(move |msg: Message| {
        msg.text()
            .and_then(|text| text.split_whitespace().next())
            .map(|head| head.split('@').next() == Some(cmd))
            .unwrap_or(false)
    })
}

/// Tokens after the command itself.
pub fn command_args(text: &str) -> Vec<&str> {
    text.split_whitespace().skip(1).collect()
}

pub async fn default_handler(bot: Bot, upd: Update, storage: SharedStorage) -> crate::Result<()> {
    if let teloxide::types::UpdateKind::Message(ref msg) = upd.kind {
        if msg.via_bot.is_some() || msg.text().map(|t| t.starts_with('/')).unwrap_or(true) {
            return Ok(());
        }

        let mut storage = storage.write().await;
        let profile = profile_from_msg(msg)?;
        handle_user(&mut storage, &profile).await?;

        bot.send_message(msg.chat.id, messages::START).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing;

    #[test]
    fn command_args_splits_after_the_command() {
        assert_eq!(
            command_args("/sell 100 1 ves Pagomovil"),
            vec!["100", "1", "ves", "Pagomovil"]
        );
        assert!(command_args("/sell").is_empty());
    }

    #[tokio::test]
    async fn handle_user_registers_then_refreshes() {
        let mut storage = testing::in_mem();
        let mut profile = UserProfile {
            tg_id: 7,
            username: Some("satoshi".to_owned()),
            lang_code: "es".to_owned(),
        };

        let created = handle_user(&mut storage, &profile).await.unwrap();
        assert!(!created.blocked);

        profile.username = Some("finney".to_owned());
        let refreshed = handle_user(&mut storage, &profile).await.unwrap();
        assert_eq!(refreshed.username.as_deref(), Some("finney"));
        assert_eq!(refreshed.created_date, created.created_date);
    }
}
