use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::Result;

/// Outbound message delivery, one impl per transport. The intent flow only
/// talks to this trait, so tests swap in a recorder instead of a live bot.
#[async_trait]
pub trait Notifier {
    /// To the invoking user's chat.
    async fn direct(&self, text: &str) -> Result<()>;

    /// To the shared announcement channel.
    async fn announce(&self, text: &str) -> Result<()>;
}

pub struct BotNotifier<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    channel: Recipient,
}

impl<'a> BotNotifier<'a> {
    pub fn new(bot: &'a Bot, chat_id: ChatId, channel: &str) -> Self {
        Self {
            bot,
            chat_id,
            channel: channel_recipient(channel),
        }
    }
}

#[async_trait]
impl<'a> Notifier for BotNotifier<'a> {
    async fn direct(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn announce(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.channel.clone(), text).await?;
        Ok(())
    }
}

/// The configured channel is either a numeric chat id or an @username.
fn channel_recipient(channel: &str) -> Recipient {
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(channel.to_owned()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Target {
        Direct,
        Channel,
    }

    /// Captures the outbound sequence instead of delivering it.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(Target, String)>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<(Target, String)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn texts(&self) -> Vec<String> {
            self.sent().into_iter().map(|(_, text)| text).collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn direct(&self, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((Target::Direct, text.to_owned()));
            Ok(())
        }

        async fn announce(&self, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((Target::Channel, text.to_owned()));
            Ok(())
        }
    }
}
