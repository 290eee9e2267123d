use std::sync::Arc;

use teloxide::prelude::*;

use crate::config::Config;
use crate::notify::{BotNotifier, Notifier};
use crate::prelude::*;
use crate::{messages, orders};

pub fn handler() -> HandlerResult {
    Update::filter_message()
        .branch(
            dptree::entry()
                .chain(filter_command("/start"))
                .endpoint(start),
        )
        .branch(
            dptree::entry()
                .chain(filter_command("/sell"))
                .endpoint(sell),
        )
        .branch(dptree::entry().chain(filter_command("/buy")).endpoint(buy))
        .branch(
            dptree::entry()
                .chain(filter_command("/cancel"))
                .endpoint(cancel),
        )
}

pub async fn start(
    bot: Bot,
    msg: Message,
    storage: SharedStorage,
    config: Arc<Config>,
) -> Result<()> {
    let mut storage = storage.write().await;
    let profile = profile_from_msg(&msg)?;
    let notifier = BotNotifier::new(&bot, msg.chat.id, &config.telegram.channel);

    start_session(&mut storage, &notifier, &profile).await
}

pub(crate) async fn start_session<N: Notifier>(
    storage: &mut Storage,
    notifier: &N,
    profile: &UserProfile,
) -> Result<()> {
    handle_user(storage, profile).await?;
    notifier.direct(messages::START).await?;
    Ok(())
}

pub async fn sell(
    bot: Bot,
    msg: Message,
    storage: SharedStorage,
    config: Arc<Config>,
) -> Result<()> {
    intent(bot, msg, storage, config, OrderSide::Sell).await
}

pub async fn buy(
    bot: Bot,
    msg: Message,
    storage: SharedStorage,
    config: Arc<Config>,
) -> Result<()> {
    intent(bot, msg, storage, config, OrderSide::Buy).await
}

async fn intent(
    bot: Bot,
    msg: Message,
    storage: SharedStorage,
    config: Arc<Config>,
    side: OrderSide,
) -> Result<()> {
    let mut storage = storage.write().await;
    let profile = profile_from_msg(&msg)?;
    let notifier = BotNotifier::new(&bot, msg.chat.id, &config.telegram.channel);
    let args = command_args(msg.text().unwrap_or_default());

    orders::handle_intent(&mut storage, &notifier, side, profile.tg_id, &args).await?;
    Ok(())
}

pub async fn cancel(
    bot: Bot,
    msg: Message,
    storage: SharedStorage,
    config: Arc<Config>,
) -> Result<()> {
    let mut storage = storage.write().await;
    let profile = profile_from_msg(&msg)?;
    let notifier = BotNotifier::new(&bot, msg.chat.id, &config.telegram.channel);
    let args = command_args(msg.text().unwrap_or_default());

    orders::handle_cancel(&mut storage, &notifier, profile.tg_id, &args).await?;
    Ok(())
}
