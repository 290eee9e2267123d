//! The order-intent flow behind `/buy` and `/sell`, plus `/cancel`.
//!
//! One invocation walks validate → duplicate check → parse → create →
//! publish. Every abort path sends exactly one message to the invoking
//! user; the success path sends the fixed five-message sequence.

use crate::messages;
use crate::notify::Notifier;
use crate::parser;
use crate::prelude::*;
use crate::verify::verify_with;

pub async fn handle_intent<N: Notifier>(
    storage: &mut Storage,
    notifier: &N,
    side: OrderSide,
    tg_id: i64,
    raw_args: &[&str],
) -> crate::Result<Order> {
    let user = verify_with(notifier, storage)
        .user_by_tg_id(tg_id)
        .await?
        .no_open_order(side)
        .await?
        .into_result();

    let args = match parser::parse(raw_args) {
        Ok(args) => args,
        Err(err) => {
            notifier.direct(&messages::usage(side)).await?;
            return Err(Box::new(err));
        }
    };

    let new = NewOrder {
        side,
        creator_tg_id: user.tg_id,
        amount_sats: args.amount_sats,
        amount_fiat: args.amount_fiat,
        fiat_code: args.fiat_code,
        payment_method: args.payment_method,
        price_margin: args.price_margin,
    };

    let order = match storage.orders.create_order(new).await {
        Ok(order) => order,
        // Lost the race against another invocation of ours; the store is
        // the authoritative guard.
        Err(err @ StorageError::DuplicateOpenOrder(..)) => {
            notifier.direct(&messages::already_open(side)).await?;
            return Err(Box::new(err));
        }
        Err(err) => {
            notifier.direct(messages::GENERIC_ERROR).await?;
            return Err(Box::new(err));
        }
    };

    log::info!(
        "user {} published {:?} order {}",
        user.tg_id,
        order.side,
        order.id
    );

    publish(notifier, &order).await?;
    Ok(order)
}

/// The deterministic success sequence: channel announcement first, then the
/// direct messages ending with the cancel instructions.
async fn publish<N: Notifier>(notifier: &N, order: &Order) -> crate::Result<()> {
    notifier.announce(&messages::order_announcement(order)).await?;
    notifier.direct(&messages::published(order.side)).await?;
    notifier.direct(messages::WAIT_TAKER).await?;
    notifier.direct(messages::CANCEL_HINT).await?;
    notifier.direct(&messages::cancel_command(&order.id)).await?;
    Ok(())
}

pub async fn handle_cancel<N: Notifier>(
    storage: &mut Storage,
    notifier: &N,
    tg_id: i64,
    raw_args: &[&str],
) -> crate::Result<Order> {
    let user = verify_with(notifier, storage)
        .user_by_tg_id(tg_id)
        .await?
        .into_result();

    let id = match raw_args.first() {
        Some(id) => *id,
        None => {
            notifier.direct(messages::CANCEL_USAGE).await?;
            return Err(Box::new(BotError::unknown("missing order id")));
        }
    };

    let cancelled = verify_with(notifier, storage)
        .order_by_id(id)
        .await?
        .owned_by(user.tg_id)
        .await?
        .still_open()
        .await?
        .cancel()
        .await?;

    log::info!("user {} cancelled order {}", user.tg_id, cancelled.id);

    notifier
        .direct(&messages::order_cancelled(&cancelled.id))
        .await?;
    Ok(cancelled)
}
