//! Precondition chain for the order commands. Each check either passes the
//! flow along or tells the invoking user why it stopped, exactly once, and
//! returns the typed error to the caller.

use std::fmt::Display;

use crate::messages;
use crate::notify::Notifier;
use crate::prelude::*;

pub fn verify_with<'a, N: Notifier>(
    notifier: &'a N,
    storage: &'a mut Storage,
) -> VerifyDriver<'a, N> {
    VerifyDriver { notifier, storage }
}

pub struct VerifyDriver<'a, N> {
    notifier: &'a N,
    storage: &'a mut Storage,
}

impl<'a, N: Notifier> VerifyDriver<'a, N> {
    async fn notify(&self, text: &str) -> crate::Result<()> {
        self.notifier.direct(text).await
    }

    /// The validator: resolves the invoking user or rejects the whole flow
    /// with a single registration notice.
    pub async fn user_by_tg_id(self, tg_id: i64) -> crate::Result<Verify<'a, N, User>> {
        let user = match self.storage.users.find_one_by_tg_id(tg_id).await {
            Ok(user) => user,
            Err(err) => {
                self.notify(messages::GENERIC_ERROR).await?;
                return Err(Box::new(VerifyUserError::Lookup(err)));
            }
        };

        let user = match user {
            Some(user) => user,
            None => {
                self.notify(messages::NON_REGISTERED).await?;
                return Err(Box::new(VerifyUserError::NotFound(tg_id)));
            }
        };

        if user.blocked {
            self.notify(messages::USER_BLOCKED).await?;
            return Err(Box::new(VerifyUserError::Blocked(tg_id)));
        }

        Ok(Verify {
            notifier: self.notifier,
            storage: self.storage,
            obj: user,
        })
    }

    pub async fn order_by_id(self, id: &str) -> crate::Result<Verify<'a, N, Order>> {
        let order = match self.storage.orders.find_one_by_id(id).await {
            Ok(order) => order,
            Err(err) => {
                self.notify(messages::GENERIC_ERROR).await?;
                return Err(Box::new(VerifyOrderError::Lookup(err)));
            }
        };

        match order {
            Some(order) => Ok(Verify {
                notifier: self.notifier,
                storage: self.storage,
                obj: order,
            }),
            None => {
                self.notify(messages::ORDER_NOT_FOUND).await?;
                Err(Box::new(VerifyOrderError::NotFound(id.to_owned())))
            }
        }
    }
}

pub struct Verify<'a, N, T> {
    notifier: &'a N,
    storage: &'a mut Storage,
    obj: T,
}

impl<'a, N, T> Verify<'a, N, T> {
    pub fn into_result(self) -> T {
        self.obj
    }
}

impl<'a, N: Notifier, T> Verify<'a, N, T> {
    async fn notify(&self, text: &str) -> crate::Result<()> {
        self.notifier.direct(text).await
    }
}

impl<'a, N: Notifier> Verify<'a, N, User> {
    /// The duplicate-offer precondition. Advisory: the store re-checks at
    /// creation time, this one exists to answer fast with a clear message.
    pub async fn no_open_order(self, side: OrderSide) -> crate::Result<Verify<'a, N, User>> {
        let open = match self.storage.orders.find_open(self.obj.tg_id, side).await {
            Ok(open) => open,
            Err(err) => {
                self.notify(messages::GENERIC_ERROR).await?;
                return Err(Box::new(VerifyOrderError::Lookup(err)));
            }
        };

        match open {
            None => Ok(self),
            Some(_) => {
                self.notify(&messages::already_open(side)).await?;
                Err(Box::new(VerifyOrderError::AlreadyOpen(
                    self.obj.tg_id,
                    side,
                )))
            }
        }
    }
}

impl<'a, N: Notifier> Verify<'a, N, Order> {
    pub async fn owned_by(self, tg_id: i64) -> crate::Result<Verify<'a, N, Order>> {
        if self.obj.creator_tg_id != tg_id {
            self.notify(messages::NOT_YOUR_ORDER).await?;
            return Err(Box::new(VerifyOrderError::NotOwner(
                self.obj.id.clone(),
                tg_id,
            )));
        }

        Ok(self)
    }

    pub async fn still_open(self) -> crate::Result<Verify<'a, N, Order>> {
        if !self.obj.is_open() {
            self.notify(messages::ORDER_NOT_CANCELLABLE).await?;
            return Err(Box::new(VerifyOrderError::NotOpen(self.obj.id.clone())));
        }

        Ok(self)
    }

    pub async fn cancel(self) -> crate::Result<Order> {
        match self
            .storage
            .orders
            .update_status(&self.obj.id, OrderStatus::Cancelled)
            .await
        {
            Ok(order) => Ok(order),
            Err(err) => {
                self.notify(messages::GENERIC_ERROR).await?;
                Err(Box::new(VerifyOrderError::Update(err)))
            }
        }
    }
}

#[derive(Debug)]
pub enum VerifyUserError {
    Lookup(StorageError),
    NotFound(i64),
    Blocked(i64),
}

impl Display for VerifyUserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyUserError::Lookup(err) => write!(f, "user lookup failed: {}", err),
            VerifyUserError::NotFound(tg_id) => write!(f, "user {} is not registered", tg_id),
            VerifyUserError::Blocked(tg_id) => write!(f, "user {} is blocked", tg_id),
        }
    }
}

impl std::error::Error for VerifyUserError {}

#[derive(Debug)]
pub enum VerifyOrderError {
    Lookup(StorageError),
    AlreadyOpen(i64, OrderSide),
    NotFound(OrderId),
    NotOwner(OrderId, i64),
    NotOpen(OrderId),
    Update(StorageError),
}

impl Display for VerifyOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyOrderError::Lookup(err) => write!(f, "order lookup failed: {}", err),
            VerifyOrderError::AlreadyOpen(tg_id, side) => {
                write!(f, "user {} already has an open {:?} order", tg_id, side)
            }
            VerifyOrderError::NotFound(id) => write!(f, "order {} not found", id),
            VerifyOrderError::NotOwner(id, tg_id) => {
                write!(f, "order {} does not belong to user {}", id, tg_id)
            }
            VerifyOrderError::NotOpen(id) => write!(f, "order {} is no longer open", id),
            VerifyOrderError::Update(err) => write!(f, "order update failed: {}", err),
        }
    }
}

impl std::error::Error for VerifyOrderError {}
