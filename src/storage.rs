use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::entries::*;

pub mod prelude {
    pub use super::{OrderStore, SharedStorage, Storage, StorageError, UserStore};
}

#[derive(Debug)]
pub enum StorageError {
    Backend(String),
    DuplicateOpenOrder(i64, OrderSide),
    OrderNotFound(OrderId),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Backend(msg) => write!(f, "storage backend error: {}", msg),
            StorageError::DuplicateOpenOrder(tg_id, side) => {
                write!(f, "user {} already has an open {:?} order", tg_id, side)
            }
            StorageError::OrderNotFound(id) => write!(f, "order {} not found", id),
        }
    }
}

impl std::error::Error for StorageError {}

#[async_trait]
pub trait UserStore {
    async fn find_one_by_tg_id(&self, tg_id: i64) -> Result<Option<User>, StorageError>;
    async fn upsert(&mut self, user: &User) -> Result<(), StorageError>;
}

#[async_trait]
pub trait OrderStore {
    /// An order of the given side in a non-terminal status, if any.
    async fn find_open(&self, tg_id: i64, side: OrderSide)
        -> Result<Option<Order>, StorageError>;

    async fn find_one_by_id(&self, id: &str) -> Result<Option<Order>, StorageError>;

    /// Creates the order. This is the authoritative duplicate guard: the
    /// verify-chain check is advisory only, racing invocations are rejected
    /// here with `DuplicateOpenOrder`.
    async fn create_order(&mut self, new: NewOrder) -> Result<Order, StorageError>;

    async fn update_status(
        &mut self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StorageError>;
}

pub struct Storage {
    pub users: Box<dyn UserStore + Send + Sync>,
    pub orders: Box<dyn OrderStore + Send + Sync>,
}

pub type SharedStorage = Arc<RwLock<Storage>>;

pub fn build() -> SharedStorage {
    Arc::new(RwLock::new(Storage {
        users: Box::new(InMemUsers::default()),
        orders: Box::new(InMemOrders::default()),
    }))
}

#[derive(Default)]
pub struct InMemUsers {
    rows: Vec<Option<User>>,
}

#[async_trait]
impl UserStore for InMemUsers {
    async fn find_one_by_tg_id(&self, tg_id: i64) -> Result<Option<User>, StorageError> {
        Ok(self
            .rows
            .iter()
            .flatten()
            .find(|user| user.tg_id == tg_id)
            .cloned())
    }

    async fn upsert(&mut self, user: &User) -> Result<(), StorageError> {
        let slot = self
            .rows
            .iter_mut()
            .flatten()
            .find(|row| row.tg_id == user.tg_id);

        match slot {
            Some(row) => *row = user.clone(),
            None => self.rows.push(Some(user.clone())),
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct InMemOrders {
    rows: Vec<Option<Order>>,
}

#[async_trait]
impl OrderStore for InMemOrders {
    async fn find_open(
        &self,
        tg_id: i64,
        side: OrderSide,
    ) -> Result<Option<Order>, StorageError> {
        Ok(self
            .rows
            .iter()
            .flatten()
            .find(|order| order.creator_tg_id == tg_id && order.side == side && order.is_open())
            .cloned())
    }

    async fn find_one_by_id(&self, id: &str) -> Result<Option<Order>, StorageError> {
        Ok(self.rows.iter().flatten().find(|order| order.id == id).cloned())
    }

    async fn create_order(&mut self, new: NewOrder) -> Result<Order, StorageError> {
        if self.find_open(new.creator_tg_id, new.side).await?.is_some() {
            return Err(StorageError::DuplicateOpenOrder(new.creator_tg_id, new.side));
        }

        let order = Order {
            id: minimal_id::Generator::new_id().to_string(),
            side: new.side,
            status: OrderStatus::Pending,
            creator_tg_id: new.creator_tg_id,
            amount_sats: new.amount_sats,
            amount_fiat: new.amount_fiat,
            fiat_code: new.fiat_code,
            payment_method: new.payment_method,
            price_margin: new.price_margin,
            created_date: Utc::now(),
        };

        self.rows.push(Some(order.clone()));
        Ok(order)
    }

    async fn update_status(
        &mut self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StorageError> {
        let order = self
            .rows
            .iter_mut()
            .flatten()
            .find(|order| order.id == id)
            .ok_or_else(|| StorageError::OrderNotFound(id.to_owned()))?;

        order.status = status;
        Ok(order.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn in_mem() -> Storage {
        Storage {
            users: Box::new(InMemUsers::default()),
            orders: Box::new(InMemOrders::default()),
        }
    }

    pub fn with_user(tg_id: i64) -> Storage {
        let mut users = InMemUsers::default();
        users.rows.push(Some(sample_user(tg_id)));

        Storage {
            users: Box::new(users),
            orders: Box::new(InMemOrders::default()),
        }
    }

    pub fn sample_user(tg_id: i64) -> User {
        User {
            tg_id,
            username: Some("satoshi".to_owned()),
            lang_code: "es".to_owned(),
            created_date: Utc::now(),
            last_activity_date: Utc::now(),
            blocked: false,
        }
    }

    /// User store whose lookups fail, for exercising the generic failure
    /// path of the validator.
    pub struct BrokenUsers;

    #[async_trait]
    impl UserStore for BrokenUsers {
        async fn find_one_by_tg_id(&self, _: i64) -> Result<Option<User>, StorageError> {
            Err(StorageError::Backend("lookup offline".to_owned()))
        }

        async fn upsert(&mut self, _: &User) -> Result<(), StorageError> {
            Err(StorageError::Backend("insert offline".to_owned()))
        }
    }

    /// Order store whose every call fails, for exercising the generic
    /// failure path of the intent flow.
    pub struct BrokenOrders;

    #[async_trait]
    impl OrderStore for BrokenOrders {
        async fn find_open(
            &self,
            _: i64,
            _: OrderSide,
        ) -> Result<Option<Order>, StorageError> {
            Ok(None)
        }

        async fn find_one_by_id(&self, _: &str) -> Result<Option<Order>, StorageError> {
            Err(StorageError::Backend("lookup offline".to_owned()))
        }

        async fn create_order(&mut self, _: NewOrder) -> Result<Order, StorageError> {
            Err(StorageError::Backend("insert offline".to_owned()))
        }

        async fn update_status(
            &mut self,
            id: &str,
            _: OrderStatus,
        ) -> Result<Order, StorageError> {
            Err(StorageError::OrderNotFound(id.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sell(tg_id: i64) -> NewOrder {
        NewOrder {
            side: OrderSide::Sell,
            creator_tg_id: tg_id,
            amount_sats: 100,
            amount_fiat: 1.0,
            fiat_code: "ves".to_owned(),
            payment_method: "Pagomovil".to_owned(),
            price_margin: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_find() {
        let mut users = InMemUsers::default();
        let user = testing::sample_user(7);

        users.upsert(&user).await.unwrap();
        let found = users.find_one_by_tg_id(7).await.unwrap().unwrap();
        assert_eq!(found.username, user.username);

        users.upsert(&user).await.unwrap();
        assert_eq!(users.rows.len(), 1);
    }

    #[tokio::test]
    async fn create_assigns_id_and_pending_status() {
        let mut orders = InMemOrders::default();
        let order = orders.create_order(new_sell(7)).await.unwrap();

        assert!(!order.id.is_empty());
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(orders.find_open(7, OrderSide::Sell).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn second_open_order_of_same_side_is_rejected() {
        let mut orders = InMemOrders::default();
        orders.create_order(new_sell(7)).await.unwrap();

        let err = orders.create_order(new_sell(7)).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateOpenOrder(7, OrderSide::Sell)));

        // The other side stays available.
        let mut buy = new_sell(7);
        buy.side = OrderSide::Buy;
        orders.create_order(buy).await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_order_no_longer_counts_as_open() {
        let mut orders = InMemOrders::default();
        let order = orders.create_order(new_sell(7)).await.unwrap();

        orders
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        assert!(orders.find_open(7, OrderSide::Sell).await.unwrap().is_none());
        orders.create_order(new_sell(7)).await.unwrap();
    }
}
