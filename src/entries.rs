use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod prelude {
    pub use super::{NewOrder, Order, OrderId, OrderSide, OrderStatus, User};
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub tg_id: i64,
    pub username: Option<String>,
    pub lang_code: String,
    pub created_date: DateTime<Utc>,
    pub last_activity_date: DateTime<Utc>,
    pub blocked: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_command(&self) -> &'static str {
        match self {
            OrderSide::Buy => "/buy",
            OrderSide::Sell => "/sell",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Open,
    Taken,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

pub type OrderId = String;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub status: OrderStatus,
    pub creator_tg_id: i64,
    pub amount_sats: u64,
    pub amount_fiat: f64,
    pub fiat_code: String,
    pub payment_method: String,
    pub price_margin: Option<f64>,
    pub created_date: DateTime<Utc>,
}

impl Order {
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// The command line that would recreate this order, verbatim.
    /// Carried in the channel announcement so takers see the exact terms.
    pub fn command_line(&self) -> String {
        let mut line = format!(
            "{} {} {} {} {}",
            self.side.as_command(),
            self.amount_sats,
            self.amount_fiat,
            self.fiat_code,
            self.payment_method
        );

        if let Some(margin) = self.price_margin {
            line.push_str(&format!(" {}", margin));
        }

        line
    }
}

/// Fields the intent flow hands to the order store. The store fills in
/// the id, the initial status and the creation date.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub side: OrderSide,
    pub creator_tg_id: i64,
    pub amount_sats: u64,
    pub amount_fiat: f64,
    pub fiat_code: String,
    pub payment_method: String,
    pub price_margin: Option<f64>,
}
