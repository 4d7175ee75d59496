use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered account. Immutable after creation except the active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub registration_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// A completed or attempted purchase. Only `status = completed` counts
/// toward revenue aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub customer_id: String,
    pub transaction_date: DateTime<Utc>,
    pub amount: Decimal,
    pub currency: String,
    pub merchant: String,
    pub category: String,
    pub payment_method: String,
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// A behavioral/session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub customer_id: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// The full record set as of a snapshot instant, as handed over by the
/// ingestion collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub events: Vec<Event>,
}
