use async_trait::async_trait;
use model::{Error, ExpiryPatch, Order};
use std::fmt::{Display, Formatter};

/// Name of the partition key attribute on the user index.
pub const PARTITION_KEY: &str = "pk";
/// Name of the sort key attribute on the user index.
pub const SORT_KEY: &str = "sk";

/// Persist order records in a single table.
///
/// Active orders and renewal offers live side by side. Records are read by
/// `orderId` or queried through a secondary index on `pk` and `sk`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Put the order, overwriting any record with the same `orderId`.
    async fn write(&self, order: Order) -> Result<Order, StoreError>;

    /// Rewrite the expiry attributes of `order_id`.
    /// When no record holds the id, one is created holding only these attributes.
    async fn update(&self, order_id: &str, patch: ExpiryPatch)
        -> Result<ExpiryPatch, StoreError>;

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// All records in the index partition, ordered by sort key.
    async fn query(&self, query: IndexQuery) -> Result<Vec<Order>, StoreError>;
}

/// A key condition against a secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub index: String,
    pub pk_key: String,
    pub pk_value: String,
    pub sk_key: String,
    // Only match this exact sort key when set
    pub sk_value: Option<String>,
    pub ascending: bool,
}

impl IndexQuery {
    pub fn new(index: impl Into<String>, pk_value: impl Into<String>) -> Self {
        IndexQuery {
            index: index.into(),
            pk_key: PARTITION_KEY.to_string(),
            pk_value: pk_value.into(),
            sk_key: SORT_KEY.to_string(),
            sk_value: None,
            ascending: true,
        }
    }

    pub fn with_sort_key(mut self, sk_value: impl Into<String>) -> Self {
        self.sk_value = Some(sk_value.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }
}

/// Errors arising from the order table.
#[derive(Debug)]
pub struct StoreError {
    pub key: String,

    pub operation: StoreOperation,
    pub reason: StoreErrorReason,
}

#[derive(Debug)]
pub enum StoreErrorReason {
    // The record could not be converted to or from an item
    BadRecord(String),
    // An error from the underlying table
    BackendFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Write,
    Update,
    Get,
    Query,
}

impl StoreError {
    pub fn new(key: impl Into<String>, operation: StoreOperation, reason: StoreErrorReason) -> Self {
        StoreError {
            key: key.into(),
            operation,
            reason,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            StoreErrorReason::BadRecord(reason) => {
                write!(f, "{:?} failed for {}: {}", self.operation, self.key, reason)
            }
            StoreErrorReason::BackendFailure(err) => {
                write!(f, "{:?} failed for {}: {}", self.operation, self.key, err)
            }
        }
    }
}

impl std::error::Error for StoreError {}
