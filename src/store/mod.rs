use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod memory;
pub mod postgres;
pub mod records;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Coins taken from a numeric field of one document as part of
/// [`DocumentStore::debit_and_put`]
#[derive(Debug, Clone, PartialEq)]
pub struct Debit {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub amount: i64,
}

/// Coins added to a numeric field of one document as part of
/// [`DocumentStore::credit_and_put`]
#[derive(Debug, Clone, PartialEq)]
pub struct Credit {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub amount: i64,
}

/// Schemaless document persistence, partitioned by collection and id.
///
/// Documents are JSON objects. Per-user data (profile, journey, liked
/// places) lives under the user id, so users never contend with each other.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Create or fully overwrite a document
    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()>;

    /// Merge the top-level fields of `fields` into an existing document.
    /// Fields not named are left untouched; a missing document is `NotFound`.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()>;

    /// Insert under a generated id and return it
    async fn add(&self, collection: &str, document: Value) -> Result<String>;

    /// Documents whose top-level `field` equals `value`
    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>>;

    /// Atomically add `delta` to a numeric field and return the new value.
    /// A missing field counts as zero; a missing document is `NotFound`.
    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64>;

    /// Debit a balance and write a record as one all-or-nothing step.
    ///
    /// The balance is checked before anything is written: when it is lower
    /// than the amount the call fails with `InsufficientBalance` and neither
    /// document changes. Returns the balance left after the debit.
    async fn debit_and_put(
        &self,
        debit: Debit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64>;

    /// Write a record and credit a balance as one all-or-nothing step.
    /// A missing account is `NotFound` and neither document changes.
    /// Returns the balance after the credit.
    async fn credit_and_put(
        &self,
        credit: Credit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64>;

    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

pub async fn create_pool(database_url: &str) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Numeric value of `field` in `document`, zero when absent
pub(crate) fn numeric_field(document: &Value, field: &str) -> i64 {
    document.get(field).and_then(Value::as_i64).unwrap_or(0)
}
