use crate::error::{AppError, Result};
use crate::store::{numeric_field, Credit, Debit, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Documents keyed by id, each tagged with its insertion sequence so listings
/// come back in the order documents were first written
#[derive(Default)]
struct Collection {
    next_seq: u64,
    documents: HashMap<String, (u64, Value)>,
}

impl Collection {
    fn get(&self, id: &str) -> Option<&Value> {
        self.documents.get(id).map(|(_, doc)| doc)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Value> {
        self.documents.get_mut(id).map(|(_, doc)| doc)
    }

    /// Overwrites keep the original position
    fn insert(&mut self, id: String, document: Value) {
        match self.documents.get_mut(&id) {
            Some((_, existing)) => *existing = document,
            None => {
                self.documents.insert(id, (self.next_seq, document));
                self.next_seq += 1;
            }
        }
    }

    fn ordered(&self) -> Vec<&Value> {
        let mut entries: Vec<&(u64, Value)> = self.documents.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, doc)| doc).collect()
    }
}

/// Process-local store. Writers hold the lock for the whole operation, so
/// `increment` and the balance-and-record operations are atomic with
/// respect to each other.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        MemoryDocumentStore {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_object(document: &Value) -> Result<()> {
    if document.is_object() {
        Ok(())
    } else {
        Err(AppError::InvalidRequest("Documents must be JSON objects".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        ensure_object(&document)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        let Value::Object(fields) = fields else {
            return Err(AppError::InvalidRequest("Updates must be JSON objects".to_string()));
        };
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{} does not exist", collection, id)))?;

        if let Some(object) = document.as_object_mut() {
            object.extend(fields);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, document: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.set(collection, &id, document).await?;
        Ok(id)
    }

    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.ordered()
                    .into_iter()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.ordered().into_iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{} does not exist", collection, id)))?;

        let updated = numeric_field(document, field) + delta;
        if let Some(object) = document.as_object_mut() {
            object.insert(field.to_string(), Value::from(updated));
        }
        Ok(updated)
    }

    async fn debit_and_put(
        &self,
        debit: Debit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        ensure_object(&document)?;
        let mut collections = self.collections.write().await;

        let account = collections
            .get_mut(&debit.collection)
            .and_then(|c| c.get_mut(&debit.id))
            .ok_or_else(|| {
                AppError::NotFound(format!("{}/{} does not exist", debit.collection, debit.id))
            })?;

        let balance = numeric_field(account, &debit.field);
        if balance < debit.amount {
            return Err(AppError::InsufficientBalance {
                balance,
                cost: debit.amount,
            });
        }

        let remaining = balance - debit.amount;
        if let Some(object) = account.as_object_mut() {
            object.insert(debit.field.clone(), Value::from(remaining));
        }
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);

        Ok(remaining)
    }

    async fn credit_and_put(
        &self,
        credit: Credit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        ensure_object(&document)?;
        let mut collections = self.collections.write().await;

        let account = collections
            .get_mut(&credit.collection)
            .and_then(|c| c.get_mut(&credit.id))
            .ok_or_else(|| {
                AppError::NotFound(format!("{}/{} does not exist", credit.collection, credit.id))
            })?;

        let balance = numeric_field(account, &credit.field) + credit.amount;
        if let Some(object) = account.as_object_mut() {
            object.insert(credit.field.clone(), Value::from(balance));
        }
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);

        Ok(balance)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
