use crate::error::{AppError, Result};
use crate::store::{numeric_field, Credit, Debit, DocumentStore};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Documents as JSONB rows of a single `documents` table keyed by
/// `(collection, id)`. `seq` preserves first-insert order for listings.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const UPSERT_SQL: &str = "INSERT INTO documents (collection, id, data)
     VALUES ($1, $2, $3)
     ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()";

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let row: Option<Json<Value>> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(data)| data))
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<()> {
        if !document.is_object() {
            return Err(AppError::InvalidRequest("Documents must be JSON objects".to_string()));
        }
        sqlx::query(UPSERT_SQL)
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<()> {
        if !fields.is_object() {
            return Err(AppError::InvalidRequest("Updates must be JSON objects".to_string()));
        }
        // jsonb `||` replaces top-level keys and keeps the rest
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now()
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{}/{} does not exist", collection, id)));
        }
        Ok(())
    }

    async fn add(&self, collection: &str, document: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.set(collection, &id, document).await?;
        Ok(id)
    }

    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let rows: Vec<Json<Value>> = sqlx::query_scalar(
            "SELECT data FROM documents
             WHERE collection = $1 AND data -> $2 = $3
             ORDER BY seq",
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(data)| data).collect())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let rows: Vec<Json<Value>> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = $1 ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(data)| data).collect())
    }

    async fn increment(&self, collection: &str, id: &str, field: &str, delta: i64) -> Result<i64> {
        // Row-level UPDATE is atomic; concurrent increments serialize on the row lock
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE documents
             SET data = jsonb_set(
                     data,
                     ARRAY[$3::text],
                     to_jsonb(COALESCE((data ->> $3)::bigint, 0) + $4::bigint)
                 ),
                 updated_at = now()
             WHERE collection = $1 AND id = $2
             RETURNING (data ->> $3)::bigint",
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("{}/{} does not exist", collection, id)))
    }

    async fn debit_and_put(
        &self,
        debit: Debit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        if !document.is_object() {
            return Err(AppError::InvalidRequest("Documents must be JSON objects".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let account: Option<Json<Value>> = sqlx::query_scalar(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(&debit.collection)
        .bind(&debit.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Json(account) = account.ok_or_else(|| {
            AppError::NotFound(format!("{}/{} does not exist", debit.collection, debit.id))
        })?;

        let balance = numeric_field(&account, &debit.field);
        if balance < debit.amount {
            // Dropping the transaction rolls it back and releases the row lock
            return Err(AppError::InsufficientBalance {
                balance,
                cost: debit.amount,
            });
        }
        let remaining = balance - debit.amount;

        sqlx::query(
            "UPDATE documents
             SET data = jsonb_set(data, ARRAY[$3::text], to_jsonb($4::bigint)), updated_at = now()
             WHERE collection = $1 AND id = $2",
        )
        .bind(&debit.collection)
        .bind(&debit.id)
        .bind(&debit.field)
        .bind(remaining)
        .execute(&mut *tx)
        .await?;

        sqlx::query(UPSERT_SQL)
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Debited {} from {}/{}, {} left",
            debit.amount,
            debit.collection,
            debit.id,
            remaining
        );
        Ok(remaining)
    }

    async fn credit_and_put(
        &self,
        credit: Credit,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        if !document.is_object() {
            return Err(AppError::InvalidRequest("Documents must be JSON objects".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let balance: Option<i64> = sqlx::query_scalar(
            "UPDATE documents
             SET data = jsonb_set(
                     data,
                     ARRAY[$3::text],
                     to_jsonb(COALESCE((data ->> $3)::bigint, 0) + $4::bigint)
                 ),
                 updated_at = now()
             WHERE collection = $1 AND id = $2
             RETURNING (data ->> $3)::bigint",
        )
        .bind(&credit.collection)
        .bind(&credit.id)
        .bind(&credit.field)
        .bind(credit.amount)
        .fetch_optional(&mut *tx)
        .await?;

        // An uncommitted transaction is rolled back on drop
        let balance = balance.ok_or_else(|| {
            AppError::NotFound(format!("{}/{} does not exist", credit.collection, credit.id))
        })?;

        sqlx::query(UPSERT_SQL)
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            "Credited {} to {}/{}, balance {}",
            credit.amount,
            credit.collection,
            credit.id,
            balance
        );
        Ok(balance)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
