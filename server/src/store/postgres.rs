//! PostgreSQL-backed table.
//!
//! Each item is one row of `kv_items`; the attribute map is kept as JSONB in
//! DynamoDB's `{"S": ..}` / `{"N": ..}` shape.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::info;

use super::{AttributeValue, Item, KeyValueStore, Result, StoreError, PARTITION_KEY, SORT_KEY};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies the embedded migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend {
                operation: "migrate",
                message: e.to_string(),
            })?;

        info!("Migrations run successfully");

        Ok(Self::new(pool))
    }
}

fn key(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(AttributeValue::as_s).map(str::to_string)
}

#[async_trait]
impl KeyValueStore for PostgresStore {
    async fn query(&self, partition_key: &str) -> Result<Vec<Item>> {
        let rows: Vec<(Json<Item>,)> =
            sqlx::query_as("SELECT attributes FROM kv_items WHERE pk = $1 ORDER BY uuid")
                .bind(partition_key)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(Json(item),)| item).collect())
    }

    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        let row: Option<(Json<Item>,)> =
            sqlx::query_as("SELECT attributes FROM kv_items WHERE pk = $1 AND uuid = $2")
                .bind(partition_key)
                .bind(sort_key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(item),)| item))
    }

    async fn put(&self, item: Item) -> Result<()> {
        let pk = key(&item, PARTITION_KEY).ok_or_else(|| StoreError::Backend {
            operation: "put",
            message: format!("item is missing key attribute '{}'", PARTITION_KEY),
        })?;
        let sk = key(&item, SORT_KEY).ok_or(StoreError::MissingSortKey)?;

        sqlx::query(
            "INSERT INTO kv_items (pk, uuid, attributes) VALUES ($1, $2, $3) \
             ON CONFLICT (pk, uuid) DO UPDATE SET attributes = EXCLUDED.attributes",
        )
        .bind(pk)
        .bind(sk)
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_items WHERE pk = $1 AND uuid = $2")
            .bind(partition_key)
            .bind(sort_key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
