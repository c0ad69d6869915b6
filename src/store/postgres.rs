//! PostgreSQL store: one row per item, key assigned by the database.

use crate::config::DatabaseSettings;
use crate::error::AppError;
use crate::model::{now_micros, Item, ItemCreate, ItemUpdate};
use crate::store::{ItemStore, Listing};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_TABLE: &str = "items";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 5;
const COLUMNS: &str = "id, name, description, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgItemStore {
    pool: PgPool,
    table: String,
}

impl PgItemStore {
    /// Wrap an existing pool; call [`PgItemStore::ensure_table`] before use.
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, DEFAULT_TABLE)
    }

    pub fn with_table(pool: PgPool, table: &str) -> Self {
        PgItemStore {
            pool,
            table: quote_ident(table),
        }
    }

    /// Create the database if needed, open the pool, create the table, and ping.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        ensure_database_exists(settings).await?;
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(settings.connect_options())
            .await?;
        let store = Self::new(pool);
        store.ensure_table().await?;
        store.ping().await?;
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.name,
            "connected to PostgreSQL"
        );
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Idempotent DDL for the items table and its listing index.
    pub async fn ensure_table(&self) -> Result<(), AppError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                seq BIGSERIAL NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        let index_name = quote_ident(&format!("{}_created_at_seq_idx", unquote(&self.table)));
        let index = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (created_at DESC, seq DESC)",
            index_name, self.table
        );
        sqlx::query(&index).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop the table. Used by tests that create throwaway tables.
    pub async fn drop_table(&self) -> Result<(), AppError> {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self, filter: Option<&str>) -> Result<u64, AppError> {
        let (total,): (i64,) = match filter {
            None => {
                let sql = format!("SELECT COUNT(*) FROM {}", self.table);
                sqlx::query_as(&sql).fetch_one(&self.pool).await?
            }
            Some(q) => {
                let sql = format!(
                    "SELECT COUNT(*) FROM {} WHERE strpos(lower(name), lower($1)) > 0",
                    self.table
                );
                sqlx::query_as(&sql).bind(q).fetch_one(&self.pool).await?
            }
        };
        Ok(total.max(0) as u64)
    }

    async fn page(&self, filter: Option<&str>, skip: u64, limit: u64) -> Result<Vec<Item>, AppError> {
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<ItemRow> = match filter {
            None => {
                let sql = format!(
                    "SELECT {} FROM {} ORDER BY created_at DESC, seq DESC OFFSET $1 LIMIT $2",
                    COLUMNS, self.table
                );
                tracing::debug!(sql = %sql, offset, limit, "query");
                sqlx::query_as(&sql)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(q) => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE strpos(lower(name), lower($1)) > 0 \
                     ORDER BY created_at DESC, seq DESC OFFSET $2 LIMIT $3",
                    COLUMNS, self.table
                );
                tracing::debug!(sql = %sql, q = %q, offset, limit, "query");
                sqlx::query_as(&sql)
                    .bind(q)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Item::from).collect())
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, input: ItemCreate) -> Result<Item, AppError> {
        let sql = format!(
            "INSERT INTO {} (name, description, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING {}",
            self.table, COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row: ItemRow = sqlx::query_as(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(now_micros())
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(id = %row.id, "item created");
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Item>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, self.table);
        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Item::from))
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Listing, AppError> {
        let total = self.count(None).await?;
        let items = self.page(None, skip, limit).await?;
        Ok(Listing { items, total })
    }

    async fn update(&self, id: Uuid, update: ItemUpdate) -> Result<Option<Item>, AppError> {
        let sql = format!(
            r#"
            UPDATE {} SET
                name = CASE WHEN $2 THEN $3::text ELSE name END,
                description = CASE WHEN $4 THEN $5::text ELSE description END,
                updated_at = GREATEST($6, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {}
            "#,
            self.table, COLUMNS
        );
        tracing::debug!(sql = %sql, id = %id, "query");
        let set_description = update.description.is_some();
        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(update.name.is_some())
            .bind(update.name)
            .bind(set_description)
            .bind(update.description.flatten())
            .bind(now_micros())
            .fetch_optional(&self.pool)
            .await?;
        if row.is_some() {
            tracing::debug!(id = %id, "item updated");
        }
        Ok(row.map(Item::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        let removed = result.rows_affected() > 0;
        if removed {
            tracing::debug!(id = %id, "item deleted");
        }
        Ok(removed)
    }

    async fn search(&self, query: &str, skip: u64, limit: u64) -> Result<Listing, AppError> {
        let total = self.count(Some(query)).await?;
        let items = self.page(Some(query), skip, limit).await?;
        Ok(Listing { items, total })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

/// Connect to the auth-source database and create the target database when missing.
pub async fn ensure_database_exists(settings: &DatabaseSettings) -> Result<(), AppError> {
    if settings.name.is_empty() || settings.name == settings.auth_source {
        return Ok(());
    }
    let mut conn = settings.admin_connect_options().connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&settings.name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %settings.name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&settings.name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn unquote(quoted: &str) -> String {
    quoted
        .trim_start_matches('"')
        .trim_end_matches('"')
        .replace("\"\"", "\"")
}
