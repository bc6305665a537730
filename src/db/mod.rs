mod clients;
mod employees;
mod schema;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::config::{Backend, Config};
use crate::error::{Result, StoreError};
use crate::models::{Record, RecordKind};

/// Data access for one record type
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Every row of the table, ordered by identity
    async fn list(&self) -> Result<Vec<R>>;

    async fn get(&self, id: i64) -> Result<R>;

    /// Insert a new row and return the identity the database assigned
    async fn insert(&self, record: &R) -> Result<i64>;

    /// Update the row with the record's identity, returning the affected row count
    async fn update(&self, record: &R) -> Result<u64>;

    async fn delete(&self, id: i64) -> Result<u64>;
}

/// Owned connection pool shared by every screen and background job
///
/// Clones share the same pool. `close` waits for checked-out connections to
/// be returned before shutting the pool down.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
}

impl Database {
    /// Open a pool using the connection settings from the config
    pub async fn new(config: &Config) -> Result<Self> {
        let backend = config
            .backend()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;

        Self::connect(&config.connection_url(), backend).await
    }

    pub async fn connect(url: &str, backend: Backend) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let options = AnyPoolOptions::new().acquire_timeout(Duration::from_secs(10));

        // Each connection to an in-memory SQLite database opens a separate,
        // empty database, so the pool must hold on to exactly one.
        let options = if backend == Backend::Sqlite && url.contains(":memory:") {
            options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            options.max_connections(5)
        };

        let pool = options.connect(url).await?;

        Ok(Self { pool, backend })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Create the client and employee tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in schema::statements(self.backend) {
            sqlx::query(statement).execute(self.get_pool()).await?;
        }

        tracing::debug!(backend = ?self.backend, "schema ready");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database connection closed");
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let db = Self::connect("sqlite::memory:", Backend::Sqlite)
            .await
            .expect("open in-memory database");
        db.ensure_schema().await.expect("create schema");
        db
    }
}

/// Turn a zero affected-row count into `NotFound`
fn expect_affected(rows_affected: u64, kind: RecordKind, id: i64) -> Result<u64> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound { kind, id });
    }
    Ok(rows_affected)
}

fn check<R: Record>(record: &R) -> Result<()> {
    record.validate().map_err(StoreError::Invalid)
}

/// Connect to the configured database and make sure both tables exist
pub async fn init(config: &Config) -> anyhow::Result<Database> {
    let db = Database::new(config).await?;
    db.ensure_schema().await?;

    tracing::info!(backend = ?db.backend(), "database connection established");
    Ok(db)
}
