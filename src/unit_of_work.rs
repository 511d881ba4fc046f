use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::{Executor, StoreError, StoreResult, TransactionAware};

/// Unit of Work pattern for managing store transactions.
///
/// The UnitOfWork owns the connection pool and hands out one session per
/// logical unit of work.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Session: UnitOfWorkSession;

    /// Begin a new transaction session.
    async fn begin(&self) -> StoreResult<Self::Session>;
}

/// Represents a single transaction session.
///
/// Writes made through the session's executor are visible to every later
/// read in the same session, and to other sessions only after `commit`.
#[async_trait]
pub trait UnitOfWorkSession: Send + Sync {
    /// Get the executor for this session (provides access to the transaction).
    fn executor(&self) -> &Executor;

    /// Register a component that needs to be notified of transaction events.
    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>);

    /// Commit the transaction and notify all registered observers.
    async fn commit(self) -> StoreResult<()>;

    /// Rollback the transaction and notify all registered observers.
    async fn rollback(self) -> StoreResult<()>;
}

/// SQLite implementation of UnitOfWork.
#[derive(Clone)]
pub struct SqliteUnitOfWork {
    pool: Arc<SqlitePool>,
}

impl SqliteUnitOfWork {
    /// Create a new SqliteUnitOfWork over an already migrated pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Connect to the configured store and apply pending migrations.
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let options = match &config.database_path {
            // Readers in other sessions must not block a writer's commit.
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(config.create_if_missing)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5)),
            None => SqliteConnectOptions::from_str(":memory:")?,
        }
        .foreign_keys(true);

        // An in-memory database lives exactly as long as its connection, so
        // the pool must never retire it.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size())
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(config.acquire_timeout())
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(
            path = ?config.database_path,
            connections = config.pool_size(),
            "auction store opened"
        );
        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Later calls to `begin` fail with
    /// [`StoreError::ConnectionFailure`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    type Session = SqliteUnitOfWorkSession;

    async fn begin(&self) -> StoreResult<Self::Session> {
        let tx = self.pool.begin().await?;
        Ok(SqliteUnitOfWorkSession::new(tx))
    }
}

/// SQLite implementation of UnitOfWorkSession.
///
/// A session that is dropped without `commit` or `rollback` is rolled back.
pub struct SqliteUnitOfWorkSession {
    executor: Executor,
    observers: Arc<RwLock<Vec<Arc<dyn TransactionAware>>>>,
}

impl SqliteUnitOfWorkSession {
    /// Create a new session from a SQLite transaction.
    pub fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self {
            executor: Executor::new(tx),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    async fn notify(&self, committed: bool) -> StoreResult<()> {
        let observers = self.observers.read().clone();
        for observer in observers.iter() {
            if committed {
                observer.on_commit().await?;
            } else {
                observer.on_rollback().await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkSession for SqliteUnitOfWorkSession {
    fn executor(&self) -> &Executor {
        &self.executor
    }

    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>) {
        self.observers.write().push(observer);
    }

    async fn commit(self) -> StoreResult<()> {
        let tx = self.executor.take_transaction().await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::CommitFailed(e.to_string()))?;
        info!(observers = self.observers.read().len(), "unit of work committed");

        self.notify(true).await
    }

    async fn rollback(self) -> StoreResult<()> {
        let tx = self.executor.take_transaction().await?;
        tx.rollback()
            .await
            .map_err(|e| StoreError::RollbackFailed(e.to_string()))?;
        info!(observers = self.observers.read().len(), "unit of work rolled back");

        self.notify(false).await
    }
}

impl Drop for SqliteUnitOfWorkSession {
    fn drop(&mut self) {
        // Dropping the sqlx transaction queues its rollback on the connection.
        if self.executor.try_take_transaction().is_some() {
            warn!("unit of work dropped without commit or rollback, discarding its writes");
        }
    }
}
