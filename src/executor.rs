use sqlx::{Sqlite, Transaction};
use std::sync::Arc;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use crate::{StoreError, StoreResult};

/// Executor wraps the session's SQLite transaction for use by repositories.
///
/// Every repository built from the same session holds a clone of this
/// handle, so all of them read and write through one transaction.
#[derive(Clone, Debug)]
pub struct Executor {
    tx: Arc<Mutex<Option<Transaction<'static, Sqlite>>>>,
}

impl Executor {
    /// Creates a new Executor from a SQLite transaction.
    pub fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Locks the transaction for the duration of one repository operation.
    ///
    /// Fails with [`StoreError::SessionClosed`] once the session has been
    /// committed, rolled back or dropped.
    pub async fn transaction(&self) -> StoreResult<MappedMutexGuard<'_, Transaction<'static, Sqlite>>> {
        let guard = self.tx.lock().await;
        MutexGuard::try_map(guard, |tx| tx.as_mut()).map_err(|_| StoreError::SessionClosed)
    }

    /// Whether the transaction is still available.
    pub async fn is_open(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> StoreResult<Transaction<'static, Sqlite>> {
        self.tx.lock().await.take().ok_or(StoreError::SessionClosed)
    }

    /// Non-blocking variant of [`Executor::take_transaction`] for `Drop`.
    pub(crate) fn try_take_transaction(&self) -> Option<Transaction<'static, Sqlite>> {
        self.tx.try_lock().ok().and_then(|mut tx| tx.take())
    }
}
