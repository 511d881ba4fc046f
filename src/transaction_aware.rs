use async_trait::async_trait;

use crate::StoreResult;

/// Trait for components that need to be notified of transaction lifecycle events.
///
/// Components implementing this trait can be registered with a session to
/// receive callbacks once its unit of work is committed or rolled back.
/// The repositories use it to account for the writes they staged.
#[async_trait]
pub trait TransactionAware: Send + Sync {
    /// Called after a successful transaction commit.
    async fn on_commit(&self) -> StoreResult<()>;

    /// Called after a transaction rollback.
    ///
    /// Implementations should revert any in-memory state that assumed the
    /// transaction's writes would persist.
    async fn on_rollback(&self) -> StoreResult<()>;
}
