use async_trait::async_trait;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::queries;
use super::StagedWrites;
use crate::model::{User, UserId};
use crate::{Executor, StoreError, StoreResult, TransactionAware};

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::restore(row.id, row.name, row.email)
    }
}

/// Transaction-aware User Repository
pub struct UserRepository {
    executor: Executor,
    staged: StagedWrites,
}

impl UserRepository {
    pub fn new(executor: Executor) -> Arc<Self> {
        Arc::new(Self {
            executor,
            staged: StagedWrites::default(),
        })
    }

    /// Assigns the user an identity and inserts it.
    #[instrument(skip(self))]
    pub async fn save(&self, user: &mut User) -> StoreResult<UserId> {
        let id = user.id().unwrap_or_else(UserId::generate);
        let mut tx = self.executor.transaction().await?;
        sqlx::query(queries::INSERT_USER)
            .bind(id)
            .bind(user.name())
            .bind(user.email())
            .execute(&mut **tx)
            .await?;
        user.set_id(id);
        self.staged.record();
        debug!(%id, "user saved");
        Ok(id)
    }

    /// Persists changes made to a saved user.
    #[instrument(skip(self))]
    pub async fn update(&self, user: &User) -> StoreResult<()> {
        let id = user.id().ok_or(StoreError::NotPersisted { entity: "User" })?;
        let mut tx = self.executor.transaction().await?;
        let result = sqlx::query(queries::UPDATE_USER)
            .bind(user.name())
            .bind(user.email())
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotPersisted { entity: "User" });
        }
        self.staged.record();
        debug!(%id, "user updated");
        Ok(())
    }

    /// Removes the user. Fails with a constraint violation while any auction
    /// or bid still references them.
    #[instrument(skip(self))]
    pub async fn delete(&self, user: &User) -> StoreResult<()> {
        let id = user.id().ok_or(StoreError::NotPersisted { entity: "User" })?;
        let mut tx = self.executor.transaction().await?;
        sqlx::query(queries::DELETE_USER)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        self.staged.record();
        debug!(%id, "user deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let mut tx = self.executor.transaction().await?;
        let row = sqlx::query_as::<_, UserRow>(queries::FIND_USER_BY_ID)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self))]
    pub async fn find_by_name_and_email(&self, name: &str, email: &str) -> StoreResult<Option<User>> {
        let mut tx = self.executor.transaction().await?;
        let row = sqlx::query_as::<_, UserRow>(queries::FIND_USER_BY_NAME_AND_EMAIL)
            .bind(name)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(User::from))
    }

    /// Writes issued since the last commit or rollback.
    pub fn staged_writes(&self) -> usize {
        self.staged.get()
    }
}

#[async_trait]
impl TransactionAware for UserRepository {
    async fn on_commit(&self) -> StoreResult<()> {
        debug!(writes = self.staged.take(), "user writes committed");
        Ok(())
    }

    async fn on_rollback(&self) -> StoreResult<()> {
        debug!(writes = self.staged.take(), "user writes discarded");
        Ok(())
    }
}
