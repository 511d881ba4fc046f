#![allow(dead_code)]

use std::sync::Arc;

use auction_repository::config::StoreConfig;
use auction_repository::model::User;
use auction_repository::{
    AuctionRepository, SqliteUnitOfWork, SqliteUnitOfWorkSession, UnitOfWork, UnitOfWorkSession,
    UserRepository,
};

/// Install a tracing subscriber that writes through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("auction_repository=debug")),
        )
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Open a fresh, migrated in-memory store.
pub async fn setup() -> SqliteUnitOfWork {
    init_tracing();
    SqliteUnitOfWork::open(&StoreConfig::default())
        .await
        .expect("Failed to open store")
}

/// One unit of work with both repositories registered on it.
pub struct Work {
    pub session: SqliteUnitOfWorkSession,
    pub users: Arc<UserRepository>,
    pub auctions: Arc<AuctionRepository>,
}

pub async fn begin(uow: &SqliteUnitOfWork) -> Work {
    let session = uow.begin().await.expect("Failed to begin transaction");
    let users = UserRepository::new(session.executor().clone());
    let auctions = AuctionRepository::new(session.executor().clone());
    session.register_transaction_aware(users.clone());
    session.register_transaction_aware(auctions.clone());
    Work {
        session,
        users,
        auctions,
    }
}

impl Work {
    /// Save every user, failing the test on error.
    pub async fn save_users(&self, users: &mut [&mut User]) {
        for user in users.iter_mut() {
            self.users.save(user).await.expect("Failed to save user");
        }
    }
}
