//! Auction marketplace repository
//!
//! Persistence and query layer for users, auctions and bids, backed by SQLite.
//! All repository work happens inside a unit of work: begin a session, build
//! repositories from its executor, then commit or roll back.

pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod repository;
pub mod transaction_aware;
pub mod unit_of_work;

pub use error::{StoreError, StoreResult};
pub use executor::Executor;
pub use repository::{AuctionRepository, UserRepository};
pub use transaction_aware::TransactionAware;
pub use unit_of_work::{SqliteUnitOfWork, SqliteUnitOfWorkSession, UnitOfWork, UnitOfWorkSession};
