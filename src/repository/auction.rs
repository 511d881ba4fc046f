use async_trait::async_trait;
use sqlx::{Connection, FromRow, Sqlite, SqliteConnection, Transaction};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tracing::{debug, instrument};

use super::{from_nanos, queries, to_nanos, StagedWrites};
use crate::model::{Auction, AuctionId, Bid, BidId, User, UserId};
use crate::{Executor, StoreError, StoreResult, TransactionAware};

/// Auctions opened at least this long ago are "old".
pub const OLD_AUCTION_AGE: Duration = Duration::days(7);

/// An open auction needs at least this many bids to count as contested.
pub const CONTESTED_MIN_BIDS: i64 = 4;

#[derive(FromRow)]
struct AuctionRow {
    id: AuctionId,
    product_name: String,
    starting_value: f64,
    used: bool,
    opened_at: i64,
    closed: bool,
    owner_id: UserId,
    owner_name: String,
    owner_email: String,
}

#[derive(FromRow)]
struct BidRow {
    id: BidId,
    auction_id: AuctionId,
    amount: f64,
    placed_at: i64,
    bidder_id: UserId,
    bidder_name: String,
    bidder_email: String,
}

impl TryFrom<BidRow> for Bid {
    type Error = StoreError;

    fn try_from(row: BidRow) -> StoreResult<Self> {
        let bidder = User::restore(row.bidder_id, row.bidder_name, row.bidder_email);
        Ok(Bid::restore(
            row.id,
            row.auction_id,
            bidder,
            row.amount,
            from_nanos(row.placed_at)?,
        ))
    }
}

/// Transaction-aware Auction Repository
///
/// Auctions are always returned with their owner and full bid sequence.
pub struct AuctionRepository {
    executor: Executor,
    staged: StagedWrites,
}

impl AuctionRepository {
    pub fn new(executor: Executor) -> Arc<Self> {
        Arc::new(Self {
            executor,
            staged: StagedWrites::default(),
        })
    }

    /// Assigns the auction and its bids an identity and inserts them.
    ///
    /// The owner and every bidder must already be saved. On failure nothing
    /// is written and the auction keeps no identity.
    #[instrument(skip_all, fields(product = auction.product_name()))]
    pub async fn save(&self, auction: &mut Auction) -> StoreResult<AuctionId> {
        let owner = persisted_user(auction.owner())?;
        let opened_at = to_nanos(auction.opened_at())?;
        let bids = PendingBid::collect(auction.bids())?;
        let id = auction.id().unwrap_or_else(AuctionId::generate);

        let mut tx = self.executor.transaction().await?;
        let mut savepoint = Connection::begin(&mut **tx).await?;
        let written = insert_auction(&mut savepoint, id, owner, opened_at, auction, &bids).await;
        release(savepoint, written).await?;

        assign_ids(auction, id, &bids);
        self.staged.record();
        debug!(%id, bids = bids.len(), "auction saved");
        Ok(id)
    }

    /// Persists changes made to a saved auction, including bids added or
    /// removed since it was loaded. On failure the stored auction is left
    /// as it was.
    #[instrument(skip_all, fields(id = ?auction.id()))]
    pub async fn update(&self, auction: &mut Auction) -> StoreResult<()> {
        let id = auction.id().ok_or(StoreError::NotPersisted { entity: "Auction" })?;
        let owner = persisted_user(auction.owner())?;
        let opened_at = to_nanos(auction.opened_at())?;
        let bids = PendingBid::collect(auction.bids())?;

        let mut tx = self.executor.transaction().await?;
        let mut savepoint = Connection::begin(&mut **tx).await?;
        let written = update_auction(&mut savepoint, id, owner, opened_at, auction, &bids).await;
        release(savepoint, written).await?;

        assign_ids(auction, id, &bids);
        self.staged.record();
        debug!(bids = bids.len(), "auction updated");
        Ok(())
    }

    /// Removes the auction and its bids.
    #[instrument(skip_all, fields(id = ?auction.id()))]
    pub async fn delete(&self, auction: &Auction) -> StoreResult<()> {
        let id = auction.id().ok_or(StoreError::NotPersisted { entity: "Auction" })?;
        let mut tx = self.executor.transaction().await?;
        sqlx::query(queries::DELETE_AUCTION)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        self.staged.record();
        debug!("auction deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: AuctionId) -> StoreResult<Option<Auction>> {
        let mut tx = self.executor.transaction().await?;
        let row = sqlx::query_as::<_, AuctionRow>(queries::FIND_AUCTION_BY_ID)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        match row {
            Some(row) => Ok(Some(hydrate(&mut tx, row).await?)),
            None => Ok(None),
        }
    }

    /// Number of auctions that are not closed.
    #[instrument(skip(self))]
    pub async fn count_open(&self) -> StoreResult<u64> {
        let mut tx = self.executor.transaction().await?;
        let total: i64 = sqlx::query_scalar(queries::COUNT_OPEN_AUCTIONS)
            .fetch_one(&mut **tx)
            .await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// Auctions of products that are not second-hand.
    #[instrument(skip(self))]
    pub async fn find_new(&self) -> StoreResult<Vec<Auction>> {
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_NEW_AUCTIONS)
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Auctions opened [`OLD_AUCTION_AGE`] or more before now.
    pub async fn find_old(&self) -> StoreResult<Vec<Auction>> {
        self.find_old_as_of(OffsetDateTime::now_utc()).await
    }

    /// Auctions opened [`OLD_AUCTION_AGE`] or more before `now`. An auction
    /// opened exactly at the cutoff is old.
    #[instrument(skip(self))]
    pub async fn find_old_as_of(&self, now: OffsetDateTime) -> StoreResult<Vec<Auction>> {
        let cutoff = to_nanos(now - OLD_AUCTION_AGE)?;
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_AUCTIONS_OPENED_UNTIL)
            .bind(cutoff)
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Open auctions whose opening date lies in `[start, end]`.
    #[instrument(skip(self))]
    pub async fn find_by_period(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> StoreResult<Vec<Auction>> {
        let (start, end) = (to_nanos(start)?, to_nanos(end)?);
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_OPEN_AUCTIONS_IN_PERIOD)
            .bind(start)
            .bind(end)
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Open auctions with a starting value in `[min, max]` that drew at
    /// least [`CONTESTED_MIN_BIDS`] bids.
    #[instrument(skip(self))]
    pub async fn find_contested_between(&self, min: f64, max: f64) -> StoreResult<Vec<Auction>> {
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_CONTESTED_AUCTIONS)
            .bind(min)
            .bind(max)
            .bind(CONTESTED_MIN_BIDS)
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Auctions whose stored bid sequence has between `min` and `max` bids.
    #[instrument(skip(self))]
    pub async fn find_by_bid_count(&self, min: u32, max: u32) -> StoreResult<Vec<Auction>> {
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_AUCTIONS_BY_BID_COUNT)
            .bind(i64::from(min))
            .bind(i64::from(max))
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Auctions the user bid on, each listed once.
    #[instrument(skip_all, fields(user = ?user.id()))]
    pub async fn list_by_user(&self, user: &User) -> StoreResult<Vec<Auction>> {
        let Some(bidder) = user.id() else {
            return Ok(Vec::new());
        };
        let mut tx = self.executor.transaction().await?;
        let rows = sqlx::query_as::<_, AuctionRow>(queries::FIND_AUCTIONS_BID_ON_BY_USER)
            .bind(bidder)
            .fetch_all(&mut **tx)
            .await?;
        hydrate_all(&mut tx, rows).await
    }

    /// Mean starting value over every bid the user placed: an auction the
    /// user bid on twice weighs twice. `None` when the user never bid.
    #[instrument(skip_all, fields(user = ?user.id()))]
    pub async fn average_starting_value_for_user(&self, user: &User) -> StoreResult<Option<f64>> {
        let Some(bidder) = user.id() else {
            return Ok(None);
        };
        let mut tx = self.executor.transaction().await?;
        let average: Option<f64> = sqlx::query_scalar(queries::AVERAGE_STARTING_VALUE_BY_BIDDER)
            .bind(bidder)
            .fetch_one(&mut **tx)
            .await?;
        Ok(average)
    }

    /// Writes issued since the last commit or rollback.
    pub fn staged_writes(&self) -> usize {
        self.staged.get()
    }
}

#[async_trait]
impl TransactionAware for AuctionRepository {
    async fn on_commit(&self) -> StoreResult<()> {
        debug!(writes = self.staged.take(), "auction writes committed");
        Ok(())
    }

    async fn on_rollback(&self) -> StoreResult<()> {
        debug!(writes = self.staged.take(), "auction writes discarded");
        Ok(())
    }
}

fn persisted_user(user: &User) -> StoreResult<UserId> {
    user.id().ok_or(StoreError::NotPersisted { entity: "User" })
}

/// A bid checked and converted for storage before any statement runs.
struct PendingBid {
    id: BidId,
    bidder: UserId,
    amount: f64,
    placed_at: i64,
}

impl PendingBid {
    fn collect(bids: &[Bid]) -> StoreResult<Vec<Self>> {
        bids.iter()
            .map(|bid| {
                Ok(Self {
                    id: bid.id().unwrap_or_else(BidId::generate),
                    bidder: persisted_user(bid.bidder())?,
                    amount: bid.amount(),
                    placed_at: to_nanos(bid.placed_at())?,
                })
            })
            .collect()
    }
}

async fn insert_auction(
    conn: &mut SqliteConnection,
    id: AuctionId,
    owner: UserId,
    opened_at: i64,
    auction: &Auction,
    bids: &[PendingBid],
) -> StoreResult<()> {
    sqlx::query(queries::INSERT_AUCTION)
        .bind(id)
        .bind(auction.product_name())
        .bind(auction.starting_value())
        .bind(owner)
        .bind(auction.is_used())
        .bind(opened_at)
        .bind(auction.is_closed())
        .execute(&mut *conn)
        .await?;
    insert_bids(conn, id, bids).await
}

async fn update_auction(
    conn: &mut SqliteConnection,
    id: AuctionId,
    owner: UserId,
    opened_at: i64,
    auction: &Auction,
    bids: &[PendingBid],
) -> StoreResult<()> {
    let result = sqlx::query(queries::UPDATE_AUCTION)
        .bind(auction.product_name())
        .bind(auction.starting_value())
        .bind(owner)
        .bind(auction.is_used())
        .bind(opened_at)
        .bind(auction.is_closed())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::NotPersisted { entity: "Auction" });
    }

    sqlx::query(queries::DELETE_BIDS_OF_AUCTION)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    insert_bids(conn, id, bids).await
}

async fn insert_bids(conn: &mut SqliteConnection, auction: AuctionId, bids: &[PendingBid]) -> StoreResult<()> {
    for (position, bid) in bids.iter().enumerate() {
        sqlx::query(queries::INSERT_BID)
            .bind(bid.id)
            .bind(auction)
            .bind(position as i64)
            .bind(bid.bidder)
            .bind(bid.amount)
            .bind(bid.placed_at)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Keeps the savepoint's writes when `written` succeeded, undoes them otherwise.
async fn release(savepoint: Transaction<'_, Sqlite>, written: StoreResult<()>) -> StoreResult<()> {
    match written {
        Ok(()) => {
            savepoint.commit().await?;
            Ok(())
        }
        Err(err) => {
            savepoint.rollback().await?;
            Err(err)
        }
    }
}

fn assign_ids(auction: &mut Auction, id: AuctionId, bids: &[PendingBid]) {
    auction.set_id(id);
    for (bid, pending) in auction.bids_mut().iter_mut().zip(bids) {
        bid.set_id(pending.id);
    }
}

async fn hydrate(conn: &mut SqliteConnection, row: AuctionRow) -> StoreResult<Auction> {
    let bids = sqlx::query_as::<_, BidRow>(queries::FIND_BIDS_OF_AUCTION)
        .bind(row.id)
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(Bid::try_from)
        .collect::<StoreResult<Vec<_>>>()?;

    let owner = User::restore(row.owner_id, row.owner_name, row.owner_email);
    Ok(Auction::restore(
        row.id,
        row.product_name,
        row.starting_value,
        owner,
        row.used,
        from_nanos(row.opened_at)?,
        row.closed,
        bids,
    ))
}

async fn hydrate_all(conn: &mut SqliteConnection, rows: Vec<AuctionRow>) -> StoreResult<Vec<Auction>> {
    let mut auctions = Vec::with_capacity(rows.len());
    for row in rows {
        auctions.push(hydrate(conn, row).await?);
    }
    Ok(auctions)
}
