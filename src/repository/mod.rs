//! Transaction-scoped repositories over the marketplace schema.
//!
//! Repositories are built from a session's [`Executor`](crate::Executor) and
//! see every write made earlier in the same session, flushed or not.

mod auction;
mod queries;
mod user;

pub use auction::{AuctionRepository, CONTESTED_MIN_BIDS, OLD_AUCTION_AGE};
pub use user::UserRepository;

use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::{StoreError, StoreResult};

/// Timestamps are stored as nanoseconds since the Unix epoch so that range
/// predicates compare instants exactly.
pub(crate) fn to_nanos(timestamp: OffsetDateTime) -> StoreResult<i64> {
    i64::try_from(timestamp.unix_timestamp_nanos())
        .map_err(|_| StoreError::TimestampOutOfRange(timestamp.to_string()))
}

pub(crate) fn from_nanos(nanos: i64) -> StoreResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .map_err(|e| StoreError::TimestampOutOfRange(e.to_string()))
}

/// Counts the writes a repository issued in the current unit of work.
#[derive(Debug, Default)]
pub(crate) struct StagedWrites(Mutex<usize>);

impl StagedWrites {
    pub(crate) fn record(&self) {
        *self.0.lock() += 1;
    }

    pub(crate) fn get(&self) -> usize {
        *self.0.lock()
    }

    pub(crate) fn take(&self) -> usize {
        std::mem::take(&mut *self.0.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn timestamps_survive_storage_with_nanosecond_precision() {
        let opened = datetime!(2024-03-01 12:30:45.123456789 UTC);
        let stored = to_nanos(opened).unwrap();
        assert_eq!(from_nanos(stored).unwrap(), opened);
    }

    #[test]
    fn storage_order_matches_time_order() {
        let earlier = datetime!(1969-12-31 23:59:59 UTC);
        let later = datetime!(2024-03-01 00:00:00 UTC);
        assert!(to_nanos(earlier).unwrap() < to_nanos(later).unwrap());
    }

    #[test]
    fn far_future_timestamps_are_rejected() {
        let far = datetime!(2500-01-01 00:00:00 UTC);
        assert!(matches!(to_nanos(far), Err(StoreError::TimestampOutOfRange(_))));
    }

    #[test]
    fn staged_writes_reset_when_taken() {
        let writes = StagedWrites::default();
        writes.record();
        writes.record();
        assert_eq!(writes.get(), 2);
        assert_eq!(writes.take(), 2);
        assert_eq!(writes.get(), 0);
    }
}
