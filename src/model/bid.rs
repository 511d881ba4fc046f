use time::OffsetDateTime;

use super::{AuctionId, BidId, User};

/// An amount offered by a user on an auction at a point in time.
///
/// Bids are accepted as data; nothing checks them against earlier bids.
#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
    id: Option<BidId>,
    auction: Option<AuctionId>,
    bidder: User,
    amount: f64,
    placed_at: OffsetDateTime,
}

impl Bid {
    pub fn new(placed_at: OffsetDateTime, bidder: User, amount: f64) -> Self {
        Self {
            id: None,
            auction: None,
            bidder,
            amount,
            placed_at,
        }
    }

    pub(crate) fn restore(
        id: BidId,
        auction: AuctionId,
        bidder: User,
        amount: f64,
        placed_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Some(id),
            auction: Some(auction),
            bidder,
            amount,
            placed_at,
        }
    }

    pub fn id(&self) -> Option<BidId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BidId) {
        self.id = Some(id);
    }

    /// The auction this bid belongs to, once that auction has an identity.
    pub fn auction(&self) -> Option<AuctionId> {
        self.auction
    }

    pub(crate) fn set_auction(&mut self, auction: Option<AuctionId>) {
        self.auction = auction;
    }

    pub fn bidder(&self) -> &User {
        &self.bidder
    }

    pub fn set_bidder(&mut self, bidder: User) {
        self.bidder = bidder;
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }

    pub fn placed_at(&self) -> OffsetDateTime {
        self.placed_at
    }

    pub fn set_placed_at(&mut self, placed_at: OffsetDateTime) {
        self.placed_at = placed_at;
    }
}
