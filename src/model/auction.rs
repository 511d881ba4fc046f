use time::OffsetDateTime;

use super::{AuctionId, Bid, User};

/// A listed product with a starting value, an owner and an ordered bid sequence.
///
/// An auction starts open. [`Auction::close`] is the only state transition and
/// there is no way back.
#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    id: Option<AuctionId>,
    product_name: String,
    starting_value: f64,
    owner: User,
    used: bool,
    opened_at: OffsetDateTime,
    closed: bool,
    bids: Vec<Bid>,
}

impl Auction {
    /// Creates an open auction that opens now.
    pub fn new(product_name: impl Into<String>, starting_value: f64, owner: User, used: bool) -> Self {
        Self {
            id: None,
            product_name: product_name.into(),
            starting_value,
            owner,
            used,
            opened_at: OffsetDateTime::now_utc(),
            closed: false,
            bids: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: AuctionId,
        product_name: String,
        starting_value: f64,
        owner: User,
        used: bool,
        opened_at: OffsetDateTime,
        closed: bool,
        bids: Vec<Bid>,
    ) -> Self {
        Self {
            id: Some(id),
            product_name,
            starting_value,
            owner,
            used,
            opened_at,
            closed,
            bids,
        }
    }

    pub fn id(&self) -> Option<AuctionId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AuctionId) {
        self.id = Some(id);
        for bid in &mut self.bids {
            bid.set_auction(Some(id));
        }
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn set_product_name(&mut self, product_name: impl Into<String>) {
        self.product_name = product_name.into();
    }

    pub fn starting_value(&self) -> f64 {
        self.starting_value
    }

    pub fn set_starting_value(&mut self, starting_value: f64) {
        self.starting_value = starting_value;
    }

    pub fn owner(&self) -> &User {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: User) {
        self.owner = owner;
    }

    /// Whether the product on sale is second-hand.
    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    pub fn opened_at(&self) -> OffsetDateTime {
        self.opened_at
    }

    pub fn set_opened_at(&mut self, opened_at: OffsetDateTime) {
        self.opened_at = opened_at;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the auction. Closing a closed auction does nothing.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub(crate) fn bids_mut(&mut self) -> &mut [Bid] {
        &mut self.bids
    }

    /// Appends a bid and points it back at this auction.
    pub fn add_bid(&mut self, mut bid: Bid) {
        bid.set_auction(self.id);
        self.bids.push(bid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> User {
        User::new("Mauricio Aniche", "mauricio@aniche.com.br")
    }

    #[test]
    fn close_is_idempotent() {
        let mut auction = Auction::new("Geladeira", 1500.0, owner(), false);
        assert!(!auction.is_closed());

        auction.close();
        auction.close();
        assert!(auction.is_closed());
    }

    #[test]
    fn add_bid_keeps_call_order_and_back_reference() {
        let mut auction = Auction::new("XBox", 700.0, owner(), false);
        let id = AuctionId::generate();
        auction.set_id(id);

        let bidder = User::new("Victor", "v@v.com");
        let now = OffsetDateTime::now_utc();
        auction.add_bid(Bid::new(now, bidder.clone(), 100.0));
        auction.add_bid(Bid::new(now, bidder, 200.0));

        let amounts: Vec<f64> = auction.bids().iter().map(Bid::amount).collect();
        assert_eq!(amounts, vec![100.0, 200.0]);
        assert!(auction.bids().iter().all(|bid| bid.auction() == Some(id)));
    }

    #[test]
    fn assigning_identity_updates_existing_bids() {
        let mut auction = Auction::new("XBox", 700.0, owner(), false);
        auction.add_bid(Bid::new(OffsetDateTime::now_utc(), owner(), 100.0));
        assert_eq!(auction.bids()[0].auction(), None);

        let id = AuctionId::generate();
        auction.set_id(id);
        assert_eq!(auction.bids()[0].auction(), Some(id));
    }
}
