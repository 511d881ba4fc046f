//! Fluent construction of fully wired [`Auction`] graphs.

use time::{Duration, OffsetDateTime};

use crate::model::{Auction, Bid, User};

pub const DEFAULT_OWNER_NAME: &str = "Joao da Silva";
pub const DEFAULT_OWNER_EMAIL: &str = "joao@silva.com.br";
pub const DEFAULT_STARTING_VALUE: f64 = 1500.0;
pub const DEFAULT_PRODUCT_NAME: &str = "XBox";

/// Builds an [`Auction`] with sensible defaults for anything not overridden.
///
/// ```
/// use auction_repository::builder::AuctionBuilder;
/// use auction_repository::model::User;
/// use time::OffsetDateTime;
///
/// let marcelo = User::new("Marcelo", "marcelo@aniche.com.br");
/// let auction = AuctionBuilder::new()
///     .starting_value(3000.0)
///     .bid(OffsetDateTime::now_utc(), marcelo, 3100.0)
///     .days_ago(3)
///     .build();
///
/// assert_eq!(auction.bids().len(), 1);
/// assert!(!auction.is_closed());
/// ```
#[derive(Debug, Clone)]
pub struct AuctionBuilder {
    owner: User,
    starting_value: f64,
    product_name: String,
    used: bool,
    closed: bool,
    opened_at: OffsetDateTime,
    bids: Vec<Bid>,
}

impl Default for AuctionBuilder {
    fn default() -> Self {
        Self {
            owner: User::new(DEFAULT_OWNER_NAME, DEFAULT_OWNER_EMAIL),
            starting_value: DEFAULT_STARTING_VALUE,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            used: false,
            closed: false,
            opened_at: OffsetDateTime::now_utc(),
            bids: Vec::new(),
        }
    }
}

impl AuctionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner: User) -> Self {
        self.owner = owner;
        self
    }

    pub fn starting_value(mut self, starting_value: f64) -> Self {
        self.starting_value = starting_value;
        self
    }

    pub fn product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    pub fn used(mut self) -> Self {
        self.used = true;
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Opens the auction `days` days before now.
    pub fn days_ago(mut self, days: i64) -> Self {
        self.opened_at = OffsetDateTime::now_utc() - Duration::days(days);
        self
    }

    pub fn opened_at(mut self, opened_at: OffsetDateTime) -> Self {
        self.opened_at = opened_at;
        self
    }

    /// Appends a bid. Bids are attached in the order of these calls.
    pub fn bid(mut self, placed_at: OffsetDateTime, bidder: User, amount: f64) -> Self {
        self.bids.push(Bid::new(placed_at, bidder, amount));
        self
    }

    pub fn build(self) -> Auction {
        let mut auction = Auction::new(self.product_name, self.starting_value, self.owner, self.used);
        auction.set_opened_at(self.opened_at);
        if self.closed {
            auction.close();
        }
        for bid in self.bids {
            auction.add_bid(bid);
        }
        auction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_new_open_auction() {
        let before = OffsetDateTime::now_utc();
        let auction = AuctionBuilder::new().build();

        assert_eq!(auction.product_name(), DEFAULT_PRODUCT_NAME);
        assert_eq!(auction.starting_value(), DEFAULT_STARTING_VALUE);
        assert_eq!(auction.owner().name(), DEFAULT_OWNER_NAME);
        assert_eq!(auction.owner().email(), DEFAULT_OWNER_EMAIL);
        assert!(!auction.is_used());
        assert!(!auction.is_closed());
        assert!(auction.bids().is_empty());
        assert!(auction.opened_at() <= OffsetDateTime::now_utc());
        assert!(auction.opened_at() >= before - Duration::seconds(1));
        assert_eq!(auction.id(), None);
    }

    #[test]
    fn overrides_are_applied() {
        let owner = User::new("Mauricio", "m@a.com");
        let auction = AuctionBuilder::new()
            .owner(owner.clone())
            .starting_value(50.0)
            .product_name("Geladeira")
            .used()
            .closed()
            .build();

        assert_eq!(auction.owner(), &owner);
        assert_eq!(auction.starting_value(), 50.0);
        assert_eq!(auction.product_name(), "Geladeira");
        assert!(auction.is_used());
        assert!(auction.is_closed());
    }

    #[test]
    fn days_ago_moves_the_opening_date_back() {
        let auction = AuctionBuilder::new().days_ago(10).build();
        let age = OffsetDateTime::now_utc() - auction.opened_at();

        assert!(age >= Duration::days(10));
        assert!(age < Duration::days(10) + Duration::minutes(1));
    }

    #[test]
    fn bids_accumulate_in_call_order() {
        let victor = User::new("Victor", "v@v.com");
        let guilherme = User::new("Guilherme", "g@g.com");
        let now = OffsetDateTime::now_utc();

        let auction = AuctionBuilder::new()
            .bid(now, victor.clone(), 100.0)
            .bid(now, guilherme.clone(), 200.0)
            .bid(now, victor.clone(), 300.0)
            .build();

        let placed: Vec<(&str, f64)> = auction
            .bids()
            .iter()
            .map(|bid| (bid.bidder().name(), bid.amount()))
            .collect();
        assert_eq!(placed, vec![("Victor", 100.0), ("Guilherme", 200.0), ("Victor", 300.0)]);
    }
}
