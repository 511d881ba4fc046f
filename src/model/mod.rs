//! Marketplace entities: users, the auctions they own, and the bids placed on them.
//!
//! Entities are created without identity. The repositories assign one the
//! first time an entity is saved.

mod auction;
mod bid;
mod user;

pub use auction::Auction;
pub use bid::Bid;
pub use user::User;

macro_rules! entity_id {
    ($struct:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
        #[sqlx(transparent)]
        pub struct $struct(pub uuid::Uuid);

        impl $struct {
            pub(crate) fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl From<uuid::Uuid> for $struct {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$struct> for uuid::Uuid {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(UserId, "Identity of a persisted [`User`]");
entity_id!(AuctionId, "Identity of a persisted [`Auction`]");
entity_id!(BidId, "Identity of a persisted [`Bid`]");
