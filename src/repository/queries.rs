// Column list shared by every query that materializes an auction with its owner.
macro_rules! select_auctions {
    () => {
        r#"
        select
            a.id, a.product_name, a.starting_value, a.used, a.opened_at, a.closed,
            o.id as owner_id, o.name as owner_name, o.email as owner_email
        from auctions a
        join users o on o.id = a.owner_id
        "#
    };
}

// region:    --- Users

pub const INSERT_USER: &str = "insert into users (id, name, email) values (?, ?, ?)";

pub const UPDATE_USER: &str = "update users set name = ?, email = ? where id = ?";

pub const DELETE_USER: &str = "delete from users where id = ?";

pub const FIND_USER_BY_ID: &str = "select id, name, email from users where id = ?";

pub const FIND_USER_BY_NAME_AND_EMAIL: &str =
    "select id, name, email from users where name = ? and email = ?";

// endregion: --- Users

// region:    --- Auctions

pub const INSERT_AUCTION: &str = r#"
    insert into auctions (id, product_name, starting_value, owner_id, used, opened_at, closed)
    values (?, ?, ?, ?, ?, ?, ?)
"#;

pub const UPDATE_AUCTION: &str = r#"
    update auctions
    set product_name = ?, starting_value = ?, owner_id = ?, used = ?, opened_at = ?, closed = ?
    where id = ?
"#;

pub const DELETE_AUCTION: &str = "delete from auctions where id = ?";

pub const FIND_AUCTION_BY_ID: &str = concat!(select_auctions!(), "where a.id = ?");

pub const COUNT_OPEN_AUCTIONS: &str = "select count(*) from auctions where closed = 0";

pub const FIND_NEW_AUCTIONS: &str = concat!(select_auctions!(), "where a.used = 0 order by a.opened_at");

/// Opened at or before the cutoff.
pub const FIND_AUCTIONS_OPENED_UNTIL: &str =
    concat!(select_auctions!(), "where a.opened_at <= ? order by a.opened_at");

pub const FIND_OPEN_AUCTIONS_IN_PERIOD: &str = concat!(
    select_auctions!(),
    "where a.closed = 0 and a.opened_at between ? and ? order by a.opened_at"
);

/// Open, starting value within range, at least N bids.
pub const FIND_CONTESTED_AUCTIONS: &str = concat!(
    select_auctions!(),
    r#"
    where a.closed = 0
      and a.starting_value between ? and ?
      and (select count(*) from bids b where b.auction_id = a.id) >= ?
    order by a.opened_at
    "#
);

pub const FIND_AUCTIONS_BY_BID_COUNT: &str = concat!(
    select_auctions!(),
    r#"
    where (select count(*) from bids b where b.auction_id = a.id) between ? and ?
    order by a.opened_at
    "#
);

pub const FIND_AUCTIONS_BID_ON_BY_USER: &str = r#"
    select distinct
        a.id, a.product_name, a.starting_value, a.used, a.opened_at, a.closed,
        o.id as owner_id, o.name as owner_name, o.email as owner_email
    from bids b
    join auctions a on a.id = b.auction_id
    join users o on o.id = a.owner_id
    where b.bidder_id = ?
    order by a.opened_at
"#;

/// One term per bid, so an auction counts as often as the user bid on it.
pub const AVERAGE_STARTING_VALUE_BY_BIDDER: &str = r#"
    select avg(a.starting_value)
    from bids b
    join auctions a on a.id = b.auction_id
    where b.bidder_id = ?
"#;

// endregion: --- Auctions

// region:    --- Bids

pub const INSERT_BID: &str = r#"
    insert into bids (id, auction_id, position, bidder_id, amount, placed_at)
    values (?, ?, ?, ?, ?, ?)
"#;

pub const DELETE_BIDS_OF_AUCTION: &str = "delete from bids where auction_id = ?";

pub const FIND_BIDS_OF_AUCTION: &str = r#"
    select
        b.id, b.auction_id, b.amount, b.placed_at,
        u.id as bidder_id, u.name as bidder_name, u.email as bidder_email
    from bids b
    join users u on u.id = b.bidder_id
    where b.auction_id = ?
    order by b.position
"#;

// endregion: --- Bids
