pub mod create_publication;
pub mod delete_publication;
pub mod list_feed;
pub mod list_mine;
pub mod list_user;
pub mod record_play;

pub const FEED_DEFAULT_LIMIT: i64 = 50;
pub const FEED_MAX_LIMIT: i64 = 100;
