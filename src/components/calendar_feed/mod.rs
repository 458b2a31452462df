mod fetcher;
pub mod models;
mod parse;

pub use fetcher::{normalize_feed_url, CalendarSource, IcsFeed};
pub use models::{CalendarEvent, NotifiableEvent};
pub use parse::parse_feed;
