use super::models::CalendarEvent;
use super::parse::parse_feed;
use crate::error::{BotResult, Error};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

/// Anything that can produce the current list of calendar events
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetch and parse the calendar
    async fn fetch_events(&self) -> BotResult<Vec<CalendarEvent>>;
}

/// Rewrite a `webcal://` subscription URL to `https://`
pub fn normalize_feed_url(url: &str) -> String {
    match url.strip_prefix("webcal://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Published iCalendar feed reachable over HTTP
#[derive(Debug, Clone)]
pub struct IcsFeed {
    url: String,
    client: Client,
}

impl IcsFeed {
    /// Create a feed for the given URL
    pub fn new(url: &str) -> Self {
        Self::with_client(url, Client::new())
    }

    /// Create a feed with an existing HTTP client
    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            url: normalize_feed_url(url),
            client,
        }
    }

    /// The URL that will actually be requested
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CalendarSource for IcsFeed {
    async fn fetch_events(&self) -> BotResult<Vec<CalendarEvent>> {
        debug!("Fetching calendar feed from {}", self.url);

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Fetch {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let events = parse_feed(&body)?;

        info!("Fetched {} events from calendar feed", events.len());
        Ok(events)
    }
}
