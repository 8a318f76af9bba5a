use std::env;

pub const FEED_REALM: &str = "Notices Feed";
pub const DEFAULT_FEED_ITEMS: u64 = 20;

/// Settings for the per-user Atom feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Absolute base URL used to build feed and entry ids.
    pub base_url: String,
    pub max_items: u64,
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let max_items = env::var("FEED_MAX_ITEMS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_FEED_ITEMS);

        Self {
            base_url,
            max_items,
        }
    }
}
