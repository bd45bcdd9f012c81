use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_FEED_CAPACITY: usize = 256;
pub const MAX_FEED_CAPACITY: usize = 65_536;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub backend_timeout: Duration,
    pub allowed_origin: String,
    pub feed_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {} value {:?}", key, value);
            default
        }),
        None => default,
    }
}

fn feed_capacity(requested: usize) -> usize {
    if (1..=MAX_FEED_CAPACITY).contains(&requested) {
        requested
    } else {
        warn!("Ignoring FEED_CAPACITY {}, expected 1..={}", requested, MAX_FEED_CAPACITY);
        DEFAULT_FEED_CAPACITY
    }
}

impl Settings {
    /// Reads `BACKEND_TIMEOUT_SECS`, `ALLOWED_ORIGIN` and `FEED_CAPACITY`
    /// through `lookup`, keeping defaults for missing or malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs = parse_or("BACKEND_TIMEOUT_SECS", lookup("BACKEND_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);

        Self {
            backend_timeout: Duration::from_secs(timeout_secs.max(1)),
            allowed_origin: lookup("ALLOWED_ORIGIN")
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .unwrap_or(defaults.allowed_origin),
            feed_capacity: feed_capacity(parse_or("FEED_CAPACITY", lookup("FEED_CAPACITY"), defaults.feed_capacity)),
        }
    }
}
