//! Project-wide constants.

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Twitter API v2 base URL.
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com/2";

/// Port used when neither `--port` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Directory holding the front-end entry page.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Per-call timeout for outbound provider requests.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Page size requested from the timeline endpoint (the provider's maximum).
pub const MAX_POSTS: u32 = 100;

/// Wait estimate when the provider rate-limits without a reset header.
pub const DEFAULT_RATE_LIMIT_WAIT_MINUTES: i64 = 15;

/// Dollars earned per 1000 impressions.
pub const CPM_RATE: f64 = 5.0;

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
