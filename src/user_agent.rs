//! Shared User-Agent strings for origin scraping and upstream streaming.
//!
//! File lockers serve a different (often blocking) page to non-browser agents,
//! so both the scrape and the proxy request present the same desktop browser.

/// Desktop browser User-Agent sent on every upstream request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// User-Agent for origin page scraping.
#[must_use]
pub(crate) fn scrape_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}

/// User-Agent for the streaming fetch of the direct file URL.
#[must_use]
pub(crate) fn stream_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}
