//! Shared HTTP client construction for upstream calls.
//!
//! Both upstream clients present the browser User-Agent. They differ in
//! deadlines and compression:
//! - scrape: connect timeout + whole-request timeout, gzip allowed, cookies
//!   kept across the redirect chain
//! - stream: connect timeout only (bodies are long-running), no transparent
//!   decompression so `Content-Length`/`Content-Range` stay byte-exact

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::HttpTimeouts;
use crate::user_agent;

/// Builds the client used to fetch origin pages.
///
/// # Errors
///
/// Returns the builder error if TLS/backend initialization fails.
pub fn build_scrape_client(timeouts: &HttpTimeouts) -> Result<Client, reqwest::Error> {
    debug!(
        connect_ms = duration_ms(timeouts.scrape_connect),
        total_ms = duration_ms(timeouts.scrape_total),
        "building scrape client"
    );
    Client::builder()
        .connect_timeout(timeouts.scrape_connect)
        .timeout(timeouts.scrape_total)
        .user_agent(user_agent::scrape_user_agent())
        .cookie_store(true)
        .gzip(true)
        .build()
}

/// Builds the client used to stream direct file URLs.
///
/// # Errors
///
/// Returns the builder error if TLS/backend initialization fails.
pub fn build_stream_client(timeouts: &HttpTimeouts) -> Result<Client, reqwest::Error> {
    debug!(
        connect_ms = duration_ms(timeouts.stream_connect),
        "building stream client"
    );
    Client::builder()
        .connect_timeout(timeouts.stream_connect)
        .user_agent(user_agent::stream_user_agent())
        .gzip(false)
        .build()
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
