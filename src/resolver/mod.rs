//! Origin page resolution: locker page URL to direct file URL.
//!
//! # Architecture
//!
//! - [`OriginResolver`] - fetches the origin page once and applies rules
//! - [`ExtractionRule`] - `html -> Option<url>` signature, tried in order
//! - [`AnchorAttributeRule`] / [`PatternRule`] - built-in rule kinds
//! - [`ResolveError`] - unreachable origin vs. missing link
//!
//! Nothing is cached: every call scrapes the page again, so rotated direct
//! links are picked up on the next request.

mod error;
mod rules;

pub use error::ResolveError;
pub use rules::{
    AnchorAttributeRule, ExtractionRule, PatternRule, compile_static_regex, decode_html_entities,
    default_rules,
};

use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::HttpTimeouts;
use crate::http_client::build_scrape_client;

/// Extracts the direct download URL from a file-locker page.
pub struct OriginResolver {
    client: Client,
    rules: Vec<Box<dyn ExtractionRule>>,
}

impl OriginResolver {
    /// Creates a resolver with the default rule list.
    ///
    /// # Errors
    ///
    /// Returns the client builder error if the HTTP client cannot be constructed.
    pub fn new(timeouts: &HttpTimeouts) -> Result<Self, reqwest::Error> {
        Ok(Self::with_rules(build_scrape_client(timeouts)?, default_rules()))
    }

    /// Creates a resolver with an explicit client and rule order.
    #[must_use]
    pub fn with_rules(client: Client, rules: Vec<Box<dyn ExtractionRule>>) -> Self {
        Self { client, rules }
    }

    /// Names of the configured rules, in application order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Applies the rules to `html` in order and returns the first match,
    /// decoded and made absolute against `page_url`.
    #[must_use]
    pub fn extract(&self, html: &str, page_url: &Url) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            let raw = rule.extract(html)?;
            let absolute = absolutize_url(&decode_html_entities(&raw), page_url)?;
            debug!(rule = rule.name(), direct_url = %absolute, "extraction rule matched");
            Some(absolute)
        })
    }

    /// Fetches `origin_page_url` and returns the direct file URL.
    ///
    /// A single GET is issued; the network call is not retried.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::OriginUnreachable`] on transport failure or a
    ///   non-success status (no extraction is attempted)
    /// - [`ResolveError::LinkNotFound`] when no rule matches
    #[instrument(skip(self), fields(url = %origin_page_url))]
    pub async fn resolve(&self, origin_page_url: &str) -> Result<String, ResolveError> {
        debug!("fetching origin page");
        let response = self
            .client
            .get(origin_page_url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "origin request failed");
                ResolveError::network(origin_page_url, &error)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "origin returned non-success status");
            return Err(ResolveError::http_status(origin_page_url, status.as_u16()));
        }

        let page_url = response.url().clone();
        let html = response.text().await.map_err(|error| {
            warn!(error = %error, "failed reading origin page body");
            ResolveError::network(origin_page_url, &error)
        })?;

        match self.extract(&html, &page_url) {
            Some(direct_url) => {
                info!(direct_url = %direct_url, "origin resolved");
                Ok(direct_url)
            }
            None => {
                warn!(rules = self.rules.len(), bytes = html.len(), "no extraction rule matched");
                Err(ResolveError::link_not_found(origin_page_url, self.rules.len()))
            }
        }
    }
}

impl std::fmt::Debug for OriginResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginResolver")
            .field("rules", &self.rule_names())
            .finish_non_exhaustive()
    }
}

/// Resolves a possibly relative URL string against the page URL.
///
/// Absolute http(s) URLs are returned as-is; `//host/...` takes the page's
/// scheme; anything else is joined onto `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("{}:{value}", base_url.scheme()));
    }
    base_url
        .join(value)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
}
