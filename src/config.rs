//! Runtime configuration passed explicitly into every component.
//!
//! The binary builds an [`AppConfig`] once at startup (from flags and
//! environment) and hands the relevant pieces to the registry, resolver,
//! proxy and auth gate. Nothing reads ambient global state.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Default accepted origin host (subdomains are accepted too).
pub const DEFAULT_ORIGIN_HOST: &str = "mediafire.com";

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default connect timeout for the origin page scrape.
pub const DEFAULT_SCRAPE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout for the origin page scrape.
pub const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for the streaming fetch. The body has no deadline.
pub const DEFAULT_STREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

const MAX_TIMEOUT_SECS: u64 = 300;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The shared secret is empty.
    #[error("access password must not be empty\n  Suggestion: set --password or CLEANLINK_PASSWORD")]
    EmptyPassword,

    /// A timeout is outside the accepted range.
    #[error("invalid value for `{field}`: {value}. Expected range: 1..={MAX_TIMEOUT_SECS}")]
    InvalidTimeout {
        /// Name of the offending setting.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },

    /// Session TTL of zero would reject every login immediately.
    #[error("session TTL must be at least 1 second")]
    InvalidSessionTtl,

    /// The origin host is empty or contains a scheme/path.
    #[error("invalid origin host '{0}'\n  Suggestion: pass a bare host such as mediafire.com")]
    InvalidOriginHost(String),

    /// The public base URL does not parse as an absolute http(s) URL.
    #[error("invalid public URL '{0}'\n  Suggestion: pass an absolute URL such as https://links.example.com")]
    InvalidPublicUrl(String),
}

/// Timeouts applied to upstream HTTP calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout for the origin page fetch.
    pub scrape_connect: Duration,
    /// Whole-request timeout for the origin page fetch.
    pub scrape_total: Duration,
    /// TCP/TLS connect timeout for the direct file fetch.
    pub stream_connect: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            scrape_connect: Duration::from_secs(DEFAULT_SCRAPE_CONNECT_TIMEOUT_SECS),
            scrape_total: Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS),
            stream_connect: Duration::from_secs(DEFAULT_STREAM_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Fully resolved application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Shared secret for the auth gate.
    pub access_password: String,
    /// SQLite file; `None` keeps links in memory for the process lifetime.
    pub database_path: Option<PathBuf>,
    /// Base for generated links; derived per request from `Host` when unset.
    pub public_base_url: Option<String>,
    /// Accepted locker host for origin URLs.
    pub origin_host: String,
    /// Session cookie lifetime.
    pub session_ttl: Duration,
    /// Upstream HTTP timeouts.
    pub timeouts: HttpTimeouts,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything except the secret.
    ///
    /// # Panics
    ///
    /// Never: [`DEFAULT_BIND`] is a valid socket address literal.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(access_password: impl Into<String>) -> Self {
        Self {
            bind: DEFAULT_BIND.parse().expect("default bind address is valid"),
            access_password: access_password.into(),
            database_path: None,
            public_base_url: None,
            origin_host: DEFAULT_ORIGIN_HOST.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            timeouts: HttpTimeouts::default(),
        }
    }

    /// Validates values that cannot be expressed in the flag parser.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_password.trim().is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if self.session_ttl.is_zero() {
            return Err(ConfigError::InvalidSessionTtl);
        }
        validate_timeout("scrape_connect_timeout_secs", self.timeouts.scrape_connect)?;
        validate_timeout("scrape_timeout_secs", self.timeouts.scrape_total)?;
        validate_timeout("stream_connect_timeout_secs", self.timeouts.stream_connect)?;

        let host = self.origin_host.trim();
        if host.is_empty() || host.contains('/') || host.contains(':') {
            return Err(ConfigError::InvalidOriginHost(self.origin_host.clone()));
        }

        if let Some(public_url) = &self.public_base_url {
            let valid = url::Url::parse(public_url)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
            if !valid {
                return Err(ConfigError::InvalidPublicUrl(public_url.clone()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("access_password", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("public_base_url", &self.public_base_url)
            .field("origin_host", &self.origin_host)
            .field("session_ttl", &self.session_ttl)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

fn validate_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    let secs = value.as_secs();
    if (1..=MAX_TIMEOUT_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { field, value: secs })
    }
}
