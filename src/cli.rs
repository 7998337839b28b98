//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use cleanlink_core::config::{
    DEFAULT_BIND, DEFAULT_ORIGIN_HOST, DEFAULT_SCRAPE_CONNECT_TIMEOUT_SECS,
    DEFAULT_SCRAPE_TIMEOUT_SECS, DEFAULT_SESSION_TTL_SECS, DEFAULT_STREAM_CONNECT_TIMEOUT_SECS,
};
use cleanlink_core::{AppConfig, ConfigError, HttpTimeouts};

/// Short, stable download links for file-locker pages.
///
/// Cleanlink maps short names to MediaFire pages and streams the current
/// file behind each page, with range requests passed through for seeking.
#[derive(Parser)]
#[command(name = "cleanlink")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to listen on
    #[arg(long, env = "CLEANLINK_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Shared secret required to create links
    #[arg(long, env = "CLEANLINK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// SQLite database file (links are kept in memory when omitted)
    #[arg(long, env = "CLEANLINK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Public base URL for generated links (derived from the Host header when omitted)
    #[arg(long, env = "CLEANLINK_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Accepted origin host; subdomains are accepted too
    #[arg(long, env = "CLEANLINK_ORIGIN_HOST", default_value = DEFAULT_ORIGIN_HOST)]
    pub origin_host: String,

    /// Session cookie lifetime in seconds
    #[arg(long, env = "CLEANLINK_SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub session_ttl_secs: u64,

    /// Connect timeout for origin page requests in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_SCRAPE_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub scrape_connect_timeout_secs: u64,

    /// Total timeout for origin page requests in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_SCRAPE_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub scrape_timeout_secs: u64,

    /// Connect timeout for file streaming in seconds (1-300)
    #[arg(long, default_value_t = DEFAULT_STREAM_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub stream_connect_timeout_secs: u64,
}

impl Args {
    /// Builds and validates the application configuration.
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            bind: self.bind,
            access_password: self.password,
            database_path: self.database,
            public_base_url: self.public_url,
            origin_host: self.origin_host,
            session_ttl: Duration::from_secs(self.session_ttl_secs),
            timeouts: HttpTimeouts {
                scrape_connect: Duration::from_secs(self.scrape_connect_timeout_secs),
                scrape_total: Duration::from_secs(self.scrape_timeout_secs),
                stream_connect: Duration::from_secs(self.stream_connect_timeout_secs),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("bind", &self.bind)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("public_url", &self.public_url)
            .field("origin_host", &self.origin_host)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["cleanlink", "--password", "pw"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.bind.to_string(), DEFAULT_BIND);
        assert_eq!(args.origin_host, "mediafire.com");
        assert!(args.database.is_none());
        assert_eq!(args.scrape_timeout_secs, 30);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["cleanlink", "--password", "pw", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["cleanlink", "--password", "pw", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["cleanlink", "--password", "pw", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["cleanlink", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["cleanlink", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["cleanlink", "--password", "pw", "--invalid-flag"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_timeout_out_of_range_rejected() {
        let result = Args::try_parse_from([
            "cleanlink",
            "--password",
            "pw",
            "--scrape-timeout-secs",
            "0",
        ]);
        assert!(result.is_err());

        let result = Args::try_parse_from([
            "cleanlink",
            "--password",
            "pw",
            "--stream-connect-timeout-secs",
            "301",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_invalid_bind_rejected() {
        let result = Args::try_parse_from(["cleanlink", "--password", "pw", "--bind", "nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_config_maps_all_fields() {
        let args = Args::try_parse_from([
            "cleanlink",
            "--password",
            "pw",
            "--bind",
            "127.0.0.1:9000",
            "--database",
            "links.db",
            "--public-url",
            "https://dl.example.com",
            "--origin-host",
            "example.com",
            "--session-ttl-secs",
            "60",
            "--scrape-connect-timeout-secs",
            "3",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:9000");
        assert_eq!(config.access_password, "pw");
        assert_eq!(config.database_path, Some(PathBuf::from("links.db")));
        assert_eq!(config.public_base_url.as_deref(), Some("https://dl.example.com"));
        assert_eq!(config.origin_host, "example.com");
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.timeouts.scrape_connect, Duration::from_secs(3));
    }

    #[test]
    fn test_into_config_rejects_blank_password() {
        let args = Args::try_parse_from(["cleanlink", "--password", "  "]).unwrap();
        assert_eq!(args.into_config().unwrap_err(), ConfigError::EmptyPassword);
    }

    #[test]
    fn test_into_config_rejects_bad_public_url() {
        let args =
            Args::try_parse_from(["cleanlink", "--password", "pw", "--public-url", "not a url"])
                .unwrap();
        assert!(matches!(
            args.into_config().unwrap_err(),
            ConfigError::InvalidPublicUrl(_)
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let args = Args::try_parse_from(["cleanlink", "--password", "hunter2"]).unwrap();
        assert!(!format!("{args:?}").contains("hunter2"));
    }
}
