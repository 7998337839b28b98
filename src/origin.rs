//! Origin page URL validation: only pages on the configured locker host are
//! accepted, checked before any I/O.

use url::Url;

/// Accepts URLs whose host is the configured locker host or a subdomain of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    host: String,
}

impl OriginPolicy {
    /// Creates a policy for `host` (normalized: trimmed, lowercased, no `www.`).
    #[must_use]
    pub fn new(host: &str) -> Self {
        Self {
            host: canonical_host(host),
        }
    }

    /// The normalized accepted host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Parses `raw` and checks scheme and host.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the URL is malformed, not
    /// http(s), or points at another host.
    pub fn validate(&self, raw: &str) -> Result<Url, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(format!("Invalid origin link: a {} URL is required", self.host));
        }
        let url = Url::parse(raw).map_err(|_| format!("Invalid origin link: '{raw}' is not a URL"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Invalid origin link: unsupported scheme '{}'",
                url.scheme()
            ));
        }
        let Some(host) = url.host_str() else {
            return Err(format!("Invalid origin link: '{raw}' has no host"));
        };
        if !host_within(host, &self.host) {
            return Err(format!(
                "Invalid origin link: expected a {} URL, got host '{host}'",
                self.host
            ));
        }
        Ok(url)
    }
}

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercase.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_end_matches('.')
        .to_ascii_lowercase()
        .trim_start_matches("www.")
        .to_string()
}

/// Returns true if `host` equals `expected` or is a subdomain of it.
#[must_use]
pub fn host_within(host: &str, expected: &str) -> bool {
    let host = canonical_host(host);
    let expected = canonical_host(expected);
    if expected.is_empty() {
        return false;
    }
    host == expected
        || host
            .strip_suffix(expected.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_host_trim_www_and_trailing_dot_lowercase() {
        assert_eq!(canonical_host("  www.MediaFire.COM.  "), "mediafire.com");
        assert_eq!(canonical_host("WWW.mediafire.com"), "mediafire.com");
        assert_eq!(canonical_host(""), "");
    }

    #[test]
    fn test_host_within_accepts_exact_and_subdomains() {
        assert!(host_within("mediafire.com", "mediafire.com"));
        assert!(host_within("www.mediafire.com", "mediafire.com"));
        assert!(host_within("download1234.mediafire.com", "mediafire.com"));
    }

    #[test]
    fn test_host_within_rejects_lookalikes() {
        assert!(!host_within("evilmediafire.com", "mediafire.com"));
        assert!(!host_within("mediafire.com.evil.net", "mediafire.com"));
        assert!(!host_within("example.com", "mediafire.com"));
        assert!(!host_within("example.com", ""));
    }

    #[test]
    fn test_validate_accepts_locker_page() {
        let policy = OriginPolicy::new("mediafire.com");
        let url = policy
            .validate("  https://www.mediafire.com/file/abc/Movie.mp4/file ")
            .unwrap();
        assert_eq!(url.host_str(), Some("www.mediafire.com"));
    }

    #[test]
    fn test_validate_rejects_foreign_host() {
        let policy = OriginPolicy::new("mediafire.com");
        let err = policy.validate("https://example.com/file/abc").unwrap_err();
        assert!(err.contains("example.com"), "{err}");
    }

    #[test]
    fn test_validate_rejects_malformed_and_empty() {
        let policy = OriginPolicy::new("mediafire.com");
        assert!(policy.validate("mediafire.com/file/abc").is_err());
        assert!(policy.validate("").is_err());
        assert!(policy.validate("ftp://mediafire.com/file").is_err());
    }

    #[test]
    fn test_validate_ip_host_policy() {
        let policy = OriginPolicy::new("127.0.0.1");
        assert!(policy.validate("http://127.0.0.1:8080/file/abc").is_ok());
        assert!(policy.validate("http://127.0.0.2/file/abc").is_err());
    }
}
