//! Extraction rules: independent signatures for finding the direct download
//! URL inside an origin page.
//!
//! Locker markup is not a stable contract, so the resolver holds an ordered
//! list of rules and takes the first match. New signatures are added here
//! without touching callers.

use std::sync::LazyLock;

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<a\b[^>]*>"));
static TAG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
});
static MEDIAFIRE_DOWNLOAD_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?i)https?://download[0-9]*\.mediafire\.com/[^"'\s<>]+"#)
});

/// A single way of locating the direct URL in an origin page.
pub trait ExtractionRule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Returns the raw (possibly relative, still entity-encoded) URL if this
    /// rule matches `html`.
    fn extract(&self, html: &str) -> Option<String>;
}

/// Matches an `<a>` tag carrying `attribute="value"` and returns its `href`.
///
/// Attribute order inside the tag does not matter; attribute names compare
/// case-insensitively, values exactly (after trimming).
#[derive(Debug, Clone)]
pub struct AnchorAttributeRule {
    name: String,
    attribute: String,
    value: String,
}

impl AnchorAttributeRule {
    /// Creates a rule for anchors with `attribute="value"`.
    #[must_use]
    pub fn new(name: impl Into<String>, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Anchor labelled for assistive tech as the download action.
    #[must_use]
    pub fn aria_label(label: &str) -> Self {
        Self::new("aria-label", "aria-label", label)
    }

    /// Anchor with a specific element id.
    #[must_use]
    pub fn element_id(id: &str) -> Self {
        Self::new("element-id", "id", id)
    }
}

impl ExtractionRule for AnchorAttributeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, html: &str) -> Option<String> {
        ANCHOR_TAG_RE.find_iter(html).find_map(|tag| {
            let attrs = parse_attributes(tag.as_str());
            let marked = attrs
                .iter()
                .any(|(name, value)| name.eq_ignore_ascii_case(&self.attribute) && value.trim() == self.value);
            if !marked {
                return None;
            }
            attrs
                .into_iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("href"))
                .map(|(_, href)| href.trim().to_string())
                .filter(|href| !href.is_empty() && !href.starts_with('#'))
        })
    }
}

/// Matches a bare URL anywhere in the page.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
}

impl PatternRule {
    /// Creates a rule returning capture group 1, or the whole match when the
    /// pattern has no groups.
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: Regex) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }

    /// Literal links to MediaFire's download hosts (`downloadNNNN.mediafire.com`).
    #[must_use]
    pub fn mediafire_download_host() -> Self {
        Self::new("download-host", MEDIAFIRE_DOWNLOAD_HOST_RE.clone())
    }
}

impl ExtractionRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, html: &str) -> Option<String> {
        let caps = self.pattern.captures(html)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Default rule order for MediaFire pages:
/// 1. `aria-label="Download file"` anchor
/// 2. `id="downloadButton"` anchor
/// 3. any literal download-host URL
#[must_use]
pub fn default_rules() -> Vec<Box<dyn ExtractionRule>> {
    vec![
        Box::new(AnchorAttributeRule::aria_label("Download file")),
        Box::new(AnchorAttributeRule::element_id("downloadButton")),
        Box::new(PatternRule::mediafire_download_host()),
    ]
}

/// Decodes the HTML entities that commonly appear inside `href` values.
#[must_use]
pub fn decode_html_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#38;", "&")
        .replace("&amp;", "&")
}

fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    TAG_ATTR_RE
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            Some((name, value))
        })
        .collect()
}
