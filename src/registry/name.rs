//! Short-name normalization and the media extension policy.

use super::RegistryError;

/// Longest accepted short name, counted in characters after sanitizing.
pub const MAX_SHORT_NAME_LEN: usize = 200;

/// Extension appended when a name carries no recognized one.
pub const DEFAULT_MEDIA_EXTENSION: &str = "mp4";

/// Extensions accepted as-is at the end of a short name.
pub const RECOGNIZED_MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv"];

/// Decides which extensions a short name may end in and what gets appended
/// otherwise.
///
/// Matching is ASCII case-insensitive, so `Clip.MKV` is kept unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaExtensionPolicy {
    recognized: Vec<String>,
    default_extension: String,
}

impl MediaExtensionPolicy {
    /// Creates a policy. The default extension is always recognized.
    #[must_use]
    pub fn new<I, S>(recognized: I, default_extension: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_extension = normalize_extension(&default_extension.into());
        let mut recognized: Vec<String> = recognized
            .into_iter()
            .map(|ext| normalize_extension(&ext.into()))
            .filter(|ext| !ext.is_empty())
            .collect();
        if !recognized.contains(&default_extension) {
            recognized.push(default_extension.clone());
        }
        Self {
            recognized,
            default_extension,
        }
    }

    /// Extension appended to names without a recognized one.
    #[must_use]
    pub fn default_extension(&self) -> &str {
        &self.default_extension
    }

    /// Returns true if `name` ends in `.<ext>` for a recognized extension.
    #[must_use]
    pub fn has_recognized_extension(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.recognized
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }

    /// Appends the default extension unless `name` already has a recognized one.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        if self.has_recognized_extension(name) {
            name.to_string()
        } else {
            format!("{name}.{}", self.default_extension)
        }
    }
}

impl Default for MediaExtensionPolicy {
    fn default() -> Self {
        Self::new(
            RECOGNIZED_MEDIA_EXTENSIONS.iter().copied(),
            DEFAULT_MEDIA_EXTENSION,
        )
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` after trimming.
///
/// Idempotent: the output only contains allowed characters.
#[must_use]
pub fn sanitize_short_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitizes `raw` and applies the extension policy.
///
/// # Errors
///
/// Returns [`RegistryError::Validation`] when the name is blank or too long.
pub fn normalize_short_name(
    raw: &str,
    policy: &MediaExtensionPolicy,
) -> Result<String, RegistryError> {
    let sanitized = sanitize_short_name(raw);
    if sanitized.is_empty() {
        return Err(RegistryError::validation("file name must not be empty"));
    }
    let normalized = policy.apply(&sanitized);
    if normalized.chars().count() > MAX_SHORT_NAME_LEN {
        return Err(RegistryError::validation(format!(
            "file name is longer than {MAX_SHORT_NAME_LEN} characters"
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_short_name("My Movie (2024)!"), "My_Movie__2024__");
        assert_eq!(sanitize_short_name("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_short_name("ok-name_1.mp4"), "ok-name_1.mp4");
    }

    #[test]
    fn test_sanitize_trims_surrounding_whitespace() {
        assert_eq!(sanitize_short_name("  Movie  "), "Movie");
    }

    #[test]
    fn test_sanitize_maps_each_non_ascii_char_to_one_underscore() {
        assert_eq!(sanitize_short_name("日本語"), "___");
        assert_eq!(sanitize_short_name("café"), "caf_");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in ["My Movie!", "  x  y ", "ok.mkv", "ünïcödé name", "a..b"] {
            let once = sanitize_short_name(raw);
            assert_eq!(sanitize_short_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_policy_appends_default_extension_once() {
        let policy = MediaExtensionPolicy::default();
        assert_eq!(policy.apply("Movie"), "Movie.mp4");
        assert_eq!(policy.apply("Movie.mp4"), "Movie.mp4");
        assert_eq!(policy.apply(&policy.apply("Movie")), "Movie.mp4");
    }

    #[test]
    fn test_policy_keeps_recognized_extensions() {
        let policy = MediaExtensionPolicy::default();
        assert_eq!(policy.apply("Clip.mkv"), "Clip.mkv");
        assert_eq!(policy.apply("Clip.MKV"), "Clip.MKV");
    }

    #[test]
    fn test_policy_appends_after_unrecognized_extension() {
        let policy = MediaExtensionPolicy::default();
        assert_eq!(policy.apply("notes.txt"), "notes.txt.mp4");
        assert_eq!(policy.apply("archive.tar"), "archive.tar.mp4");
    }

    #[test]
    fn test_policy_bare_extension_is_kept() {
        let policy = MediaExtensionPolicy::default();
        assert!(policy.has_recognized_extension(".mp4"));
        assert_eq!(policy.apply(".mp4"), ".mp4");
    }

    #[test]
    fn test_custom_policy_always_recognizes_default() {
        let policy = MediaExtensionPolicy::new(["webm"], ".MP3");
        assert_eq!(policy.default_extension(), "mp3");
        assert!(policy.has_recognized_extension("a.webm"));
        assert!(policy.has_recognized_extension("a.mp3"));
        assert_eq!(policy.apply("a.mp4"), "a.mp4.mp3");
    }

    #[test]
    fn test_normalize_short_name_full_pipeline() {
        let policy = MediaExtensionPolicy::default();
        assert_eq!(normalize_short_name("Movie", &policy).unwrap(), "Movie.mp4");
        assert_eq!(
            normalize_short_name(" My Movie ", &policy).unwrap(),
            "My_Movie.mp4"
        );
    }

    #[test]
    fn test_normalize_short_name_is_idempotent() {
        let policy = MediaExtensionPolicy::default();
        for raw in ["Movie", "My Movie.mkv", "x y z.avi"] {
            let once = normalize_short_name(raw, &policy).unwrap();
            let twice = normalize_short_name(&once, &policy).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_normalize_short_name_rejects_blank() {
        let policy = MediaExtensionPolicy::default();
        let err = normalize_short_name("   ", &policy).unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
    }

    #[test]
    fn test_normalize_short_name_rejects_overlong() {
        let policy = MediaExtensionPolicy::default();
        let raw = "a".repeat(MAX_SHORT_NAME_LEN);
        assert!(normalize_short_name(&raw, &policy).is_err());

        let fits = "a".repeat(MAX_SHORT_NAME_LEN - 4);
        assert_eq!(
            normalize_short_name(&fits, &policy).unwrap().len(),
            MAX_SHORT_NAME_LEN
        );
    }
}
