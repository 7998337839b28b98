//! Route handlers.

use std::borrow::Cow;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::{HOST, RANGE};
use axum::http::{HeaderMap, HeaderName};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::auth::AUTH_COOKIE_NAME;
use super::error::{ApiError, AppError};
use super::form::FormFields;
use super::router::AppState;
use crate::registry::{MediaExtensionPolicy, RegistryError, normalize_short_name};

/// Name used for inline streams when the origin URL has no usable segment.
pub const FALLBACK_FILE_NAME: &str = "download";

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Form body of `POST /api/create`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkForm {
    /// Origin page URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Requested short name.
    #[serde(default)]
    pub name: Option<String>,
    /// Shared secret, for clients without a session cookie.
    #[serde(default)]
    pub password: Option<String>,
}

/// Form body of `POST /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: Option<String>,
}

/// Query of `GET /stream`.
#[derive(Debug, Default, Deserialize)]
pub struct InlineStreamQuery {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /` - service info and whether the caller holds a valid session.
pub async fn index(State(state): State<AppState>, jar: CookieJar) -> Json<Value> {
    let authenticated = jar
        .get(AUTH_COOKIE_NAME)
        .is_some_and(|cookie| state.auth.verify_token(cookie.value()));
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "authenticated": authenticated,
    }))
}

/// `GET /healthz` - liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `POST /api/create` - registers a short name for an origin page.
#[instrument(skip_all)]
pub async fn create_link(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    FormFields(form): FormFields<CreateLinkForm>,
) -> Result<Json<Value>, ApiError> {
    let session = jar.get(AUTH_COOKIE_NAME).map(Cookie::value);
    if !state.auth.is_authorized(session, form.password.as_deref()) {
        return Err(AppError::Unauthorized.into());
    }

    let origin_url = required(form.url.as_deref(), "url")?;
    let raw_name = required(form.name.as_deref(), "name")?;
    let base_url = request_base_url(state.public_base_url.as_deref(), &headers);

    let link = state.registry.create(raw_name, origin_url, &base_url).await?;
    Ok(Json(json!({ "success": true, "link": link })))
}

/// `POST /login` - exchanges the shared secret for a session cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    FormFields(form): FormFields<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let password = form.password.unwrap_or_default();
    if !state.auth.check_password(&password) {
        warn!("login rejected");
        return Err(AppError::Unauthorized.into());
    }

    let secure = request_base_url(state.public_base_url.as_deref(), &headers).starts_with("https://");
    let max_age = i64::try_from(state.auth.session_ttl().as_secs()).unwrap_or(i64::MAX);
    let cookie = Cookie::build((AUTH_COOKIE_NAME, state.auth.issue_token()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age))
        .build();

    info!("session issued");
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// `GET /logout` - clears the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(Cookie::build(AUTH_COOKIE_NAME).path("/").build()),
        Redirect::to("/"),
    )
}

/// `GET /{name}` - streams the file behind a registered short name.
#[instrument(skip_all, fields(name = %name))]
pub async fn stream_named(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let origin_url = state.registry.resolve(&name).await?;
    debug!(origin_url = %origin_url, "short name resolved");
    relay(&state, &origin_url, &name, &headers).await
}

/// `GET /stream?url=&name=` - streams an origin page without registering it.
#[instrument(skip_all)]
pub async fn stream_inline(
    State(state): State<AppState>,
    Query(query): Query<InlineStreamQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let raw_url = required(query.url.as_deref(), "url")?;
    let origin_url = state
        .registry
        .origin_policy()
        .validate(raw_url)
        .map_err(RegistryError::validation)?;

    let policy = state.registry.extension_policy();
    let file_name = match query.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => normalize_short_name(name, policy)?,
        _ => derive_file_name(&origin_url, policy),
    };

    relay(&state, origin_url.as_str(), &file_name, &headers).await
}

async fn relay(
    state: &AppState,
    origin_url: &str,
    file_name: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let direct_url = state.resolver.resolve(origin_url).await?;
    let response = state
        .proxy
        .stream(&direct_url, headers.get(RANGE), file_name)
        .await?;
    Ok(response.into_response())
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::missing_parameter(name))
}

/// Base for generated links: the configured public URL, else
/// `<X-Forwarded-Proto or http>://<Host>`.
#[must_use]
pub fn request_base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }
    let scheme = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| matches!(*value, "http" | "https"))
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// File name for an inline stream: the last meaningful path segment of the
/// origin URL, percent-decoded (MediaFire's trailing `/file` is skipped), else
/// [`FALLBACK_FILE_NAME`], normalized through `policy`.
#[must_use]
pub fn derive_file_name(origin_url: &Url, policy: &MediaExtensionPolicy) -> String {
    let candidate = origin_url
        .path_segments()
        .and_then(|segments| {
            segments
                .rev()
                .find(|segment| !segment.is_empty() && !segment.eq_ignore_ascii_case("file"))
        })
        .unwrap_or(FALLBACK_FILE_NAME);
    let candidate = urlencoding::decode(candidate).unwrap_or(Cow::Borrowed(candidate));

    normalize_short_name(&candidate, policy).unwrap_or_else(|_| policy.apply(FALLBACK_FILE_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn policy() -> MediaExtensionPolicy {
        MediaExtensionPolicy::default()
    }

    #[test]
    fn test_derive_file_name_skips_trailing_file_segment() {
        let url = Url::parse("https://www.mediafire.com/file/abc123/Movie.mkv/file").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "Movie.mkv");
    }

    #[test]
    fn test_derive_file_name_appends_default_extension() {
        let url = Url::parse("https://www.mediafire.com/file/abc123/My%20Clip/file").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "My_Clip.mp4");
    }

    #[test]
    fn test_derive_file_name_decodes_before_sanitizing() {
        let url = Url::parse("https://www.mediafire.com/file/abc/Holiday%2Dreel%2Emkv/file").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "Holiday-reel.mkv");
        // Invalid UTF-8 after decoding keeps the raw segment.
        let url = Url::parse("https://www.mediafire.com/file/abc/bad%FFname/file").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "bad_FFname.mp4");
    }

    #[test]
    fn test_derive_file_name_falls_back() {
        let url = Url::parse("https://www.mediafire.com/").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "download.mp4");
        let url = Url::parse("https://www.mediafire.com/file/").unwrap();
        assert_eq!(derive_file_name(&url, &policy()), "download.mp4");
    }

    #[test]
    fn test_request_base_url_prefers_configured() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("ignored.example"));
        assert_eq!(
            request_base_url(Some("https://dl.example.com/"), &headers),
            "https://dl.example.com"
        );
    }

    #[test]
    fn test_request_base_url_from_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("dl.example.com"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https, http"));
        assert_eq!(request_base_url(None, &headers), "https://dl.example.com");
    }

    #[test]
    fn test_request_base_url_defaults() {
        assert_eq!(request_base_url(None, &HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(Some("  "), "url").is_err());
        assert!(required(None, "url").is_err());
        assert_eq!(required(Some(" x "), "url").unwrap(), "x");
    }
}
