//! Streaming reverse proxy for direct file URLs.
//!
//! The proxy never slices ranges itself: the inbound `Range` header goes
//! upstream verbatim and the upstream status (200/206/4xx/5xx) and range
//! headers come back unchanged. Bodies are relayed chunk by chunk, so memory
//! use does not depend on file size.
//!
//! The upstream connection is owned by the response body stream. When the
//! client disconnects, the server drops that stream and the connection is
//! closed instead of being drained.

mod error;

pub use error::ProxyError;

use axum::body::Body;
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, HeaderName,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::HttpTimeouts;
use crate::http_client::build_stream_client;

/// Upstream response headers copied to the client.
pub const RELAYED_HEADERS: [HeaderName; 4] = [CONTENT_TYPE, CONTENT_LENGTH, CONTENT_RANGE, ACCEPT_RANGES];

/// Relays direct file URLs to clients with range support intact.
#[derive(Debug, Clone)]
pub struct StreamingProxy {
    client: Client,
}

/// Upstream status and headers, plus the not-yet-consumed body.
#[derive(Debug)]
pub struct ProxyResponse {
    /// Upstream status, relayed unchanged.
    pub status: StatusCode,
    /// Allow-listed upstream headers plus the fixed download headers.
    pub headers: HeaderMap,
    upstream: reqwest::Response,
    direct_url: String,
}

impl StreamingProxy {
    /// Creates a proxy with a client built from `timeouts`.
    ///
    /// # Errors
    ///
    /// Returns the client builder error if the HTTP client cannot be constructed.
    pub fn new(timeouts: &HttpTimeouts) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_stream_client(timeouts)?))
    }

    /// Creates a proxy around an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Starts the upstream fetch of `direct_url` and returns once headers arrive.
    ///
    /// `inbound_range` is forwarded verbatim as `Range`. `filename` is used
    /// for `Content-Disposition`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError`] if the request cannot be sent or no response
    /// headers are received.
    #[instrument(skip(self, inbound_range), fields(range = ?inbound_range))]
    pub async fn stream(
        &self,
        direct_url: &str,
        inbound_range: Option<&HeaderValue>,
        filename: &str,
    ) -> Result<ProxyResponse, ProxyError> {
        let mut request = self.client.get(direct_url);
        if let Some(range) = inbound_range {
            let range = reqwest::header::HeaderValue::from_bytes(range.as_bytes())
                .map_err(|_| ProxyError::invalid_range(direct_url))?;
            request = request.header(reqwest::header::RANGE, range);
        }

        let upstream = request
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "upstream request failed");
                ProxyError::from_send(direct_url, error)
            })?;

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let headers = relay_headers(upstream.headers(), filename);

        info!(
            status = status.as_u16(),
            content_length = ?upstream.content_length(),
            content_range = ?headers.get(CONTENT_RANGE),
            "upstream responded"
        );

        Ok(ProxyResponse {
            status,
            headers,
            upstream,
            direct_url: direct_url.to_string(),
        })
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let direct_url = self.direct_url;
        let body = self.upstream.bytes_stream().inspect_err(move |error| {
            warn!(url = %direct_url, error = %error, "upstream stream failed mid-transfer");
        });
        let mut response = Response::new(Body::from_stream(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Builds the client-facing header set from upstream headers.
///
/// Copies [`RELAYED_HEADERS`] when present, then sets `accept-ranges: bytes`,
/// a permissive CORS origin and an attachment disposition.
#[must_use]
pub fn relay_headers(upstream: &reqwest::header::HeaderMap, filename: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in &RELAYED_HEADERS {
        if let Some(value) = upstream.get(name.as_str())
            && let Ok(value) = HeaderValue::from_bytes(value.as_bytes())
        {
            headers.insert(name.clone(), value);
        }
    }

    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    match HeaderValue::from_str(&content_disposition(filename)) {
        Ok(value) => {
            headers.insert(CONTENT_DISPOSITION, value);
        }
        Err(_) => debug!(filename, "filename not representable in Content-Disposition"),
    }
    headers
}

/// `attachment; filename="<name>"` with quotes, backslashes and control
/// characters replaced by `_`.
#[must_use]
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
