//! Form body extractor for the management routes.
//!
//! Browsers and scripts post either `application/x-www-form-urlencoded` or
//! `multipart/form-data`; both decode into the same field struct. A body with
//! no `Content-Type` is read as urlencoded. Every rejection is an [`ApiError`],
//! so these routes always answer with the JSON envelope.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{HeaderValue, StatusCode};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{ApiError, AppError};

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Form fields decoded from a urlencoded or multipart body.
#[derive(Debug)]
pub struct FormFields<T>(pub T);

/// Body encodings accepted by [`FormFields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormEncoding {
    UrlEncoded,
    Multipart,
}

impl FormEncoding {
    fn from_content_type(content_type: Option<&str>) -> Option<Self> {
        let Some(content_type) = content_type else {
            return Some(Self::UrlEncoded);
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "" | URLENCODED => Some(Self::UrlEncoded),
            MULTIPART => Some(Self::Multipart),
            _ => None,
        }
    }
}

impl<S, T> FromRequest<S> for FormFields<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let encoding = req
            .headers()
            .get(CONTENT_TYPE)
            .map(HeaderValue::to_str)
            .transpose()
            .ok()
            .and_then(FormEncoding::from_content_type)
            .ok_or_else(|| {
                AppError::invalid_body(
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    format!("Form requests must use {URLENCODED} or {MULTIPART}"),
                )
            })?;

        let fields = match encoding {
            FormEncoding::UrlEncoded => {
                let body = Bytes::from_request(req, state).await.map_err(|rejection| {
                    AppError::invalid_body(rejection.status(), rejection.body_text())
                })?;
                urlencoded_fields(&body)
            }
            FormEncoding::Multipart => {
                let multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
                    AppError::invalid_body(rejection.status(), rejection.body_text())
                })?;
                multipart_fields(multipart).await?
            }
        };

        serde_json::from_value(Value::Object(fields))
            .map(Self)
            .map_err(|error| {
                AppError::invalid_body(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()).into()
            })
    }
}

/// Decodes a urlencoded body. A repeated key keeps its last value.
fn urlencoded_fields(body: &[u8]) -> Map<String, Value> {
    url::form_urlencoded::parse(body)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Collects the text parts of a multipart body. File parts are skipped.
async fn multipart_fields(mut multipart: Multipart) -> Result<Map<String, Value>, AppError> {
    let mut fields = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::invalid_body(error.status(), error.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|error| AppError::invalid_body(error.status(), error.body_text()))?;
        fields.insert(name, Value::String(value));
    }
    Ok(fields)
}
