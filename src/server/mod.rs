//! HTTP boundary: routes, auth gate and error mapping.
//!
//! # Architecture
//!
//! - [`build_router`] - axum route table over a shared [`AppState`]
//! - [`AuthGate`] - shared-secret check and session tokens
//! - [`AppError`] / [`ApiError`] - component errors mapped to status + message
//! - [`FormFields`] - urlencoded or multipart form bodies
//!
//! # Example
//!
//! ```no_run
//! use cleanlink_core::server::{AppState, AuthGate, build_router};
//! use cleanlink_core::{
//!     AppConfig, LinkRegistry, MemoryLinkStore, OriginPolicy, OriginResolver, StreamingProxy,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::new("secret");
//! let registry = LinkRegistry::new(
//!     Arc::new(MemoryLinkStore::new()),
//!     OriginPolicy::new(&config.origin_host),
//! );
//! let state = AppState::new(
//!     registry,
//!     OriginResolver::new(&config.timeouts)?,
//!     StreamingProxy::new(&config.timeouts)?,
//!     AuthGate::new(config.access_password.clone(), config.session_ttl),
//!     config.public_base_url.clone(),
//! );
//! let listener = tokio::net::TcpListener::bind(config.bind).await?;
//! axum::serve(listener, build_router(state)).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod error;
mod form;
mod handlers;
mod router;

pub use auth::{AUTH_COOKIE_NAME, AuthGate};
pub use error::{
    ApiError, AppError, LINK_NOT_FOUND_MESSAGE, NOT_FOUND_MESSAGE, ORIGIN_UNREACHABLE_MESSAGE,
    STREAM_ERROR_MESSAGE, UNAUTHORIZED_MESSAGE,
};
pub use form::FormFields;
pub use handlers::{FALLBACK_FILE_NAME, derive_file_name, request_base_url};
pub use router::{AppState, MAX_FORM_BODY_BYTES, build_router};
