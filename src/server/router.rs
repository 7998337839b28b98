use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use super::auth::AuthGate;
use super::handlers;
use crate::proxy::StreamingProxy;
use crate::registry::LinkRegistry;
use crate::resolver::OriginResolver;

/// Upper bound for create/login form bodies.
pub const MAX_FORM_BODY_BYTES: usize = 16 * 1024;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub registry: Arc<LinkRegistry>,
    pub resolver: Arc<OriginResolver>,
    pub proxy: StreamingProxy,
    pub auth: Arc<AuthGate>,
    /// Base for generated links; `None` derives it from request headers.
    pub public_base_url: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn new(
        registry: LinkRegistry,
        resolver: OriginResolver,
        proxy: StreamingProxy,
        auth: AuthGate,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver: Arc::new(resolver),
            proxy,
            auth: Arc::new(auth),
            public_base_url,
        }
    }
}

/// Build the full Axum router.
///
/// **Management:**
/// - `POST /api/create` - register a short name (session or password)
/// - `POST /login`      - exchange the password for a session cookie
/// - `GET  /logout`     - clear the session cookie
///
/// **Info (unauthenticated):**
/// - `GET /`        - service info
/// - `GET /healthz` - liveness probe
///
/// **Delivery (unauthenticated):**
/// - `GET /stream?url=&name=` - inline origin URL, nothing persisted
/// - `GET /{name}`            - registered short name
///
/// Static routes win over the `/{name}` capture, so short names equal to a
/// static path (`stream`, `login`, ...) are shadowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/create", post(handlers::create_link))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/stream", get(handlers::stream_inline))
        .route("/{name}", get(handlers::stream_named))
        .layer(DefaultBodyLimit::max(MAX_FORM_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
