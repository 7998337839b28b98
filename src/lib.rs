//! Cleanlink Core Library
//!
//! Short, stable download links for files hosted on a file-locker site.
//! A link maps a short name to the locker's landing page; every fetch
//! scrapes the page for the current direct URL and streams the file back
//! with range support.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`registry`] - short name to origin page URL, create-once semantics
//! - [`resolver`] - origin page to direct file URL via ordered extraction rules
//! - [`proxy`] - streaming relay of the direct URL with `Range` passthrough
//! - [`server`] - axum routes, auth gate and HTTP error mapping
//! - [`db`] - SQLite connection and schema management
//! - [`config`] - validated application configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod db;
pub mod http_client;
pub mod origin;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod user_agent;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, HttpTimeouts};
pub use db::{Database, DbError};
pub use origin::OriginPolicy;
pub use proxy::{ProxyError, ProxyResponse, StreamingProxy};
pub use registry::{
    LinkRecord, LinkRegistry, LinkStore, MediaExtensionPolicy, MemoryLinkStore, RegistryError,
    SqliteLinkStore, StoreError,
};
pub use resolver::{ExtractionRule, OriginResolver, ResolveError};
pub use server::{AppState, AuthGate, build_router};
