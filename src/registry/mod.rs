//! Link registry: short name to origin page URL.
//!
//! # Architecture
//!
//! - [`LinkRegistry`] - validation, name normalization and create/resolve
//! - [`LinkStore`] - async persistence seam with an atomic conditional insert
//! - [`SqliteLinkStore`] / [`MemoryLinkStore`] - store implementations
//! - [`MediaExtensionPolicy`] - which extensions a short name may end in
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cleanlink_core::registry::{LinkRegistry, MemoryLinkStore};
//! use cleanlink_core::OriginPolicy;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = LinkRegistry::new(
//!     Arc::new(MemoryLinkStore::new()),
//!     OriginPolicy::new("mediafire.com"),
//! );
//! let link = registry
//!     .create("Movie", "https://www.mediafire.com/file/abc", "https://links.example.com")
//!     .await?;
//! assert_eq!(link, "https://links.example.com/Movie.mp4");
//! # Ok(())
//! # }
//! ```

mod error;
mod name;
mod store;

pub use error::{DUPLICATE_NAME_MESSAGE, RegistryError, StoreError};
pub use name::{
    DEFAULT_MEDIA_EXTENSION, MAX_SHORT_NAME_LEN, MediaExtensionPolicy,
    RECOGNIZED_MEDIA_EXTENSIONS, normalize_short_name, sanitize_short_name,
};
pub use store::{LinkStore, MemoryLinkStore, SqliteLinkStore};

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::origin::OriginPolicy;

/// A persisted short name and the origin page it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Sanitized public name, also the last path segment of the link.
    pub short_name: String,
    /// Third-party locker page URL.
    pub origin_url: String,
}

/// Maps short names to origin page URLs with create-once semantics.
pub struct LinkRegistry {
    store: Arc<dyn LinkStore>,
    origin_policy: OriginPolicy,
    extension_policy: MediaExtensionPolicy,
}

impl LinkRegistry {
    /// Creates a registry with the default media extension policy.
    #[must_use]
    pub fn new(store: Arc<dyn LinkStore>, origin_policy: OriginPolicy) -> Self {
        Self::with_extension_policy(store, origin_policy, MediaExtensionPolicy::default())
    }

    /// Creates a registry with an explicit extension policy.
    #[must_use]
    pub fn with_extension_policy(
        store: Arc<dyn LinkStore>,
        origin_policy: OriginPolicy,
        extension_policy: MediaExtensionPolicy,
    ) -> Self {
        Self {
            store,
            origin_policy,
            extension_policy,
        }
    }

    /// The policy used to normalize names (shared with inline streaming).
    #[must_use]
    pub fn extension_policy(&self) -> &MediaExtensionPolicy {
        &self.extension_policy
    }

    /// The policy used to validate origin URLs.
    #[must_use]
    pub fn origin_policy(&self) -> &OriginPolicy {
        &self.origin_policy
    }

    /// Validates and normalizes a create request without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] for a foreign/malformed origin URL
    /// or an unusable name.
    pub fn prepare(&self, raw_name: &str, origin_url: &str) -> Result<LinkRecord, RegistryError> {
        let url = self
            .origin_policy
            .validate(origin_url)
            .map_err(RegistryError::validation)?;
        let short_name = normalize_short_name(raw_name, &self.extension_policy)?;
        Ok(LinkRecord {
            short_name,
            origin_url: url.to_string(),
        })
    }

    /// Registers `raw_name` for `origin_url` and returns the public link
    /// (`base_url` + `/` + short name).
    ///
    /// Exactly one store write happens on success; none on validation failure
    /// or collision.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Validation`] before any store access
    /// - [`RegistryError::DuplicateName`] if the sanitized name is taken
    /// - [`RegistryError::Store`] if persistence fails
    #[instrument(skip(self, origin_url, base_url), fields(raw_name = %raw_name))]
    pub async fn create(
        &self,
        raw_name: &str,
        origin_url: &str,
        base_url: &str,
    ) -> Result<String, RegistryError> {
        let record = self.prepare(raw_name, origin_url)?;

        let inserted = self
            .store
            .insert_if_absent(&record.short_name, &record.origin_url)
            .await?;
        if !inserted {
            debug!(short_name = %record.short_name, "short name already registered");
            return Err(RegistryError::duplicate_name(record.short_name));
        }

        let link = public_link(base_url, &record.short_name);
        info!(short_name = %record.short_name, link = %link, "link created");
        Ok(link)
    }

    /// Looks up the origin page URL for `short_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when nothing is registered, or
    /// [`RegistryError::Store`] if the lookup fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, short_name: &str) -> Result<String, RegistryError> {
        self.store
            .get(short_name)
            .await?
            .ok_or_else(|| RegistryError::not_found(short_name))
    }
}

impl std::fmt::Debug for LinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkRegistry")
            .field("origin_policy", &self.origin_policy)
            .field("extension_policy", &self.extension_policy)
            .finish_non_exhaustive()
    }
}

/// Joins a base URL and a short name with exactly one `/`.
#[must_use]
pub fn public_link(base_url: &str, short_name: &str) -> String {
    format!("{}/{short_name}", base_url.trim_end_matches('/'))
}
