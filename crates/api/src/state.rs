//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::services::AuthStore;
use crate::store::MemoryStore;
use crate::store::seed::SeedError;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// data store, the auth store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: MemoryStore,
    auth: AuthStore,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Seeds the store with demo data when `config.seed_data` is set. The
    /// demo credentials are always installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the demo data fails validation.
    pub fn new(config: ApiConfig) -> Result<Self, SeedError> {
        let store = if config.seed_data {
            MemoryStore::with_demo_data()?
        } else {
            MemoryStore::new()
        };
        let auth = AuthStore::with_demo_credentials(config.session_ttl_secs);

        Ok(Self::from_parts(config, store, auth))
    }

    /// Assemble state from already built parts.
    #[must_use]
    pub fn from_parts(config: ApiConfig, store: MemoryStore, auth: AuthStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                auth,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.inner.store
    }

    /// Get a reference to the auth store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }
}
