//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{StoreBackend, StorefrontConfig};
use crate::db::{self, Collection, MemoryCollection, PgCollection};
use crate::services::RateLimiterRegistry;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database URL is required for the postgres store")]
    MissingDatabaseUrl,
    #[error("failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the collections and the rate limiter registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    assortment: Collection,
    cart: Collection,
    limiter: Arc<RateLimiterRegistry>,
}

impl AppState {
    /// Create application state from already-built collections.
    #[must_use]
    pub fn new(assortment: impl Into<Collection>, cart: impl Into<Collection>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                assortment: assortment.into(),
                cart: cart.into(),
                limiter: Arc::new(RateLimiterRegistry::new()),
            }),
        }
    }

    /// Connect to the configured store and build the state.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the `PostgreSQL` pool cannot be created.
    pub async fn connect(config: &StorefrontConfig) -> Result<Self, StateError> {
        match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_ref()
                    .ok_or(StateError::MissingDatabaseUrl)?;
                let pool = db::create_pool(url).await?;
                tracing::info!("Database pool created");
                Ok(Self::new(
                    PgCollection::assortment(pool.clone()),
                    PgCollection::cart(pool),
                ))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::new(MemoryCollection::new(), MemoryCollection::new()))
            }
        }
    }

    /// The product catalog.
    #[must_use]
    pub fn assortment(&self) -> &Collection {
        &self.inner.assortment
    }

    /// The shared cart.
    #[must_use]
    pub fn cart(&self) -> &Collection {
        &self.inner.cart
    }

    /// The per-client rate limiter registry.
    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiterRegistry> {
        &self.inner.limiter
    }
}
