use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::services::cart_service::CartService;
use crate::services::catalog_service::CatalogService;
use crate::services::order_backend::{HttpBackend, LocalBackend, OrderBackend};
use crate::services::session_service::SessionService;
use crate::store::{FileStore, KvStore};

/// The single owner of the session's services. Screens borrow what they need
/// from here; there is no ambient global state.
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub cart: CartService,
    pub catalog: CatalogService,
    pub session: SessionService,
    pub backend: Arc<dyn OrderBackend>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store: Arc<dyn KvStore> = Arc::new(FileStore::open(&config.data_dir)?);
        Ok(Self::with_store(store, config))
    }

    /// A configured API base URL selects the REST backend; otherwise orders
    /// live in the durable store.
    pub fn with_store(store: Arc<dyn KvStore>, config: &AppConfig) -> Self {
        let backend: Arc<dyn OrderBackend> = match &config.api_base_url {
            Some(url) => Arc::new(HttpBackend::new(url.clone())),
            None => Arc::new(LocalBackend::new(Arc::clone(&store))),
        };
        Self {
            cart: CartService::open(Arc::clone(&store), config.tax_rate, config.quantity_policy),
            catalog: CatalogService::load(store.as_ref()),
            session: SessionService::new(Arc::clone(&store)),
            backend,
            store,
        }
    }
}
