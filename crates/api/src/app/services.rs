use std::sync::Arc;

use catalog_infra::ProductStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn ProductStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn products(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices").finish_non_exhaustive()
    }
}
