use crate::auth::AuthProvider;
use crate::kv::KvStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<KvStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(store: KvStore, auth: impl AuthProvider + 'static) -> Self {
        Self {
            store: Arc::new(store),
            auth: Arc::new(auth),
        }
    }
}
