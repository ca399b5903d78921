use crate::identity::HostUser;
use crate::store::TipStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TipStore>>,
    pub user: Arc<HostUser>,
}

impl AppState {
    pub fn new(store: TipStore, user: HostUser) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            user: Arc::new(user),
        }
    }
}
