//! In-memory registry of platform clients, keyed by application id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use kanthor_playground_core::{Credentials, RecordStore, StoreError, keys};

use crate::sdk::KanthorClient;

/// Thread-safe map from application id to its platform client.
///
/// Owned by the server state; concurrent inserts for different applications
/// all land, and an insert for an existing id replaces the client.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<String, Arc<KanthorClient>>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild clients from every persisted credential record.
    ///
    /// Records that fail to decode or produce a client are logged and
    /// skipped. Returns how many clients were registered.
    pub async fn load_from_store(
        &self,
        store: &RecordStore,
        sdk_host: Option<&str>,
    ) -> Result<usize, StoreError> {
        let credentials: Vec<Credentials> = store.list_decoded(keys::CREDENTIALS_PATTERN).await?;

        let mut loaded = 0;
        for item in credentials {
            match KanthorClient::new(&item.user, &item.password, sdk_host) {
                Ok(client) => {
                    self.insert(item.app_id, Arc::new(client)).await;
                    loaded += 1;
                }
                Err(e) => {
                    warn!(app_id = %item.app_id, error = %e, "Skipping stored credentials");
                }
            }
        }

        info!(loaded, "Platform clients restored from store");
        Ok(loaded)
    }

    pub async fn insert(&self, app_id: String, client: Arc<KanthorClient>) {
        self.clients.write().await.insert(app_id, client);
    }

    pub async fn get(&self, app_id: &str) -> Option<Arc<KanthorClient>> {
        self.clients.read().await.get(app_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    pub async fn app_ids(&self) -> Vec<String> {
        self.clients.read().await.keys().cloned().collect()
    }
}
