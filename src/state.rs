use crate::config::Config;
use crate::store::{Datastore, LocalStore, StoreError, SupabaseClient};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Datastore,
}

impl AppState {
    pub fn new(config: Config, store: Datastore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Picks Supabase when credentials are configured, the JSON file otherwise.
    pub async fn from_config(config: Config) -> Result<Self, StoreError> {
        let store = match &config.supabase {
            Some(supabase) => {
                info!("using supabase datastore at {}", supabase.url);
                Datastore::Supabase(SupabaseClient::new(supabase)?)
            }
            None => {
                info!("using local datastore at {}", config.data_path.display());
                Datastore::Local(LocalStore::open(config.data_path.clone()).await?)
            }
        };
        Ok(Self::new(config, store))
    }
}
