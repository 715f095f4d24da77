use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use aspexis_shared::ClientConfig;

use crate::config;

#[derive(Clone)]
pub struct AppState {
    pub client_config: Arc<ClientConfig>,
    pub static_dir: Arc<PathBuf>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(api_base_url: Option<String>, static_dir: PathBuf) -> Self {
        Self {
            client_config: Arc::new(ClientConfig { api_base_url }),
            static_dir: Arc::new(static_dir),
            started_at: Instant::now(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(config::api_base_url(), config::static_dir())
    }
}
