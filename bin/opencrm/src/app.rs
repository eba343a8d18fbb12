//! Composition root: wires storage, state, client and caches together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use opencrm_client::{ApiClient, ClientConfig};
use opencrm_core::TracingNotifier;
use opencrm_data::{OptionCache, PageCache};
use opencrm_state::{FileSessionStorage, SessionService, StateStore};

pub struct App {
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionService>,
    pub page_cache: Arc<PageCache>,
    pub option_cache: Arc<OptionCache>,
    pub session_path: PathBuf,
}

impl App {
    /// Build the full service graph and restore the persisted session.
    pub fn bootstrap(session_file: Option<PathBuf>) -> Result<Self> {
        let session_path = session_file.unwrap_or_else(FileSessionStorage::default_path);
        debug!(path = %session_path.display(), "using session file");
        let storage = FileSessionStorage::new(session_path.clone());

        let store = Arc::new(StateStore::new());
        let session = Arc::new(SessionService::new(store, Arc::new(storage)));
        // Terminal output, light theme.
        session.initialize(false)?;

        let page_cache = Arc::new(PageCache::new());
        let option_cache = Arc::new(OptionCache::new());
        {
            let page_cache = page_cache.clone();
            let option_cache = option_cache.clone();
            session.on_teardown(move || {
                page_cache.invalidate_all();
                option_cache.invalidate_all();
            });
        }

        let client = Arc::new(ApiClient::over_http(
            ClientConfig::from_env(),
            session.clone(),
            Arc::new(TracingNotifier),
        ));

        Ok(Self {
            client,
            session,
            page_cache,
            option_cache,
            session_path,
        })
    }
}
