use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use opencrm_client::ApiClient;

use crate::cache::{PageCache, PageData, page_key};
use crate::decode::Payload;

const FETCH_FAILED_NOTICE: &str = "Failed to fetch data";

/// Observable state of one paginated listing.
#[derive(Debug, Clone)]
pub struct PageState {
    pub rows: Vec<Value>,
    pub loading: bool,
    pub total_rows: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub search_term: String,
    pub query: BTreeMap<String, String>,
    /// Last decoded envelope (raw payload when malformed).
    pub root: Value,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            // Views render a spinner until the first fetch settles.
            loading: true,
            total_rows: 0,
            current_page: 1,
            per_page: 10,
            search_term: String::new(),
            query: BTreeMap::new(),
            root: Value::Null,
        }
    }
}

/// Per-call overrides for [`PageSource::fetch`]. Anything left unset
/// falls back to the source's current state.
#[derive(Debug, Clone, Default)]
pub struct FetchPlan {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
    query: Option<BTreeMap<String, String>>,
    force: bool,
    silent: bool,
}

impl FetchPlan {
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Bypass the cache and hit the server even for a known key.
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    /// Refetch without flipping the loading flag, for background
    /// refreshes that should not blank the table.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Paginated listing backed by one endpoint.
///
/// Holds the page state, consults the shared [`PageCache`] before
/// going to the server, and drops out-of-order completions so a slow
/// response never clobbers a newer one.
pub struct PageSource {
    endpoint: String,
    deps: Vec<String>,
    client: Arc<ApiClient>,
    cache: Arc<PageCache>,
    state: RwLock<PageState>,
    generation: AtomicU64,
}

impl PageSource {
    pub fn new(client: Arc<ApiClient>, cache: Arc<PageCache>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            deps: Vec::new(),
            client,
            cache,
            state: RwLock::new(PageState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Extra cache-key dimensions (tenant id, route params) that are
    /// not request parameters themselves.
    pub fn with_deps(mut self, deps: Vec<String>) -> Self {
        self.deps = deps;
        self
    }

    pub fn with_per_page(self, per_page: u64) -> Self {
        self.state.write().unwrap().per_page = per_page;
        self
    }

    pub fn with_query(self, query: BTreeMap<String, String>) -> Self {
        self.state.write().unwrap().query = query;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn snapshot(&self) -> PageState {
        self.state.read().unwrap().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().unwrap().loading
    }

    pub fn rows(&self) -> Vec<Value> {
        self.state.read().unwrap().rows.clone()
    }

    pub fn total_rows(&self) -> u64 {
        self.state.read().unwrap().total_rows
    }

    /// Fetch one page, preferring the cache unless the plan forces a
    /// server round trip. Returns the page served to the view, or
    /// `None` when the fetch failed or was superseded by a newer one.
    pub async fn fetch(&self, plan: FetchPlan) -> Option<PageData> {
        if self.endpoint.is_empty() {
            self.state.write().unwrap().loading = false;
            return None;
        }

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Resolve request coordinates from the plan, falling back to
        // current state, and commit them before the round trip.
        let (page, limit, search, query) = {
            let mut state = self.state.write().unwrap();
            let page = plan.page.unwrap_or(state.current_page);
            let limit = plan.limit.unwrap_or(state.per_page);
            let search = plan
                .search
                .unwrap_or_else(|| state.search_term.clone())
                .trim()
                .to_string();
            let query = plan.query.unwrap_or_else(|| state.query.clone());
            state.current_page = page;
            state.per_page = limit;
            state.search_term = search.clone();
            state.query = query.clone();
            (page, limit, search, query)
        };

        let key = page_key(&self.endpoint, page, limit, &search, &query, &self.deps);

        if !plan.force {
            if let Some(data) = self.cache.get(&key) {
                debug!(endpoint = %self.endpoint, page, "serving page from cache");
                self.apply(&data);
                return Some(data);
            }
        }

        if !plan.silent {
            self.state.write().unwrap().loading = true;
        }

        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), limit.to_string()),
        ];
        if !search.is_empty() {
            params.push(("search".to_string(), search.clone()));
        }
        for (name, value) in &query {
            if !value.is_empty() {
                params.push((name.clone(), value.clone()));
            }
        }

        let result = self.client.get(&self.endpoint, &params).await;

        if self.generation.load(Ordering::SeqCst) != my_generation {
            debug!(endpoint = %self.endpoint, page, "discarding superseded fetch");
            return None;
        }

        match result {
            Ok(body) => {
                let payload = Payload::classify(body);
                let total = payload.total();
                let data = match payload {
                    Payload::Bare(rows) => PageData {
                        root: Value::Array(rows.clone()),
                        rows,
                        total,
                    },
                    Payload::Enveloped { rows, envelope } => PageData {
                        rows,
                        total,
                        root: envelope,
                    },
                    Payload::Malformed(raw) => {
                        warn!(endpoint = %self.endpoint, "unexpected payload shape, treating as empty");
                        PageData::empty_with_root(raw)
                    }
                };
                self.cache.set(&key, data.clone());
                self.apply(&data);
                Some(data)
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "page fetch failed");
                // Forbidden is already surfaced by the request layer.
                if !err.is_forbidden() {
                    let notice = if err.status().is_some() {
                        err.notification_message()
                    } else {
                        FETCH_FAILED_NOTICE.to_string()
                    };
                    self.client.notifier().error(&notice);
                }
                let mut state = self.state.write().unwrap();
                state.rows.clear();
                state.total_rows = 0;
                state.root = Value::Null;
                state.loading = false;
                None
            }
        }
    }

    fn apply(&self, data: &PageData) {
        let mut state = self.state.write().unwrap();
        state.rows = data.rows.clone();
        state.total_rows = data.total;
        state.root = data.root.clone();
        state.loading = false;
    }

    pub async fn set_page(&self, page: u64) -> Option<PageData> {
        self.fetch(FetchPlan::default().page(page)).await
    }

    pub async fn set_per_page(&self, per_page: u64) -> Option<PageData> {
        self.fetch(FetchPlan::default().limit(per_page)).await
    }

    /// Apply a search term (trimmed) and jump back to the first page.
    pub async fn handle_search(&self, term: impl Into<String>) -> Option<PageData> {
        self.fetch(FetchPlan::default().search(term).page(1)).await
    }

    /// Replace the extra query parameters and jump back to the first
    /// page.
    pub async fn set_query(&self, query: BTreeMap<String, String>) -> Option<PageData> {
        self.fetch(FetchPlan::default().query(query).page(1)).await
    }

    /// Refetch the current page from the server, ignoring the cache.
    pub async fn refresh(&self) -> Option<PageData> {
        self.fetch(FetchPlan::default().force()).await
    }
}
