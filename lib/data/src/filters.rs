use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use opencrm_client::ApiClient;
use opencrm_client::endpoints;
use opencrm_core::ApiError;

use crate::cache::{OptionCache, option_key};
use crate::debounce::Debouncer;

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
const SEARCH_LIMIT: u64 = 20;
const OPTIONS_FAILED_NOTICE: &str = "Failed to load filter options";

/// Reference-data domains selectable in listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDomain {
    Brand,
    Unit,
    Merchant,
    Team,
    User,
    Role,
    Permission,
    Lead,
}

impl FilterDomain {
    pub const ALL: [FilterDomain; 8] = [
        FilterDomain::Brand,
        FilterDomain::Unit,
        FilterDomain::Merchant,
        FilterDomain::Team,
        FilterDomain::User,
        FilterDomain::Role,
        FilterDomain::Permission,
        FilterDomain::Lead,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            FilterDomain::Brand => endpoints::BRANDS,
            FilterDomain::Unit => endpoints::UNITS,
            FilterDomain::Merchant => endpoints::MERCHANTS,
            FilterDomain::Team => endpoints::TEAMS,
            FilterDomain::User => endpoints::USERS,
            FilterDomain::Role => endpoints::ROLES,
            FilterDomain::Permission => endpoints::PERMISSIONS,
            FilterDomain::Lead => endpoints::LEADS,
        }
    }

    /// Page size for the unfiltered initial fetch.
    pub fn default_limit(self) -> u64 {
        match self {
            FilterDomain::Role => 50,
            _ => 20,
        }
    }

    /// Page size when the search input is cleared.
    pub fn clear_limit(self) -> u64 {
        match self {
            FilterDomain::Role => 50,
            _ => 10,
        }
    }

    /// Map a domain name (as typed on the command line) to its domain.
    pub fn from_name(name: &str) -> Option<FilterDomain> {
        match name.to_lowercase().as_str() {
            "brand" | "brands" => Some(FilterDomain::Brand),
            "unit" | "units" => Some(FilterDomain::Unit),
            "merchant" | "merchants" => Some(FilterDomain::Merchant),
            "team" | "teams" => Some(FilterDomain::Team),
            "user" | "users" => Some(FilterDomain::User),
            "role" | "roles" => Some(FilterDomain::Role),
            "permission" | "permissions" => Some(FilterDomain::Permission),
            "lead" | "leads" => Some(FilterDomain::Lead),
            _ => None,
        }
    }

    fn label_noun(self) -> &'static str {
        match self {
            FilterDomain::Brand => "Brand",
            FilterDomain::Unit => "Unit",
            FilterDomain::Merchant => "Merchant",
            FilterDomain::Team => "Team",
            FilterDomain::User => "User",
            FilterDomain::Role => "Role",
            FilterDomain::Permission => "Permission",
            FilterDomain::Lead => "Lead",
        }
    }
}

/// One selectable option, already mapped for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            id: None,
            email: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DomainState {
    options: Vec<FilterOption>,
    loading: bool,
}

/// Non-empty string or stringified number at `key`, mirroring the
/// truthiness rules the option labels rely on.
fn text(row: &Value, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn map_row(domain: FilterDomain, row: &Value) -> FilterOption {
    let id_text = text(row, "id").unwrap_or_default();
    let fallback = || format!("{} {id_text}", domain.label_noun());
    match domain {
        FilterDomain::Brand | FilterDomain::Unit => FilterOption::new(
            id_text.clone(),
            text(row, "title")
                .or_else(|| text(row, "name"))
                .unwrap_or_else(fallback),
        ),
        FilterDomain::Merchant | FilterDomain::Team => FilterOption::new(
            id_text.clone(),
            text(row, "name")
                .or_else(|| text(row, "title"))
                .unwrap_or_else(fallback),
        ),
        FilterDomain::User => FilterOption {
            value: id_text.clone(),
            label: text(row, "name")
                .or_else(|| text(row, "email"))
                .unwrap_or_else(fallback),
            id: None,
            email: text(row, "email"),
        },
        FilterDomain::Role => FilterOption {
            value: text(row, "name").unwrap_or_else(|| id_text.clone()),
            label: text(row, "name")
                .or_else(|| text(row, "title"))
                .unwrap_or_else(fallback),
            id: row.get("id").and_then(Value::as_u64),
            email: None,
        },
        FilterDomain::Permission => FilterOption::new(
            id_text.clone(),
            text(row, "name")
                .or_else(|| text(row, "title"))
                .unwrap_or_else(fallback),
        ),
        FilterDomain::Lead => FilterOption::new(
            id_text.clone(),
            format!(
                "{} ({})",
                text(row, "name").unwrap_or_else(|| "N/A".to_string()),
                text(row, "email").unwrap_or_else(|| "N/A".to_string()),
            ),
        ),
    }
}

/// The roles list views can fall back on when the server is unable to
/// serve one.
fn fallback_roles() -> Vec<FilterOption> {
    vec![
        FilterOption::new("admin", "Admin"),
        FilterOption::new("manager", "Manager"),
        FilterOption::new("staff", "Staff"),
    ]
}

/// Rows for one domain. Roles tolerate both the standard envelope and
/// a bare array; every other domain requires the envelope.
fn rows_for(domain: FilterDomain, body: &Value) -> Vec<Value> {
    if let Some(Value::Array(rows)) = body.get("data") {
        return rows.clone();
    }
    if domain == FilterDomain::Role {
        if let Value::Array(rows) = body {
            return rows.clone();
        }
    }
    Vec::new()
}

/// Resolves selectable options for listing filters, one state slot per
/// domain, sharing a mapped-option cache across instances.
pub struct FilterResolver {
    client: Arc<ApiClient>,
    cache: Arc<OptionCache>,
    enabled: HashSet<FilterDomain>,
    states: RwLock<HashMap<FilterDomain, DomainState>>,
    debouncers: HashMap<FilterDomain, Debouncer>,
}

impl FilterResolver {
    pub fn new(
        client: Arc<ApiClient>,
        cache: Arc<OptionCache>,
        enabled: impl IntoIterator<Item = FilterDomain>,
    ) -> Self {
        let debouncers = FilterDomain::ALL
            .into_iter()
            .map(|domain| (domain, Debouncer::new(SEARCH_DEBOUNCE)))
            .collect();
        Self {
            client,
            cache,
            enabled: enabled.into_iter().collect(),
            states: RwLock::new(HashMap::new()),
            debouncers,
        }
    }

    /// Resolver with every domain enabled.
    pub fn all(client: Arc<ApiClient>, cache: Arc<OptionCache>) -> Self {
        Self::new(client, cache, FilterDomain::ALL)
    }

    pub fn is_enabled(&self, domain: FilterDomain) -> bool {
        self.enabled.contains(&domain)
    }

    pub fn options(&self, domain: FilterDomain) -> Vec<FilterOption> {
        self.states
            .read()
            .unwrap()
            .get(&domain)
            .map(|state| state.options.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, domain: FilterDomain) -> bool {
        self.states
            .read()
            .unwrap()
            .get(&domain)
            .is_some_and(|state| state.loading)
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Fetch and map one page of options for a domain. Disabled
    /// domains are a silent no-op; failures reset the domain (roles to
    /// the built-in fallback) without touching its siblings.
    pub async fn fetch_options(
        &self,
        domain: FilterDomain,
        page: u64,
        limit: u64,
        search: &str,
    ) -> Result<(), ApiError> {
        if !self.enabled.contains(&domain) {
            return Ok(());
        }

        let endpoint = domain.endpoint();
        let key = option_key(endpoint, page, limit, search);
        if let Some(options) = self.cache.get(&key) {
            debug!(domain = ?domain, "serving options from cache");
            self.put_options(domain, options);
            return Ok(());
        }

        self.set_loading(domain, true);

        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), limit.to_string()),
        ];
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }

        match self.client.get(endpoint, &params).await {
            Ok(body) => {
                let options: Vec<FilterOption> = rows_for(domain, &body)
                    .iter()
                    .map(|row| map_row(domain, row))
                    .collect();
                self.cache.set(&key, options.clone());
                self.put_options(domain, options);
                Ok(())
            }
            Err(err) => {
                warn!(domain = ?domain, error = %err, "option fetch failed");
                let options = if domain == FilterDomain::Role {
                    fallback_roles()
                } else {
                    Vec::new()
                };
                self.put_options(domain, options);
                Err(err)
            }
        }
    }

    /// Apply a search keystroke. Non-empty terms are debounced on the
    /// trailing edge; clearing the input fetches the unfiltered first
    /// page immediately and drops any pending debounced fetch.
    pub fn search(self: &Arc<Self>, domain: FilterDomain, raw: impl Into<String>) {
        let term = raw.into().trim().to_string();
        if term.is_empty() {
            self.debouncers[&domain].cancel();
            let resolver = self.clone();
            tokio::spawn(async move {
                let _ = resolver
                    .fetch_options(domain, 1, domain.clear_limit(), "")
                    .await;
            });
        } else {
            let resolver = self.clone();
            self.debouncers[&domain].call(async move {
                let _ = resolver
                    .fetch_options(domain, 1, SEARCH_LIMIT, &term)
                    .await;
            });
        }
    }

    /// Fetch every enabled domain in parallel with its default page
    /// size. Any failure surfaces as one aggregate notice.
    pub async fn load_initial(&self) {
        let domains: Vec<FilterDomain> = self.enabled.iter().copied().collect();
        let fetches = domains
            .iter()
            .map(|&domain| self.fetch_options(domain, 1, domain.default_limit(), ""));
        let results = futures::future::join_all(fetches).await;
        if results.iter().any(Result::is_err) {
            self.client.notifier().error(OPTIONS_FAILED_NOTICE);
        }
    }

    fn put_options(&self, domain: FilterDomain, options: Vec<FilterOption>) {
        let mut states = self.states.write().unwrap();
        let state = states.entry(domain).or_default();
        state.options = options;
        state.loading = false;
    }

    fn set_loading(&self, domain: FilterDomain, loading: bool) {
        self.states
            .write()
            .unwrap()
            .entry(domain)
            .or_default()
            .loading = loading;
    }
}
