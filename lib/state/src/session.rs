use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use opencrm_core::{Session, SessionUser, check_permission};

use crate::storage::{SessionStorage, StorageError};
use crate::store::StateStore;

/// Store path holding the current `Session`.
pub const SESSION_PATH: &str = "auth/session";
/// Store path holding the current route as a `String`.
pub const ROUTE_PATH: &str = "app/route";
/// Store path holding the dark-theme flag as a `bool`.
pub const THEME_PATH: &str = "app/theme";

/// Route every teardown lands on.
pub const LOGIN_ROUTE: &str = "/login";

type TeardownHook = Arc<dyn Fn() + Send + Sync>;

/// Owns the session lifecycle: restore at startup, publish on login,
/// tear down on logout or credential failure.
///
/// All session reads go through the [`StateStore`] at [`SESSION_PATH`],
/// so subscribers observe every transition. Teardown hooks let other
/// layers (caches, mostly) register cleanup without this crate knowing
/// about them.
pub struct SessionService {
    store: Arc<StateStore>,
    storage: Arc<dyn SessionStorage>,
    teardown_hooks: RwLock<Vec<TeardownHook>>,
}

impl SessionService {
    pub fn new(store: Arc<StateStore>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            store,
            storage,
            teardown_hooks: RwLock::new(Vec::new()),
        }
    }

    /// Restore the persisted session and seed the store with it, the
    /// root route and the host-chosen theme.
    pub fn initialize(&self, dark_theme: bool) -> Result<Session, StorageError> {
        let session = self.storage.load()?;
        if session.is_authenticated() {
            debug!(user = ?session.user.as_ref().map(|u| u.id), "session restored");
        }
        self.store.set(SESSION_PATH, session.clone());
        self.store.set(ROUTE_PATH, "/".to_string());
        self.store.set(THEME_PATH, dark_theme);
        Ok(session)
    }

    /// Publish a fresh login and persist it. Persistence is best
    /// effort; the in-memory session wins even when the disk write
    /// fails.
    pub fn login(&self, user: SessionUser, token: impl Into<String>) -> Session {
        let session = Session::new(user, token);
        if let Err(err) = self.storage.save(&session) {
            warn!("failed to persist session: {err}");
        }
        self.store.set(SESSION_PATH, session.clone());
        info!("session established");
        session
    }

    /// Replace the user half of the session (profile refresh) while
    /// keeping the token.
    pub fn update_user(&self, user: SessionUser) -> Session {
        let mut session = self.current();
        session.user = Some(user);
        if let Err(err) = self.storage.save(&session) {
            warn!("failed to persist session: {err}");
        }
        self.store.set(SESSION_PATH, session.clone());
        session
    }

    /// Snapshot of the current session; empty when nothing is stored.
    pub fn current(&self) -> Session {
        self.store
            .read::<Session, _>(SESSION_PATH, |s| s.clone())
            .unwrap_or_else(Session::empty)
    }

    pub fn token(&self) -> Option<String> {
        self.current().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_authenticated()
    }

    /// Permission check against the current session.
    pub fn can<S: AsRef<str>>(&self, required: &[S]) -> bool {
        let session = self.current();
        check_permission(session.user.as_ref(), required)
    }

    pub fn route(&self) -> String {
        self.store
            .read::<String, _>(ROUTE_PATH, |r| r.clone())
            .unwrap_or_else(|| "/".to_string())
    }

    pub fn set_route(&self, route: impl Into<String>) {
        self.store.set(ROUTE_PATH, route.into());
    }

    pub fn dark_theme(&self) -> bool {
        self.store
            .read::<bool, _>(THEME_PATH, |d| *d)
            .unwrap_or(false)
    }

    pub fn set_dark_theme(&self, dark: bool) {
        self.store.set(THEME_PATH, dark);
    }

    /// Register cleanup to run on teardown (cache invalidation, etc).
    pub fn on_teardown(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.teardown_hooks.write().unwrap().push(Arc::new(hook));
    }

    /// Drop the session everywhere: persisted file, store, registered
    /// hooks, and finally route to the login screen.
    ///
    /// No-op returning false when no token is held, so a burst of
    /// failed requests tears down at most once.
    pub fn teardown(&self) -> bool {
        if self.token().is_none() {
            debug!("teardown skipped, no session");
            return false;
        }
        if let Err(err) = self.storage.clear() {
            warn!("failed to clear persisted session: {err}");
        }
        self.store.set(SESSION_PATH, Session::empty());
        let hooks: Vec<TeardownHook> = self.teardown_hooks.read().unwrap().clone();
        for hook in hooks {
            hook();
        }
        self.store.set(ROUTE_PATH, LOGIN_ROUTE.to_string());
        info!("session torn down");
        true
    }
}
