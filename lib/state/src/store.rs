use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::trie::PatternTrie;
use crate::value::{StateValue, SubscriptionId};

/// Callback invoked when a matching path changes.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Observable per-path state shared by every view of the console.
///
/// Holds the session, the current route, the theme flag and whatever
/// else views agree to share, keyed by `/`-separated paths. `set`
/// stores a value and synchronously notifies every subscriber whose
/// pattern matches the path, so a sidebar subscribed to `auth/session`
/// re-renders the moment a login or teardown lands.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: PatternTrie<HandlerEntry>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: PatternTrie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store a value at `path` and notify matching subscribers.
    ///
    /// Handlers run synchronously on the caller, after the write lock
    /// is released, so a handler may read the store.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        let value = StateValue::new(value);
        {
            let mut values = self.values.write().unwrap();
            values.insert(path.to_string(), value.clone());
        }
        for entry in self.handlers.matches(path) {
            (entry.handler)(path, &value);
        }
    }

    /// Current value at `path`, if any. Cheap Arc clone.
    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values.read().unwrap().get(path).cloned()
    }

    /// Typed read: downcast the value at `path` and map it through `f`.
    pub fn read<T: Any, R>(&self, path: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let value = self.get(path)?;
        value.downcast_ref::<T>().map(f)
    }

    /// Drop the value at `path` without notifying. Returns the old value.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values.write().unwrap().remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.read().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored value. Subscriptions stay registered.
    pub fn clear(&self) {
        self.values.write().unwrap().clear();
    }

    /// Register a handler for every `set` on a path matching `pattern`
    /// (exact, `+` for one segment, `#` for the rest).
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.add(
            pattern,
            HandlerEntry {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove_where(pattern, |entry| entry.id == id);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
