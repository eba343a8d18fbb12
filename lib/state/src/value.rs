use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased, reference-counted value held by the store.
///
/// Console state is heterogeneous (a `Session`, a route string, a theme
/// flag), so entries are stored behind `Arc<dyn Any + Send + Sync>` and
/// downcast at the point of use. Clone is an atomic increment, so views
/// and subscribers share one allocation.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Downcast to a concrete type; `None` when the stored type differs.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `StateStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;
    use opencrm_core::Session;

    #[test]
    fn downcast_matching_type() {
        let v = StateValue::new("/leads".to_string());
        assert_eq!(v.downcast_ref::<String>(), Some(&"/leads".to_string()));
    }

    #[test]
    fn downcast_wrong_type_returns_none() {
        let v = StateValue::new(true);
        assert_eq!(v.downcast_ref::<String>(), None);
        assert_eq!(v.downcast_ref::<u32>(), None);
        assert!(v.is::<bool>());
    }

    #[test]
    fn holds_domain_structs() {
        let v = StateValue::new(Session::empty());
        let session = v.downcast_ref::<Session>().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clone_shares_the_allocation() {
        let v1 = StateValue::new(vec![1u32, 2, 3]);
        let v2 = v1.clone();
        let p1 = v1.downcast_ref::<Vec<u32>>().unwrap().as_ptr();
        let p2 = v2.downcast_ref::<Vec<u32>>().unwrap().as_ptr();
        assert_eq!(p1, p2);
    }

    #[test]
    fn subscription_ids_compare_and_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(SubscriptionId(1));
        set.insert(SubscriptionId(2));
        set.insert(SubscriptionId(1));
        assert_eq!(set.len(), 2);
        assert_eq!(SubscriptionId(7), SubscriptionId(7));
    }
}
