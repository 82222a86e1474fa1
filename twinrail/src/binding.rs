//! Two-way synchronization between the working value and the bound store
//! field.
//!
//! Every write the controller makes goes through [`BindingSynchronizer::push`],
//! which passes the controller's own subscription as the suppressed listener
//! and raises the suppression flag for the duration of the call. Other
//! subscribers of the path still see the write immediately.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::{
    convert::RangeValue,
    store::{StoreListener, SubscriptionId, ValueStore},
};

/// Raises a suppression flag until dropped, restoring the previous state.
pub(crate) struct SuppressionGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl<'a> SuppressionGuard<'a> {
    pub(crate) fn engage(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::AcqRel);
        Self { flag, previous }
    }
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::Release);
    }
}

/// Interprets whatever is stored in the bound field.
///
/// - an array whose first two entries are numbers is reordered and clamped,
/// - a missing or `null` field resets to [`RangeValue::ZERO`],
/// - any other shape keeps `current`.
pub fn normalize_bound_value(raw: Option<&Value>, current: RangeValue) -> RangeValue {
    match raw {
        None | Some(Value::Null) => RangeValue::ZERO,
        Some(Value::Array(items)) => {
            match (
                items.first().and_then(Value::as_f64),
                items.get(1).and_then(Value::as_f64),
            ) {
                (Some(a), Some(b)) => RangeValue::ordered(a, b),
                _ => current,
            }
        }
        Some(_) => current,
    }
}

/// JSON shape written back to the store.
pub fn to_bound_value(value: RangeValue) -> Value {
    json!([value.low, value.high])
}

/// Keeps one store path and a working copy consistent.
pub struct BindingSynchronizer {
    store: Arc<dyn ValueStore>,
    path: String,
    subscription: Mutex<Option<SubscriptionId>>,
    suppressed: Arc<AtomicBool>,
}

impl BindingSynchronizer {
    /// Creates a synchronizer for `path`. Nothing is subscribed until
    /// [`attach`](Self::attach).
    pub fn new(store: Arc<dyn ValueStore>, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
            subscription: Mutex::new(None),
            suppressed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The bound path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shared handle on the suppression flag, for listeners that must check
    /// it without going through the synchronizer.
    pub fn suppression_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.suppressed)
    }

    /// Whether a self-initiated write is in progress.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// Subscribes `listener` to the bound path, replacing any previous
    /// subscription.
    pub fn attach(&self, listener: StoreListener) {
        let id = self.store.subscribe(&self.path, listener);
        let previous = self.subscription.lock().replace(id);
        if let Some(previous) = previous {
            self.store.unsubscribe(previous);
        }
    }

    /// Drops the subscription. Returns `false` when already detached.
    pub fn detach(&self) -> bool {
        let taken = self.subscription.lock().take();
        match taken {
            Some(id) => {
                self.store.unsubscribe(id);
                true
            }
            None => false,
        }
    }

    /// Whether a subscription is currently held.
    pub fn is_attached(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Reads and normalizes the stored value, then writes the normalized
    /// form back so that store and working copy agree exactly.
    pub fn pull(&self, current: RangeValue) -> RangeValue {
        let raw = self.store.read(&self.path);
        let value = normalize_bound_value(raw.as_ref(), current);
        trace!(path = %self.path, ?raw, ?value, "pulled bound value");
        self.push(value);
        value
    }

    /// Writes `value` to the store as a self-initiated change.
    pub fn push(&self, value: RangeValue) {
        let subscription = *self.subscription.lock();
        let _guard = SuppressionGuard::engage(&self.suppressed);
        debug!(path = %self.path, low = value.low, high = value.high, "writing bound value");
        self.store
            .write(&self.path, to_bound_value(value), subscription);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Weak, atomic::AtomicUsize};

    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn synchronizer(store: &Arc<MemoryStore>) -> BindingSynchronizer {
        let store: Arc<dyn ValueStore> = store.clone();
        BindingSynchronizer::new(store, "range")
    }

    #[test]
    fn normalizes_reversed_pair() {
        let value = normalize_bound_value(Some(&json!([0.7, 0.3])), RangeValue::FULL);
        assert_eq!(value, RangeValue::new(0.3, 0.7));
    }

    #[test]
    fn clamps_out_of_range_components() {
        let value = normalize_bound_value(Some(&json!([1.5, -0.5])), RangeValue::ZERO);
        assert_eq!(value, RangeValue::FULL);
    }

    #[test]
    fn missing_value_defaults_to_zero() {
        let current = RangeValue::new(0.2, 0.4);
        assert_eq!(normalize_bound_value(None, current), RangeValue::ZERO);
        assert_eq!(
            normalize_bound_value(Some(&Value::Null), current),
            RangeValue::ZERO
        );
    }

    #[test]
    fn malformed_value_keeps_working_copy() {
        let current = RangeValue::new(0.2, 0.4);
        for raw in [json!("wide"), json!({"low": 0.1}), json!([0.5]), json!(["a", 1])] {
            assert_eq!(normalize_bound_value(Some(&raw), current), current);
        }
    }

    #[test]
    fn extra_array_entries_are_ignored() {
        let value = normalize_bound_value(Some(&json!([0.1, 0.6, 0.9])), RangeValue::ZERO);
        assert_eq!(value, RangeValue::new(0.1, 0.6));
    }

    #[test]
    fn pull_rewrites_store_with_normalized_pair() {
        let store = Arc::new(MemoryStore::new());
        store.set("range", json!([0.7, 0.3]));
        let sync = synchronizer(&store);

        let value = sync.pull(RangeValue::ZERO);

        assert_eq!(value, RangeValue::new(0.3, 0.7));
        assert_eq!(store.read("range"), Some(json!([0.3, 0.7])));
    }

    #[test]
    fn push_skips_own_listener_and_clears_flag() {
        let store = Arc::new(MemoryStore::new());
        let sync = synchronizer(&store);
        let flag = sync.suppression_flag();
        let own_hits = Arc::new(AtomicUsize::new(0));
        let seen_suppressed = Arc::new(AtomicBool::new(false));

        let counter = Arc::clone(&own_hits);
        sync.attach(Arc::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let observed = Arc::clone(&seen_suppressed);
        store.subscribe(
            "range",
            Arc::new(move |_: &str| {
                observed.store(flag.load(Ordering::SeqCst), Ordering::SeqCst);
            }),
        );

        sync.push(RangeValue::new(0.25, 0.5));

        assert_eq!(own_hits.load(Ordering::SeqCst), 0);
        assert!(seen_suppressed.load(Ordering::SeqCst));
        assert!(!sync.is_suppressed());
        assert_eq!(store.read("range"), Some(json!([0.25, 0.5])));
    }

    #[test]
    fn detach_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let sync = synchronizer(&store);
        sync.attach(Arc::new(|_: &str| {}));
        sync.attach(Arc::new(|_: &str| {}));
        assert_eq!(store.subscription_count(), 1);
        assert!(sync.detach());
        assert!(!sync.detach());
        assert!(!sync.is_attached());
        assert_eq!(store.subscription_count(), 0);
    }

    /// Store whose `unsubscribe` queries the synchronizer that owns the
    /// subscription.
    #[derive(Default)]
    struct ReentrantStore {
        inner: MemoryStore,
        owner: Mutex<Weak<BindingSynchronizer>>,
        attached_on_unsubscribe: Mutex<Vec<bool>>,
    }

    impl ValueStore for ReentrantStore {
        fn read(&self, path: &str) -> Option<Value> {
            self.inner.read(path)
        }

        fn write(&self, path: &str, value: Value, suppress: Option<SubscriptionId>) {
            self.inner.write(path, value, suppress);
        }

        fn subscribe(&self, path: &str, listener: StoreListener) -> SubscriptionId {
            self.inner.subscribe(path, listener)
        }

        fn unsubscribe(&self, id: SubscriptionId) -> bool {
            let owner = self.owner.lock().upgrade();
            if let Some(owner) = owner {
                self.attached_on_unsubscribe.lock().push(owner.is_attached());
            }
            self.inner.unsubscribe(id)
        }
    }

    #[test]
    fn store_may_call_back_while_unsubscribing() {
        let store = Arc::new(ReentrantStore::default());
        let sync = Arc::new(BindingSynchronizer::new(store.clone(), "range"));
        *store.owner.lock() = Arc::downgrade(&sync);

        sync.attach(Arc::new(|_: &str| {}));
        sync.attach(Arc::new(|_: &str| {}));
        assert!(sync.detach());

        assert_eq!(*store.attached_on_unsubscribe.lock(), vec![true, false]);
        assert_eq!(store.inner.subscription_count(), 0);
    }

    #[test]
    fn guard_restores_previous_state() {
        let flag = AtomicBool::new(false);
        {
            let _outer = SuppressionGuard::engage(&flag);
            {
                let _inner = SuppressionGuard::engage(&flag);
                assert!(flag.load(Ordering::SeqCst));
            }
            assert!(flag.load(Ordering::SeqCst));
        }
        assert!(!flag.load(Ordering::SeqCst));
    }
}
