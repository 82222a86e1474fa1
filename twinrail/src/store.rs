//! The external value store boundary.
//!
//! The store owns the persisted range. The controller only keeps a working
//! copy and talks to the store through [`ValueStore`]. Values are dynamic
//! JSON because the bound field is not guaranteed to hold a well-formed pair.
//!
//! [`MemoryStore`] is an in-process implementation with path-keyed
//! subscriptions, suitable for hosts without their own data model and for
//! tests.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use tracing::trace;

new_key_type! {
    /// Token identifying one store subscription.
    pub struct SubscriptionId;
}

/// Change listener, invoked with the path that changed.
pub type StoreListener = Arc<dyn Fn(&str) + Send + Sync>;

/// A data store holding values under string paths and notifying
/// subscribers synchronously on change.
pub trait ValueStore: Send + Sync {
    /// Reads the value at `path`, `None` when nothing is stored there.
    fn read(&self, path: &str) -> Option<Value>;

    /// Stores `value` at `path` and notifies every subscriber of `path`
    /// except `suppress`.
    ///
    /// Listeners must be invoked after the store has released any internal
    /// lock, and before this call returns.
    fn write(&self, path: &str, value: Value, suppress: Option<SubscriptionId>);

    /// Registers `listener` for changes at `path`.
    fn subscribe(&self, path: &str, listener: StoreListener) -> SubscriptionId;

    /// Removes a subscription. Returns `false` if it was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

struct Subscription {
    path: String,
    listener: StoreListener,
}

/// In-memory [`ValueStore`].
///
/// Writing a value equal to the one already stored is a no-op and notifies
/// nobody.
///
/// ```
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
///
/// use serde_json::json;
/// use twinrail::{MemoryStore, ValueStore};
///
/// let store = MemoryStore::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&hits);
/// store.subscribe("range", Arc::new(move |_: &str| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// store.set("range", json!([0.2, 0.4]));
/// store.set("range", json!([0.2, 0.4]));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, Value>>,
    subscriptions: RwLock<SlotMap<SubscriptionId, Subscription>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes without suppressing anyone, as an external actor would.
    pub fn set(&self, path: &str, value: Value) {
        self.write(path, value, None);
    }

    /// Deletes the value at `path`, notifying its subscribers if something
    /// was removed.
    pub fn remove(&self, path: &str) -> Option<Value> {
        let removed = self.values.write().remove(path);
        if removed.is_some() {
            self.notify(path, None);
        }
        removed
    }

    /// Number of live subscriptions across all paths.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    fn notify(&self, path: &str, suppress: Option<SubscriptionId>) {
        let listeners: SmallVec<[StoreListener; 4]> = self
            .subscriptions
            .read()
            .iter()
            .filter(|(id, sub)| sub.path == path && Some(*id) != suppress)
            .map(|(_, sub)| Arc::clone(&sub.listener))
            .collect();

        trace!(
            path,
            listeners = listeners.len(),
            suppressed = suppress.is_some(),
            "notifying store listeners"
        );
        for listener in listeners {
            listener(path);
        }
    }
}

impl ValueStore for MemoryStore {
    fn read(&self, path: &str) -> Option<Value> {
        self.values.read().get(path).cloned()
    }

    fn write(&self, path: &str, value: Value, suppress: Option<SubscriptionId>) {
        {
            let mut values = self.values.write();
            if values.get(path) == Some(&value) {
                return;
            }
            values.insert(path.to_owned(), value);
        }
        self.notify(path, suppress);
    }

    fn subscribe(&self, path: &str, listener: StoreListener) -> SubscriptionId {
        self.subscriptions.write().insert(Subscription {
            path: path.to_owned(),
            listener,
        })
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.write().remove(id).is_some()
    }
}
