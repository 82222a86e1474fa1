//! Shareable callback handle for controller notifications.
//!
//! Callbacks are stored behind an `Arc` and compare by identity, so args
//! structs holding them can still derive `PartialEq` and be cheaply cloned
//! into the controller.

use std::sync::Arc;

/// Callback handle for `Fn(T)`.
///
/// Used for the committed-change and display notifications, which carry the
/// value or display snapshot that triggered them.
pub struct CallbackWith<T> {
    handler: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> CallbackWith<T> {
    /// Create a callback from a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invoke the callback with an argument.
    pub fn call(&self, value: T) {
        (self.handler)(value);
    }
}

impl<T, F> From<F> for CallbackWith<T>
where
    F: Fn(T) + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl<T> Clone for CallbackWith<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> PartialEq for CallbackWith<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }
}

impl<T> Eq for CallbackWith<T> {}

impl<T> std::fmt::Debug for CallbackWith<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackWith").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn callbacks_compare_by_identity() {
        let a = CallbackWith::new(|_: u8| {});
        let b = a.clone();
        let c = CallbackWith::new(|_: u8| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn callback_with_forwards_argument() {
        let total = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&total);
        let cb = CallbackWith::new(move |n: usize| {
            sink.fetch_add(n, Ordering::SeqCst);
        });
        cb.call(3);
        cb.clone().call(4);
        assert_eq!(total.load(Ordering::SeqCst), 7);
    }
}
