//! Listener registries for lifecycle signals.
//!
//! Signals invoke their listeners synchronously, in registration order, on
//! the context of the emitting operation. Cloning a [`Signal`] yields a
//! handle to the same underlying registry, so a signal can be shared between
//! a manager and the closures it installs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identifies one listener registration on a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
}

/// An explicit registry of listener callbacks for one event kind.
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T> {
    /// Creates a signal with no listeners.
    pub fn new() -> Self {
        Signal {
            inner: Arc::new(SignalInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers a listener and returns its subscription id.
    ///
    /// Listeners are invoked in registration order.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut listeners = self.inner.listeners.lock().unwrap();
        listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener registration.
    ///
    /// Returns `true` if the subscription was present. Removing an already
    /// removed subscription is a harmless no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Invokes every listener with `value`, in registration order.
    ///
    /// The listener list is snapshotted before invocation, so a listener may
    /// subscribe or unsubscribe reentrantly; such changes take effect from
    /// the next emission.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = {
            let listeners = self.inner.listeners.lock().unwrap();
            listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect()
        };
        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap().len()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
