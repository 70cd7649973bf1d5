//! Observer registry used to push simulator updates to listeners.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Listener callback. Receives a borrowed value; clone it to keep it.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identifies one registration within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Slots<T> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

/// Set of listeners for values of type `T`.
///
/// Cloning yields another handle to the same set.
pub struct ObserverRegistry<T> {
    slots: Arc<Mutex<Slots<T>>>,
}

impl<T: 'static> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Adds a listener. It stays registered until the returned handle is
    /// unsubscribed or dropped.
    pub fn register(&self, listener: Listener<T>) -> Subscription {
        let id = {
            let mut slots = self.slots.lock();
            let id = SubscriptionId(slots.next_id);
            slots.next_id += 1;
            slots.listeners.push((id, listener));
            id
        };
        let weak: Weak<Mutex<Slots<T>>> = Arc::downgrade(&self.slots);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.lock().listeners.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Delivers `value` to every listener registered when the call began.
    ///
    /// The set is copied before iterating, so listeners may subscribe or
    /// unsubscribe from inside the callback.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .slots
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObserverRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<T> fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("listeners", &self.slots.lock().listeners.len())
            .finish()
    }
}

/// Handle for one registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
