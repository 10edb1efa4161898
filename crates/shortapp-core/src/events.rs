// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener registry with disposable subscription tokens.
//
// Native event emitters and the web message channel both fan a value out to
// every registered callback. Callbacks fire in registration order. A
// `Subscription` removes its callback when dropped.

use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T: 'static> Detach for Mutex<Registry<T>> {
    fn detach(&self, id: u64) {
        let mut registry = self.lock().unwrap_or_else(PoisonError::into_inner);
        registry.entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

/// A set of callbacks for one event channel.
pub struct Listeners<T> {
    inner: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Listeners<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// subscription is dropped or unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };
        let owner: Arc<dyn Detach> = self.inner.clone();
        Subscription {
            id,
            owner: Some(Arc::downgrade(&owner)),
        }
    }

    /// Deliver `value` to every registered callback and return how many ran.
    ///
    /// The callback list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn emit(&self, value: &T) -> usize {
        let snapshot: Vec<Callback<T>> = {
            let registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in &snapshot {
            callback(value);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposable handle for a registered listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    owner: Option<Weak<dyn Detach>>,
}

impl Subscription {
    /// A subscription that was never attached to anything. Returned when the
    /// event source does not exist on this platform.
    pub fn noop() -> Self {
        Self { id: 0, owner: None }
    }

    pub fn is_noop(&self) -> bool {
        self.owner.is_none()
    }

    /// Remove the listener now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.take().and_then(|weak| weak.upgrade()) {
            owner.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("noop", &self.is_noop())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_reaches_all_listeners_in_order() {
        let listeners = Listeners::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            listeners.subscribe(move |v| seen.lock().unwrap().push(("a", *v)))
        };
        let b = {
            let seen = seen.clone();
            listeners.subscribe(move |v| seen.lock().unwrap().push(("b", *v)))
        };

        assert_eq!(listeners.emit(&7), 2);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let listeners = Listeners::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let sub = {
            let count = count.clone();
            listeners.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        listeners.emit(&());
        sub.unsubscribe();
        listeners.emit(&());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let sub = {
            let listeners = Listeners::<u8>::new();
            listeners.subscribe(|_| {})
        };
        drop(sub);
    }

    #[test]
    fn callback_may_unsubscribe_others_during_emit() {
        let listeners = Listeners::<()>::new();
        let victim = Arc::new(Mutex::new(Some(listeners.subscribe(|_| {}))));
        let _killer = {
            let victim = victim.clone();
            listeners.subscribe(move |_| {
                victim.lock().unwrap().take();
            })
        };
        listeners.emit(&());
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn noop_subscription() {
        let sub = Subscription::noop();
        assert!(sub.is_noop());
    }
}
