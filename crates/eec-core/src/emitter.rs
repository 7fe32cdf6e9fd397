//! Single-key emitter.
//!
//! The [`Emitter`] trait is the seam between the dispatcher and whatever
//! delivers events for a single key. [`KeyedEmitter`] is the in-memory
//! implementation every dispatcher uses unless told otherwise.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::callback::Callback;
use crate::key::DispatchKey;

/// Single-key publish/subscribe primitive.
///
/// Implementations deliver synchronously, in subscription order.
pub trait Emitter<A> {
    /// Subscribe a callback under a key. Duplicates are kept.
    fn subscribe(&self, key: &DispatchKey, callback: Callback<A>);

    /// Remove subscriptions and return how many were removed.
    ///
    /// - key and callback: every subscription of that callback under the key.
    /// - key only: every subscription under the key.
    /// - no key: every subscription on the emitter.
    fn unsubscribe(&self, key: Option<&DispatchKey>, callback: Option<&Callback<A>>) -> usize;

    /// Check for at least one matching subscription.
    ///
    /// A missing callback matches any callback; a missing key matches any key.
    fn has_subscriber(&self, key: Option<&DispatchKey>, callback: Option<&Callback<A>>) -> bool;

    /// Invoke every current subscriber of `key` with `args`.
    ///
    /// Returns the number of callbacks invoked. Publishing without a key
    /// reaches nobody.
    fn publish(&self, key: Option<&DispatchKey>, args: &A) -> usize;

    /// Total number of live subscriptions.
    fn subscriber_count(&self) -> usize;
}

/// In-memory emitter keyed by [`DispatchKey`].
///
/// Publishing snapshots the subscriber list before invoking anything and
/// holds no lock while callbacks run, so callbacks may subscribe or
/// unsubscribe on the same emitter. Such changes apply from the next publish.
pub struct KeyedEmitter<A> {
    listeners: Mutex<HashMap<DispatchKey, Vec<Callback<A>>>>,
}

impl<A> KeyedEmitter<A> {
    /// Create an empty emitter.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct keys with at least one subscriber.
    pub fn key_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<A> Default for KeyedEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for KeyedEmitter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("KeyedEmitter")
            .field("keys", &listeners.len())
            .field("subscribers", &listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl<A> Emitter<A> for KeyedEmitter<A> {
    fn subscribe(&self, key: &DispatchKey, callback: Callback<A>) {
        self.listeners
            .lock()
            .entry(key.clone())
            .or_default()
            .push(callback);
    }

    fn unsubscribe(&self, key: Option<&DispatchKey>, callback: Option<&Callback<A>>) -> usize {
        let mut listeners = self.listeners.lock();

        let Some(key) = key else {
            let removed = listeners.values().map(Vec::len).sum();
            listeners.clear();
            return removed;
        };

        let Some(list) = listeners.get_mut(key) else {
            return 0;
        };

        let before = list.len();
        match callback {
            Some(cb) => list.retain(|existing| existing != cb),
            None => list.clear(),
        }
        let removed = before - list.len();

        if list.is_empty() {
            listeners.remove(key);
        }

        removed
    }

    fn has_subscriber(&self, key: Option<&DispatchKey>, callback: Option<&Callback<A>>) -> bool {
        let listeners = self.listeners.lock();
        let matches = |list: &Vec<Callback<A>>| match callback {
            Some(cb) => list.contains(cb),
            None => !list.is_empty(),
        };

        match key {
            Some(key) => listeners.get(key).is_some_and(matches),
            None => listeners.values().any(matches),
        }
    }

    fn publish(&self, key: Option<&DispatchKey>, args: &A) -> usize {
        let Some(key) = key else {
            return 0;
        };

        let snapshot = match self.listeners.lock().get(key) {
            Some(list) => list.clone(),
            None => return 0,
        };

        for callback in &snapshot {
            callback.call(args);
        }

        snapshot.len()
    }

    fn subscriber_count(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, Callback<()>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        let cb = Callback::new(move |_: &()| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        (hits, cb)
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let emitter = KeyedEmitter::<()>::new();
        let key = DispatchKey::new("c", "e");
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            emitter.subscribe(&key, Callback::new(move |_| order.lock().push(tag)));
        }

        assert_eq!(emitter.publish(Some(&key), &()), 3);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_publish_without_key_is_noop() {
        let emitter = KeyedEmitter::<()>::new();
        let (hits, cb) = counter();
        emitter.subscribe(&DispatchKey::new("c", "e"), cb);

        assert_eq!(emitter.publish(None, &()), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_removes_all_duplicates_of_callback() {
        let emitter = KeyedEmitter::<()>::new();
        let key = DispatchKey::new("c", "e");
        let (hits, cb) = counter();
        let (_, other) = counter();

        emitter.subscribe(&key, cb.clone());
        emitter.subscribe(&key, cb.clone());
        emitter.subscribe(&key, other.clone());

        assert_eq!(emitter.unsubscribe(Some(&key), Some(&cb)), 2);
        assert!(!emitter.has_subscriber(Some(&key), Some(&cb)));
        assert!(emitter.has_subscriber(Some(&key), Some(&other)));

        emitter.publish(Some(&key), &());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_key_and_all() {
        let emitter = KeyedEmitter::<()>::new();
        let k1 = DispatchKey::new("c", "e1");
        let k2 = DispatchKey::new("c", "e2");
        let (_, cb) = counter();

        emitter.subscribe(&k1, cb.clone());
        emitter.subscribe(&k1, cb.clone());
        emitter.subscribe(&k2, cb.clone());
        assert_eq!(emitter.key_count(), 2);

        assert_eq!(emitter.unsubscribe(Some(&k1), None), 2);
        assert_eq!(emitter.key_count(), 1);
        assert_eq!(emitter.unsubscribe(Some(&k1), None), 0);

        assert_eq!(emitter.unsubscribe(None, None), 1);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn test_has_subscriber_without_key() {
        let emitter = KeyedEmitter::<()>::new();
        let (_, cb) = counter();
        let (_, other) = counter();
        assert!(!emitter.has_subscriber(None, None));

        emitter.subscribe(&DispatchKey::new("c", "e"), cb.clone());
        assert!(emitter.has_subscriber(None, None));
        assert!(emitter.has_subscriber(None, Some(&cb)));
        assert!(!emitter.has_subscriber(None, Some(&other)));
    }

    #[test]
    fn test_callback_may_mutate_during_publish() {
        let emitter = Arc::new(KeyedEmitter::<()>::new());
        let key = DispatchKey::new("c", "e");
        let (late_hits, late) = counter();

        let inner = Arc::clone(&emitter);
        let inner_key = key.clone();
        emitter.subscribe(
            &key,
            Callback::new(move |_| inner.subscribe(&inner_key, late.clone())),
        );

        // The callback added during the first publish is not part of its snapshot.
        assert_eq!(emitter.publish(Some(&key), &()), 1);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);

        assert_eq!(emitter.publish(Some(&key), &()), 2);
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }
}
