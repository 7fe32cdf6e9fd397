//! Channeled dispatcher.
//!
//! Maps (channel, event) registrations onto a single-key [`Emitter`] and keeps
//! a [`SubscriptionRegistry`] next to it so registrations can be removed per
//! channel. Every registry change is made together with the matching emitter
//! change while the registry lock is held, so the two never disagree.

use std::fmt;

use parking_lot::Mutex;

use crate::callback::Callback;
use crate::config::DispatcherConfig;
use crate::emitter::{Emitter, KeyedEmitter};
use crate::error::{Error, Result};
use crate::key::{compose_key, describe, DispatchKey};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::{SubscriptionRecord, SubscriptionRegistry};

/// Two-dimensional event dispatcher.
///
/// Each instance owns its registry and emitter; nothing is shared between
/// instances. `A` is the argument type handed to callbacks on publish.
pub struct Dispatcher<A, E = KeyedEmitter<A>> {
    config: DispatcherConfig,
    registry: Mutex<SubscriptionRegistry<A>>,
    emitter: E,
    metrics: DispatchMetrics,
}

impl<A> Dispatcher<A> {
    /// Create a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher with the given configuration.
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self::with_emitter(KeyedEmitter::new(), config)
    }
}

impl<A> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, E: Emitter<A>> Dispatcher<A, E> {
    /// Create a dispatcher on top of a custom emitter.
    ///
    /// The emitter should start empty; subscriptions it already holds are
    /// invisible to channel-wide removal.
    pub fn with_emitter(emitter: E, config: DispatcherConfig) -> Self {
        Self {
            registry: Mutex::new(SubscriptionRegistry::with_capacity(
                config.initial_channel_capacity,
            )),
            config,
            emitter,
            metrics: DispatchMetrics::new(),
        }
    }

    /// Register `callback` for `event` on `channel`.
    ///
    /// Registrations are not deduplicated: registering the same triple twice
    /// delivers twice per publish. Names are not validated; see
    /// [`try_on`](Self::try_on).
    pub fn on(&self, channel: &str, event: &str, callback: &Callback<A>) {
        let key = DispatchKey::new(channel, event);

        let mut registry = self.registry.lock();
        registry.insert(SubscriptionRecord::new(channel, key.clone(), callback.clone()));
        self.emitter.subscribe(&key, callback.clone());
        drop(registry);

        self.metrics.record_registration();
        tracing::debug!(channel, event, callback = callback.id(), "subscription created");
    }

    /// Register like [`on`](Self::on), rejecting empty or oversized names.
    pub fn try_on(&self, channel: &str, event: &str, callback: &Callback<A>) -> Result<()> {
        if let Err(err) = self.validate_names(channel, event) {
            tracing::warn!(channel, event, error = %err, "registration rejected");
            return Err(err);
        }

        self.on(channel, event, callback);
        Ok(())
    }

    /// Remove registrations.
    ///
    /// - no channel: everything on this dispatcher;
    /// - channel only: every registration on that channel;
    /// - channel and event: registrations under that pair, limited to
    ///   `callback` when one is given.
    ///
    /// Arguments that match nothing are a no-op.
    pub fn off(&self, channel: Option<&str>, event: Option<&str>, callback: Option<&Callback<A>>) {
        let mut registry = self.registry.lock();

        let Some(channel) = channel else {
            let removed = registry.clear();
            self.emitter.unsubscribe(None, None);
            drop(registry);

            self.metrics.record_removals(removed);
            tracing::debug!(removed, "all subscriptions removed");
            return;
        };

        if event.is_none() && callback.is_none() {
            let removed = registry.remove_channel(channel);
            for record in &removed {
                self.emitter
                    .unsubscribe(Some(record.dispatch_key()), Some(record.callback()));
            }
            drop(registry);

            self.metrics.record_removals(removed.len());
            tracing::debug!(channel, removed = removed.len(), "channel subscriptions removed");
            return;
        }

        let Some(key) = compose_key(Some(channel), event) else {
            return;
        };

        let removed = registry.remove_matching(channel, &key, callback);
        self.emitter.unsubscribe(Some(&key), callback);
        drop(registry);

        self.metrics.record_removals(removed.len());
        tracing::debug!(
            key = %key,
            callback = callback.map(Callback::id),
            removed = removed.len(),
            "subscription removed"
        );
    }

    /// Check whether anything is registered for (channel, event), optionally
    /// limited to one callback.
    ///
    /// A channel without an event never matches: registrations always carry
    /// both.
    pub fn has(
        &self,
        channel: Option<&str>,
        event: Option<&str>,
        callback: Option<&Callback<A>>,
    ) -> bool {
        let key = compose_key(channel, event);
        self.emitter.has_subscriber(key.as_ref(), callback)
    }

    /// Deliver `args` to every callback registered for (channel, event).
    ///
    /// Callbacks run synchronously, in registration order, before this
    /// returns. Returns the number of callbacks invoked; a missing event
    /// always reaches nobody.
    pub fn emit(&self, channel: Option<&str>, event: Option<&str>, args: &A) -> usize {
        let key = compose_key(channel, event);
        let delivered = self.emitter.publish(key.as_ref(), args);

        self.metrics.record_publish(delivered);
        tracing::trace!(key = %describe(key.as_ref()), delivered, "event published");

        delivered
    }

    /// Total number of live registrations.
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// Check if there are no live registrations.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Names of channels with live registrations, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.registry.lock().channels()
    }

    /// Number of live registrations on a channel.
    pub fn channel_len(&self, channel: &str) -> usize {
        self.registry.lock().channel_len(channel)
    }

    /// Snapshot of a channel's registrations, in registration order.
    pub fn subscriptions(&self, channel: &str) -> Vec<SubscriptionRecord<A>> {
        self.registry.lock().records(channel).to_vec()
    }

    /// Current counter values.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Underlying emitter.
    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    fn validate_names(&self, channel: &str, event: &str) -> Result<()> {
        if channel.is_empty() {
            return Err(Error::EmptyChannel);
        }
        if event.is_empty() {
            return Err(Error::EmptyEvent);
        }

        if let Some(max) = self.config.max_name_len {
            for (field, name) in [("channel", channel), ("event", event)] {
                if name.len() > max {
                    return Err(Error::NameTooLong {
                        field,
                        len: name.len(),
                        max,
                    });
                }
            }
        }

        Ok(())
    }
}

impl<A, E> fmt::Debug for Dispatcher<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("registry", &*self.registry.lock())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
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

    /// Registry and emitter must hold the same number of subscriptions.
    fn assert_in_step(dispatcher: &Dispatcher<()>) {
        assert_eq!(dispatcher.len(), dispatcher.emitter().subscriber_count());
    }

    #[test]
    fn test_on_records_and_subscribes() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();

        dispatcher.on("channel", "event", &cb);

        assert_eq!(dispatcher.len(), 1);
        assert_eq!(dispatcher.channels(), vec!["channel".to_string()]);
        let records = dispatcher.subscriptions("channel");
        assert_eq!(records[0].event(), Some("event"));
        assert_eq!(records[0].callback(), &cb);
        assert_in_step(&dispatcher);
    }

    #[test]
    fn test_has_on_fresh_instance() {
        let dispatcher = Dispatcher::<()>::new();
        assert!(!dispatcher.has(Some("channel"), Some("event"), None));
        assert!(!dispatcher.has(Some("channel"), None, None));
        assert!(!dispatcher.has(None, None, None));
    }

    #[test]
    fn test_has_without_channel_or_event_spans_all_keys() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();
        let (_, other) = counter();
        dispatcher.on("channel", "event", &cb);

        assert!(dispatcher.has(None, None, None));
        assert!(dispatcher.has(None, None, Some(&cb)));
        assert!(!dispatcher.has(None, None, Some(&other)));
    }

    #[test]
    fn test_off_exact_removes_duplicates_in_step() {
        let dispatcher = Dispatcher::new();
        let (hits, cb) = counter();
        let (other_hits, other) = counter();

        dispatcher.on("c", "e", &cb);
        dispatcher.on("c", "e", &cb);
        dispatcher.on("c", "e", &other);

        dispatcher.off(Some("c"), Some("e"), Some(&cb));
        assert_eq!(dispatcher.len(), 1);
        assert_in_step(&dispatcher);

        assert_eq!(dispatcher.emit(Some("c"), Some("e"), &()), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(other_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_channel_with_callback_but_no_event_is_noop() {
        let dispatcher = Dispatcher::new();
        let (hits, cb) = counter();
        dispatcher.on("c", "e", &cb);

        dispatcher.off(Some("c"), None, Some(&cb));

        assert_eq!(dispatcher.len(), 1);
        assert_in_step(&dispatcher);
        dispatcher.emit(Some("c"), Some("e"), &());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_without_channel_resets_even_with_event() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();
        dispatcher.on("c1", "e", &cb);
        dispatcher.on("c2", "e", &cb);

        dispatcher.off(None, Some("e"), None);

        assert!(dispatcher.is_empty());
        assert_in_step(&dispatcher);
    }

    #[test]
    fn test_off_on_unknown_channel_is_noop() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();
        dispatcher.on("c", "e", &cb);

        dispatcher.off(Some("missing"), None, None);
        dispatcher.off(Some("missing"), Some("e"), None);
        dispatcher.off(Some("missing"), Some("e"), Some(&cb));

        assert_eq!(dispatcher.len(), 1);
        assert_in_step(&dispatcher);
    }

    #[test]
    fn test_emit_passes_args() {
        let dispatcher = Dispatcher::<Vec<String>>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb = Callback::new(move |args: &Vec<String>| sink.lock().push(args.join(",")));

        dispatcher.on("c", "e", &cb);
        dispatcher.emit(Some("c"), Some("e"), &vec!["a".to_string(), "b".to_string()]);
        dispatcher.emit(Some("c"), Some("e"), &Vec::new());

        assert_eq!(*seen.lock(), vec!["a,b".to_string(), String::new()]);
    }

    #[test]
    fn test_try_on_validation() {
        let dispatcher = Dispatcher::with_config(DispatcherConfig::new().with_max_name_len(4));
        let (_, cb) = counter();

        assert_eq!(dispatcher.try_on("", "e", &cb), Err(Error::EmptyChannel));
        assert_eq!(dispatcher.try_on("c", "", &cb), Err(Error::EmptyEvent));
        assert_eq!(
            dispatcher.try_on("c", "events", &cb),
            Err(Error::NameTooLong {
                field: "event",
                len: 6,
                max: 4,
            })
        );
        assert!(dispatcher.is_empty());

        assert_eq!(dispatcher.try_on("c", "e", &cb), Ok(()));
        assert!(dispatcher.has(Some("c"), Some("e"), Some(&cb)));
    }

    #[test]
    fn test_try_on_without_limit() {
        let dispatcher = Dispatcher::with_config(DispatcherConfig::new().without_name_limit());
        let (_, cb) = counter();
        let long = "x".repeat(10_000);

        assert!(dispatcher.try_on(&long, "e", &cb).is_ok());
    }

    #[test]
    fn test_on_accepts_empty_names() {
        let dispatcher = Dispatcher::new();
        let (hits, cb) = counter();

        dispatcher.on("", "", &cb);

        assert!(dispatcher.has(Some(""), Some(""), None));
        assert_eq!(dispatcher.emit(Some(""), Some(""), &()), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_can_unsubscribe_itself() {
        let dispatcher = Arc::new(Dispatcher::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&dispatcher);
        let sink = Arc::clone(&hits);
        let once = Callback::new(move |_: &()| {
            sink.fetch_add(1, Ordering::SeqCst);
            inner.off(Some("c"), Some("e"), None);
        });
        dispatcher.on("c", "e", &once);

        assert_eq!(dispatcher.emit(Some("c"), Some("e"), &()), 1);
        assert_eq!(dispatcher.emit(Some("c"), Some("e"), &()), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_metrics() {
        let dispatcher = Dispatcher::new();
        let (_, cb) = counter();

        dispatcher.on("c", "e1", &cb);
        dispatcher.on("c", "e2", &cb);
        dispatcher.emit(Some("c"), Some("e1"), &());
        dispatcher.emit(Some("c"), None, &());
        dispatcher.off(Some("c"), None, None);

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.registrations, 2);
        assert_eq!(metrics.removals, 2);
        assert_eq!(metrics.publishes, 2);
        assert_eq!(metrics.deliveries, 1);
        assert_eq!(metrics.empty_publishes, 1);
    }

    #[test]
    fn test_custom_emitter() {
        let dispatcher: Dispatcher<()> =
            Dispatcher::with_emitter(KeyedEmitter::new(), DispatcherConfig::default());
        let (hits, cb) = counter();

        dispatcher.on("c", "e", &cb);
        assert_eq!(dispatcher.emitter().key_count(), 1);

        dispatcher.emit(Some("c"), Some("e"), &());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
