//! Subscription registry.
//!
//! Records every live registration grouped by channel, so a whole channel can
//! be removed even though the emitter only knows about individual keys.

use std::collections::HashMap;
use std::fmt;

use crate::callback::Callback;
use crate::key::DispatchKey;

/// One live registration of a callback against a (channel, event) pair.
pub struct SubscriptionRecord<A> {
    channel: String,
    dispatch_key: DispatchKey,
    callback: Callback<A>,
}

impl<A> SubscriptionRecord<A> {
    /// Create a record for a callback registered under `dispatch_key`.
    pub fn new(
        channel: impl Into<String>,
        dispatch_key: DispatchKey,
        callback: Callback<A>,
    ) -> Self {
        Self {
            channel: channel.into(),
            dispatch_key,
            callback,
        }
    }

    /// Channel the record belongs to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Event name, if the record has one.
    pub fn event(&self) -> Option<&str> {
        self.dispatch_key.event()
    }

    /// Key the callback is subscribed under on the emitter.
    pub fn dispatch_key(&self) -> &DispatchKey {
        &self.dispatch_key
    }

    /// Registered callback.
    pub fn callback(&self) -> &Callback<A> {
        &self.callback
    }

    fn matches(&self, key: &DispatchKey, callback: Option<&Callback<A>>) -> bool {
        self.dispatch_key == *key && callback.map_or(true, |cb| self.callback == *cb)
    }
}

impl<A> Clone for SubscriptionRecord<A> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            dispatch_key: self.dispatch_key.clone(),
            callback: self.callback.clone(),
        }
    }
}

impl<A> fmt::Debug for SubscriptionRecord<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRecord")
            .field("channel", &self.channel)
            .field("event", &self.event())
            .field("callback", &self.callback)
            .finish()
    }
}

/// Channel-indexed set of subscription records.
pub struct SubscriptionRegistry<A> {
    /// Records per channel, in insertion order. Channels with no records are
    /// removed.
    channels: HashMap<String, Vec<SubscriptionRecord<A>>>,
    /// Total number of records.
    len: usize,
}

impl<A> SubscriptionRegistry<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty registry sized for `channels` channels.
    pub fn with_capacity(channels: usize) -> Self {
        Self {
            channels: HashMap::with_capacity(channels),
            len: 0,
        }
    }

    /// Append a record to its channel.
    pub fn insert(&mut self, record: SubscriptionRecord<A>) {
        self.channels
            .entry(record.channel.clone())
            .or_default()
            .push(record);
        self.len += 1;
    }

    /// Remove and return every record on a channel.
    pub fn remove_channel(&mut self, channel: &str) -> Vec<SubscriptionRecord<A>> {
        let removed = self.channels.remove(channel).unwrap_or_default();
        self.len -= removed.len();
        removed
    }

    /// Remove and return the records on `channel` registered under `key`.
    ///
    /// With a callback only that callback's records are removed; without one
    /// every record under the key goes.
    pub fn remove_matching(
        &mut self,
        channel: &str,
        key: &DispatchKey,
        callback: Option<&Callback<A>>,
    ) -> Vec<SubscriptionRecord<A>> {
        let Some(records) = self.channels.get_mut(channel) else {
            return Vec::new();
        };

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(records)
            .into_iter()
            .partition(|record| record.matches(key, callback));
        *records = kept;

        if records.is_empty() {
            self.channels.remove(channel);
        }

        self.len -= removed.len();
        removed
    }

    /// Remove everything, returning the number of records dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.len;
        self.channels.clear();
        self.len = 0;
        removed
    }

    /// Records on a channel, in insertion order.
    pub fn records(&self, channel: &str) -> &[SubscriptionRecord<A>] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of channels that currently have records, sorted.
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of records on a channel.
    pub fn channel_len(&self, channel: &str) -> usize {
        self.records(channel).len()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the registry holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<A> Default for SubscriptionRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for SubscriptionRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("channels", &self.channels.len())
            .field("len", &self.len)
            .finish()
    }
}
