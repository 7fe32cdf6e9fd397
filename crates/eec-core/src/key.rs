//! Dispatch key composition.
//!
//! A dispatch key is the single identifier the underlying emitter matches on.
//! It is a two-part value compared component-wise, so no separator can ever
//! make two different (channel, event) pairs collide.

use std::fmt;

/// Text used for an absent component when a key is displayed.
pub const ABSENT_COMPONENT: &str = "undefined";

/// Separator used when a key is displayed.
pub const DISPLAY_SEPARATOR: char = '|';

/// Composite key for one (channel, event) pair.
///
/// Either component may be absent, but never both: a key with neither
/// component is represented as `None` by [`compose_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchKey {
    channel: Option<String>,
    event: Option<String>,
}

impl DispatchKey {
    /// Create a fully specified key.
    pub fn new(channel: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            event: Some(event.into()),
        }
    }

    /// Get the channel component.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Get the event component.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Check whether both components are present.
    ///
    /// Registration only ever produces complete keys, so a partial key never
    /// matches a live subscription.
    pub fn is_complete(&self) -> bool {
        self.channel.is_some() && self.event.is_some()
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.channel().unwrap_or(ABSENT_COMPONENT),
            DISPLAY_SEPARATOR,
            self.event().unwrap_or(ABSENT_COMPONENT)
        )
    }
}

/// Compose the dispatch key for a (channel, event) pair.
///
/// Returns `None` only when both parts are absent. A channel-only call still
/// yields a key, distinct from every fully specified key on that channel.
/// Inputs are used verbatim: no trimming or normalization.
pub fn compose_key(channel: Option<&str>, event: Option<&str>) -> Option<DispatchKey> {
    if channel.is_none() && event.is_none() {
        return None;
    }

    Some(DispatchKey {
        channel: channel.map(str::to_owned),
        event: event.map(str::to_owned),
    })
}

/// Render an optional key for log fields.
pub(crate) fn describe(key: Option<&DispatchKey>) -> String {
    match key {
        Some(key) => key.to_string(),
        None => "<all>".to_string(),
    }
}
