//! Dispatcher configuration.

/// Default maximum length, in bytes, of a channel or event name accepted by
/// validated registration.
pub const DEFAULT_MAX_NAME_LEN: usize = 256;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Maximum channel/event name length for `try_on`. None disables the check.
    pub max_name_len: Option<usize>,

    /// Number of channels the registry is pre-sized for.
    pub initial_channel_capacity: usize,
}

impl DispatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            max_name_len: Some(DEFAULT_MAX_NAME_LEN),
            initial_channel_capacity: 0,
        }
    }

    /// Set the maximum name length.
    pub fn with_max_name_len(mut self, max: usize) -> Self {
        self.max_name_len = Some(max);
        self
    }

    /// Disable the name length check.
    pub fn without_name_limit(mut self) -> Self {
        self.max_name_len = None;
        self
    }

    /// Set the initial channel capacity.
    pub fn with_initial_channel_capacity(mut self, channels: usize) -> Self {
        self.initial_channel_capacity = channels;
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.max_name_len, Some(DEFAULT_MAX_NAME_LEN));
        assert_eq!(config.initial_channel_capacity, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DispatcherConfig::new()
            .with_max_name_len(32)
            .with_initial_channel_capacity(16);
        assert_eq!(config.max_name_len, Some(32));
        assert_eq!(config.initial_channel_capacity, 16);

        let config = config.without_name_limit();
        assert!(config.max_name_len.is_none());
    }
}
