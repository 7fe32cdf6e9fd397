//! EEC Core - Channeled event dispatch.
//!
//! Callers register interest in a (channel, event) pair instead of a flat
//! event name, and can later remove registrations by channel, by
//! (channel, event), or by (channel, event, callback).
//!
//! ```
//! use eec_core::{Callback, Dispatcher};
//!
//! let events = Dispatcher::<String>::new();
//! let greet = Callback::new(|name: &String| println!("hello {name}"));
//!
//! events.on("users", "joined", &greet);
//! assert!(events.has(Some("users"), Some("joined"), Some(&greet)));
//! assert!(!events.has(Some("users"), None, None));
//!
//! assert_eq!(events.emit(Some("users"), Some("joined"), &"ada".to_string()), 1);
//!
//! events.off(Some("users"), None, None);
//! assert_eq!(events.emit(Some("users"), Some("joined"), &"bob".to_string()), 0);
//! ```

pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod key;
pub mod metrics;
pub mod registry;

pub use callback::Callback;
pub use config::{DispatcherConfig, DEFAULT_MAX_NAME_LEN};
pub use dispatcher::Dispatcher;
pub use emitter::{Emitter, KeyedEmitter};
pub use error::{Error, Result};
pub use key::{compose_key, DispatchKey};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registry::{SubscriptionRecord, SubscriptionRegistry};
