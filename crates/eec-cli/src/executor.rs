//! Statement parsing and execution against a dispatcher session.

use std::collections::HashMap;
use std::sync::Arc;

use eec_core::{Callback, Dispatcher, DispatcherConfig};
use parking_lot::Mutex;
use thiserror::Error;

/// Arguments delivered to CLI handlers.
pub type EventArgs = Vec<String>;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Statement could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Dispatcher rejected the statement.
    #[error("{0}")]
    Dispatch(#[from] eec_core::Error),
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `on <channel> <event> <handler>`
    On {
        channel: String,
        event: String,
        handler: String,
    },
    /// `off [<channel> [<event> [<handler>]]]`
    Off {
        channel: Option<String>,
        event: Option<String>,
        handler: Option<String>,
    },
    /// `has [<channel> [<event> [<handler>]]]`
    Has {
        channel: Option<String>,
        event: Option<String>,
        handler: Option<String>,
    },
    /// `emit [<channel> [<event> [args...]]]`
    Emit {
        channel: Option<String>,
        event: Option<String>,
        args: EventArgs,
    },
}

/// One handler invocation observed during an emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Handler name.
    pub handler: String,
    /// Arguments it received.
    pub args: EventArgs,
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A handler was registered.
    Registered {
        channel: String,
        event: String,
        handler: String,
    },
    /// Registrations were removed.
    Removed(usize),
    /// Answer to a `has` query.
    Exists(bool),
    /// Handlers invoked by an emit, in invocation order.
    Delivered(Vec<Delivery>),
}

/// Parse a single statement.
pub fn parse(input: &str) -> Result<Statement, ExecuteError> {
    let mut words = input.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ExecuteError::Parse("empty statement".to_string()));
    };

    let rest: Vec<String> = words.map(str::to_string).collect();
    let mut parts = rest.clone().into_iter();

    match verb.to_lowercase().as_str() {
        "on" => {
            if rest.len() != 3 {
                return Err(ExecuteError::Parse(
                    "usage: on <channel> <event> <handler>".to_string(),
                ));
            }
            Ok(Statement::On {
                channel: rest[0].clone(),
                event: rest[1].clone(),
                handler: rest[2].clone(),
            })
        }
        "off" | "has" => {
            if rest.len() > 3 {
                return Err(ExecuteError::Parse(format!(
                    "usage: {} [<channel> [<event> [<handler>]]]",
                    verb.to_lowercase()
                )));
            }
            let (channel, event, handler) = (parts.next(), parts.next(), parts.next());
            if verb.eq_ignore_ascii_case("off") {
                Ok(Statement::Off {
                    channel,
                    event,
                    handler,
                })
            } else {
                Ok(Statement::Has {
                    channel,
                    event,
                    handler,
                })
            }
        }
        "emit" => Ok(Statement::Emit {
            channel: parts.next(),
            event: parts.next(),
            args: parts.collect(),
        }),
        other => Err(ExecuteError::Parse(format!("unknown statement '{}'", other))),
    }
}

/// A dispatcher plus the named handlers created on it.
pub struct Session {
    dispatcher: Dispatcher<EventArgs>,
    handlers: HashMap<String, Callback<EventArgs>>,
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl Session {
    /// Create a session with a fresh dispatcher.
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            dispatcher: Dispatcher::with_config(config),
            handlers: HashMap::new(),
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The session's dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<EventArgs> {
        &self.dispatcher
    }

    /// Parse and execute a statement.
    pub fn execute(&mut self, input: &str) -> Result<Outcome, ExecuteError> {
        let statement = parse(input)?;
        tracing::debug!(?statement, "executing statement");

        match statement {
            Statement::On {
                channel,
                event,
                handler,
            } => {
                let callback = self.handler(&handler);
                self.dispatcher.try_on(&channel, &event, &callback)?;
                self.handlers.entry(handler.clone()).or_insert(callback);
                Ok(Outcome::Registered {
                    channel,
                    event,
                    handler,
                })
            }
            Statement::Off {
                channel,
                event,
                handler,
            } => {
                let callback = handler.as_deref().map(|name| self.handler(name));
                let before = self.dispatcher.len();
                self.dispatcher
                    .off(channel.as_deref(), event.as_deref(), callback.as_ref());
                Ok(Outcome::Removed(before - self.dispatcher.len()))
            }
            Statement::Has {
                channel,
                event,
                handler,
            } => {
                let callback = handler.as_deref().map(|name| self.handler(name));
                Ok(Outcome::Exists(self.dispatcher.has(
                    channel.as_deref(),
                    event.as_deref(),
                    callback.as_ref(),
                )))
            }
            Statement::Emit {
                channel,
                event,
                args,
            } => {
                self.dispatcher
                    .emit(channel.as_deref(), event.as_deref(), &args);
                let delivered = std::mem::take(&mut *self.deliveries.lock());
                Ok(Outcome::Delivered(delivered))
            }
        }
    }

    /// Resolve a handler name. Names not yet registered get a fresh
    /// callback that is only kept once a registration succeeds.
    fn handler(&self, name: &str) -> Callback<EventArgs> {
        if let Some(callback) = self.handlers.get(name) {
            return callback.clone();
        }
        let sink = Arc::clone(&self.deliveries);
        let label = name.to_string();
        Callback::new(move |args: &EventArgs| {
            sink.lock().push(Delivery {
                handler: label.clone(),
                args: args.clone(),
            });
        })
    }
}
