//! Identity-compared callback handles.

use std::fmt;
use std::sync::Arc;

/// A shared event handler.
///
/// Handles compare by identity: clones of one handle are equal, while two
/// handles built from separate closures are never equal, even if the closures
/// do the same thing. Keep a clone around to query or remove a registration
/// later.
pub struct Callback<A> {
    handler: Arc<dyn Fn(&A) + Send + Sync>,
}

impl<A> Callback<A> {
    /// Wrap a closure in a new handle with a fresh identity.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, args: &A) {
        (self.handler)(args);
    }

    /// Stable identity of this handle, shared by all its clones.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.handler).cast::<()>() as usize
    }
}

impl<A> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A> PartialEq for Callback<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<A> Eq for Callback<A> {}

impl<A> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("id", &format_args!("{:#x}", self.id()))
            .finish()
    }
}
