use crate::error::{CallbackError, Result};
use crate::handler::{Handler, Payload};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Immutable point-in-time view of a registry.
pub type Snapshot<P> = Arc<[Handler<P>]>;

/// Ordered collection of handlers guarded by a single mutex.
///
/// Registration order is kept across all shapes. The lock is held only while the
/// list is mutated or copied, never while a handler runs.
pub struct HandlerRegistry<P> {
    handlers: Mutex<Vec<Handler<P>>>,
}

impl<P: Payload> HandlerRegistry<P> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handler(handler: Handler<P>) -> Self {
        Self {
            handlers: Mutex::new(vec![handler]),
        }
    }

    /// Append a handler to the tail.
    pub fn add(&self, handler: Handler<P>) {
        let mut handlers = self.handlers.lock();
        trace!(kind = %handler.kind(), position = handlers.len(), "Adding handler");
        handlers.push(handler);
    }

    /// Remove the first handler identical to `handler`.
    ///
    /// Returns whether a handler was removed. Removing an unregistered handler is
    /// not an error.
    pub fn remove(&self, handler: &Handler<P>) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().position(|registered| registered == handler) {
            Some(position) => {
                handlers.remove(position);
                trace!(kind = %handler.kind(), position, "Removed handler");
                true
            }
            None => {
                trace!(kind = %handler.kind(), "Handler not registered, nothing removed");
                false
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<P> {
        let handlers = self.handlers.lock();
        Arc::from(handlers.as_slice())
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    pub fn clear(&self) {
        self.handlers.lock().clear();
    }

    /// Add `handler` to `existing`, or seed a new registry with it when absent.
    pub fn add_to(existing: Option<Arc<Self>>, handler: Handler<P>) -> Arc<Self> {
        match existing {
            Some(registry) => {
                registry.add(handler);
                registry
            }
            None => Arc::new(Self::with_handler(handler)),
        }
    }

    /// Remove `handler` from `existing` and hand the same registry back.
    ///
    /// An absent registry is a usage error, unlike an absent handler.
    pub fn remove_from(existing: Option<Arc<Self>>, handler: &Handler<P>) -> Result<Arc<Self>> {
        let registry = existing.ok_or(CallbackError::MissingRegistry)?;
        registry.remove(handler);
        Ok(registry)
    }
}

impl<P: Payload> Default for HandlerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> From<Handler<P>> for HandlerRegistry<P> {
    fn from(handler: Handler<P>) -> Self {
        Self::with_handler(handler)
    }
}

impl<P: Payload> fmt::Debug for HandlerRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &*self.handlers.lock())
            .finish()
    }
}
