use super::HandlerRegistry;
use crate::handler::{Handler, Payload};
use std::fmt;
use std::sync::Arc;

/// Subscribe/unsubscribe capability over a handler registry.
pub trait HandlerRegistration<P: Payload>: Send + Sync {
    fn add(&self, handler: Handler<P>);

    /// Remove the first identical handler, returning whether one was removed.
    fn remove(&self, handler: &Handler<P>) -> bool;
}

impl<P: Payload> HandlerRegistration<P> for HandlerRegistry<P> {
    fn add(&self, handler: Handler<P>) {
        HandlerRegistry::add(self, handler);
    }

    fn remove(&self, handler: &Handler<P>) -> bool {
        HandlerRegistry::remove(self, handler)
    }
}

/// Add/remove-only view of a dispatcher's registry.
///
/// The owning component keeps the dispatcher and exposes this view, so external
/// collaborators can subscribe and unsubscribe but never trigger an invocation.
pub struct EventRegistration<P> {
    registry: Arc<HandlerRegistry<P>>,
}

impl<P: Payload> EventRegistration<P> {
    pub(crate) fn new(registry: Arc<HandlerRegistry<P>>) -> Self {
        Self { registry }
    }

    pub fn handler_count(&self) -> usize {
        self.registry.len()
    }
}

impl<P: Payload> HandlerRegistration<P> for EventRegistration<P> {
    fn add(&self, handler: Handler<P>) {
        self.registry.add(handler);
    }

    fn remove(&self, handler: &Handler<P>) -> bool {
        self.registry.remove(handler)
    }
}

impl<P> Clone for EventRegistration<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P: Payload> fmt::Debug for EventRegistration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistration")
            .field("handler_count", &self.registry.len())
            .finish()
    }
}
