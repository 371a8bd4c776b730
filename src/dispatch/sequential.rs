//! Strictly ordered dispatch with early exit.

use super::Invoke;
use crate::error::{CallbackError, Result};
use crate::handler::{flatten_join, Handler, Payload};
use crate::logging::log_dispatch_operation;
use crate::registry::{EventRegistration, HandlerRegistration, HandlerRegistry};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Invokes registered handlers one at a time, in registration order.
///
/// Each handler fully completes before the next starts, so it observes every
/// side effect of the handlers before it. The token is checked between
/// handlers; once it fires no further handler is started. A failing handler
/// stops the sequence and its error is returned as is.
pub struct SequentialCallback<P> {
    registry: Arc<HandlerRegistry<P>>,
}

impl<P: Payload> SequentialCallback<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::new()),
        }
    }

    pub fn with_handler(handler: Handler<P>) -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::with_handler(handler)),
        }
    }

    pub fn add_to(existing: Option<Self>, handler: Handler<P>) -> Self {
        Self {
            registry: HandlerRegistry::add_to(existing.map(|cb| cb.registry), handler),
        }
    }

    pub fn remove_from(existing: Option<Self>, handler: &Handler<P>) -> Result<Self> {
        Ok(Self {
            registry: HandlerRegistry::remove_from(existing.map(|cb| cb.registry), handler)?,
        })
    }

    pub fn registration(&self) -> EventRegistration<P> {
        EventRegistration::new(Arc::clone(&self.registry))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    async fn run(
        &self,
        invocation_id: Uuid,
        snapshot: &[Handler<P>],
        payload: P,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() && !snapshot.is_empty() {
            return Err(CallbackError::Cancelled);
        }

        for (position, handler) in snapshot.iter().enumerate() {
            debug!(
                invocation_id = %invocation_id,
                position,
                kind = %handler.kind(),
                "Running handler"
            );

            if let Err(err) = flatten_join(handler.spawn(payload.clone(), cancel).await) {
                warn!(
                    invocation_id = %invocation_id,
                    position,
                    kind = %handler.kind(),
                    error = %err,
                    "Handler failed, skipping remaining handlers"
                );
                return Err(err);
            }

            if cancel.is_cancelled() {
                debug!(
                    invocation_id = %invocation_id,
                    position,
                    remaining = snapshot.len() - position - 1,
                    "Cancelled between handlers"
                );
                return Err(CallbackError::Cancelled);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<P: Payload> Invoke<P> for SequentialCallback<P> {
    async fn invoke_async(&self, payload: P, cancel: &CancellationToken) -> Result<()> {
        let invocation_id = Uuid::new_v4();
        let snapshot = self.registry.snapshot();
        let started = Instant::now();

        let outcome = self.run(invocation_id, &snapshot, payload, cancel).await;

        let status = match &outcome {
            Ok(()) => "completed",
            Err(CallbackError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        log_dispatch_operation(
            "sequential",
            &invocation_id.to_string(),
            snapshot.len(),
            status,
            Some(started.elapsed().as_millis() as u64),
        );

        outcome
    }
}

impl<P: Payload> HandlerRegistration<P> for SequentialCallback<P> {
    fn add(&self, handler: Handler<P>) {
        self.registry.add(handler);
    }

    fn remove(&self, handler: &Handler<P>) -> bool {
        self.registry.remove(handler)
    }
}

impl<P: Payload> Default for SequentialCallback<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for SequentialCallback<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P: Payload> From<Handler<P>> for SequentialCallback<P> {
    fn from(handler: Handler<P>) -> Self {
        Self::with_handler(handler)
    }
}

impl<P: Payload> fmt::Debug for SequentialCallback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialCallback")
            .field("registry", &self.registry)
            .finish()
    }
}
