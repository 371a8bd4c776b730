//! Concurrent fan-out with a joint, cancellable wait.

use super::Invoke;
use crate::error::{CallbackError, Result};
use crate::handler::{flatten_join, Handler, Payload};
use crate::logging::log_dispatch_operation;
use crate::registry::{EventRegistration, HandlerRegistration, HandlerRegistry};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Invokes every registered handler in parallel.
///
/// `Sync` handlers run on the blocking pool, async handlers are spawned as tasks
/// and cancellation-aware handlers receive the token. The call returns once all
/// of them finished, or as soon as the token fires; executions still running at
/// that point are left to complete in the background.
///
/// When several handlers fail, the first failure in completion order is
/// returned and the others are only logged. Which one that is cannot be
/// predicted.
pub struct MulticastCallback<P> {
    registry: Arc<HandlerRegistry<P>>,
}

impl<P: Payload> MulticastCallback<P> {
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

    /// Add `handler` to `existing`, seeding a new callback when it is absent.
    pub fn add_to(existing: Option<Self>, handler: Handler<P>) -> Self {
        Self {
            registry: HandlerRegistry::add_to(existing.map(|cb| cb.registry), handler),
        }
    }

    /// Remove `handler` from `existing`; an absent callback is a usage error.
    pub fn remove_from(existing: Option<Self>, handler: &Handler<P>) -> Result<Self> {
        Ok(Self {
            registry: HandlerRegistry::remove_from(existing.map(|cb| cb.registry), handler)?,
        })
    }

    /// Subscription-only view for external collaborators.
    pub fn registration(&self) -> EventRegistration<P> {
        EventRegistration::new(Arc::clone(&self.registry))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[async_trait]
impl<P: Payload> Invoke<P> for MulticastCallback<P> {
    async fn invoke_async(&self, payload: P, cancel: &CancellationToken) -> Result<()> {
        let invocation_id = Uuid::new_v4();
        let snapshot = self.registry.snapshot();
        let started = Instant::now();

        debug!(
            invocation_id = %invocation_id,
            handler_count = snapshot.len(),
            "Dispatching callback concurrently"
        );

        let mut pending: FuturesUnordered<_> = snapshot
            .iter()
            .map(|handler| handler.spawn(payload.clone(), cancel))
            .collect();

        let joint = async move {
            let mut first_failure = None;
            while let Some(joined) = pending.next().await {
                if let Err(err) = flatten_join(joined) {
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    } else {
                        warn!(invocation_id = %invocation_id, error = %err, "Additional handler failure not reported");
                    }
                }
            }
            first_failure.map_or(Ok(()), Err)
        };

        // A finished join wins over a token that fired at the same time.
        let outcome = tokio::select! {
            biased;
            outcome = joint => outcome,
            _ = cancel.cancelled() => Err(CallbackError::Cancelled),
        };

        let status = match &outcome {
            Ok(()) => "completed",
            Err(CallbackError::Cancelled) => "cancelled",
            Err(err) => {
                warn!(invocation_id = %invocation_id, error = %err, "Concurrent dispatch failed");
                "failed"
            }
        };
        log_dispatch_operation(
            "concurrent",
            &invocation_id.to_string(),
            snapshot.len(),
            status,
            Some(started.elapsed().as_millis() as u64),
        );

        outcome
    }
}

impl<P: Payload> HandlerRegistration<P> for MulticastCallback<P> {
    fn add(&self, handler: Handler<P>) {
        self.registry.add(handler);
    }

    fn remove(&self, handler: &Handler<P>) -> bool {
        self.registry.remove(handler)
    }
}

impl<P: Payload> Default for MulticastCallback<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for MulticastCallback<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P: Payload> From<Handler<P>> for MulticastCallback<P> {
    fn from(handler: Handler<P>) -> Self {
        Self::with_handler(handler)
    }
}

impl<P: Payload> fmt::Debug for MulticastCallback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastCallback")
            .field("registry", &self.registry)
            .finish()
    }
}
