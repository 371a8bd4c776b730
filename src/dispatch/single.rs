//! Uniform invocation over exactly one handler.

use super::Invoke;
use crate::error::{CallbackError, Result};
use crate::handler::{flatten_join, Handler, HandlerKind, Payload};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A single handler with the same invoke contract as the multicast dispatchers.
///
/// Immutable: build a new wrapper to change the handler.
pub struct SingleCallback<P> {
    handler: Handler<P>,
}

impl<P: Payload> SingleCallback<P> {
    pub fn new(handler: Handler<P>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Handler<P> {
        &self.handler
    }

    pub fn kind(&self) -> HandlerKind {
        self.handler.kind()
    }
}

#[async_trait]
impl<P: Payload> Invoke<P> for SingleCallback<P> {
    async fn invoke_async(&self, payload: P, cancel: &CancellationToken) -> Result<()> {
        let kind = self.handler.kind();

        if kind == HandlerKind::AsyncCancelable {
            return flatten_join(self.handler.spawn(payload, cancel).await);
        }

        // Neither shape can observe the token, so only the wait is cancellable.
        if cancel.is_cancelled() {
            return Err(CallbackError::Cancelled);
        }
        let execution = self.handler.spawn(payload, cancel);
        tokio::select! {
            biased;
            joined = execution => flatten_join(joined),
            _ = cancel.cancelled() => {
                debug!(kind = %kind, "Stopped waiting for handler, execution continues detached");
                Err(CallbackError::Cancelled)
            }
        }
    }
}

impl<P> Clone for SingleCallback<P> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<P: Payload> fmt::Debug for SingleCallback<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleCallback")
            .field("handler", &self.handler)
            .finish()
    }
}

impl<P: Payload> From<Handler<P>> for SingleCallback<P> {
    fn from(handler: Handler<P>) -> Self {
        Self::new(handler)
    }
}
