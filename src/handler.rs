//! # Handlers
//!
//! A [`Handler`] is one registered callable in one of three shapes. The payload
//! type `P` carries the arguments: `()` for zero arguments, `T` for one and
//! `(A, B)` for two.
//!
//! Identity is the identity of the shared callable: clones of a handler compare
//! equal, two handlers built from the same closure do not.

use crate::error::{CallbackError, HandlerResult, Result};
use crate::logging::log_error;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// Bound shared by every payload type.
pub trait Payload: Clone + Send + 'static {}

impl<T> Payload for T where T: Clone + Send + 'static {}

pub type SyncFn<P> = dyn Fn(P) -> HandlerResult + Send + Sync;
pub type AsyncFn<P> = dyn Fn(P) -> BoxFuture<'static, HandlerResult> + Send + Sync;
pub type CancelableFn<P> =
    dyn Fn(P, CancellationToken) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// One registered callable.
pub enum Handler<P> {
    /// Runs to completion when invoked; dispatchers move it onto a blocking worker.
    Sync(Arc<SyncFn<P>>),
    /// Asynchronous and unaware of cancellation.
    Async(Arc<AsyncFn<P>>),
    /// Asynchronous and handed the cancellation token, which it must honor itself.
    AsyncCancelable(Arc<CancelableFn<P>>),
}

/// Shape of a handler without its callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Sync,
    Async,
    AsyncCancelable,
}

impl HandlerKind {
    pub fn name(&self) -> &'static str {
        match self {
            HandlerKind::Sync => "sync",
            HandlerKind::Async => "async",
            HandlerKind::AsyncCancelable => "async_cancelable",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<P: Payload> Handler<P> {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(P) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Sync(Arc::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::Async(Arc::new(move |payload| f(payload).boxed()))
    }

    pub fn cancelable<F, Fut>(f: F) -> Self
    where
        F: Fn(P, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::AsyncCancelable(Arc::new(move |payload, token| f(payload, token).boxed()))
    }

    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Sync(_) => HandlerKind::Sync,
            Handler::Async(_) => HandlerKind::Async,
            Handler::AsyncCancelable(_) => HandlerKind::AsyncCancelable,
        }
    }

    /// Schedule this handler on the current tokio runtime.
    ///
    /// `Sync` handlers go to the blocking pool, the async shapes are spawned as
    /// tasks. Dropping the returned handle detaches the execution; it is never
    /// aborted.
    pub(crate) fn spawn(&self, payload: P, cancel: &CancellationToken) -> JoinHandle<HandlerResult> {
        match self {
            Handler::Sync(f) => {
                let f = Arc::clone(f);
                tokio::task::spawn_blocking(move || f(payload))
            }
            // The closure itself runs inside the task so a panic while building
            // the future lands in the join handle like any other handler panic.
            Handler::Async(f) => {
                let f = Arc::clone(f);
                tokio::spawn(async move { f(payload).await })
            }
            Handler::AsyncCancelable(f) => {
                let f = Arc::clone(f);
                let cancel = cancel.clone();
                tokio::spawn(async move { f(payload, cancel).await })
            }
        }
    }

    fn identity(&self) -> *const () {
        match self {
            Handler::Sync(f) => Arc::as_ptr(f) as *const (),
            Handler::Async(f) => Arc::as_ptr(f) as *const (),
            Handler::AsyncCancelable(f) => Arc::as_ptr(f) as *const (),
        }
    }
}

impl Handler<()> {
    /// Zero-argument synchronous handler.
    pub fn action<F>(f: F) -> Self
    where
        F: Fn() -> HandlerResult + Send + Sync + 'static,
    {
        Self::sync(move |()| f())
    }

    /// Zero-argument asynchronous handler.
    pub fn task<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::from_async(move |()| f())
    }

    /// Zero-argument cancellation-aware handler.
    pub fn cancelable_task<F, Fut>(f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::cancelable(move |(), token| f(token))
    }
}

impl<P> Clone for Handler<P> {
    fn clone(&self) -> Self {
        match self {
            Handler::Sync(f) => Handler::Sync(Arc::clone(f)),
            Handler::Async(f) => Handler::Async(Arc::clone(f)),
            Handler::AsyncCancelable(f) => Handler::AsyncCancelable(Arc::clone(f)),
        }
    }
}

impl<P: Payload> PartialEq for Handler<P> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && std::ptr::eq(self.identity(), other.identity())
    }
}

impl<P: Payload> Eq for Handler<P> {}

impl<P: Payload> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &self.kind())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Flatten the outcome of a spawned handler into a dispatch result.
///
/// A panic becomes a handler failure. A task that was cancelled by the runtime
/// produced no outcome at all, which the dispatchers never cause themselves.
pub(crate) fn flatten_join(joined: std::result::Result<HandlerResult, JoinError>) -> Result<()> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CallbackError::HandlerFailure(err)),
        Err(join_err) if join_err.is_panic() => {
            let panic = join_err.into_panic();
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(CallbackError::HandlerFailure(anyhow::anyhow!(
                "handler panicked: {message}"
            )))
        }
        Err(join_err) => {
            let reason = format!("handler execution ended without an outcome: {join_err}");
            log_error("handler", "join", &reason, None);
            Err(CallbackError::InvariantViolation(reason))
        }
    }
}
