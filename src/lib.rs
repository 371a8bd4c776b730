#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Multicast Callback
//!
//! Registries of heterogeneous handlers invoked together, with cooperative
//! cancellation.
//!
//! ## Overview
//!
//! A [`Handler`] is a synchronous action, an asynchronous operation, or an
//! asynchronous operation that receives a [`CancellationToken`]. Handlers are
//! registered into a dispatcher and invoked with a payload:
//!
//! - [`MulticastCallback`] runs all handlers concurrently and waits for all of them
//! - [`SequentialCallback`] runs them one by one in registration order
//! - [`SingleCallback`] wraps exactly one handler
//!
//! Payloads carry the arguments: `()`, a single value, or a pair. Aliases such as
//! [`Callback`], [`CallbackOf1Arg`] and [`CallbackSequentialOf2Args`] name the
//! common arities.
//!
//! ## Module Organization
//!
//! - [`handler`] - Handler shapes and identity
//! - [`registry`] - Thread-safe handler storage and the registration capability
//! - [`dispatch`] - Concurrent, sequential and single-handler invocation
//! - [`blocking`] - Blocking bridge for synchronous callers
//! - [`config`] - Runtime configuration for the blocking bridge
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use multicast_callback::{Callback, CancellationToken, Handler, HandlerRegistration, Invoke};
//!
//! # async fn example() -> multicast_callback::Result<()> {
//! let callback = Callback::from(Handler::action(|| Ok(())));
//! callback.add(Handler::task(|| async { Ok(()) }));
//! callback.add(Handler::cancelable_task(|token| async move {
//!     tokio::select! {
//!         _ = token.cancelled() => {}
//!         _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {}
//!     }
//!     Ok(())
//! }));
//!
//! callback.invoke_async((), &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Exposing Events
//!
//! An owner keeps the dispatcher and hands out [`EventRegistration`], which can
//! add and remove handlers but cannot invoke them.

pub mod blocking;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod logging;
pub mod registry;

pub use config::DispatchConfig;
pub use dispatch::{
    Callback, CallbackOf1Arg, CallbackOf2Args, CallbackSequential, CallbackSequentialOf1Arg,
    CallbackSequentialOf2Args, Invoke, MethodCallback, MethodCallbackOf1Arg,
    MethodCallbackOf2Args, MulticastCallback, SequentialCallback, SingleCallback,
};
pub use error::{CallbackError, HandlerError, HandlerResult, Result};
pub use handler::{Handler, HandlerKind, Payload};
pub use registry::{EventRegistration, HandlerRegistration, HandlerRegistry, Snapshot};
pub use tokio_util::sync::CancellationToken;
