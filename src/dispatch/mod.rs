//! # Dispatch
//!
//! Invocation disciplines over registered handlers.
//!
//! - [`MulticastCallback`]: every handler at once, joint wait, first failure wins
//! - [`SequentialCallback`]: one handler at a time in registration order
//! - [`SingleCallback`]: exactly one handler, no registry
//!
//! Each discipline exists for zero, one and two arguments through the payload
//! type: `()`, `T` or `(A, B)`. The aliases below name those arities.

pub mod concurrent;
pub mod sequential;
pub mod single;

pub use concurrent::MulticastCallback;
pub use sequential::SequentialCallback;
pub use single::SingleCallback;

use crate::blocking::block_on_dispatch;
use crate::error::Result;
use crate::handler::Payload;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Invocation capability, withheld from [`EventRegistration`](crate::EventRegistration).
#[async_trait]
pub trait Invoke<P: Payload>: Send + Sync {
    /// Run the handlers with `payload` under this dispatcher's discipline.
    async fn invoke_async(&self, payload: P, cancel: &CancellationToken) -> Result<()>;

    /// Block the calling thread until [`invoke_async`](Invoke::invoke_async) completes.
    ///
    /// The token reaches the handlers but cannot interrupt synchronous work that
    /// has already started.
    fn invoke(&self, payload: P, cancel: &CancellationToken) -> Result<()> {
        block_on_dispatch(self.invoke_async(payload, cancel))
    }
}

pub type Callback = MulticastCallback<()>;
pub type CallbackOf1Arg<T> = MulticastCallback<T>;
pub type CallbackOf2Args<A, B> = MulticastCallback<(A, B)>;

pub type CallbackSequential = SequentialCallback<()>;
pub type CallbackSequentialOf1Arg<T> = SequentialCallback<T>;
pub type CallbackSequentialOf2Args<A, B> = SequentialCallback<(A, B)>;

pub type MethodCallback = SingleCallback<()>;
pub type MethodCallbackOf1Arg<T> = SingleCallback<T>;
pub type MethodCallbackOf2Args<A, B> = SingleCallback<(A, B)>;
