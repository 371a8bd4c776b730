//! Blocking bridge behind the synchronous `invoke` entry points.

use crate::config::DispatchConfig;
use crate::error::{CallbackError, Result};
use std::future::Future;
use std::sync::OnceLock;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tracing::debug;

static FALLBACK_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Drive `future` to completion, blocking the calling thread.
///
/// On a multi-threaded runtime the current worker is handed off with
/// `block_in_place`. Outside any runtime a process-wide fallback runtime is used
/// and kept alive, so detached handler executions can still finish. A
/// current-thread runtime cannot block without deadlocking and is rejected.
pub fn block_on_dispatch<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(move || handle.block_on(future))
            }
            _ => Err(CallbackError::BlockingContext),
        },
        Err(_) => fallback_runtime()?.block_on(future),
    }
}

fn fallback_runtime() -> Result<&'static Runtime> {
    if let Some(runtime) = FALLBACK_RUNTIME.get() {
        return Ok(runtime);
    }

    let config = DispatchConfig::from_env()?;
    let runtime = build_runtime(&config)?;
    debug!(
        worker_threads = ?config.worker_threads,
        max_blocking_threads = config.max_blocking_threads,
        thread_name = %config.thread_name,
        "Started fallback dispatch runtime"
    );

    // A racing thread may have won; its runtime is kept and ours is dropped here,
    // outside of any async context.
    Ok(FALLBACK_RUNTIME.get_or_init(|| runtime))
}

fn build_runtime(config: &DispatchConfig) -> Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder
        .enable_all()
        .thread_name(config.thread_name.clone())
        .max_blocking_threads(config.max_blocking_threads);
    if let Some(workers) = config.worker_threads {
        builder.worker_threads(workers);
    }
    builder
        .build()
        .map_err(|e| CallbackError::Configuration(format!("Failed to build dispatch runtime: {e}")))
}
