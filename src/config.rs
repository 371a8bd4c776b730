use crate::error::{CallbackError, Result};
use serde::Deserialize;

/// Runtime settings for the fallback runtime used by blocking `invoke` calls
/// made outside of any tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Async worker threads; `None` lets tokio pick one per CPU core.
    pub worker_threads: Option<usize>,
    /// Upper bound of the blocking pool that runs `Sync` handlers.
    pub max_blocking_threads: usize,
    pub thread_name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: 512,
            thread_name: "callback-worker".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workers) = lookup("CALLBACK_WORKER_THREADS") {
            config.worker_threads = Some(workers.trim().parse().map_err(|e| {
                CallbackError::Configuration(format!("Invalid worker_threads: {e}"))
            })?);
        }

        if let Some(max_blocking) = lookup("CALLBACK_MAX_BLOCKING_THREADS") {
            config.max_blocking_threads = max_blocking.trim().parse().map_err(|e| {
                CallbackError::Configuration(format!("Invalid max_blocking_threads: {e}"))
            })?;
        }

        if let Some(name) = lookup("CALLBACK_THREAD_NAME") {
            config.thread_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(CallbackError::Configuration(
                "worker_threads must be greater than zero".to_string(),
            ));
        }
        if self.max_blocking_threads == 0 {
            return Err(CallbackError::Configuration(
                "max_blocking_threads must be greater than zero".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(CallbackError::Configuration(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
