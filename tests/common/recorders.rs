#![allow(dead_code)]

use multicast_callback::{CancellationToken, Handler};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Records the ids of handlers in the order they ran.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<usize>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<usize> {
        self.entries.lock().clone()
    }

    pub fn sync_handler(&self, id: usize) -> Handler<()> {
        let entries = self.entries.clone();
        Handler::action(move || {
            entries.lock().push(id);
            Ok(())
        })
    }

    pub fn async_handler(&self, id: usize, delay: Duration) -> Handler<()> {
        let entries = self.entries.clone();
        Handler::task(move || {
            let entries = entries.clone();
            async move {
                tokio::time::sleep(delay).await;
                entries.lock().push(id);
                Ok(())
            }
        })
    }

    pub fn cancelable_handler(&self, id: usize) -> Handler<()> {
        let entries = self.entries.clone();
        Handler::cancelable_task(move |_token: CancellationToken| {
            let entries = entries.clone();
            async move {
                entries.lock().push(id);
                Ok(())
            }
        })
    }

    /// Records its id, then fails with `"handler {id} failed"`.
    pub fn failing_handler(&self, id: usize) -> Handler<()> {
        let entries = self.entries.clone();
        Handler::action(move || {
            entries.lock().push(id);
            anyhow::bail!("handler {id} failed")
        })
    }
}

pub fn counting_handler(counter: &Arc<AtomicUsize>) -> Handler<()> {
    let counter = counter.clone();
    Handler::action(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}
