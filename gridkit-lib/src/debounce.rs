//! Trailing-edge debouncer for search input

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Runs only the last scheduled task of a burst.
///
/// Each [`schedule`](Debouncer::schedule) cancels the previous pending task
/// and starts a new delay; a task runs once its delay passes without another
/// call.
///
/// # Example
///
/// ```ignore
/// let debouncer = Debouncer::new();
/// for term in ["k", "ki", "kil", "kiln"] {
///     let engine = engine.clone();
///     debouncer.schedule(Duration::from_millis(300), async move {
///         engine.set_global_filter(term).await;
///     });
/// }
/// // only "kiln" is searched
/// ```
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` after `delay`, replacing any pending task.
    ///
    /// Must be called within a Tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
    }

    /// Drops the pending task, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_runs() {
        let debouncer = Debouncer::new();
        let runs = Arc::new(Mutex::new(Vec::new()));

        for term in ["k", "ki", "kiln"] {
            let runs = runs.clone();
            debouncer.schedule(Duration::from_millis(300), async move {
                runs.lock().unwrap().push(term);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(*runs.lock().unwrap(), ["kiln"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let debouncer = Debouncer::new();
        let runs = Arc::new(Mutex::new(0));

        let counter = runs.clone();
        debouncer.schedule(Duration::from_millis(300), async move {
            *counter.lock().unwrap() += 1;
        });
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(*runs.lock().unwrap(), 0);
    }
}
