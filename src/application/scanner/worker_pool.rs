use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Bounded pool of async workers.
///
/// The permit set lives as long as the pool, so the same bound holds across
/// every batch submitted to it.
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of tasks currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.size - self.permits.available_permits()
    }

    /// Run `task` for every item with at most `size` running at once.
    ///
    /// Results come back in completion order, each paired with its input. A
    /// task that panics yields `Err(JoinError)` for its item; the rest of the
    /// batch is unaffected.
    pub async fn run_unordered<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        task: F,
    ) -> Vec<(T, Result<R, JoinError>)>
    where
        T: Clone + Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = items.len();
        let mut running = FuturesUnordered::new();

        for item in items {
            let permits = Arc::clone(&self.permits);
            let work = task(item.clone());
            let handle = tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only waits
                let _permit = permits.acquire_owned().await.ok();
                work.await
            });
            running.push(async move { (item, handle.await) });
        }

        let mut completed = Vec::with_capacity(total);
        while let Some(done) = running.next().await {
            completed.push(done);
        }
        completed
    }
}
