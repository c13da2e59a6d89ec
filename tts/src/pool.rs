use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// A bounded set of tokio tasks.
///
/// At most `size` submitted futures run at once; the rest wait for a slot.
/// Dropping the pool detaches its tasks rather than aborting them.
pub struct WorkerPool<T> {
    permits: Arc<Semaphore>,
    size: usize,
    handles: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// A zero size is bumped to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
            handles: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Spawn `fut`; it starts once a slot frees up and holds it until done.
    pub fn submit<F>(&mut self, fut: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.handles.push(tokio::spawn(async move {
            // The semaphore is never closed, so this only holds the slot.
            let _permit = permits.acquire_owned().await.ok();
            fut.await
        }));
    }

    /// Wait for every task, returning results in submission order.
    pub async fn join(self) -> Vec<Result<T, JoinError>> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            results.push(handle.await);
        }
        results
    }
}
