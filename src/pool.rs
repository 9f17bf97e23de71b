//! Worker pool for member calls.
//!
//! Member workers are blocking jobs: they call into invokers that may block
//! on I/O or on placeholders. They run on the blocking pool of a tokio
//! runtime, which bounds the number of worker threads and queues the rest.

use std::fmt;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::config::PoolConfig;

/// Runs member workers on a bounded set of threads.
pub struct WorkerPool {
    handle: Handle,
    /// Present when this pool owns its runtime rather than borrowing one.
    owned: Option<Runtime>,
    max_workers: usize,
}

impl WorkerPool {
    /// Build a pool with its own runtime.
    pub fn new(config: &PoolConfig) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_workers)
            .thread_name(config.thread_name.clone())
            .thread_keep_alive(Duration::from_millis(config.keep_alive_ms))
            .enable_all()
            .build()?;

        debug!(
            pool.max_workers = config.max_workers,
            pool.thread_name = %config.thread_name,
            "Worker pool started"
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
            max_workers: config.max_workers,
        })
    }

    /// Run workers on the blocking pool of an existing runtime.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
            max_workers: 0,
        }
    }

    /// Upper bound on concurrent workers; 0 when the embedding runtime decides.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Submit a job. The job runs at most once; it is dropped unrun if the
    /// runtime shuts down first.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        drop(self.handle.spawn_blocking(job));
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Queued jobs are dropped, running ones are left to finish detached.
        if let Some(runtime) = self.owned.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("owned", &self.owned.is_some())
            .field("max_workers", &self.max_workers)
            .finish()
    }
}
