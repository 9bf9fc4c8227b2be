//! Request pool lifecycle
//!
//! A [`RequestPool`] runs fetches as tasks on a tokio runtime owned by the
//! caller. The pool never starts a runtime or threads of its own. It tracks
//! every task it spawns so that [`RequestPool::shutdown`] can stop accepting
//! work and wait, for a bounded time, until the in-flight tasks finish.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::BattlefieldsError;

/// Handle to the caller's runtime plus tracking of submitted requests
#[derive(Debug, Clone)]
pub struct RequestPool {
    handle: Handle,
    tracker: TaskTracker,
    interrupt: CancellationToken,
}

impl RequestPool {
    /// Creates a pool that spawns onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tracker: TaskTracker::new(),
            interrupt: CancellationToken::new(),
        }
    }

    /// Creates a pool on the runtime of the calling task
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// The runtime this pool spawns onto
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Submits a request to run in the background
    ///
    /// # Errors
    /// * `BattlefieldsError::PoolShutdown` once `shutdown` has been called
    pub fn spawn<F>(&self, task: F) -> Result<JoinHandle<F::Output>, BattlefieldsError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self.tracker.is_closed() {
            return Err(BattlefieldsError::PoolShutdown);
        }
        Ok(self.tracker.spawn_on(task, &self.handle))
    }

    /// Number of submitted requests that have not finished
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Whether `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Interrupts any current or future `shutdown` wait
    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    /// Stops accepting work and waits up to `wait` for in-flight requests
    ///
    /// Returns `Ok(true)` if every request finished in time and `Ok(false)` if
    /// the wait elapsed first; unfinished tasks keep running on the runtime.
    /// A pool with nothing in flight reports `Ok(true)` without waiting.
    /// Calling this again waits on the same, already closed, pool.
    ///
    /// # Errors
    /// * `BattlefieldsError::Interrupted` if [`interrupt`](Self::interrupt) is
    ///   called while requests are still running
    pub async fn shutdown(&self, wait: Duration) -> Result<bool, BattlefieldsError> {
        self.tracker.close();
        tracing::debug!(in_flight = self.tracker.len(), "shutting down request pool");

        if self.tracker.is_empty() {
            return Ok(true);
        }

        tokio::select! {
            biased;
            _ = self.interrupt.cancelled() => Err(BattlefieldsError::Interrupted),
            drained = tokio::time::timeout(wait, self.tracker.wait()) => Ok(drained.is_ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_task_runs() {
        let pool = RequestPool::current();
        let handle = pool.spawn(async { 2 + 2 }).unwrap();
        assert_eq!(handle.await.unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_with_no_work_finishes() {
        let pool = RequestPool::current();
        assert!(pool.shutdown(Duration::from_secs(1)).await.unwrap());
        assert!(pool.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_short_work() {
        let pool = RequestPool::current();
        pool.spawn(tokio::time::sleep(Duration::from_millis(500))).unwrap();

        assert!(pool.shutdown(Duration::from_secs(1)).await.unwrap());
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_times_out_on_long_work() {
        let pool = RequestPool::current();
        pool.spawn(tokio::time::sleep(Duration::from_secs(30))).unwrap();

        assert!(!pool.shutdown(Duration::from_secs(1)).await.unwrap());
        assert_eq!(pool.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_spawn_after_shutdown_is_rejected() {
        let pool = RequestPool::current();
        pool.shutdown(Duration::from_millis(10)).await.unwrap();

        let result = pool.spawn(async {});
        assert!(matches!(result, Err(BattlefieldsError::PoolShutdown)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_shutdown() {
        let pool = RequestPool::current();
        pool.spawn(tokio::time::sleep(Duration::from_secs(30))).unwrap();
        pool.interrupt();

        let result = pool.shutdown(Duration::from_secs(60)).await;
        assert!(matches!(result, Err(BattlefieldsError::Interrupted)));
    }

    #[tokio::test]
    async fn test_interrupt_does_not_fail_shutdown_of_idle_pool() {
        let pool = RequestPool::current();
        pool.interrupt();
        assert!(pool.shutdown(Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_after_drained_interrupt_reports_success() {
        let pool = RequestPool::current();
        pool.spawn(tokio::time::sleep(Duration::from_millis(100))).unwrap();
        assert!(pool.shutdown(Duration::from_secs(1)).await.unwrap());

        pool.interrupt();
        assert!(pool.shutdown(Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_shutdown_waits_again() {
        let pool = RequestPool::current();
        pool.spawn(tokio::time::sleep(Duration::from_secs(5))).unwrap();

        assert!(!pool.shutdown(Duration::from_secs(1)).await.unwrap());
        assert!(pool.shutdown(Duration::from_secs(10)).await.unwrap());
    }

    #[test]
    fn test_pool_on_explicit_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let pool = RequestPool::new(runtime.handle().clone());

        let handle = pool.spawn(async { "done" }).unwrap();
        let finished = runtime.block_on(async {
            let value = handle.await.unwrap();
            let drained = pool.shutdown(Duration::from_secs(1)).await.unwrap();
            (value, drained)
        });

        assert_eq!(finished, ("done", true));
    }
}
