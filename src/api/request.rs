//! # Cancellable Requests
//!
//! Every backend call is spawned onto tokio together with the callback that
//! delivers its result. The caller keeps a `CancelHandle`; cancelling it
//! (or dropping it, which is what happens when a view is torn down) aborts
//! the task and guarantees the callback never runs afterwards.
//!
//! ```text
//! view ──spawn_cancellable──► task: future.await ─► lock ─► on_complete()
//!   │                                                 ▲
//!   └── drop / cancel() ────────── lock, mark, abort ─┘
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::task::AbortHandle;

/// Owner-side handle for an in-flight request.
#[derive(Debug)]
pub struct CancelHandle {
    label: String,
    cancelled: Arc<Mutex<bool>>,
    abort: AbortHandle,
}

impl CancelHandle {
    /// Marks the request cancelled and aborts its task. Idempotent.
    ///
    /// Once this returns, the completion callback will not run.
    pub fn cancel(&self) {
        let mut cancelled = self.cancelled.lock().unwrap_or_else(|e| e.into_inner());
        if !*cancelled {
            debug!("Cancelling request: {}", self.label);
            *cancelled = true;
        }
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns `future` and hands its output to `on_complete` unless the returned
/// handle is cancelled first. Must be called from within a tokio runtime.
pub fn spawn_cancellable<T, F, C>(label: impl Into<String>, future: F, on_complete: C) -> CancelHandle
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    let label = label.into();
    let cancelled = Arc::new(Mutex::new(false));

    let task_cancelled = cancelled.clone();
    let task_label = label.clone();
    let handle = tokio::spawn(async move {
        let output = future.await;
        // Held across the callback so cancel() cannot slip in between
        let guard = task_cancelled.lock().unwrap_or_else(|e| e.into_inner());
        if *guard {
            debug!("Request {} finished after cancellation, dropping result", task_label);
            return;
        }
        on_complete(output);
    });

    CancelHandle {
        label,
        cancelled,
        abort: handle.abort_handle(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completion_delivered_when_not_cancelled() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_cancellable("ok", async { 42 }, move |v| {
            tx.send(v).unwrap();
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rx.try_recv().unwrap(), 42);
        assert!(!handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_before_completion_suppresses_callback() {
        let (tx, rx) = mpsc::channel::<u32>();
        let handle = spawn_cancellable(
            "slow",
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                7
            },
            move |v| {
                let _ = tx.send(v);
            },
        );
        handle.cancel();
        assert!(handle.is_cancelled());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (tx, rx) = mpsc::channel::<u32>();
        {
            let _handle = spawn_cancellable(
                "dropped",
                async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    1
                },
                move |v| {
                    let _ = tx.send(v);
                },
            );
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let handle = spawn_cancellable("twice", async {}, |_| {});
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }
}
