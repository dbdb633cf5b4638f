//! Hand-off of work from I/O threads to the sync thread.

use std::thread::{self, ThreadId};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::error;

use crate::error::{SyncError, SyncResult};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Queue of closures executed on the thread that created it.
///
/// Other threads post through a [`DispatcherHandle`]; the owner runs the
/// backlog once per tick with [`run_pending`](Self::run_pending).
#[derive(Debug)]
pub struct MainThreadDispatcher {
    owner: ThreadId,
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

/// Cloneable poster for a [`MainThreadDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: Sender<Task>,
}

impl DispatcherHandle {
    /// Queues `task` for the next tick. Returns `false` once the dispatcher is gone.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

impl Default for MainThreadDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MainThreadDispatcher {
    /// Creates a dispatcher owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            owner: thread::current().id(),
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            tx: self.tx.clone(),
        }
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Fails with [`SyncError::WrongThread`] off the owning thread.
    pub fn ensure_owner(&self, operation: &'static str) -> SyncResult<()> {
        if self.is_owner() {
            return Ok(());
        }
        error!(operation, "scene access from a foreign thread");
        Err(SyncError::WrongThread { operation })
    }

    /// Runs every task posted so far; returns how many ran.
    pub fn run_pending(&self) -> SyncResult<usize> {
        self.ensure_owner("run_pending")?;
        let mut ran = 0;
        for task in self.rx.try_iter() {
            task();
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn tasks_run_on_owner_in_post_order() {
        let dispatcher = MainThreadDispatcher::new();
        let (seen_tx, seen_rx) = unbounded();
        let handle = dispatcher.handle();
        thread::spawn(move || {
            for i in 0..3 {
                let seen_tx = seen_tx.clone();
                assert!(handle.post(move || {
                    seen_tx.send((i, thread::current().id())).unwrap();
                }));
            }
        })
        .join()
        .unwrap();

        assert_eq!(dispatcher.run_pending().unwrap(), 3);
        let seen: Vec<_> = seen_rx.try_iter().collect();
        let owner = thread::current().id();
        assert_eq!(seen, vec![(0, owner), (1, owner), (2, owner)]);
        assert_eq!(dispatcher.run_pending().unwrap(), 0);
    }

    #[test]
    fn foreign_thread_is_rejected() {
        let dispatcher = Arc::new(MainThreadDispatcher::new());
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let ran = Arc::clone(&ran);
            dispatcher.handle().post(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            });
        }
        let remote = Arc::clone(&dispatcher);
        let result = thread::spawn(move || remote.run_pending().map_err(|err| err.to_string()))
            .join()
            .unwrap();
        assert_eq!(result.unwrap_err(), "run_pending called off the sync thread");
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(dispatcher.ensure_owner("tick").is_ok());
        assert_eq!(dispatcher.run_pending().unwrap(), 1);
    }

    #[test]
    fn post_after_drop_fails() {
        let handle = MainThreadDispatcher::new().handle();
        assert!(!handle.post(|| {}));
    }
}
