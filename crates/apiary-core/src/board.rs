//! TaskBoard — the shared board of discovered nectar sources.
//!
//! Scouts publish task items, foragers claim them. Delivery is at most once:
//! no item is ever handed to two foragers, no matter how many claims race.
//!
//! `claim` is one of the system's two suspension points. A claimer with
//! nothing to take parks on an internal [`Notify`] and is woken either by
//! the next publish or by `shutdown`, which broadcasts a termination signal
//! to every parked claimer. After shutdown, remaining items are still handed
//! out to active claimers; whatever nobody takes is surfaced by [`drain`],
//! so no published item is ever lost silently.
//!
//! [`drain`]: TaskBoard::drain

use crate::error::{ApiaryError, Result};
use crate::types::{TaskItem, Tick};
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

struct BoardInner {
    queue: VecDeque<TaskItem>,
    /// Logical clock stamping publish order into `discovered_at`.
    clock: Tick,
    closed: bool,
}

/// Multi-producer/multi-consumer set of discoverable work items.
pub struct TaskBoard {
    inner: Mutex<BoardInner>,
    /// Wakes claimers: one permit per publish, broadcast on shutdown.
    notify: Notify,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BoardInner {
                queue: VecDeque::new(),
                clock: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Publish a discovered source. Non-blocking; never drops a valid item.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero-yield item (rejected at the producer
    /// boundary, never enters the board) and `Shutdown` once the board is
    /// shut down.
    pub async fn publish(&self, mut item: TaskItem) -> Result<()> {
        if item.yield_amount == 0 {
            return Err(ApiaryError::validation("task yield must be > 0"));
        }
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(ApiaryError::Shutdown);
        }
        item.discovered_at = inner.clock;
        inner.clock += 1;
        debug!(task_id = %item.id.0, yield_amount = item.yield_amount, "published task");
        inner.queue.push_back(item);
        drop(inner);
        // Stores a permit if no claimer is parked, so the wakeup is never lost.
        self.notify.notify_one();
        Ok(())
    }

    /// Atomically remove and return one item, suspending while the board is
    /// empty. Returns `None` once the board is shut down and empty.
    pub async fn claim(&self) -> Option<TaskItem> {
        loop {
            // Register interest before the emptiness check so a shutdown
            // broadcast between check and park cannot be missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if let Some(item) = inner.queue.pop_front() {
                    debug!(task_id = %item.id.0, "claimed task");
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Non-blocking claim: one item if present, else `None` immediately.
    pub async fn try_claim(&self) -> Option<TaskItem> {
        self.inner.lock().await.queue.pop_front()
    }

    /// Shut the board down, waking every parked claimer with the
    /// termination signal. Idempotent.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        inner.closed = true;
        let pending = inner.queue.len();
        drop(inner);
        debug!(pending, "task board shut down");
        self.notify.notify_waiters();
    }

    /// Remove and return every pending item. Used after shutdown to report
    /// items no forager drained.
    pub async fn drain(&self) -> Vec<TaskItem> {
        self.inner.lock().await.queue.drain(..).collect()
    }

    /// Number of unclaimed items.
    pub async fn backlog(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    /// Whether `shutdown` has been called.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}
