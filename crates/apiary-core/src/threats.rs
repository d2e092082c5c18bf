//! ThreatQueue — severity-then-FIFO queue of threat events.
//!
//! Producers (the environment, or external callers through the colony)
//! report threats; soldiers take them. A High-severity event is always
//! serviced before any Medium or Low event, even one that arrived earlier;
//! within one severity class delivery is strict FIFO by arrival. The queue
//! keeps one deque per class, so the class order is simply push order, and
//! stamps `arrived_at` from an internal logical clock at report time to make
//! the tie-break total.
//!
//! `take` is the system's other suspension point, with the same wake
//! discipline as the task board: one permit per report, broadcast on
//! shutdown.

use crate::error::{ApiaryError, Result};
use crate::types::{Severity, ThreatEvent, Tick};
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tracing::debug;

struct ThreatInner {
    high: VecDeque<ThreatEvent>,
    medium: VecDeque<ThreatEvent>,
    low: VecDeque<ThreatEvent>,
    clock: Tick,
    closed: bool,
}

impl ThreatInner {
    fn class(&mut self, severity: Severity) -> &mut VecDeque<ThreatEvent> {
        match severity {
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }

    fn pop_priority(&mut self) -> Option<ThreatEvent> {
        self.high
            .pop_front()
            .or_else(|| self.medium.pop_front())
            .or_else(|| self.low.pop_front())
    }

    fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }
}

/// Ordered queue of threat events, consumed by soldiers.
pub struct ThreatQueue {
    inner: Mutex<ThreatInner>,
    notify: Notify,
}

impl ThreatQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ThreatInner {
                high: VecDeque::new(),
                medium: VecDeque::new(),
                low: VecDeque::new(),
                clock: 0,
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Report a threat. Non-blocking insert preserving severity-then-arrival
    /// order; the event's `arrived_at` is stamped here.
    ///
    /// # Errors
    ///
    /// Returns `Shutdown` once the queue is shut down.
    pub async fn report(&self, mut event: ThreatEvent) -> Result<Tick> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(ApiaryError::Shutdown);
        }
        let arrived_at = inner.clock;
        inner.clock += 1;
        event.arrived_at = arrived_at;
        debug!(threat_id = %event.id.0, severity = %event.severity, arrived_at, "threat reported");
        inner.class(event.severity).push_back(event);
        drop(inner);
        self.notify.notify_one();
        Ok(arrived_at)
    }

    /// Remove and return the highest-priority, earliest-arrived event,
    /// suspending while the queue is empty. Returns `None` once the queue is
    /// shut down and empty. No event is delivered to two soldiers.
    pub async fn take(&self) -> Option<ThreatEvent> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if let Some(event) = inner.pop_priority() {
                    debug!(threat_id = %event.id.0, severity = %event.severity, "threat taken");
                    return Some(event);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Non-blocking take: the highest-priority event if any, else `None`.
    pub async fn try_take(&self) -> Option<ThreatEvent> {
        self.inner.lock().await.pop_priority()
    }

    /// Shut the queue down, waking every parked soldier with the
    /// termination signal. Idempotent.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        inner.closed = true;
        let pending = inner.len();
        drop(inner);
        debug!(pending, "threat queue shut down");
        self.notify.notify_waiters();
    }

    /// Remove and return every pending event in priority order. Used after
    /// shutdown to report threats no soldier serviced.
    pub async fn drain(&self) -> Vec<ThreatEvent> {
        let mut inner = self.inner.lock().await;
        let mut events = Vec::with_capacity(inner.len());
        while let Some(event) = inner.pop_priority() {
            events.push(event);
        }
        events
    }

    /// Number of unserviced events.
    pub async fn backlog(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether `shutdown` has been called.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }
}

impl Default for ThreatQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn high_severity_preempts_earlier_arrivals() {
        let queue = ThreatQueue::new();
        let low_1 = queue.report(ThreatEvent::new(Severity::Low)).await.unwrap();
        let high = queue.report(ThreatEvent::new(Severity::High)).await.unwrap();
        let low_2 = queue.report(ThreatEvent::new(Severity::Low)).await.unwrap();

        let first = queue.take().await.unwrap();
        assert_eq!(first.severity, Severity::High);
        assert_eq!(first.arrived_at, high);

        let second = queue.take().await.unwrap();
        assert_eq!(second.severity, Severity::Low);
        assert_eq!(second.arrived_at, low_1);

        let third = queue.take().await.unwrap();
        assert_eq!(third.severity, Severity::Low);
        assert_eq!(third.arrived_at, low_2);
    }

    #[tokio::test]
    async fn fifo_holds_within_a_severity_class() {
        let queue = ThreatQueue::new();
        let mut arrivals = Vec::new();
        for _ in 0..5 {
            arrivals.push(queue.report(ThreatEvent::new(Severity::Medium)).await.unwrap());
        }
        for expected in arrivals {
            assert_eq!(queue.take().await.unwrap().arrived_at, expected);
        }
    }

    #[tokio::test]
    async fn medium_outranks_low_but_not_high() {
        let queue = ThreatQueue::new();
        queue.report(ThreatEvent::new(Severity::Low)).await.unwrap();
        queue.report(ThreatEvent::new(Severity::Medium)).await.unwrap();
        queue.report(ThreatEvent::new(Severity::High)).await.unwrap();

        assert_eq!(queue.take().await.unwrap().severity, Severity::High);
        assert_eq!(queue.take().await.unwrap().severity, Severity::Medium);
        assert_eq!(queue.take().await.unwrap().severity, Severity::Low);
    }

    #[tokio::test]
    async fn take_suspends_until_report() {
        let queue = Arc::new(ThreatQueue::new());
        let soldier = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.take().await })
        };

        tokio::task::yield_now().await;
        queue.report(ThreatEvent::new(Severity::Medium)).await.unwrap();

        let event = timeout(Duration::from_secs(5), soldier)
            .await
            .expect("soldier hung")
            .unwrap();
        assert_eq!(event.unwrap().severity, Severity::Medium);
    }

    #[tokio::test]
    async fn shutdown_wakes_blocked_soldiers_and_rejects_reports() {
        let queue = Arc::new(ThreatQueue::new());
        let soldier = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.take().await })
        };

        tokio::task::yield_now().await;
        queue.shutdown().await;
        queue.shutdown().await; // idempotent

        let result = timeout(Duration::from_secs(5), soldier)
            .await
            .expect("soldier hung")
            .unwrap();
        assert!(result.is_none());

        assert!(matches!(
            queue.report(ThreatEvent::new(Severity::High)).await,
            Err(ApiaryError::Shutdown)
        ));
    }

    #[tokio::test]
    async fn drain_reports_unserviced_events_in_priority_order() {
        let queue = ThreatQueue::new();
        queue.report(ThreatEvent::new(Severity::Low)).await.unwrap();
        queue.report(ThreatEvent::new(Severity::High)).await.unwrap();
        queue.shutdown().await;

        let pending = queue.drain().await;
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].severity, Severity::High);
        assert_eq!(queue.backlog().await, 0);
    }
}
