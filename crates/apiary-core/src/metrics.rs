//! Cumulative colony activity counters.
//!
//! Agents and the runtime record into one shared [`ColonyMetrics`] as they
//! work; [`snapshot`](ColonyMetrics::snapshot) produces a serializable view
//! for external reporting. Counters are monotonic and lock-free — they are
//! observability, not synchronization.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared activity counters, recorded by agents and the runtime.
#[derive(Debug, Default)]
pub struct ColonyMetrics {
    tasks_published: AtomicU64,
    tasks_claimed: AtomicU64,
    nectar_deposited: AtomicU64,
    nectar_overflow: AtomicU64,
    nectar_consumed: AtomicU64,
    threats_reported: AtomicU64,
    threats_resolved: AtomicU64,
    agents_spawned: AtomicU64,
    agents_retired: AtomicU64,
}

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub tasks_published: u64,
    pub tasks_claimed: u64,
    /// Nectar units actually absorbed by the pool.
    pub nectar_deposited: u64,
    /// Nectar units rejected by a full pool (the unabsorbed remainders).
    pub nectar_overflow: u64,
    /// Nectar units withdrawn by the queen for maintenance.
    pub nectar_consumed: u64,
    pub threats_reported: u64,
    pub threats_resolved: u64,
    pub agents_spawned: u64,
    pub agents_retired: u64,
}

impl ColonyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_task_published(&self) {
        self.tasks_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_claimed(&self) {
        self.tasks_claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deposit(&self, accepted: u64, overflow: u64) {
        self.nectar_deposited.fetch_add(accepted, Ordering::Relaxed);
        self.nectar_overflow.fetch_add(overflow, Ordering::Relaxed);
    }

    pub fn record_consumption(&self, granted: u64) {
        self.nectar_consumed.fetch_add(granted, Ordering::Relaxed);
    }

    pub fn record_threat_reported(&self) {
        self.threats_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_threat_resolved(&self) {
        self.threats_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_agent_spawned(&self) {
        self.agents_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_agent_retired(&self) {
        self.agents_retired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_published: self.tasks_published.load(Ordering::Relaxed),
            tasks_claimed: self.tasks_claimed.load(Ordering::Relaxed),
            nectar_deposited: self.nectar_deposited.load(Ordering::Relaxed),
            nectar_overflow: self.nectar_overflow.load(Ordering::Relaxed),
            nectar_consumed: self.nectar_consumed.load(Ordering::Relaxed),
            threats_reported: self.threats_reported.load(Ordering::Relaxed),
            threats_resolved: self.threats_resolved.load(Ordering::Relaxed),
            agents_spawned: self.agents_spawned.load(Ordering::Relaxed),
            agents_retired: self.agents_retired.load(Ordering::Relaxed),
        }
    }
}
