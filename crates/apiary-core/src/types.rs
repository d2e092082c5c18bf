//! Shared types used across all Apiary crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an agent in the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic ID (for testing).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(seed, seed))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task item on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic ID (for testing).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(seed, seed))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a threat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreatId(pub Uuid);

impl ThreatId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic ID (for testing).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(seed, seed))
    }
}

impl Default for ThreatId {
    fn default() -> Self {
        Self::new()
    }
}

/// A logical timestamp. Components stamp insert order from an internal
/// monotonic clock, so ordering never depends on producer wall clocks.
pub type Tick = u64;

/// The role an agent embodies in the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// Discovers nectar sources and publishes them to the task board.
    Scout,
    /// Claims discovered sources and deposits their yield into the pool.
    Forager,
    /// Takes threat events from the queue and resolves them.
    Soldier,
    /// Inspects colony state and rebalances role counts. Exactly one exists.
    Queen,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentRole::Scout => "scout",
            AgentRole::Forager => "forager",
            AgentRole::Soldier => "soldier",
            AgentRole::Queen => "queen",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle state of an agent.
///
/// Agents loop `Idle → Working → Idle` and transition to the terminal
/// `Stopped` only at a checkpoint between discrete steps — never while a
/// shared component is mid-mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    Idle,
    Working,
    Stopped,
}

/// A discovered nectar source awaiting collection.
///
/// Published by scouts, consumed exactly once by a single forager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: TaskId,
    /// Nectar units this source yields when collected. Always > 0 once past
    /// the producer boundary.
    pub yield_amount: u64,
    /// Stamped by the board at publish time.
    pub discovered_at: Tick,
}

impl TaskItem {
    pub fn new(yield_amount: u64) -> Self {
        Self {
            id: TaskId::new(),
            yield_amount,
            discovered_at: 0,
        }
    }
}

/// Severity of a threat. Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// A threat against the colony.
///
/// Delivered to exactly one soldier, highest severity first, FIFO within a
/// severity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatEvent {
    pub id: ThreatId,
    pub severity: Severity,
    /// Stamped by the queue at report time.
    pub arrived_at: Tick,
}

impl ThreatEvent {
    pub fn new(severity: Severity) -> Self {
        Self {
            id: ThreatId::new(),
            severity,
            arrived_at: 0,
        }
    }
}

/// A role-count adjustment decided by the queen.
///
/// The queen is the single writer of role-count decisions, but she never
/// touches the live-agent set herself: commands travel over a channel to the
/// colony supervisor, which applies them clamped to the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceCommand {
    Spawn(AgentRole),
    Retire(AgentRole),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_ids_are_deterministic() {
        assert_eq!(AgentId::from_seed(7), AgentId::from_seed(7));
        assert_ne!(AgentId::from_seed(7), AgentId::from_seed(8));
    }

    #[test]
    fn severity_orders_high_above_low() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
