//! Live-agent registry.
//!
//! One entry per running agent task: its role, the control handle for
//! signaling stop and observing state, and the tokio join handle. The
//! registry is plain bookkeeping — callers lock it to add or remove entries
//! and release the lock before awaiting any join or component operation.

use apiary_agents::ControlHandle;
use apiary_core::types::{AgentId, AgentRole};
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Ownership record for one running agent task.
pub struct AgentHandle {
    pub role: AgentRole,
    pub control: ControlHandle,
    pub join: JoinHandle<()>,
}

/// The set of live worker agents, keyed by id.
///
/// The queen is not registered here; her lifecycle is pinned to the colony
/// itself and she is never a rebalance target.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, AgentHandle>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: AgentId, handle: AgentHandle) {
        self.agents.insert(id, handle);
    }

    /// Number of live agents of one role.
    pub fn count(&self, role: AgentRole) -> usize {
        self.agents.values().filter(|h| h.role == role).count()
    }

    pub fn total(&self) -> usize {
        self.agents.len()
    }

    /// Remove one agent of the given role, if any.
    ///
    /// Which one is unspecified. The caller signals stop and awaits the join
    /// handle after releasing the registry lock.
    pub fn remove_one(&mut self, role: AgentRole) -> Option<(AgentId, AgentHandle)> {
        let id = self
            .agents
            .iter()
            .find(|(_, h)| h.role == role)
            .map(|(id, _)| *id)?;
        self.agents.remove(&id).map(|handle| (id, handle))
    }

    /// Drain every entry, leaving the registry empty.
    pub fn take_all(&mut self) -> Vec<(AgentId, AgentHandle)> {
        self.agents.drain().collect()
    }
}
