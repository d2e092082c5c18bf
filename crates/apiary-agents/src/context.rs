//! Per-agent execution context and its control handle.
//!
//! Every agent task owns an [`AgentContext`]; the colony keeps the matching
//! [`ControlHandle`]. The pair carries two watch channels: a stop flag
//! flowing colony → agent (cooperative cancellation, observed only at loop
//! checkpoints) and the agent's lifecycle state flowing agent → colony.

use apiary_core::types::{AgentId, AgentRole, AgentState};
use tokio::sync::watch;

/// The agent-side half: identity, stop flag receiver, state publisher.
pub struct AgentContext {
    id: AgentId,
    role: AgentRole,
    state_tx: watch::Sender<AgentState>,
    stop_rx: watch::Receiver<bool>,
}

/// The colony-side half: stop flag sender, state observer.
pub struct ControlHandle {
    stop: watch::Sender<bool>,
    state: watch::Receiver<AgentState>,
}

impl AgentContext {
    /// Create a context/handle pair for a new agent.
    pub fn new(id: AgentId, role: AgentRole) -> (Self, ControlHandle) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(AgentState::Idle);
        (
            Self {
                id,
                role,
                state_tx,
                stop_rx,
            },
            ControlHandle {
                stop: stop_tx,
                state: state_rx,
            },
        )
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    /// Publish a lifecycle state transition.
    pub fn set_state(&self, state: AgentState) {
        // Send only fails when the colony dropped the handle, which also
        // means nobody is observing the state anymore.
        let _ = self.state_tx.send(state);
    }

    /// Whether the stop flag is raised. Checked at loop checkpoints.
    pub fn should_stop(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Resolve when the stop flag is raised (or the colony side is gone).
    ///
    /// Cancel-safe; intended for `tokio::select!` against a blocking
    /// component call or a latency sleep.
    pub async fn stopped(&mut self) {
        loop {
            if *self.stop_rx.borrow() {
                return;
            }
            if self.stop_rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl ControlHandle {
    /// Raise the stop flag. The agent honors it at its next checkpoint.
    pub fn signal_stop(&self) {
        let _ = self.stop.send(true);
    }

    /// The agent's last published lifecycle state.
    pub fn state(&self) -> AgentState {
        *self.state.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn stop_flag_resolves_the_stopped_future() {
        let (mut ctx, handle) = AgentContext::new(AgentId::from_seed(1), AgentRole::Scout);
        assert!(!ctx.should_stop());

        handle.signal_stop();
        timeout(Duration::from_secs(1), ctx.stopped())
            .await
            .expect("stopped() did not resolve");
        assert!(ctx.should_stop());
    }

    #[tokio::test]
    async fn state_transitions_are_observable() {
        let (ctx, handle) = AgentContext::new(AgentId::from_seed(2), AgentRole::Forager);
        assert_eq!(handle.state(), AgentState::Idle);

        ctx.set_state(AgentState::Working);
        assert_eq!(handle.state(), AgentState::Working);

        ctx.set_state(AgentState::Stopped);
        assert_eq!(handle.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn dropped_handle_counts_as_stop() {
        let (mut ctx, handle) = AgentContext::new(AgentId::from_seed(3), AgentRole::Soldier);
        drop(handle);
        timeout(Duration::from_secs(1), ctx.stopped())
            .await
            .expect("stopped() did not resolve after handle drop");
    }
}
