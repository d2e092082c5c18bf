//! Soldier — takes threat events and resolves them.
//!
//! Biological analog: guard bees at the hive entrance. Soldiers compete for
//! nothing but the queue itself; each event goes to exactly one soldier,
//! highest severity first. Resolution is simulated latency — once an event
//! is taken it is always resolved, and the stop flag is honored at the next
//! checkpoint.

use crate::context::AgentContext;
use apiary_core::metrics::ColonyMetrics;
use apiary_core::threats::ThreatQueue;
use apiary_core::types::AgentState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Soldier role: loop { take (suspends if empty) → resolve → Idle }.
pub struct Soldier {
    ctx: AgentContext,
    threats: Arc<ThreatQueue>,
    metrics: Arc<ColonyMetrics>,
    resolve_latency: Duration,
}

impl Soldier {
    pub fn new(
        ctx: AgentContext,
        threats: Arc<ThreatQueue>,
        metrics: Arc<ColonyMetrics>,
        resolve_latency: Duration,
    ) -> Self {
        Self {
            ctx,
            threats,
            metrics,
            resolve_latency,
        }
    }

    pub async fn run(mut self) {
        info!(agent_id = %self.ctx.id(), "soldier started");
        loop {
            let taken = tokio::select! {
                event = self.threats.take() => event,
                _ = self.ctx.stopped() => break,
            };
            // None means the queue shut down and drained.
            let Some(event) = taken else { break };

            self.ctx.set_state(AgentState::Working);
            sleep(self.resolve_latency).await;
            self.metrics.record_threat_resolved();
            debug!(
                agent_id = %self.ctx.id(),
                threat_id = %event.id.0,
                severity = %event.severity,
                "threat resolved"
            );
            self.ctx.set_state(AgentState::Idle);

            if self.ctx.should_stop() {
                break;
            }
        }
        self.ctx.set_state(AgentState::Stopped);
        info!(agent_id = %self.ctx.id(), "soldier stopped");
    }
}
