//! Forager — claims discovered sources and deposits their yield.
//!
//! Biological analog: forager bees fly to advertised sources and haul
//! nectar back to the comb. The claim is the role's only suspension point;
//! a forager parked on an empty board is woken by the next publish or by
//! shutdown, at which point it stops.

use crate::context::AgentContext;
use apiary_core::board::TaskBoard;
use apiary_core::metrics::ColonyMetrics;
use apiary_core::pool::ResourcePool;
use apiary_core::types::AgentState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Forager role: loop { claim (suspends if empty) → haul → deposit → Idle }.
pub struct Forager {
    ctx: AgentContext,
    board: Arc<TaskBoard>,
    pool: Arc<ResourcePool>,
    metrics: Arc<ColonyMetrics>,
    haul_latency: Duration,
}

impl Forager {
    pub fn new(
        ctx: AgentContext,
        board: Arc<TaskBoard>,
        pool: Arc<ResourcePool>,
        metrics: Arc<ColonyMetrics>,
        haul_latency: Duration,
    ) -> Self {
        Self {
            ctx,
            board,
            pool,
            metrics,
            haul_latency,
        }
    }

    pub async fn run(mut self) {
        info!(agent_id = %self.ctx.id(), "forager started");
        loop {
            let claimed = tokio::select! {
                item = self.board.claim() => item,
                _ = self.ctx.stopped() => break,
            };
            // None means the board shut down and drained.
            let Some(item) = claimed else { break };

            self.ctx.set_state(AgentState::Working);
            self.metrics.record_task_claimed();
            sleep(self.haul_latency).await;

            // A claimed item is never dropped: the deposit happens even if
            // the stop flag was raised mid-haul; stop is honored at the next
            // checkpoint.
            match self.pool.deposit(item.yield_amount).await {
                Ok(accepted) => {
                    let overflow = item.yield_amount - accepted;
                    self.metrics.record_deposit(accepted, overflow);
                    if overflow > 0 {
                        debug!(
                            agent_id = %self.ctx.id(),
                            task_id = %item.id.0,
                            overflow,
                            "pool full, yield partially absorbed"
                        );
                    }
                }
                Err(error) => {
                    // Unreachable for board-validated items; log, don't crash.
                    warn!(agent_id = %self.ctx.id(), %error, "deposit rejected");
                }
            }
            self.ctx.set_state(AgentState::Idle);

            if self.ctx.should_stop() {
                break;
            }
        }
        self.ctx.set_state(AgentState::Stopped);
        info!(agent_id = %self.ctx.id(), "forager stopped");
    }
}
