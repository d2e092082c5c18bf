//! Scout — discovers nectar sources and publishes them to the task board.
//!
//! Biological analog: scout bees range away from the hive and advertise
//! finds with a waggle dance. Here the ranging is a simulated discovery
//! latency and the dance is a non-blocking `publish`; the scout never
//! suspends on shared state.

use crate::context::AgentContext;
use apiary_core::board::TaskBoard;
use apiary_core::error::ApiaryError;
use apiary_core::metrics::ColonyMetrics;
use apiary_core::types::{AgentState, TaskItem};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Scout role: loop { discover (simulated latency) → publish → Idle }.
pub struct Scout {
    ctx: AgentContext,
    board: Arc<TaskBoard>,
    metrics: Arc<ColonyMetrics>,
    discovery_latency: Duration,
    yield_min: u64,
    yield_max: u64,
}

impl Scout {
    pub fn new(
        ctx: AgentContext,
        board: Arc<TaskBoard>,
        metrics: Arc<ColonyMetrics>,
        discovery_latency: Duration,
        yield_min: u64,
        yield_max: u64,
    ) -> Self {
        Self {
            ctx,
            board,
            metrics,
            discovery_latency,
            yield_min,
            yield_max,
        }
    }

    pub async fn run(mut self) {
        info!(agent_id = %self.ctx.id(), "scout started");
        loop {
            tokio::select! {
                _ = sleep(self.discovery_latency) => {}
                _ = self.ctx.stopped() => break,
            }
            if self.ctx.should_stop() {
                break;
            }

            self.ctx.set_state(AgentState::Working);
            let yield_amount = {
                let mut rng = rand::thread_rng();
                rng.gen_range(self.yield_min..=self.yield_max)
            };
            match self.board.publish(TaskItem::new(yield_amount)).await {
                Ok(()) => self.metrics.record_task_published(),
                Err(ApiaryError::Shutdown) => break,
                Err(error) => {
                    warn!(agent_id = %self.ctx.id(), %error, "publish rejected");
                }
            }
            self.ctx.set_state(AgentState::Idle);
        }
        self.ctx.set_state(AgentState::Stopped);
        info!(agent_id = %self.ctx.id(), "scout stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AgentContext;
    use apiary_core::types::{AgentId, AgentRole};
    use tokio::time::timeout;

    #[tokio::test]
    async fn scout_publishes_until_stopped() {
        let board = Arc::new(TaskBoard::new());
        let metrics = Arc::new(ColonyMetrics::new());
        let (ctx, handle) = AgentContext::new(AgentId::from_seed(1), AgentRole::Scout);

        let scout = Scout::new(
            ctx,
            Arc::clone(&board),
            Arc::clone(&metrics),
            Duration::from_millis(1),
            2,
            4,
        );
        let task = tokio::spawn(scout.run());

        timeout(Duration::from_secs(5), async {
            while board.backlog().await < 3 {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("scout produced nothing");

        handle.signal_stop();
        timeout(Duration::from_secs(5), task)
            .await
            .expect("scout did not stop")
            .unwrap();
        assert_eq!(handle.state(), AgentState::Stopped);

        let snapshot = metrics.snapshot();
        assert!(snapshot.tasks_published >= 3);
        while let Some(item) = board.try_claim().await {
            assert!((2..=4).contains(&item.yield_amount));
        }
    }

    #[tokio::test]
    async fn scout_stops_when_board_shuts_down() {
        let board = Arc::new(TaskBoard::new());
        let metrics = Arc::new(ColonyMetrics::new());
        let (ctx, _handle) = AgentContext::new(AgentId::from_seed(2), AgentRole::Scout);

        board.shutdown().await;
        let scout = Scout::new(ctx, board, metrics, Duration::from_millis(1), 1, 1);
        timeout(Duration::from_secs(5), tokio::spawn(scout.run()))
            .await
            .expect("scout did not observe board shutdown")
            .unwrap();
    }
}
