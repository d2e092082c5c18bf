//! Queen — inspects colony state and rebalances role counts.
//!
//! Exactly one queen exists, making her the single writer of role-count
//! decisions, but she never mutates the live-agent set herself: decisions
//! travel as [`RebalanceCommand`]s over a channel to the colony supervisor,
//! which applies them clamped to the configured bounds. The queen holds no
//! component lock while deciding and never blocks on a component operation,
//! only on her own tick interval.
//!
//! Each tick she also withdraws a fixed maintenance ration from the pool —
//! the colony eats.

use crate::context::AgentContext;
use apiary_core::board::TaskBoard;
use apiary_core::metrics::ColonyMetrics;
use apiary_core::pool::ResourcePool;
use apiary_core::threats::ThreatQueue;
use apiary_core::types::{AgentRole, AgentState, RebalanceCommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Rebalance thresholds, lifted from `ColonyConfig` at spawn time.
#[derive(Debug, Clone, Copy)]
pub struct QueenPolicy {
    /// Interval between inspections.
    pub tick: Duration,
    /// Nectar withdrawn per tick for colony maintenance.
    pub consumption: u64,
    /// Board backlog above which a forager is requested.
    pub board_high_watermark: usize,
    /// Threat backlog above which a soldier is requested.
    pub threat_high_watermark: usize,
}

/// Queen role: loop { tick → consume maintenance → inspect → command }.
pub struct Queen {
    ctx: AgentContext,
    pool: Arc<ResourcePool>,
    board: Arc<TaskBoard>,
    threats: Arc<ThreatQueue>,
    metrics: Arc<ColonyMetrics>,
    commands: mpsc::Sender<RebalanceCommand>,
    policy: QueenPolicy,
}

impl Queen {
    pub fn new(
        ctx: AgentContext,
        pool: Arc<ResourcePool>,
        board: Arc<TaskBoard>,
        threats: Arc<ThreatQueue>,
        metrics: Arc<ColonyMetrics>,
        commands: mpsc::Sender<RebalanceCommand>,
        policy: QueenPolicy,
    ) -> Self {
        Self {
            ctx,
            pool,
            board,
            threats,
            metrics,
            commands,
            policy,
        }
    }

    /// Decide rebalancing from one consistent inspection.
    ///
    /// At most one step per role per tick; the supervisor clamps every
    /// command to the configured min/max, so the policy can only ever be
    /// wrong about throughput, never about safety.
    fn decide(
        &self,
        level: u64,
        board_backlog: usize,
        threat_backlog: usize,
    ) -> Vec<RebalanceCommand> {
        let mut commands = Vec::new();

        if board_backlog > self.policy.board_high_watermark {
            // Sources pile up faster than foragers clear them.
            commands.push(RebalanceCommand::Spawn(AgentRole::Forager));
        } else if board_backlog == 0 {
            // Foragers are starved; send out more scouts.
            commands.push(RebalanceCommand::Spawn(AgentRole::Scout));
        }

        if level >= self.pool.capacity() {
            // Nowhere to put more nectar.
            commands.push(RebalanceCommand::Retire(AgentRole::Scout));
        }

        if threat_backlog > self.policy.threat_high_watermark {
            commands.push(RebalanceCommand::Spawn(AgentRole::Soldier));
        } else if threat_backlog == 0 {
            commands.push(RebalanceCommand::Retire(AgentRole::Soldier));
        }

        commands
    }

    pub async fn run(mut self) {
        info!(agent_id = %self.ctx.id(), "queen started");
        let mut ticker = interval(self.policy.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        'reign: loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.ctx.stopped() => break,
            }
            if self.ctx.should_stop() {
                break;
            }

            self.ctx.set_state(AgentState::Working);

            // Colony maintenance: the queen is the pool's only consumer.
            if self.policy.consumption > 0 {
                if let Ok(granted) = self.pool.withdraw(self.policy.consumption).await {
                    self.metrics.record_consumption(granted);
                }
            }

            let level = self.pool.snapshot().await;
            let board_backlog = self.board.backlog().await;
            let threat_backlog = self.threats.backlog().await;
            debug!(
                agent_id = %self.ctx.id(),
                level,
                board_backlog,
                threat_backlog,
                "queen inspection"
            );

            for command in self.decide(level, board_backlog, threat_backlog) {
                if self.commands.send(command).await.is_err() {
                    // Supervisor is gone — the colony is shutting down.
                    break 'reign;
                }
            }

            self.ctx.set_state(AgentState::Idle);
        }
        self.ctx.set_state(AgentState::Stopped);
        info!(agent_id = %self.ctx.id(), "queen stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AgentContext;
    use apiary_core::types::{AgentId, TaskItem};
    use tokio::time::timeout;

    fn queen_under_test(
        pool: Arc<ResourcePool>,
        board: Arc<TaskBoard>,
        threats: Arc<ThreatQueue>,
    ) -> (
        Queen,
        crate::context::ControlHandle,
        mpsc::Receiver<RebalanceCommand>,
        Arc<ColonyMetrics>,
    ) {
        let metrics = Arc::new(ColonyMetrics::new());
        let (ctx, handle) = AgentContext::new(AgentId::from_seed(42), AgentRole::Queen);
        let (command_tx, command_rx) = mpsc::channel(32);
        let queen = Queen::new(
            ctx,
            pool,
            board,
            threats,
            Arc::clone(&metrics),
            command_tx,
            QueenPolicy {
                tick: Duration::from_millis(5),
                consumption: 2,
                board_high_watermark: 3,
                threat_high_watermark: 1,
            },
        );
        (queen, handle, command_rx, metrics)
    }

    #[tokio::test]
    async fn backlogged_board_requests_a_forager() {
        let pool = Arc::new(ResourcePool::new(100));
        let board = Arc::new(TaskBoard::new());
        let threats = Arc::new(ThreatQueue::new());
        for _ in 0..10 {
            board.publish(TaskItem::new(1)).await.unwrap();
        }

        let (queen, handle, mut command_rx, _metrics) =
            queen_under_test(pool, board, threats);
        let task = tokio::spawn(queen.run());

        let spawn_seen = timeout(Duration::from_secs(5), async {
            loop {
                match command_rx.recv().await {
                    Some(RebalanceCommand::Spawn(AgentRole::Forager)) => break true,
                    Some(_) => continue,
                    None => break false,
                }
            }
        })
        .await
        .expect("queen issued no commands");
        assert!(spawn_seen);

        handle.signal_stop();
        timeout(Duration::from_secs(5), task)
            .await
            .expect("queen did not stop")
            .unwrap();
        assert_eq!(handle.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn empty_board_requests_a_scout() {
        let pool = Arc::new(ResourcePool::new(100));
        let board = Arc::new(TaskBoard::new());
        let threats = Arc::new(ThreatQueue::new());

        let (queen, handle, mut command_rx, _metrics) =
            queen_under_test(pool, board, threats);
        let task = tokio::spawn(queen.run());

        let scout_seen = timeout(Duration::from_secs(5), async {
            loop {
                match command_rx.recv().await {
                    Some(RebalanceCommand::Spawn(AgentRole::Scout)) => break true,
                    Some(_) => continue,
                    None => break false,
                }
            }
        })
        .await
        .expect("queen issued no commands");
        assert!(scout_seen);

        handle.signal_stop();
        timeout(Duration::from_secs(5), task).await.expect("queen hung").unwrap();
    }

    #[tokio::test]
    async fn maintenance_consumption_draws_from_the_pool() {
        let pool = Arc::new(ResourcePool::new(100));
        pool.deposit(50).await.unwrap();
        let board = Arc::new(TaskBoard::new());
        let threats = Arc::new(ThreatQueue::new());

        let (queen, handle, mut command_rx, metrics) =
            queen_under_test(Arc::clone(&pool), board, threats);
        let task = tokio::spawn(queen.run());
        // Keep the channel drained so the queen never blocks on send.
        let drain = tokio::spawn(async move { while command_rx.recv().await.is_some() {} });

        timeout(Duration::from_secs(5), async {
            while metrics.snapshot().nectar_consumed < 4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("queen consumed nothing");

        handle.signal_stop();
        timeout(Duration::from_secs(5), task).await.expect("queen hung").unwrap();
        drain.abort();

        assert!(pool.snapshot().await < 50);
    }

    #[tokio::test]
    async fn threat_backlog_requests_a_soldier() {
        use apiary_core::types::{Severity, ThreatEvent};

        let pool = Arc::new(ResourcePool::new(100));
        let board = Arc::new(TaskBoard::new());
        // Keep the board non-empty so the scout branch stays quiet.
        board.publish(TaskItem::new(1)).await.unwrap();
        let threats = Arc::new(ThreatQueue::new());
        for _ in 0..4 {
            threats.report(ThreatEvent::new(Severity::High)).await.unwrap();
        }

        let (queen, handle, mut command_rx, _metrics) =
            queen_under_test(pool, board, threats);
        let task = tokio::spawn(queen.run());

        let soldier_seen = timeout(Duration::from_secs(5), async {
            loop {
                match command_rx.recv().await {
                    Some(RebalanceCommand::Spawn(AgentRole::Soldier)) => break true,
                    Some(_) => continue,
                    None => break false,
                }
            }
        })
        .await
        .expect("queen issued no commands");
        assert!(soldier_seen);

        handle.signal_stop();
        timeout(Duration::from_secs(5), task).await.expect("queen hung").unwrap();
    }
}
