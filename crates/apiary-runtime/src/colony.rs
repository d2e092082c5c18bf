//! Colony — agent lifecycle management.
//!
//! The colony is the organism. It owns the three shared components (pool,
//! board, threat queue), the live-agent registry, and the supervisor task
//! that applies the queen's rebalance commands. `start` brings the initial
//! population up; `stop` tears everything down and does not return until
//! every agent has observably stopped. Both are idempotent.
//!
//! Lock discipline: the registry lock is held only for bookkeeping, never
//! across a join or a component await. Agent panics surface at the join
//! boundary as warnings; they never take the colony down.

use crate::environment::ThreatGenerator;
use crate::registry::{AgentHandle, AgentRegistry};
use apiary_agents::{AgentContext, ControlHandle, Forager, Queen, QueenPolicy, Scout, Soldier};
use apiary_core::board::TaskBoard;
use apiary_core::config::ColonyConfig;
use apiary_core::error::{ApiaryError, Result};
use apiary_core::metrics::{ColonyMetrics, MetricsSnapshot};
use apiary_core::pool::ResourcePool;
use apiary_core::threats::ThreatQueue;
use apiary_core::types::{AgentId, AgentRole, RebalanceCommand, Severity, ThreatEvent, Tick};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Rebalance commands buffered between the queen and the supervisor.
const COMMAND_CHANNEL_DEPTH: usize = 64;

/// A point-in-time view of the colony.
///
/// Each field is read under its own component's lock; the snapshot is
/// consistent per component, not across components.
#[derive(Debug, Clone, Serialize)]
pub struct ColonyStatus {
    pub running: bool,
    pub pool_level: u64,
    pub pool_capacity: u64,
    pub board_backlog: usize,
    pub threat_backlog: usize,
    pub scouts: usize,
    pub foragers: usize,
    pub soldiers: usize,
    pub metrics: MetricsSnapshot,
}

enum Phase {
    Created,
    Running,
    Stopped,
}

/// Handles owned by a running colony, torn down in `stop`.
struct Lifecycle {
    phase: Phase,
    supervisor: Option<(watch::Sender<bool>, JoinHandle<()>)>,
    queen: Option<(AgentId, ControlHandle, JoinHandle<()>)>,
    environment: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

/// The colony: components, registry, and lifecycle.
pub struct Colony {
    config: ColonyConfig,
    pool: Arc<ResourcePool>,
    board: Arc<TaskBoard>,
    threats: Arc<ThreatQueue>,
    metrics: Arc<ColonyMetrics>,
    registry: Arc<Mutex<AgentRegistry>>,
    lifecycle: Mutex<Lifecycle>,
    running: AtomicBool,
}

impl Colony {
    /// Create a colony with default configuration.
    pub fn new() -> Self {
        // The default config always validates.
        match Self::from_config(ColonyConfig::default()) {
            Ok(colony) => colony,
            Err(_) => unreachable!("default configuration is valid"),
        }
    }

    /// Create a colony with custom settings. Fails on invalid configuration.
    pub fn from_config(config: ColonyConfig) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(ResourcePool::new(config.pool_capacity));
        Ok(Self {
            config,
            pool,
            board: Arc::new(TaskBoard::new()),
            threats: Arc::new(ThreatQueue::new()),
            metrics: Arc::new(ColonyMetrics::new()),
            registry: Arc::new(Mutex::new(AgentRegistry::new())),
            lifecycle: Mutex::new(Lifecycle {
                phase: Phase::Created,
                supervisor: None,
                queen: None,
                environment: None,
            }),
            running: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<ResourcePool> {
        &self.pool
    }

    pub fn board(&self) -> &Arc<TaskBoard> {
        &self.board
    }

    pub fn threats(&self) -> &Arc<ThreatQueue> {
        &self.threats
    }

    pub fn metrics(&self) -> &Arc<ColonyMetrics> {
        &self.metrics
    }

    /// Spawn the initial population, the queen, and the supervisor.
    ///
    /// Calling `start` on a running colony is a no-op. A stopped colony
    /// cannot be restarted (its board and threat queue are closed);
    /// `Shutdown` is returned instead.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.phase {
            Phase::Running => return Ok(()),
            Phase::Stopped => return Err(ApiaryError::Shutdown),
            Phase::Created => {}
        }

        // Initial workers.
        {
            let mut registry = self.registry.lock().await;
            for role in [AgentRole::Scout, AgentRole::Forager, AgentRole::Soldier] {
                for _ in 0..self.config.bounds(role).initial {
                    let Some((id, handle)) = self.spawn_worker(role) else {
                        continue;
                    };
                    registry.insert(id, handle);
                    self.metrics.record_agent_spawned();
                }
            }
        }

        // Exactly one queen; she feeds the supervisor over the command channel.
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_DEPTH);
        let queen_id = AgentId::new();
        let (ctx, control) = AgentContext::new(queen_id, AgentRole::Queen);
        let queen = Queen::new(
            ctx,
            Arc::clone(&self.pool),
            Arc::clone(&self.board),
            Arc::clone(&self.threats),
            Arc::clone(&self.metrics),
            command_tx,
            QueenPolicy {
                tick: self.config.queen_tick,
                consumption: self.config.queen_consumption,
                board_high_watermark: self.config.board_high_watermark,
                threat_high_watermark: self.config.threat_high_watermark,
            },
        );
        lifecycle.queen = Some((queen_id, control, tokio::spawn(queen.run())));
        self.metrics.record_agent_spawned();

        // Supervisor: the only writer of the live-agent set after start.
        let (supervisor_stop_tx, supervisor_stop_rx) = watch::channel(false);
        let supervisor = Supervisor {
            config: self.config.clone(),
            pool: Arc::clone(&self.pool),
            board: Arc::clone(&self.board),
            threats: Arc::clone(&self.threats),
            metrics: Arc::clone(&self.metrics),
            registry: Arc::clone(&self.registry),
        };
        lifecycle.supervisor = Some((
            supervisor_stop_tx,
            tokio::spawn(supervisor.run(command_rx, supervisor_stop_rx)),
        ));

        if self.config.environment.enabled {
            let (env_stop_tx, env_stop_rx) = watch::channel(false);
            let generator = ThreatGenerator::new(
                Arc::clone(&self.threats),
                Arc::clone(&self.metrics),
                self.config.environment.clone(),
                env_stop_rx,
            );
            lifecycle.environment = Some((env_stop_tx, tokio::spawn(generator.run())));
        }

        lifecycle.phase = Phase::Running;
        self.running.store(true, Ordering::SeqCst);
        info!(
            scouts = self.config.scouts.initial,
            foragers = self.config.foragers.initial,
            soldiers = self.config.soldiers.initial,
            "colony started"
        );
        Ok(())
    }

    /// Stop everything and wait for every agent to reach `Stopped`.
    ///
    /// Idempotent; a second call returns immediately. Items still on the
    /// board or in the threat queue after the agents exit are drained and
    /// reported, never silently lost.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if !matches!(lifecycle.phase, Phase::Running) {
            return;
        }

        // Supervisor first, so no new agents appear mid-teardown.
        if let Some((stop, join)) = lifecycle.supervisor.take() {
            let _ = stop.send(true);
            if let Err(error) = join.await {
                warn!(%error, "supervisor task failed at join");
            }
        }

        if let Some((stop, join)) = lifecycle.environment.take() {
            let _ = stop.send(true);
            if let Err(error) = join.await {
                warn!(%error, "threat generator failed at join");
            }
        }

        if let Some((id, control, join)) = lifecycle.queen.take() {
            control.signal_stop();
            if let Err(error) = join.await {
                warn!(agent_id = %id, %error, "queen task failed at join");
            }
            self.metrics.record_agent_retired();
        }

        // Close the components; this wakes every agent blocked on claim or
        // take. Producers now get Shutdown and exit.
        self.board.shutdown().await;
        self.threats.shutdown().await;

        let agents = {
            let mut registry = self.registry.lock().await;
            registry.take_all()
        };
        for (id, handle) in agents {
            handle.control.signal_stop();
            if let Err(error) = handle.join.await {
                warn!(agent_id = %id, role = %handle.role, %error, "agent task failed at join");
            }
            self.metrics.record_agent_retired();
        }

        let unclaimed = self.board.drain().await;
        let unresolved = self.threats.drain().await;
        if !unclaimed.is_empty() || !unresolved.is_empty() {
            info!(
                unclaimed = unclaimed.len(),
                unresolved = unresolved.len(),
                "items left behind at shutdown"
            );
        }

        lifecycle.phase = Phase::Stopped;
        self.running.store(false, Ordering::SeqCst);
        info!("colony stopped");
    }

    /// Observe the colony without blocking any agent for long.
    pub async fn status(&self) -> ColonyStatus {
        let (scouts, foragers, soldiers) = {
            let registry = self.registry.lock().await;
            (
                registry.count(AgentRole::Scout),
                registry.count(AgentRole::Forager),
                registry.count(AgentRole::Soldier),
            )
        };
        ColonyStatus {
            running: self.running.load(Ordering::SeqCst),
            pool_level: self.pool.snapshot().await,
            pool_capacity: self.pool.capacity(),
            board_backlog: self.board.backlog().await,
            threat_backlog: self.threats.backlog().await,
            scouts,
            foragers,
            soldiers,
            metrics: self.metrics.snapshot(),
        }
    }

    /// Report an external threat. Environment-facing producer API.
    pub async fn report_threat(&self, severity: Severity) -> Result<Tick> {
        let arrived_at = self.threats.report(ThreatEvent::new(severity)).await?;
        self.metrics.record_threat_reported();
        Ok(arrived_at)
    }

    /// Spawn one worker task of the given role. Returns `None` for the
    /// queen, whose population is fixed at one.
    fn spawn_worker(&self, role: AgentRole) -> Option<(AgentId, AgentHandle)> {
        spawn_worker(
            role,
            &self.config,
            &self.pool,
            &self.board,
            &self.threats,
            &self.metrics,
        )
    }
}

/// Spawn one worker task. Returns `None` for the queen, whose population is
/// fixed at one and never rebalanced.
fn spawn_worker(
    role: AgentRole,
    config: &ColonyConfig,
    pool: &Arc<ResourcePool>,
    board: &Arc<TaskBoard>,
    threats: &Arc<ThreatQueue>,
    metrics: &Arc<ColonyMetrics>,
) -> Option<(AgentId, AgentHandle)> {
    let id = AgentId::new();
    let (ctx, control) = AgentContext::new(id, role);
    let join = match role {
        AgentRole::Scout => tokio::spawn(
            Scout::new(
                ctx,
                Arc::clone(board),
                Arc::clone(metrics),
                config.discovery_latency,
                config.yield_min,
                config.yield_max,
            )
            .run(),
        ),
        AgentRole::Forager => tokio::spawn(
            Forager::new(
                ctx,
                Arc::clone(board),
                Arc::clone(pool),
                Arc::clone(metrics),
                config.haul_latency,
            )
            .run(),
        ),
        AgentRole::Soldier => tokio::spawn(
            Soldier::new(
                ctx,
                Arc::clone(threats),
                Arc::clone(metrics),
                config.resolve_latency,
            )
            .run(),
        ),
        AgentRole::Queen => return None,
    };
    Some((id, AgentHandle { role, control, join }))
}

impl Default for Colony {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the queen's rebalance commands against the registry, clamped to
/// the configured bounds.
struct Supervisor {
    config: ColonyConfig,
    pool: Arc<ResourcePool>,
    board: Arc<TaskBoard>,
    threats: Arc<ThreatQueue>,
    metrics: Arc<ColonyMetrics>,
    registry: Arc<Mutex<AgentRegistry>>,
}

impl Supervisor {
    async fn run(
        self,
        mut commands: mpsc::Receiver<RebalanceCommand>,
        mut stop: watch::Receiver<bool>,
    ) {
        loop {
            let command = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => command,
                    // Queen gone, nothing left to apply.
                    None => break,
                },
                _ = stop.changed() => break,
            };
            match command {
                RebalanceCommand::Spawn(AgentRole::Queen)
                | RebalanceCommand::Retire(AgentRole::Queen) => {
                    warn!("queen population is fixed; command ignored");
                }
                RebalanceCommand::Spawn(role) => self.spawn(role).await,
                RebalanceCommand::Retire(role) => self.retire(role).await,
            }
        }
        debug!("supervisor stopped");
    }

    async fn spawn(&self, role: AgentRole) {
        let bounds = self.config.bounds(role);
        let mut registry = self.registry.lock().await;
        let live = registry.count(role);
        if live >= bounds.max {
            debug!(%role, live, max = bounds.max, "spawn clamped at bound");
            return;
        }
        let Some((id, handle)) = spawn_worker(
            role,
            &self.config,
            &self.pool,
            &self.board,
            &self.threats,
            &self.metrics,
        ) else {
            return;
        };
        registry.insert(id, handle);
        self.metrics.record_agent_spawned();
        info!(agent_id = %id, %role, live = live + 1, "agent spawned");
    }

    async fn retire(&self, role: AgentRole) {
        let bounds = self.config.bounds(role);
        let removed = {
            let mut registry = self.registry.lock().await;
            if registry.count(role) <= bounds.min {
                debug!(%role, min = bounds.min, "retire clamped at bound");
                None
            } else {
                registry.remove_one(role)
            }
        };
        // Join outside the registry lock; the agent stops at its next
        // checkpoint, which is bounded by its latency settings.
        if let Some((id, handle)) = removed {
            handle.control.signal_stop();
            if let Err(error) = handle.join.await {
                warn!(agent_id = %id, %role, %error, "agent task failed at join");
            }
            self.metrics.record_agent_retired();
            info!(agent_id = %id, %role, "agent retired");
        }
    }
}
