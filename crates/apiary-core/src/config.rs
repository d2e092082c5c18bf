//! Configuration for colony simulation parameters.
//!
//! Everything tunable lives here: pool capacity, role counts and bounds,
//! agent latencies, the queen's tick and rebalance watermarks, and the
//! optional environment threat generator. Use with `Colony::from_config` to
//! build a colony with custom settings; all thresholds are configuration,
//! not code constants.

use crate::error::{ApiaryError, Result};
use crate::types::AgentRole;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Population bounds for one role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoleBounds {
    /// Agents of this role spawned at startup.
    pub initial: usize,
    /// The queen never retires below this.
    pub min: usize,
    /// The queen never spawns above this.
    pub max: usize,
}

impl RoleBounds {
    pub fn new(initial: usize, min: usize, max: usize) -> Self {
        Self { initial, min, max }
    }

    fn validate(&self, role: AgentRole) -> Result<()> {
        if self.min > self.initial || self.initial > self.max {
            return Err(ApiaryError::config(
                format!("{}_bounds", role),
                format!(
                    "require min <= initial <= max, got {}/{}/{}",
                    self.min, self.initial, self.max
                ),
            ));
        }
        Ok(())
    }
}

/// Settings for the optional environment threat generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Whether the generator task is spawned at all.
    pub enabled: bool,
    /// Mean delay between generated threats.
    pub mean_interval: Duration,
    /// Uniform jitter added on top of the mean delay.
    pub jitter: Duration,
    /// Relative weights for sampling [Low, Medium, High].
    pub severity_weights: [u32; 3],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mean_interval: Duration::from_millis(40),
            jitter: Duration::from_millis(20),
            severity_weights: [6, 3, 1],
        }
    }
}

/// Configuration for colony simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyConfig {
    /// Nectar units the resource pool can hold (default: 100).
    pub pool_capacity: u64,
    /// Scout population bounds (default: 2 initial, 1..=4).
    pub scouts: RoleBounds,
    /// Forager population bounds (default: 3 initial, 1..=6).
    pub foragers: RoleBounds,
    /// Soldier population bounds (default: 2 initial, 1..=4).
    pub soldiers: RoleBounds,
    /// Interval between queen inspections (default: 50ms).
    pub queen_tick: Duration,
    /// Nectar withdrawn per queen tick for colony maintenance (default: 2).
    pub queen_consumption: u64,
    /// Simulated time for a scout to discover a source (default: 10ms).
    pub discovery_latency: Duration,
    /// Inclusive yield range for discovered sources (default: 1..=5).
    pub yield_min: u64,
    pub yield_max: u64,
    /// Simulated time for a forager to haul a claimed source (default: 5ms).
    pub haul_latency: Duration,
    /// Simulated time for a soldier to resolve a threat (default: 15ms).
    pub resolve_latency: Duration,
    /// Board backlog above which the queen spawns a forager (default: 8).
    pub board_high_watermark: usize,
    /// Threat backlog above which the queen spawns a soldier (default: 2).
    pub threat_high_watermark: usize,
    /// Environment threat generator settings (default: disabled).
    pub environment: EnvironmentConfig,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 100,
            scouts: RoleBounds::new(2, 1, 4),
            foragers: RoleBounds::new(3, 1, 6),
            soldiers: RoleBounds::new(2, 1, 4),
            queen_tick: Duration::from_millis(50),
            queen_consumption: 2,
            discovery_latency: Duration::from_millis(10),
            yield_min: 1,
            yield_max: 5,
            haul_latency: Duration::from_millis(5),
            resolve_latency: Duration::from_millis(15),
            board_high_watermark: 8,
            threat_high_watermark: 2,
            environment: EnvironmentConfig::default(),
        }
    }
}

impl ColonyConfig {
    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.pool_capacity == 0 {
            return Err(ApiaryError::config("pool_capacity", "must be > 0"));
        }
        if self.yield_min == 0 {
            return Err(ApiaryError::config("yield_min", "must be > 0"));
        }
        if self.yield_min > self.yield_max {
            return Err(ApiaryError::config(
                "yield_max",
                format!("must be >= yield_min ({})", self.yield_min),
            ));
        }
        if self.queen_tick.is_zero() {
            return Err(ApiaryError::config("queen_tick", "must be > 0"));
        }
        self.scouts.validate(AgentRole::Scout)?;
        self.foragers.validate(AgentRole::Forager)?;
        self.soldiers.validate(AgentRole::Soldier)?;
        Ok(())
    }

    /// Population bounds for a role. The queen is always exactly one.
    pub fn bounds(&self, role: AgentRole) -> RoleBounds {
        match role {
            AgentRole::Scout => self.scouts,
            AgentRole::Forager => self.foragers,
            AgentRole::Soldier => self.soldiers,
            AgentRole::Queen => RoleBounds::new(1, 1, 1),
        }
    }
}
