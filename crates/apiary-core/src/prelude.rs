//! Apiary Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use apiary_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{
    AgentId, AgentRole, AgentState, RebalanceCommand, Severity, TaskId, TaskItem, ThreatEvent,
    ThreatId, Tick,
};

// Re-export the shared components
pub use crate::board::TaskBoard;
pub use crate::pool::ResourcePool;
pub use crate::threats::ThreatQueue;

// Re-export configuration
pub use crate::config::{ColonyConfig, EnvironmentConfig, RoleBounds};

// Re-export metrics
pub use crate::metrics::{ColonyMetrics, MetricsSnapshot};

// Re-export error types
pub use crate::error::{ApiaryError, Result};
