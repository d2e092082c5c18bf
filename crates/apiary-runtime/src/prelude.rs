//! Convenience re-exports for runtime users.

pub use crate::colony::{Colony, ColonyStatus};
pub use crate::environment::ThreatGenerator;
pub use crate::registry::{AgentHandle, AgentRegistry};
pub use apiary_core::config::{ColonyConfig, EnvironmentConfig, RoleBounds};
pub use apiary_core::error::{ApiaryError, Result};
pub use apiary_core::metrics::{ColonyMetrics, MetricsSnapshot};
pub use apiary_core::types::{AgentId, AgentRole, AgentState, Severity};
