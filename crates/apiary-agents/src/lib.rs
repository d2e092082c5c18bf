//! # Apiary Agents
//!
//! Role behaviors for the Apiary colony simulation.
//!
//! Each role is a plain struct with an async `run` loop, selected by a
//! tagged [`AgentRole`](apiary_core::types::AgentRole) at spawn time — no
//! virtual dispatch. Every role closes over only the component handles it
//! needs:
//!
//! - **Scout** — TaskBoard only — discovers nectar sources and publishes them
//! - **Forager** — TaskBoard + ResourcePool — claims sources and deposits
//!   their yield
//! - **Soldier** — ThreatQueue only — takes threats and resolves them
//! - **Queen** — read-only view of all three — inspects backlogs and sends
//!   rebalance commands to the colony supervisor
//!
//! Cancellation is cooperative: each loop checks its stop flag at a
//! checkpoint between discrete steps and never mid-mutation of a shared
//! component.

pub mod context;
pub mod scout;
pub mod forager;
pub mod soldier;
pub mod queen;

pub use context::{AgentContext, ControlHandle};
pub use forager::Forager;
pub use queen::{Queen, QueenPolicy};
pub use scout::Scout;
pub use soldier::Soldier;
