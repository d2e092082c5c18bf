//! # Apiary Core
//!
//! Core types and shared concurrency components for the Apiary colony
//! simulation.
//!
//! A colony is a set of concurrently executing agents (scouts, foragers,
//! soldiers, one queen) that coordinate exclusively through three shared
//! components defined here:
//!
//! - **ResourcePool** — bounded nectar store with serialized, partial-fill
//!   deposits and withdrawals
//! - **TaskBoard** — multi-producer/multi-consumer set of discovered nectar
//!   sources, delivered at most once each
//! - **ThreatQueue** — severity-then-FIFO queue of threat events
//!
//! Each component owns exactly one internal lock and never calls into
//! another component while holding it, which rules out circular-wait
//! deadlocks by construction. The only suspension points in the whole
//! system are [`TaskBoard::claim`](board::TaskBoard::claim) and
//! [`ThreatQueue::take`](threats::ThreatQueue::take); everything else
//! returns immediately.
//!
//! ## Quick Start
//!
//! ```rust
//! use apiary_core::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let pool = ResourcePool::new(100);
//! let accepted = pool.deposit(40).await.unwrap();
//! assert_eq!(accepted, 40);
//! assert_eq!(pool.snapshot().await, 40);
//! # });
//! ```

pub mod types;
pub mod error;
pub mod config;
pub mod pool;
pub mod board;
pub mod threats;
pub mod metrics;
pub mod prelude;
