//! # Apiary Runtime
//!
//! Colony lifecycle, agent registry, and environment.
//!
//! The runtime is the "organism" — it brings the initial population up,
//! supervises rebalancing decided by the queen, and tears everything down on
//! stop without losing work silently.
//!
//! ```no_run
//! use apiary_runtime::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let colony = Colony::new();
//! colony.start().await.unwrap();
//! let status = colony.status().await;
//! assert!(status.running);
//! colony.stop().await;
//! # });
//! ```

pub mod colony;
pub mod environment;
pub mod registry;
pub mod prelude;

pub use colony::{Colony, ColonyStatus};
