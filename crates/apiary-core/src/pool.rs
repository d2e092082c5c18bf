//! ResourcePool — the bounded shared nectar store.
//!
//! Foragers deposit into it, the queen withdraws from it for colony
//! maintenance. All operations are serialized through a single internal
//! lock, so the level is linearizable and never observed outside
//! `[0, capacity]`. A deposit that would exceed capacity is partially
//! applied (fills to capacity) and the unabsorbed remainder is reported
//! back through the return value — overflow is an outcome, not an error.

use crate::error::{ApiaryError, Result};
use tokio::sync::Mutex;
use tracing::debug;

/// Bounded nectar store with serialized deposit/withdraw.
///
/// Invariant: `0 <= level <= capacity` at every observable instant, and the
/// sum of all accepted deposits minus all granted withdrawals equals the
/// current level.
pub struct ResourcePool {
    capacity: u64,
    level: Mutex<u64>,
}

impl ResourcePool {
    /// Create an empty pool. `capacity` must be > 0 (enforced by
    /// `ColonyConfig::validate`).
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            level: Mutex::new(0),
        }
    }

    /// The fixed capacity of the pool.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Add up to `amount` nectar units, capped at capacity.
    ///
    /// Returns the quantity actually accepted (`0..=amount`). The accepted
    /// portion is never lost. Never suspends beyond the brief internal lock.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `amount` is zero.
    pub async fn deposit(&self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(ApiaryError::validation("deposit amount must be > 0"));
        }
        let mut level = self.level.lock().await;
        let headroom = self.capacity - *level;
        let accepted = amount.min(headroom);
        *level += accepted;
        debug!(amount, accepted, level = *level, "deposit");
        Ok(accepted)
    }

    /// Remove up to `amount` nectar units, capped at the current level.
    ///
    /// Returns the quantity granted (`0..=amount`). Never suspends beyond
    /// the brief internal lock.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `amount` is zero.
    pub async fn withdraw(&self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(ApiaryError::validation("withdraw amount must be > 0"));
        }
        let mut level = self.level.lock().await;
        let granted = amount.min(*level);
        *level -= granted;
        debug!(amount, granted, level = *level, "withdraw");
        Ok(granted)
    }

    /// Consistent read of the current level — never observes a level
    /// mid-mutation.
    pub async fn snapshot(&self) -> u64 {
        *self.level.lock().await
    }
}
