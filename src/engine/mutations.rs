use crate::limits::*;
use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    /// Reserve `interval`. On rejection no partition changes.
    pub fn allocate(&self, interval: Interval) -> Result<(), EngineError> {
        self.transact("allocate", |tx| tx.allocate(&interval))
    }

    /// Free `interval`. Every slot it covers must currently be reserved;
    /// otherwise the caller's view is stale and nothing changes.
    pub fn release(&self, interval: Interval) -> Result<(), EngineError> {
        self.transact("release", |tx| tx.release(&interval))
    }

    /// Atomically move a reservation from `old` to `new`.
    ///
    /// Behaves as release(old) then allocate(new) in one transaction. `new`
    /// may overlap `old`. If either half is rejected, `old` stays reserved.
    pub fn reassign(&self, old: Interval, new: Interval) -> Result<(), EngineError> {
        self.transact("reassign", |tx| {
            tx.release(&old)?;
            tx.allocate(&new)
        })
    }

    /// Reserve every interval or none. Intervals in the batch that overlap
    /// each other collide.
    pub fn allocate_batch(&self, intervals: &[Interval]) -> Result<(), EngineError> {
        if intervals.len() > MAX_BATCH_SIZE {
            return Err(EngineError::LimitExceeded("batch too large"));
        }
        if intervals.is_empty() {
            return Ok(());
        }
        self.transact("allocate_batch", |tx| {
            intervals.iter().try_for_each(|iv| tx.allocate(iv))
        })
    }

    /// Release every interval or none.
    pub fn release_batch(&self, intervals: &[Interval]) -> Result<(), EngineError> {
        if intervals.len() > MAX_BATCH_SIZE {
            return Err(EngineError::LimitExceeded("batch too large"));
        }
        if intervals.is_empty() {
            return Ok(());
        }
        self.transact("release_batch", |tx| {
            intervals.iter().try_for_each(|iv| tx.release(iv))
        })
    }
}
