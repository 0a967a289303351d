use std::collections::BTreeMap;

use crate::model::*;
use crate::partition::{Calendar, CalendarPartition};
use crate::resolver::resolve;

use super::EngineError;

/// One check-then-commit unit of work against the calendar.
///
/// Every step works on shadow copies of the partitions it touches; the live
/// calendar is only written by `commit`, which swaps all shadows in at once.
/// Dropping a transaction without committing discards every tentative change.
pub(crate) struct Transaction<'a> {
    calendar: &'a mut Calendar,
    policy: QuantumPolicy,
    shadows: BTreeMap<i32, CalendarPartition>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(calendar: &'a mut Calendar, policy: QuantumPolicy) -> Self {
        Self {
            calendar,
            policy,
            shadows: BTreeMap::new(),
        }
    }

    /// Working copy for `year`, cloned from the live partition on first use.
    /// Creates the live partition if this year was never seen.
    fn shadow(&mut self, year: i32) -> &mut CalendarPartition {
        let calendar = &mut *self.calendar;
        self.shadows
            .entry(year)
            .or_insert_with(|| calendar.get_or_create(year).clone())
    }

    /// Tentatively reserve `interval`. Fails on the first fragment that is not
    /// entirely free; shadows are left untouched for that interval.
    pub(crate) fn allocate(&mut self, interval: &Interval) -> Result<(), EngineError> {
        let fragments = resolve(interval, self.policy)?;
        for f in &fragments {
            if !self.shadow(f.year).is_free(f.range) {
                return Err(EngineError::Collision {
                    year: f.year,
                    range: f.range,
                });
            }
        }
        for f in &fragments {
            self.shadow(f.year).reserve(f.range);
        }
        Ok(())
    }

    /// Tentatively release `interval`. Every fragment must be fully reserved.
    pub(crate) fn release(&mut self, interval: &Interval) -> Result<(), EngineError> {
        let fragments = resolve(interval, self.policy)?;
        for f in &fragments {
            if !self.shadow(f.year).is_fully_reserved(f.range) {
                return Err(EngineError::NotReserved {
                    year: f.year,
                    range: f.range,
                });
            }
        }
        for f in &fragments {
            self.shadow(f.year).release(f.range);
        }
        Ok(())
    }

    pub(crate) fn touched_years(&self) -> Vec<i32> {
        self.shadows.keys().copied().collect()
    }

    /// Swap every shadow into the live calendar. Returns the years written.
    ///
    /// The transaction borrows the calendar mutably for its whole life, so
    /// each live partition is still the one its shadow was cloned from.
    pub(crate) fn commit(self) -> Vec<i32> {
        let years: Vec<i32> = self.shadows.keys().copied().collect();
        for shadow in self.shadows.into_values() {
            self.calendar.insert(shadow);
        }
        years
    }
}
