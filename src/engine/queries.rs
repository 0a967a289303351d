use crate::model::*;
use crate::partition::CalendarPartition;
use crate::resolver::{resolve, slot_start};

use super::{Engine, EngineError};

impl Engine {
    /// Whether every slot `interval` covers is free right now.
    ///
    /// The answer may be stale by the time the caller acts on it; use
    /// `allocate` to check and reserve atomically.
    pub fn is_free(&self, interval: Interval) -> Result<bool, EngineError> {
        let fragments = resolve(&interval, self.policy)?;
        let calendar = self.calendar.lock();
        Ok(fragments.iter().all(|f| {
            calendar
                .get(f.year)
                .is_none_or(|p| p.is_free(f.range))
        }))
    }

    /// Whether every slot `interval` covers is reserved right now.
    pub fn is_reserved(&self, interval: Interval) -> Result<bool, EngineError> {
        let fragments = resolve(&interval, self.policy)?;
        let calendar = self.calendar.lock();
        Ok(fragments.iter().all(|f| match calendar.get(f.year) {
            Some(p) => p.is_fully_reserved(f.range),
            None => f.range.is_empty(),
        }))
    }

    /// Maximal free sub-intervals of `window`, clipped to it. Free time that
    /// runs across a year boundary comes back as one interval.
    ///
    /// The window need not be slot-aligned; a partially reserved slot at
    /// either edge counts as reserved.
    pub fn free_windows(&self, window: Interval) -> Result<Vec<Interval>, EngineError> {
        let fragments = resolve(&window, QuantumPolicy::Lenient)?;
        let mut runs: Vec<(i32, SlotRange)> = Vec::new();
        {
            let calendar = self.calendar.lock();
            for f in &fragments {
                match calendar.get(f.year) {
                    Some(p) => runs.extend(p.free_runs(f.range).into_iter().map(|r| (f.year, r))),
                    None if !f.range.is_empty() => runs.push((f.year, f.range)),
                    None => {}
                }
            }
        }

        let mut windows: Vec<Interval> = Vec::with_capacity(runs.len());
        for (year, run) in runs {
            let start = slot_start(year, run.start).ok_or(EngineError::YearOutOfRange(year))?;
            let end = slot_start(year, run.end).ok_or(EngineError::YearOutOfRange(year))?;
            let clipped = Interval::new(start.max(window.start), end.min(window.end));
            if clipped.end <= clipped.start {
                continue;
            }
            match windows.last_mut() {
                Some(prev) if prev.end == clipped.start => prev.end = clipped.end,
                _ => windows.push(clipped),
            }
        }
        Ok(windows)
    }

    /// Copy of the partition for `year`, if any operation has touched it.
    pub fn partition(&self, year: i32) -> Option<CalendarPartition> {
        self.calendar.lock().get(year).cloned()
    }

    pub fn years(&self) -> Vec<i32> {
        self.calendar.lock().years()
    }

    /// Reserved slot count for `year`; zero for a year never touched.
    pub fn reserved_slots(&self, year: i32) -> usize {
        self.calendar
            .lock()
            .get(year)
            .map_or(0, |p| p.reserved_count())
    }
}
