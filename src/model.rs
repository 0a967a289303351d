use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Zone-less wall-clock timestamp. The only time type.
pub type Timestamp = NaiveDateTime;

/// Half-open time interval `[start, end)` as the caller sees it.
///
/// Not validated on construction; the resolver rejects `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Build an interval from a work item whose timestamps may be unset.
    pub fn from_parts(
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Self, crate::engine::EngineError> {
        use crate::engine::EngineError;
        let start = start.ok_or(EngineError::MissingTimestamp("start"))?;
        let end = end.ok_or(EngineError::MissingTimestamp("end"))?;
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Half-open range of slot indices `[start, end)` inside one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "SlotRange start must not be after end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &SlotRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// The part of an interval that falls inside one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub year: i32,
    pub range: SlotRange,
}

/// Whether interval durations must be whole multiples of the slot length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuantumPolicy {
    /// Reject durations that are not a multiple of 15 minutes.
    #[default]
    Strict,
    /// Accept any duration; partial slots are reserved whole.
    Lenient,
}

impl FromStr for QuantumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(QuantumPolicy::Strict),
            "lenient" => Ok(QuantumPolicy::Lenient),
            other => Err(format!("unknown quantum policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn interval_overlap() {
        let a = Interval::new(ts(2024, 2, 20, 1, 0), ts(2024, 2, 20, 1, 30));
        let b = Interval::new(ts(2024, 2, 20, 1, 15), ts(2024, 2, 20, 1, 45));
        let c = Interval::new(ts(2024, 2, 20, 1, 30), ts(2024, 2, 20, 2, 0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn interval_from_parts_requires_both() {
        let t = ts(2024, 1, 1, 0, 0);
        assert!(Interval::from_parts(Some(t), Some(t)).is_ok());
        assert!(Interval::from_parts(None, Some(t)).is_err());
        assert!(Interval::from_parts(Some(t), None).is_err());
    }

    #[test]
    fn slot_range_basics() {
        let r = SlotRange::new(4, 6);
        assert_eq!(r.len(), 2);
        assert!(!r.is_empty());
        assert!(SlotRange::new(3, 3).is_empty());
        assert!(r.overlaps(&SlotRange::new(5, 10)));
        assert!(!r.overlaps(&SlotRange::new(6, 10)));
    }

    #[test]
    fn quantum_policy_parse() {
        assert_eq!("strict".parse::<QuantumPolicy>(), Ok(QuantumPolicy::Strict));
        assert_eq!(" Lenient ".parse::<QuantumPolicy>(), Ok(QuantumPolicy::Lenient));
        assert!("loose".parse::<QuantumPolicy>().is_err());
        assert_eq!(QuantumPolicy::default(), QuantumPolicy::Strict);
    }
}
