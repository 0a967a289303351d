use crate::model::{SlotRange, Timestamp};

/// Broad reason a transaction was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The request itself was malformed; retrying it unchanged never helps.
    InvalidInput,
    /// The request was well formed but the calendar's current occupancy
    /// does not permit it.
    Collision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    MissingTimestamp(&'static str),
    EmptyInterval { start: Timestamp, end: Timestamp },
    UnalignedDuration { seconds: i64 },
    YearOutOfRange(i32),
    LimitExceeded(&'static str),
    /// Allocate found reserved slots in `range`.
    Collision { year: i32, range: SlotRange },
    /// Release found slots in `range` that are not reserved.
    NotReserved { year: i32, range: SlotRange },
}

impl EngineError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            EngineError::Collision { .. } | EngineError::NotReserved { .. } => {
                RejectionKind::Collision
            }
            EngineError::MissingTimestamp(_)
            | EngineError::EmptyInterval { .. }
            | EngineError::UnalignedDuration { .. }
            | EngineError::YearOutOfRange(_)
            | EngineError::LimitExceeded(_) => RejectionKind::InvalidInput,
        }
    }

    pub fn is_collision(&self) -> bool {
        self.kind() == RejectionKind::Collision
    }

    pub fn is_invalid_input(&self) -> bool {
        self.kind() == RejectionKind::InvalidInput
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingTimestamp(which) => write!(f, "missing {which} timestamp"),
            EngineError::EmptyInterval { start, end } => {
                write!(f, "interval end {end} is not after start {start}")
            }
            EngineError::UnalignedDuration { seconds } => write!(
                f,
                "duration of {seconds}s is not a multiple of {} minutes",
                crate::limits::SLOT_MINUTES
            ),
            EngineError::YearOutOfRange(year) => write!(f, "year {year} out of range"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Collision { year, range } => {
                write!(f, "collision in {year} slots {range}")
            }
            EngineError::NotReserved { year, range } => {
                write!(f, "{year} slots {range} are not fully reserved")
            }
        }
    }
}

impl std::error::Error for EngineError {}
