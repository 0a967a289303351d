//! Transactional 15-minute slot allocation across calendar years.
//!
//! [`engine::Engine`] is the entry point: `allocate`, `release` and
//! `reassign` either commit across every year an interval touches or leave
//! the calendar untouched.

pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod partition;
pub mod resolver;
pub mod snapshot;
pub mod snapshotter;

pub use engine::{Engine, EngineError, RejectionKind};
pub use model::{Interval, QuantumPolicy, Timestamp};
