use chrono::{Datelike, NaiveDate, Timelike};

use crate::engine::EngineError;
use crate::limits::*;
use crate::model::*;

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of 15-minute slots in `year`.
pub fn slot_count_for_year(year: i32) -> usize {
    days_in_year(year) as usize * SLOTS_PER_DAY
}

/// Slot containing `ts` within its own year: `(day_of_year - 1) * 96 + hour * 4 + minute / 15`.
pub fn slot_index(ts: &Timestamp) -> usize {
    (ts.ordinal0() as usize) * SLOTS_PER_DAY
        + ts.hour() as usize * SLOTS_PER_HOUR
        + (ts.minute() / SLOT_MINUTES) as usize
}

fn on_slot_boundary(ts: &Timestamp) -> bool {
    ts.minute() % SLOT_MINUTES == 0 && ts.second() == 0 && ts.nanosecond() == 0
}

/// Exclusive end slot for an interval ending at `ts`.
///
/// `Strict` uses the same formula as the start, so the slot count is always
/// the duration in quanta. `Lenient` rounds a timestamp inside a slot up so
/// that sub-slot intervals still cover something.
pub fn end_slot_index(ts: &Timestamp, policy: QuantumPolicy) -> usize {
    let idx = slot_index(ts);
    match policy {
        QuantumPolicy::Lenient if !on_slot_boundary(ts) => idx + 1,
        _ => idx,
    }
}

fn is_year_start(ts: &Timestamp) -> bool {
    ts.ordinal0() == 0 && ts.hour() == 0 && on_slot_boundary(ts)
}

/// Last year holding at least one slot of `interval`.
fn last_occupied_year(interval: &Interval) -> i32 {
    if is_year_start(&interval.end) {
        interval.end.year() - 1
    } else {
        interval.end.year()
    }
}

/// Start time of `slot` in `year`. `slot == slot_count` maps to midnight,
/// January 1st of the following year.
pub fn slot_start(year: i32, slot: usize) -> Option<Timestamp> {
    if slot > slot_count_for_year(year) {
        return None;
    }
    if slot == slot_count_for_year(year) {
        return NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0);
    }
    let day = (slot / SLOTS_PER_DAY) as u32;
    let in_day = slot % SLOTS_PER_DAY;
    let hour = (in_day / SLOTS_PER_HOUR) as u32;
    let minute = (in_day % SLOTS_PER_HOUR) as u32 * SLOT_MINUTES;
    NaiveDate::from_yo_opt(year, day + 1)?.and_hms_opt(hour, minute, 0)
}

/// Check an interval against the input rules without computing fragments.
pub fn validate(interval: &Interval, policy: QuantumPolicy) -> Result<(), EngineError> {
    if interval.end <= interval.start {
        return Err(EngineError::EmptyInterval {
            start: interval.start,
            end: interval.end,
        });
    }
    for year in [interval.start.year(), last_occupied_year(interval)] {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::YearOutOfRange(year));
        }
    }
    if interval.end.year() - interval.start.year() > MAX_YEAR_SPAN {
        return Err(EngineError::LimitExceeded("interval spans too many years"));
    }
    if policy == QuantumPolicy::Strict {
        let duration = interval.end - interval.start;
        if duration.num_seconds() % SLOT_SECONDS != 0 || duration.subsec_nanos() != 0 {
            return Err(EngineError::UnalignedDuration {
                seconds: duration.num_seconds(),
            });
        }
    }
    Ok(())
}

/// Split `interval` into one fragment per calendar year it touches, in year order.
///
/// Every fragment but the last ends at its year's slot count; every fragment
/// but the first starts at slot 0. An interval ending exactly at midnight on
/// January 1st yields an empty final fragment for that year, unless that
/// year is past `MAX_YEAR`.
pub fn resolve(interval: &Interval, policy: QuantumPolicy) -> Result<Vec<Fragment>, EngineError> {
    validate(interval, policy)?;

    let first_year = interval.start.year();
    let year_span = interval.end.year().min(MAX_YEAR) - first_year;
    let mut fragments = Vec::with_capacity(year_span as usize + 1);

    for i in 0..=year_span {
        let year = first_year + i;
        let start = if i == 0 { slot_index(&interval.start) } else { 0 };
        let end = if year == interval.end.year() {
            end_slot_index(&interval.end, policy)
        } else {
            slot_count_for_year(year)
        };
        fragments.push(Fragment {
            year,
            range: SlotRange::new(start, end),
        });
    }

    Ok(fragments)
}
