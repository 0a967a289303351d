/// Length of one schedulable slot.
pub const SLOT_MINUTES: u32 = 15;
pub const SLOTS_PER_HOUR: usize = 60 / SLOT_MINUTES as usize;
pub const SLOTS_PER_DAY: usize = 24 * SLOTS_PER_HOUR;
pub const SLOT_SECONDS: i64 = SLOT_MINUTES as i64 * 60;

/// Earliest and latest calendar years a partition may be created for.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Max number of year boundaries a single interval may cross.
pub const MAX_YEAR_SPAN: i32 = 10;

/// Max intervals in one batch allocate/release.
pub const MAX_BATCH_SIZE: usize = 1000;
