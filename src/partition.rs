use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::SlotRange;
use crate::resolver::slot_count_for_year;

const WORD_BITS: usize = 64;

/// Occupancy bitmap for one calendar year, one bit per 15-minute slot.
///
/// Check and mutation are separate: `reserve`/`release` never look at the
/// bits they overwrite. Callers check `is_free`/`is_fully_reserved` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPartition {
    year: i32,
    slot_count: usize,
    /// Bit `i` of word `i / 64` is slot `i`. Bits past `slot_count` stay zero.
    words: Vec<u64>,
}

impl CalendarPartition {
    pub fn new(year: i32) -> Self {
        let slot_count = slot_count_for_year(year);
        Self {
            year,
            slot_count,
            words: vec![0; slot_count.div_ceil(WORD_BITS)],
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Range covering the whole year.
    pub fn full_range(&self) -> SlotRange {
        SlotRange::new(0, self.slot_count)
    }

    pub fn is_reserved(&self, slot: usize) -> bool {
        debug_assert!(slot < self.slot_count);
        self.words[slot / WORD_BITS] & (1 << (slot % WORD_BITS)) != 0
    }

    pub fn reserved_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True iff no bit in `range` is set. Vacuously true for an empty range.
    pub fn is_free(&self, range: SlotRange) -> bool {
        self.masks(range).all(|(i, mask)| self.words[i] & mask == 0)
    }

    /// True iff every bit in `range` is set. Vacuously true for an empty range.
    pub fn is_fully_reserved(&self, range: SlotRange) -> bool {
        self.masks(range).all(|(i, mask)| self.words[i] & mask == mask)
    }

    pub fn reserve(&mut self, range: SlotRange) {
        for (i, mask) in self.masks(range) {
            self.words[i] |= mask;
        }
    }

    pub fn release(&mut self, range: SlotRange) {
        for (i, mask) in self.masks(range) {
            self.words[i] &= !mask;
        }
    }

    /// Maximal runs of free slots inside `range`, in order.
    pub fn free_runs(&self, range: SlotRange) -> Vec<SlotRange> {
        let mut runs = Vec::new();
        let mut run_start: Option<usize> = None;
        for slot in range.start..range.end {
            match (self.is_reserved(slot), run_start) {
                (false, None) => run_start = Some(slot),
                (true, Some(start)) => {
                    runs.push(SlotRange::new(start, slot));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(SlotRange::new(start, range.end));
        }
        runs
    }

    /// Check the structural invariants. Used on partitions read from a snapshot.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.slot_count != slot_count_for_year(self.year) {
            return Err("slot count does not match year");
        }
        if self.words.len() != self.slot_count.div_ceil(WORD_BITS) {
            return Err("bitmap length does not match slot count");
        }
        let tail_bits = self.slot_count % WORD_BITS;
        if tail_bits != 0
            && let Some(last) = self.words.last()
            && last >> tail_bits != 0
        {
            return Err("bits set past the end of the year");
        }
        Ok(())
    }

    fn masks(&self, range: SlotRange) -> impl Iterator<Item = (usize, u64)> + use<> {
        debug_assert!(range.start <= range.end && range.end <= self.slot_count);
        word_masks(range)
    }
}

/// `(word index, bit mask)` pairs covering `range`.
fn word_masks(range: SlotRange) -> impl Iterator<Item = (usize, u64)> {
    let (start, end) = (range.start, range.end);
    let first = start / WORD_BITS;
    let last = if end == 0 { 0 } else { (end - 1) / WORD_BITS };
    let words = if start < end { first..last + 1 } else { 0..0 };
    words.map(move |i| {
        let lo = if i == first { start % WORD_BITS } else { 0 };
        let hi = if i == last { end - i * WORD_BITS } else { WORD_BITS };
        let width = hi - lo;
        let mask = if width == WORD_BITS {
            u64::MAX
        } else {
            ((1u64 << width) - 1) << lo
        };
        (i, mask)
    })
}

/// Every partition the engine has seen, keyed by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    partitions: BTreeMap<i32, CalendarPartition>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, year: i32) -> Option<&CalendarPartition> {
        self.partitions.get(&year)
    }

    /// Look up the partition for `year`, creating an empty one on first use.
    pub fn get_or_create(&mut self, year: i32) -> &mut CalendarPartition {
        self.partitions
            .entry(year)
            .or_insert_with(|| CalendarPartition::new(year))
    }

    /// Insert or replace the partition for its year.
    pub fn insert(&mut self, partition: CalendarPartition) -> Option<CalendarPartition> {
        self.partitions.insert(partition.year(), partition)
    }

    pub fn years(&self) -> Vec<i32> {
        self.partitions.keys().copied().collect()
    }

    pub fn partitions(&self) -> impl Iterator<Item = &CalendarPartition> {
        self.partitions.values()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
