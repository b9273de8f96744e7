//! Sequential unique-value allocator.
//!
//! A [`SequentialAllocator`] is built fresh for every batch from a range and
//! the used-value scan. Each call to `next()` yields the lowest value of the
//! range not yet used and records it as used, so a single allocator never
//! hands out the same value twice. Once the range is consumed it keeps
//! returning `None`.

use std::collections::HashSet;
use std::iter::FusedIterator;

use super::format::AddressFormat;
use super::scan::UsedValueScan;
use crate::ranges::AllocationRange;

#[derive(Debug, Clone)]
pub struct SequentialAllocator {
    range: AllocationRange,
    format: AddressFormat,
    used: HashSet<u64>,
    /// Every value below the cursor is either used or already handed out
    cursor: u64,
}

impl SequentialAllocator {
    pub fn new(range: AllocationRange, format: AddressFormat, used: &UsedValueScan) -> Self {
        let used: HashSet<u64> = used
            .iter()
            .filter_map(|value| format.parse(value))
            .filter(|value| range.contains(*value))
            .collect();

        Self {
            range,
            format,
            used,
            cursor: range.min,
        }
    }

    /// Allocator over an untouched range.
    pub fn empty(range: AllocationRange, format: AddressFormat) -> Self {
        Self::new(range, format, &UsedValueScan::default())
    }

    pub fn range(&self) -> AllocationRange {
        self.range
    }

    pub fn format(&self) -> AddressFormat {
        self.format
    }

    /// Mark a value as used without handing it out.
    pub fn reserve(&mut self, value: u64) {
        if self.range.contains(value) {
            self.used.insert(value);
        }
    }

    /// Next value rendered in this allocator's format.
    pub fn next_formatted(&mut self) -> Option<String> {
        let format = self.format;
        self.next().map(|value| format.format(value))
    }

    /// Values still available in the range.
    pub fn remaining(&self) -> u64 {
        (self.cursor..self.range.max)
            .filter(|value| !self.used.contains(value))
            .count() as u64
    }
}

impl Iterator for SequentialAllocator {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.cursor < self.range.max {
            let candidate = self.cursor;
            self.cursor += 1;
            if self.used.insert(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

impl FusedIterator for SequentialAllocator {}
