//! Axis-mapping table: raw device axis codes to the tracker's logical
//! codes, with a per-code priority used to arbitrate when more than one
//! raw code maps to the same logical code within a sync group.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The logical role a raw axis sample can be mapped onto. `Ignore` is an
/// explicit mapping entry that discards the sample entirely. `Unmapped` is
/// never a configured mapping — it is the sentinel [`AxisMapping::lookup`]
/// returns for a raw code with no entry at all, kept distinct from `Ignore`
/// so an unconfigured axis is recorded rather than dropped (§4.G: "record
/// at lowest priority and pass through").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAxis {
    X,
    Y,
    Z,
    Pressure,
    Major,
    Minor,
    Orientation,
    Width,
    TrackingId,
    Slot,
    Ignore,
    Unmapped,
}

/// The reported capability range for one raw axis, as read from the
/// device's absolute-axis capability list before samples start arriving.
/// Used to normalize a raw sample into the tracker's float coordinate
/// space: `(raw - min) / (max - min)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

impl AxisRange {
    pub fn normalize(&self, raw: i32) -> f64 {
        let span = (self.max - self.min) as f64;
        if span <= 0.0 {
            return raw as f64;
        }
        (raw - self.min) as f64 / span
    }
}

/// Maps raw axis codes to `(logical_code, priority)`. Built once from a
/// device's reported capability list and the wrapper's configuration.
#[derive(Debug, Clone, Default)]
pub struct AxisMapping {
    entries: HashMap<i32, (LogicalAxis, i32)>,
    ranges: HashMap<i32, AxisRange>,
}

impl AxisMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_code(&mut self, raw_code: i32, logical: LogicalAxis, priority: i32) {
        self.entries.insert(raw_code, (logical, priority));
    }

    pub fn set_range(&mut self, raw_code: i32, range: AxisRange) {
        self.ranges.insert(raw_code, range);
    }

    /// Looks up the mapping for a raw code. A code with no configured entry
    /// reports `Unmapped` at `i32::MIN` priority rather than `Ignore` — the
    /// caller records and passes the sample through instead of discarding
    /// it, per the tracker's failure semantics for an unmapped axis. A code
    /// explicitly mapped to `Ignore` is returned as such and the caller
    /// discards it.
    pub fn lookup(&self, raw_code: i32) -> (LogicalAxis, i32) {
        self.entries
            .get(&raw_code)
            .copied()
            .unwrap_or((LogicalAxis::Unmapped, i32::MIN))
    }

    pub fn range_of(&self, raw_code: i32) -> Option<AxisRange> {
        self.ranges.get(&raw_code).copied()
    }

    pub fn normalize(&self, raw_code: i32, value: i32) -> f64 {
        match self.range_of(raw_code) {
            Some(range) => range.normalize(value),
            None => value as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_code_reports_unmapped_at_lowest_priority() {
        let mapping = AxisMapping::new();
        assert_eq!(mapping.lookup(99), (LogicalAxis::Unmapped, i32::MIN));
    }

    #[test]
    fn code_explicitly_mapped_to_ignore_is_distinct_from_unmapped() {
        let mut mapping = AxisMapping::new();
        mapping.map_code(0x2e, LogicalAxis::Ignore, 0);
        assert_eq!(mapping.lookup(0x2e), (LogicalAxis::Ignore, 0));
        assert_eq!(mapping.lookup(0x2f), (LogicalAxis::Unmapped, i32::MIN));
    }

    #[test]
    fn mapped_code_reports_its_logical_axis_and_priority() {
        let mut mapping = AxisMapping::new();
        mapping.map_code(0x35, LogicalAxis::X, 10);
        assert_eq!(mapping.lookup(0x35), (LogicalAxis::X, 10));
    }

    #[test]
    fn normalize_scales_into_unit_range() {
        let mut mapping = AxisMapping::new();
        mapping.set_range(
            0x35,
            AxisRange {
                min: 0,
                max: 1000,
                fuzz: 0,
                flat: 0,
                resolution: 1,
            },
        );
        assert!((mapping.normalize(0x35, 500) - 0.5).abs() < 1e-9);
    }
}
