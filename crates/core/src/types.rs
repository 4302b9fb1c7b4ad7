use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lowest severity label produced by the classifier.
pub const LEVEL_MIN: u8 = 4;
/// Highest severity label produced by the classifier.
pub const LEVEL_MAX: u8 = 10;
/// Number of equal-width bins (`LEVEL_MIN..=LEVEL_MAX`).
pub const LEVEL_COUNT: usize = 7;
/// Depth labels are stored as `DEPTH_INVERSION_PIVOT - label`.
pub const DEPTH_INVERSION_PIVOT: u8 = 11;

/// One row of the input table, as read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 1-based position of the row among the data rows of the source.
    pub row: usize,
    pub magnitude: f64,
    /// Focal depth in km.
    pub depth: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub location: String,
    pub casualty_index: i64,
}

/// A record that passed the relevance filter, with its derived times.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedRecord {
    pub record: EventRecord,
    /// True event time with the local offset applied.
    pub event_time: NaiveDateTime,
    /// Synthetic, evenly spaced date used only for animation pacing.
    pub display_slot: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub timed: TimedRecord,
    /// Magnitude bin label in `LEVEL_MIN..=LEVEL_MAX`.
    pub magnitude_level: u8,
    /// Inverted depth label: higher means shallower.
    pub depth_level: u8,
}

impl ClassifiedRecord {
    pub fn record(&self) -> &EventRecord {
        &self.timed.record
    }

    pub fn event_time(&self) -> NaiveDateTime {
        self.timed.event_time
    }

    pub fn display_slot(&self) -> NaiveDate {
        self.timed.display_slot
    }

    /// The depth bin label before inversion.
    pub fn depth_bin(&self) -> u8 {
        invert_depth_label(self.depth_level)
    }
}

/// `11 - label`; applying it twice yields the original label.
pub fn invert_depth_label(label: u8) -> u8 {
    DEPTH_INVERSION_PIVOT - label
}
