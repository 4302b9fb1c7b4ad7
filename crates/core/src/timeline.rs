//! Relevance filter, true event time and synthetic display slots

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::{debug, info};

use crate::{
    config::{FilterConfig, TimelineConfig},
    error::{QuakemapError, Result},
    types::{EventRecord, TimedRecord},
};

/// Format of the animation time tag attached to every feature.
pub const SLOT_FORMAT: &str = "%Y-%m-%d";
/// Format of the true event time shown in popups.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn is_relevant(record: &EventRecord, filter: &FilterConfig) -> bool {
    record.magnitude >= filter.min_magnitude && record.year >= filter.min_year
}

/// Compose the record's clock fields into a datetime and shift it by `offset_hours`.
pub fn event_time(record: &EventRecord, offset_hours: i64) -> Result<NaiveDateTime> {
    let row = record.row;

    if !(1..=12).contains(&record.month) {
        return Err(QuakemapError::malformed(
            row,
            "month",
            format!("is not a calendar month: {}", record.month),
        ));
    }
    let date = NaiveDate::from_ymd_opt(record.year, record.month, record.day).ok_or_else(|| {
        QuakemapError::malformed(
            row,
            "day",
            format!(
                "does not exist in {:04}-{:02}: {}",
                record.year, record.month, record.day
            ),
        )
    })?;

    for (field, value, limit) in [
        ("hour", record.hour, 23),
        ("minute", record.minute, 59),
        ("second", record.second, 59),
    ] {
        if value > limit {
            return Err(QuakemapError::malformed(
                row,
                field,
                format!("is out of range: {value}"),
            ));
        }
    }
    let time = NaiveTime::from_hms_opt(record.hour, record.minute, record.second)
        .ok_or_else(|| QuakemapError::malformed(row, "second", "does not form a valid time"))?;

    let offset = TimeDelta::try_hours(offset_hours).ok_or_else(|| {
        QuakemapError::Config(format!("utc offset of {offset_hours} hours is out of range"))
    })?;
    date.and_time(time)
        .checked_add_signed(offset)
        .ok_or_else(|| QuakemapError::malformed(row, "year", "is out of the representable range"))
}

/// Slot `index` on the synthetic timeline: `start + index * slot_days`.
pub fn display_slot(config: &TimelineConfig, index: usize, row: usize) -> Result<NaiveDate> {
    let days = u64::from(config.slot_days)
        .checked_mul(index as u64)
        .ok_or_else(|| QuakemapError::malformed(row, "display_slot", "overflows the calendar"))?;
    config
        .start_date
        .checked_add_days(Days::new(days))
        .ok_or_else(|| QuakemapError::malformed(row, "display_slot", "overflows the calendar"))
}

/// Keep relevant records in source order and attach both times to each.
///
/// Any record that survives the filter but cannot be composed into a datetime
/// aborts the run, since every later slot depends on the kept count.
pub fn normalize(
    records: &[EventRecord],
    filter: &FilterConfig,
    timeline: &TimelineConfig,
) -> Result<Vec<TimedRecord>> {
    let kept: Vec<&EventRecord> = records.iter().filter(|r| is_relevant(r, filter)).collect();
    info!(
        "Kept {} of {} records (magnitude >= {}, year >= {})",
        kept.len(),
        records.len(),
        filter.min_magnitude,
        filter.min_year
    );

    kept.into_iter()
        .enumerate()
        .map(|(index, record)| {
            let event_time = event_time(record, timeline.utc_offset_hours)?;
            let display_slot = display_slot(timeline, index, record.row)?;
            debug!(
                row = record.row,
                "{} M{} at {} -> slot {}",
                record.location,
                record.magnitude,
                event_time.format(EVENT_TIME_FORMAT),
                display_slot.format(SLOT_FORMAT)
            );
            Ok(TimedRecord {
                record: record.clone(),
                event_time,
                display_slot,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, magnitude: f64, year: i32) -> EventRecord {
        EventRecord {
            row,
            magnitude,
            depth: 10.0,
            longitude: 100.0,
            latitude: 30.0,
            year,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            location: format!("ROW {row}"),
            casualty_index: 0,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_keeps_thresholds_inclusive() {
        let filter = FilterConfig::default();
        assert!(is_relevant(&record(1, 6.5, 1975), &filter));
        assert!(!is_relevant(&record(2, 6.49, 2000), &filter));
        assert!(!is_relevant(&record(3, 8.0, 1974), &filter));
    }

    #[test]
    fn test_normalize_preserves_source_order_of_kept_records() {
        let records = vec![
            record(1, 7.0, 2001),
            record(2, 5.0, 2001),
            record(3, 6.8, 1960),
            record(4, 6.9, 1999),
            record(5, 7.7, 1980),
        ];
        let timed = normalize(
            &records,
            &FilterConfig::default(),
            &TimelineConfig::default(),
        )
        .unwrap();

        let rows: Vec<usize> = timed.iter().map(|t| t.record.row).collect();
        assert_eq!(rows, vec![1, 4, 5]);
    }

    #[test]
    fn test_slots_advance_two_days_regardless_of_event_time() {
        let mut records = vec![
            record(1, 7.0, 2020),
            record(2, 7.0, 1980),
            record(3, 7.0, 2010),
        ];
        records[1].month = 12;
        let timed = normalize(
            &records,
            &FilterConfig::default(),
            &TimelineConfig::default(),
        )
        .unwrap();

        assert_eq!(timed[0].display_slot, date(2024, 1, 1));
        assert_eq!(timed[1].display_slot, date(2024, 1, 3));
        assert_eq!(timed[2].display_slot, date(2024, 1, 5));
        for pair in timed.windows(2) {
            assert_eq!(
                pair[1].display_slot - pair[0].display_slot,
                TimeDelta::days(2)
            );
        }
    }

    #[test]
    fn test_event_time_applies_offset_across_midnight() {
        let mut r = record(1, 7.0, 2008);
        r.month = 5;
        r.day = 12;
        r.hour = 18;
        r.minute = 28;
        r.second = 1;

        let t = event_time(&r, 8).unwrap();
        assert_eq!(t.format(EVENT_TIME_FORMAT).to_string(), "2008-05-13 02:28:01");
    }

    #[test]
    fn test_invalid_month_names_month_field() {
        let mut r = record(7, 7.0, 2008);
        r.month = 13;
        let err = event_time(&r, 8).unwrap_err();
        assert!(matches!(
            err,
            QuakemapError::MalformedRecord { row: 7, ref field, .. } if field == "month"
        ));
    }

    #[test]
    fn test_nonexistent_day_names_day_field() {
        let mut r = record(2, 7.0, 2019);
        r.month = 2;
        r.day = 29;
        let err = event_time(&r, 8).unwrap_err();
        assert!(matches!(
            err,
            QuakemapError::MalformedRecord { ref field, .. } if field == "day"
        ));
    }

    #[test]
    fn test_malformed_kept_record_aborts_normalize() {
        let mut bad = record(2, 7.0, 2019);
        bad.hour = 24;
        let records = vec![record(1, 7.0, 2019), bad];
        let err = normalize(
            &records,
            &FilterConfig::default(),
            &TimelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            QuakemapError::MalformedRecord { row: 2, ref field, .. } if field == "hour"
        ));
    }

    #[test]
    fn test_malformed_dropped_record_is_ignored() {
        let mut bad = record(2, 5.0, 2019);
        bad.month = 0;
        let records = vec![record(1, 7.0, 2019), bad];
        let timed = normalize(
            &records,
            &FilterConfig::default(),
            &TimelineConfig::default(),
        )
        .unwrap();
        assert_eq!(timed.len(), 1);
    }
}
