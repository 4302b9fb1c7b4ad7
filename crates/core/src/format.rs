use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    features::FeatureRole,
    pipeline::PipelineOutput,
    timeline::{EVENT_TIME_FORMAT, SLOT_FORMAT},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub input_rows: usize,
    pub kept_records: usize,
    pub feature_count: usize,
    pub first_slot: Option<NaiveDate>,
    pub last_slot: Option<NaiveDate>,
    pub earliest_event: Option<NaiveDateTime>,
    pub latest_event: Option<NaiveDateTime>,
    /// Record count per magnitude level.
    pub magnitude_levels: BTreeMap<u8, usize>,
    /// Record count per (inverted) depth level.
    pub depth_levels: BTreeMap<u8, usize>,
    pub features_by_role: BTreeMap<FeatureRole, usize>,
}

impl RunSummary {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let mut magnitude_levels = BTreeMap::new();
        let mut depth_levels = BTreeMap::new();
        for record in &output.records {
            *magnitude_levels.entry(record.magnitude_level).or_insert(0) += 1;
            *depth_levels.entry(record.depth_level).or_insert(0) += 1;
        }

        let mut features_by_role = BTreeMap::new();
        for feature in &output.features {
            *features_by_role.entry(feature.role).or_insert(0) += 1;
        }

        Self {
            input_rows: output.input_rows,
            kept_records: output.records.len(),
            feature_count: output.features.len(),
            first_slot: output.records.first().map(|r| r.display_slot()),
            last_slot: output.records.last().map(|r| r.display_slot()),
            earliest_event: output.records.iter().map(|r| r.event_time()).min(),
            latest_event: output.records.iter().map(|r| r.event_time()).max(),
            magnitude_levels,
            depth_levels,
            features_by_role,
        }
    }
}

fn histogram_line(counts: &BTreeMap<u8, usize>) -> String {
    counts
        .iter()
        .map(|(level, count)| format!("{}×{}", level, count))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Format a run summary as human-readable text
pub fn format_summary_readable(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Records: {} read, {} kept | Features: {}\n",
        summary.input_rows, summary.kept_records, summary.feature_count
    ));

    if let (Some(first), Some(last)) = (summary.first_slot, summary.last_slot) {
        output.push_str(&format!(
            "Timeline: {} → {}\n",
            first.format(SLOT_FORMAT),
            last.format(SLOT_FORMAT)
        ));
    }
    if let (Some(earliest), Some(latest)) = (summary.earliest_event, summary.latest_event) {
        output.push_str(&format!(
            "Events: {} → {}\n",
            earliest.format(EVENT_TIME_FORMAT),
            latest.format(EVENT_TIME_FORMAT)
        ));
    }

    if !summary.magnitude_levels.is_empty() {
        output.push_str(&format!(
            "Magnitude levels: {}\n",
            histogram_line(&summary.magnitude_levels)
        ));
        output.push_str(&format!(
            "Depth levels: {}\n",
            histogram_line(&summary.depth_levels)
        ));
    }

    for (role, count) in &summary.features_by_role {
        output.push_str(&format!("• {}: {}\n", role.name(), count));
    }

    output
}
