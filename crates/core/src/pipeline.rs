use std::path::Path;

use tracing::info;

use crate::{
    classify::classify,
    config::PipelineConfig,
    error::Result,
    features::{Feature, features_for},
    source::load_table,
    timeline::normalize,
    types::{ClassifiedRecord, EventRecord},
};

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rows read from the source, before filtering.
    pub input_rows: usize,
    pub records: Vec<ClassifiedRecord>,
    pub features: Vec<Feature>,
}

/// Concatenate every record's features in record order.
///
/// This is the only place that decides render and animation order.
pub fn assemble_features(records: &[ClassifiedRecord]) -> Result<Vec<Feature>> {
    let mut features = Vec::new();
    for record in records {
        features.extend(features_for(record)?);
    }
    Ok(features)
}

/// Normalize, classify and synthesize features for a table already in memory
pub fn run_pipeline(records: &[EventRecord], config: &PipelineConfig) -> Result<PipelineOutput> {
    let timed = normalize(records, &config.filter, &config.timeline)?;
    let classified = classify(timed)?;
    let features = assemble_features(&classified)?;

    info!(
        "Synthesized {} features from {} records",
        features.len(),
        classified.len()
    );

    Ok(PipelineOutput {
        input_rows: records.len(),
        records: classified,
        features,
    })
}

/// Load a table from disk and run the pipeline over it
pub async fn run_file(path: &Path, config: &PipelineConfig) -> Result<PipelineOutput> {
    let records = load_table(path).await?;
    run_pipeline(&records, config)
}
