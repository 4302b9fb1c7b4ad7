//! Quakemap Core Library
//!
//! Turns a table of seismic events into an ordered stream of styled,
//! time-tagged point features for a time-animated map layer.

pub mod classify;
pub mod config;
pub mod error;
pub mod features;
pub mod format;
pub mod pipeline;
pub mod playback;
pub mod source;
pub mod style;
pub mod timeline;
pub mod types;

// Re-export commonly used items at crate root
pub use classify::{Bins, classify};
pub use config::{FilterConfig, PipelineConfig, TimelineConfig, resolve_config_path};
pub use error::{QuakemapError, Result};
pub use features::{Feature, FeatureRole, Geometry, Properties, Style, features_for};
pub use format::{RunSummary, format_summary_readable};
pub use pipeline::{PipelineOutput, assemble_features, run_file, run_pipeline};
pub use playback::{
    AnimationLayer, FeatureCollection, PlaybackOptions, collection_to_json, layer_to_json,
    save_collection, save_layer,
};
pub use source::{RawTable, load_table};
pub use timeline::normalize;
pub use types::{ClassifiedRecord, EventRecord, TimedRecord};
