//! Envelope handed to the time-animated point renderer

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::{error::Result, features::Feature};

/// Playback settings for the animation layer. Durations are ISO 8601.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    /// Time between animation steps; matches the display slot spacing.
    pub period: String,
    /// How long a feature stays visible after its step.
    pub duration: String,
    /// Milliseconds per step transition.
    pub transition_time: u32,
    pub auto_play: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    pub loop_button: bool,
    pub max_speed: u32,
    pub add_last_point: bool,
    pub date_options: String,
    pub time_slider_drag_update: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            period: "PT48H".to_string(),
            duration: "P55D".to_string(),
            transition_time: 1000,
            auto_play: true,
            loop_playback: true,
            loop_button: true,
            max_speed: 5,
            add_last_point: true,
            date_options: "YYYY-MM-DD".to_string(),
            time_slider_drag_update: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

/// A feature collection together with the options it should be played back with.
#[derive(Debug, Clone, Serialize)]
pub struct AnimationLayer {
    pub data: FeatureCollection,
    pub options: PlaybackOptions,
}

impl AnimationLayer {
    pub fn new(features: Vec<Feature>, options: PlaybackOptions) -> Self {
        Self {
            data: FeatureCollection::new(features),
            options,
        }
    }
}

pub fn layer_to_json(layer: &AnimationLayer) -> Result<String> {
    Ok(serde_json::to_string_pretty(layer)?)
}

pub fn collection_to_json(collection: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Save an animation layer to a file
pub async fn save_layer(layer: &AnimationLayer, path: &Path) -> Result<()> {
    let pretty_json = layer_to_json(layer)?;
    fs::write(path, &pretty_json).await?;
    info!(
        "Wrote {} features with playback options to {}",
        layer.data.features.len(),
        path.display()
    );
    Ok(())
}

/// Save a bare feature collection to a file
pub async fn save_collection(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let pretty_json = collection_to_json(collection)?;
    fs::write(path, &pretty_json).await?;
    info!(
        "Wrote {} features to {}",
        collection.features.len(),
        path.display()
    );
    Ok(())
}
