//! Styled point features emitted for each classified record

use serde::Serialize;

use crate::{
    error::{QuakemapError, Result},
    style::{
        CASUALTY_RADIUS_SCALE, CASUALTY_WEIGHT, DEPTH_RING_COLOR, DEPTH_RING_DASH,
        DEPTH_RING_RADIUS_PAD, DEPTH_RING_RADIUS_SCALE, DEPTH_RING_WEIGHT_SCALE,
        MARKER_COLOR, MARKER_LATITUDE_OFFSET, MARKER_OPACITY, MARKER_POPUP_MILLIS,
        MARKER_RADIUS, RING_COLORS, RING_RADII, RING_RADIUS_SCALE, RING_WIDTHS, casualty_color,
        ring_opacity,
    },
    timeline::{EVENT_TIME_FORMAT, SLOT_FORMAT},
    types::ClassifiedRecord,
};

/// Which emitter produced a feature. Not part of the serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureRole {
    CasualtyCircle,
    MagnitudeRing,
    DepthRing,
    InfoMarker,
}

impl FeatureRole {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureRole::CasualtyCircle => "casualty circle",
            FeatureRole::MagnitudeRing => "magnitude ring",
            FeatureRole::DepthRing => "depth ring",
            FeatureRole::InfoMarker => "info marker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl Geometry {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point",
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub radius: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Properties {
    /// Display slot, `YYYY-MM-DD`.
    pub time: String,
    pub icon: &'static str,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autopopup: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popuptime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Geometry,
    pub properties: Properties,
    #[serde(skip)]
    pub role: FeatureRole,
}

impl Feature {
    fn circle(role: FeatureRole, geometry: Geometry, time: String, style: Style) -> Self {
        Self {
            kind: "Feature",
            geometry,
            properties: Properties {
                time,
                icon: "circle",
                style,
                popup: None,
                autopopup: None,
                popuptime: None,
            },
            role,
        }
    }
}

fn slot_tag(record: &ClassifiedRecord) -> String {
    record.display_slot().format(SLOT_FORMAT).to_string()
}

fn point_of(record: &ClassifiedRecord) -> Geometry {
    let r = record.record();
    Geometry::point(r.longitude, r.latitude)
}

/// Filled circle sized by magnitude and colored by casualty severity.
pub fn casualty_circle(record: &ClassifiedRecord) -> Result<Feature> {
    let r = record.record();
    let color = casualty_color(r.casualty_index).ok_or_else(|| {
        QuakemapError::StyleIndexOutOfRange {
            row: r.row,
            index: r.casualty_index,
        }
    })?;

    Ok(Feature::circle(
        FeatureRole::CasualtyCircle,
        point_of(record),
        slot_tag(record),
        Style {
            radius: f64::from(record.magnitude_level) * CASUALTY_RADIUS_SCALE,
            color: color.to_string(),
            weight: Some(CASUALTY_WEIGHT),
            fill_color: Some(color.to_string()),
            fill_opacity: Some(1.0),
            ..Style::default()
        },
    ))
}

/// One ring per magnitude tier, innermost first.
pub fn magnitude_rings(record: &ClassifiedRecord) -> Result<Vec<Feature>> {
    let count = usize::from(record.magnitude_level);
    if count > RING_COLORS.len() {
        return Err(QuakemapError::ClassificationRange {
            row: record.record().row,
            column: "magnitude",
            label: i64::from(record.magnitude_level),
        });
    }

    let geometry = point_of(record);
    let time = slot_tag(record);
    Ok((0..count)
        .map(|ring| {
            Feature::circle(
                FeatureRole::MagnitudeRing,
                geometry.clone(),
                time.clone(),
                Style {
                    radius: RING_RADII[ring] * RING_RADIUS_SCALE,
                    color: RING_COLORS[ring].to_string(),
                    weight: Some(RING_WIDTHS[ring]),
                    opacity: ring_opacity(ring),
                    ..Style::default()
                },
            )
        })
        .collect())
}

/// Dashed outline: size follows magnitude, line weight follows (inverted) depth.
pub fn depth_ring(record: &ClassifiedRecord) -> Feature {
    Feature::circle(
        FeatureRole::DepthRing,
        point_of(record),
        slot_tag(record),
        Style {
            radius: (f64::from(record.magnitude_level) + DEPTH_RING_RADIUS_PAD)
                * DEPTH_RING_RADIUS_SCALE,
            color: DEPTH_RING_COLOR.to_string(),
            weight: Some(f64::from(record.depth_level) * DEPTH_RING_WEIGHT_SCALE),
            fill_color: Some("none".to_string()),
            dash_array: Some(DEPTH_RING_DASH.to_string()),
            ..Style::default()
        },
    )
}

/// Near-invisible point north of the event that carries the label popup.
pub fn info_marker(record: &ClassifiedRecord) -> Feature {
    let r = record.record();
    let mut feature = Feature::circle(
        FeatureRole::InfoMarker,
        Geometry::point(r.longitude, r.latitude + MARKER_LATITUDE_OFFSET),
        slot_tag(record),
        Style {
            radius: MARKER_RADIUS,
            color: MARKER_COLOR.to_string(),
            opacity: Some(MARKER_OPACITY),
            ..Style::default()
        },
    );
    feature.properties.popup = Some(popup_html(record));
    feature.properties.autopopup = Some(true);
    feature.properties.popuptime = Some(MARKER_POPUP_MILLIS);
    feature
}

pub fn popup_html(record: &ClassifiedRecord) -> String {
    let r = record.record();
    format!(
        concat!(
            r#"<div style="background-color: lightblue; padding: 2px; border-radius: 50%/20%; border: 2px solid blue;">"#,
            r#"<p style="font-size: 14px; color: black;">"#,
            "Magnitude: {}<br>Depth: {}km<br>Location: {}<br>Time: {}",
            "</p></div>"
        ),
        r.magnitude,
        r.depth,
        escape_html(&r.location),
        record.event_time().format(EVENT_TIME_FORMAT)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// All features for one record, in render order.
pub fn features_for(record: &ClassifiedRecord) -> Result<Vec<Feature>> {
    let mut features = Vec::with_capacity(usize::from(record.magnitude_level) + 3);
    features.push(casualty_circle(record)?);
    features.extend(magnitude_rings(record)?);
    features.push(depth_ring(record));
    features.push(info_marker(record));
    Ok(features)
}
