//! GeoJSON-like track input.
//!
//! The track-ingestion layer hands over a `FeatureCollection` whose geometries
//! carry `[lng, lat, elevation?]` positions. Only line geometries contribute to
//! the course; points (POIs) and unknown geometry types are skipped.

use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One raw track position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackCoord {
    pub lng: f64,
    pub lat: f64,
    /// Missing when the source recorded no altitude
    pub elevation: Option<f64>,
}

impl TrackCoord {
    pub fn new(lng: f64, lat: f64, elevation: Option<f64>) -> Self {
        Self { lng, lat, elevation }
    }

    /// Planar coordinate for geo algorithms (`x = lng`, `y = lat`).
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    /// Parse a GeoJSON position array. Returns `None` unless the first two
    /// members are numbers.
    fn from_position(value: &Value) -> Option<Self> {
        let position = value.as_array()?;
        let lng = position.first()?.as_f64()?;
        let lat = position.get(1)?.as_f64()?;
        let elevation = position.get(2).and_then(Value::as_f64);
        Some(Self::new(lng, lat, elevation))
    }
}

/// A GeoJSON geometry, kept loosely typed so unsupported kinds pass through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
    /// Members of a `GeometryCollection`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometries: Vec<Geometry>,
}

impl Geometry {
    /// Append every line carried by this geometry to `out`.
    fn collect_lines(&self, out: &mut Vec<Vec<TrackCoord>>) {
        match self.kind.as_str() {
            "LineString" => out.push(parse_line(&self.coordinates)),
            "MultiLineString" => {
                if let Some(lines) = self.coordinates.as_array() {
                    out.extend(lines.iter().map(parse_line));
                }
            }
            "GeometryCollection" => {
                for geometry in &self.geometries {
                    geometry.collect_lines(out);
                }
            }
            // Points are waypoints/POIs, not track
            _ => {}
        }
    }
}

fn parse_line(value: &Value) -> Vec<TrackCoord> {
    value
        .as_array()
        .map(|positions| {
            positions
                .iter()
                .filter_map(TrackCoord::from_position)
                .collect()
        })
        .unwrap_or_default()
}

/// A GeoJSON feature. Properties are ignored by the pacing core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub properties: Value,
}

/// The track as delivered by the ingestion layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Parse a GeoJSON `FeatureCollection` document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Flatten every line geometry into its own coordinate list, in document
    /// order. Empty lines are dropped.
    pub fn coordinate_lists(&self) -> Vec<Vec<TrackCoord>> {
        let mut lines = Vec::new();
        for geometry in self.features.iter().filter_map(|f| f.geometry.as_ref()) {
            geometry.collect_lines(&mut lines);
        }
        lines.retain(|line| !line.is_empty());
        lines
    }
}
