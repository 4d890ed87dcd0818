//! # Gradepace
//!
//! Grade-adjusted pacing plans for GPS courses.
//!
//! This library provides:
//! - Elevation profile extraction from GeoJSON-like track geometry, including
//!   stitching of tracks split by GPS dropouts
//! - Distance-windowed grade estimation
//! - A smooth terrain-response curve mapping grade to a pace multiplier
//! - Waypoint segment decomposition with elevation gain/loss
//! - Arrival-time prediction at every waypoint, renormalized so the total
//!   travel time matches the runner's target exactly
//!
//! ## Features
//!
//! - **`parallel`** - Integrate segment factors in parallel with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use gradepace::{
//!     build_segments, compute_arrival_times, ElevationPoint, PacingInput, Plan,
//!     SmoothingConfig, Waypoint,
//! };
//!
//! // A 10 km flat course sampled every 100 m
//! let profile: Vec<ElevationPoint> = (0..=100)
//!     .map(|i| ElevationPoint::new(i as f64 * 100.0, 50.0))
//!     .collect();
//!
//! let waypoints = vec![
//!     Waypoint::new("start", 0.0, 0),
//!     Waypoint::new("finish", 10_000.0, 1),
//! ];
//! let segments = build_segments(&waypoints, Some(&profile));
//!
//! let plan = Plan::with_pace_per_km(480.0); // 8:00/km
//! let input = PacingInput {
//!     waypoints: &waypoints,
//!     segments: &segments,
//!     profile: &profile,
//!     plan: &plan,
//!     stoppages: &[],
//!     smoothing: SmoothingConfig::default(),
//! };
//!
//! let result = compute_arrival_times(&input);
//! assert_eq!(result.arrival_map()["finish"], 4800);
//! ```

use geo::{BoundingRect, Coord, LineString};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, PacingError, Result};

// Geographic utilities (haversine distance, coordinate validity)
pub mod geo_utils;

// GeoJSON-like track input
pub mod track;
pub use track::{FeatureCollection, TrackCoord};

// Elevation profile extraction and track stitching
pub mod profile;
pub use profile::{
    extract_elevation_profile, extract_from_geojson_str, summarize_profile, ProfileExtractor,
    ProfileSummary, ProximityStitcher, StitchPolicy,
};

// Grade estimation
pub mod grade;
pub use grade::{elevation_at, grade_at};

// Terrain-response curve
pub mod adjustment;
pub use adjustment::{clamped_factor, pace_factor};

// Waypoint segment decomposition
pub mod segments;
pub use segments::{build_segments, course_elevation_totals};

// Plan model and stoppage resolution
pub mod plan;
pub use plan::{
    validate_waypoints, PaceMode, PaceUnit, PacingStrategyKind, Plan, WaypointStoppageTime,
};

// Pacing strategy seam (flat implemented, linear reserved)
pub mod strategy;
pub use strategy::{strategy_for, FlatStrategy, PacingStrategy};

// Grade-adjusted time engine
pub mod engine;
pub use engine::{
    compute_arrival_times, try_compute_arrival_times, PacingInput, PacingResult,
    SegmentDiagnostics, WaypointArrival,
};

// Fixed-distance splits with back-scaling
pub mod splits;
pub use splits::{compute_splits, try_compute_splits, Split};

// Display-only pace chart smoothing
pub mod smoothing;
pub use smoothing::{pace_chart, sliding_window_mean, PaceChartPoint};

// Memoization layer
pub mod cache;
pub use cache::PacingCache;

// Algorithm toolbox - flat access to the standalone algorithms
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// One sample of the distance-indexed elevation series.
///
/// Produced by the profile extractor, ordered ascending by `distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationPoint {
    /// Cumulative distance along the track in meters
    pub distance: f64,
    /// Elevation in meters (0 when the source had none)
    pub elevation: f64,
    pub lat: f64,
    pub lng: f64,
    /// Index of the source coordinate in the stitched track
    pub original_index: i32,
}

impl ElevationPoint {
    /// Create a point with only distance and elevation (no position).
    pub fn new(distance: f64, elevation: f64) -> Self {
        Self {
            distance,
            elevation,
            lat: 0.0,
            lng: 0.0,
            original_index: -1,
        }
    }
}

/// A waypoint placed along the course.
///
/// `order` defines the sequence: the minimum order is the start, the maximum
/// order is the finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Distance along the route in meters
    pub distance: f64,
    pub order: i32,
    /// Stored elevation in meters, if known
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl Waypoint {
    /// Create a waypoint without a stored elevation.
    pub fn new(id: impl Into<String>, distance: f64, order: i32) -> Self {
        Self {
            id: id.into(),
            name: None,
            distance,
            order,
            elevation: None,
        }
    }

    /// Attach a stored elevation.
    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// The stretch of course between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointSegment {
    pub from_waypoint: String,
    pub to_waypoint: String,
    /// Distance in meters
    pub distance: f64,
    /// Total climbing in meters
    pub elevation_gain: f64,
    /// Total descending in meters (positive magnitude)
    pub elevation_loss: f64,
}

/// Bounding box of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from the positions of an elevation series.
    pub fn from_points(points: &[ElevationPoint]) -> Option<Self> {
        let line: LineString<f64> = points
            .iter()
            .map(|p| Coord { x: p.lng, y: p.lat })
            .collect();
        let rect = line.bounding_rect()?;

        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }
}

// ============================================================================
// Smoothing Configuration
// ============================================================================

/// Default grade window in meters.
pub const DEFAULT_GRADE_WINDOW_M: f64 = 100.0;
/// Default pace-chart smoothing window in meters.
pub const DEFAULT_PACE_WINDOW_M: f64 = 300.0;
/// Default integration sample step in meters.
pub const DEFAULT_SAMPLE_STEP_M: f64 = 50.0;
/// Smallest accepted integration sample step in meters.
pub const MIN_SAMPLE_STEP_M: f64 = 1.0;

/// Distance span used to estimate grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeWindow {
    /// Slope between the two profile points bracketing the target
    Raw,
    /// Slope across a centered window of this many meters
    Meters(f64),
}

impl GradeWindow {
    /// Decode a stored window where `0` means "raw".
    pub fn from_meters(meters: f64) -> Self {
        if meters > 0.0 {
            GradeWindow::Meters(meters)
        } else {
            GradeWindow::Raw
        }
    }
}

impl Default for GradeWindow {
    fn default() -> Self {
        GradeWindow::Meters(DEFAULT_GRADE_WINDOW_M)
    }
}

/// Distance span used to smooth the display pace chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartWindow {
    /// Per-point pace, no smoothing
    Raw,
    /// Centered moving average over this many meters
    Meters(f64),
}

impl ChartWindow {
    /// Decode a stored window where `0` means "raw".
    pub fn from_meters(meters: f64) -> Self {
        if meters > 0.0 {
            ChartWindow::Meters(meters)
        } else {
            ChartWindow::Raw
        }
    }
}

impl Default for ChartWindow {
    fn default() -> Self {
        ChartWindow::Meters(DEFAULT_PACE_WINDOW_M)
    }
}

/// Distance increment for integrating the pace factor across a segment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleStep {
    /// Use [`DEFAULT_SAMPLE_STEP_M`]
    #[default]
    Default,
    Meters(f64),
}

impl SampleStep {
    /// Decode a stored step where `0` means "use the default".
    pub fn from_meters(meters: f64) -> Self {
        if meters > 0.0 {
            SampleStep::Meters(meters)
        } else {
            SampleStep::Default
        }
    }

    /// Effective step in meters, never below [`MIN_SAMPLE_STEP_M`].
    pub fn meters(&self) -> f64 {
        match *self {
            SampleStep::Meters(m) if m > 0.0 && m.is_finite() => m.max(MIN_SAMPLE_STEP_M),
            _ => DEFAULT_SAMPLE_STEP_M,
        }
    }
}

/// Smoothing parameters for grade estimation, integration and charting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingConfig {
    /// Grade estimation window.
    /// Default: 100 meters
    pub grade_window: GradeWindow,

    /// Pace chart smoothing window (display only).
    /// Default: 300 meters
    pub pace_window: ChartWindow,

    /// Integration sample step.
    /// Default: 50 meters
    pub sample_step: SampleStep,
}

/// Per-course smoothing overrides as stored alongside a course.
///
/// `None` falls back to the system default. A stored `0` keeps its legacy
/// meaning: raw values for the two windows, the default for the sample step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothingOverrides {
    #[serde(default)]
    pub grade_window: Option<f64>,
    #[serde(default)]
    pub pace_window: Option<f64>,
    #[serde(default)]
    pub sample_step: Option<f64>,
}

impl SmoothingOverrides {
    /// Resolve overrides against the defaults, rejecting negative or
    /// non-finite values and sample steps below [`MIN_SAMPLE_STEP_M`].
    pub fn resolve(&self) -> Result<SmoothingConfig> {
        fn check(parameter: &str, value: Option<f64>) -> Result<Option<f64>> {
            match value {
                Some(v) if !v.is_finite() || v < 0.0 => Err(PacingError::InvalidSmoothing {
                    parameter: parameter.to_string(),
                    value: v,
                }),
                other => Ok(other),
            }
        }

        let grade_window = check("gradeWindow", self.grade_window)?
            .map(GradeWindow::from_meters)
            .unwrap_or_default();
        let pace_window = check("paceWindow", self.pace_window)?
            .map(ChartWindow::from_meters)
            .unwrap_or_default();
        let sample_step = match check("sampleStep", self.sample_step)? {
            Some(v) if v > 0.0 && v < MIN_SAMPLE_STEP_M => {
                return Err(PacingError::InvalidSmoothing {
                    parameter: "sampleStep".to_string(),
                    value: v,
                })
            }
            other => other.map(SampleStep::from_meters).unwrap_or_default(),
        };

        Ok(SmoothingConfig {
            grade_window,
            pace_window,
            sample_step,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
