//! Pacing plan model and boundary validation.
//!
//! Plans arrive from persistence as camelCase JSON records. `Plan::validate`
//! and [`validate_waypoints`] reject malformed input before it reaches the
//! engine; the engine itself treats missing values as "no data".

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, PacingError, Result};
use crate::Waypoint;

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Distance unit the plan's pace is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaceUnit {
    #[default]
    #[serde(rename = "min_per_km")]
    MinPerKm,
    #[serde(rename = "min_per_mi")]
    MinPerMi,
}

impl PaceUnit {
    /// Length of one unit in meters.
    pub fn meters(&self) -> f64 {
        match self {
            PaceUnit::MinPerKm => 1000.0,
            PaceUnit::MinPerMi => METERS_PER_MILE,
        }
    }
}

/// How the plan states its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceMode {
    /// Average pace over the course; grade adjustment redistributes time
    #[default]
    Pace,
    /// Finish time; the pace is derived from it
    Time,
    /// The pace is a flat-ground effort pace; the course average is derived
    /// from it and the terrain
    Normalized,
}

/// Pacing strategy selector. Only `Flat` has a defined computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingStrategyKind {
    #[default]
    Flat,
    Linear,
}

/// User-authored pacing configuration for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Seconds per pace unit
    #[serde(default)]
    pub pace: Option<f64>,
    #[serde(default)]
    pub pace_unit: PaceUnit,
    #[serde(default)]
    pub pace_mode: PaceMode,
    #[serde(default)]
    pub target_time_seconds: Option<f64>,
    /// Seconds credited at every intermediate waypoint
    #[serde(default)]
    pub default_stoppage_time: f64,
    #[serde(default = "default_true")]
    pub use_grade_adjustment: bool,
    #[serde(default)]
    pub pacing_strategy: PacingStrategyKind,
    #[serde(default)]
    pub pacing_linear_percent: f64,
}

fn default_true() -> bool {
    true
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            pace: None,
            pace_unit: PaceUnit::MinPerKm,
            pace_mode: PaceMode::Pace,
            target_time_seconds: None,
            default_stoppage_time: 0.0,
            use_grade_adjustment: true,
            pacing_strategy: PacingStrategyKind::Flat,
            pacing_linear_percent: 0.0,
        }
    }
}

impl Plan {
    /// Pace-mode plan in seconds per kilometer.
    pub fn with_pace_per_km(seconds: f64) -> Self {
        Self {
            pace: Some(seconds),
            ..Default::default()
        }
    }

    /// Pace-mode plan in seconds per mile.
    pub fn with_pace_per_mile(seconds: f64) -> Self {
        Self {
            pace: Some(seconds),
            pace_unit: PaceUnit::MinPerMi,
            ..Default::default()
        }
    }

    /// Time-mode plan targeting a finish time in seconds.
    pub fn with_target_time(seconds: f64) -> Self {
        Self {
            pace_mode: PaceMode::Time,
            target_time_seconds: Some(seconds),
            ..Default::default()
        }
    }

    /// Stated pace converted to seconds per meter, if set and positive.
    pub fn pace_per_meter(&self) -> Option<f64> {
        self.pace
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| p / self.pace_unit.meters())
    }

    /// Target finish time when the plan is in time mode.
    pub fn time_target(&self) -> Option<f64> {
        if self.pace_mode != PaceMode::Time {
            return None;
        }
        self.target_time_seconds.filter(|t| t.is_finite() && *t > 0.0)
    }

    /// Base pace in seconds per meter for a course.
    ///
    /// Time mode spreads the target (minus stoppage) over the distance; other
    /// modes use the stated pace. Missing data yields 0.
    pub fn base_pace_per_meter(&self, total_distance: f64, total_stoppage: f64) -> f64 {
        match self.time_target() {
            Some(target) if total_distance > 0.0 => {
                ((target - total_stoppage) / total_distance).max(0.0)
            }
            Some(_) => 0.0,
            None => self.pace_per_meter().unwrap_or(0.0),
        }
    }

    /// Course-average base pace once the terrain is known.
    ///
    /// Normalized plans state a flat-ground effort pace, so the average over
    /// the course is that pace stretched by `E / D`. Other modes already state
    /// the average. Normalization then applies to every mode alike.
    pub fn course_base_pace(
        &self,
        stated: f64,
        total_distance: f64,
        equivalent_distance: f64,
    ) -> f64 {
        if self.pace_mode == PaceMode::Normalized
            && total_distance > 0.0
            && equivalent_distance > 0.0
        {
            stated * equivalent_distance / total_distance
        } else {
            stated
        }
    }

    /// Check field ranges and mode requirements.
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &str, message: &str) -> PacingError {
            PacingError::InvalidPlan {
                field: field.to_string(),
                message: message.to_string(),
            }
        }

        if let Some(pace) = self.pace {
            if !pace.is_finite() || pace < 0.0 {
                return Err(invalid("pace", "must be finite and >= 0"));
            }
        }
        if let Some(target) = self.target_time_seconds {
            if !target.is_finite() || target < 0.0 {
                return Err(invalid("targetTimeSeconds", "must be finite and >= 0"));
            }
        }
        if self.pace_mode == PaceMode::Time {
            self.target_time_seconds
                .ok_or_invalid_plan("targetTimeSeconds", "required in time mode")?;
        }
        if !self.default_stoppage_time.is_finite() || self.default_stoppage_time < 0.0 {
            return Err(invalid("defaultStoppageTime", "must be finite and >= 0"));
        }
        if !self.pacing_linear_percent.is_finite() {
            return Err(invalid("pacingLinearPercent", "must be finite"));
        }
        Ok(())
    }
}

/// Per-(plan, waypoint) override of the default stoppage time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointStoppageTime {
    pub plan_id: String,
    pub waypoint_id: String,
    /// Seconds
    pub stoppage_time: f64,
}

impl WaypointStoppageTime {
    pub fn new(plan_id: impl Into<String>, waypoint_id: impl Into<String>, seconds: f64) -> Self {
        Self {
            plan_id: plan_id.into(),
            waypoint_id: waypoint_id.into(),
            stoppage_time: seconds,
        }
    }
}

/// Stoppage seconds for each waypoint of `ordered` (already sorted by order).
///
/// An override wins when present (the last one for a waypoint if duplicated).
/// Otherwise intermediate waypoints get the plan default and the start/finish
/// (minimum/maximum order) get zero.
pub fn resolve_stoppages(
    ordered: &[&Waypoint],
    plan: &Plan,
    overrides: &[WaypointStoppageTime],
) -> Vec<f64> {
    let custom: HashMap<&str, f64> = overrides
        .iter()
        .filter(|o| o.stoppage_time.is_finite())
        .map(|o| (o.waypoint_id.as_str(), o.stoppage_time.max(0.0)))
        .collect();

    let min_order = ordered.iter().map(|w| w.order).min();
    let max_order = ordered.iter().map(|w| w.order).max();
    let default = plan.default_stoppage_time.max(0.0);

    ordered
        .iter()
        .map(|w| {
            if let Some(&seconds) = custom.get(w.id.as_str()) {
                return seconds;
            }
            let is_endpoint = Some(w.order) == min_order || Some(w.order) == max_order;
            if is_endpoint {
                0.0
            } else {
                default
            }
        })
        .collect()
}

/// Check the waypoint invariants: finite non-negative distances, unique ids,
/// unique orders and no two waypoints at the same distance.
pub fn validate_waypoints(waypoints: &[Waypoint]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut orders = HashSet::new();

    for w in waypoints {
        if !w.distance.is_finite() || w.distance < 0.0 {
            return Err(PacingError::InvalidWaypoints {
                message: format!("waypoint '{}' has invalid distance {}", w.id, w.distance),
            });
        }
        if !ids.insert(w.id.as_str()) {
            return Err(PacingError::InvalidWaypoints {
                message: format!("duplicate waypoint id '{}'", w.id),
            });
        }
        if !orders.insert(w.order) {
            return Err(PacingError::InvalidWaypoints {
                message: format!("duplicate order {}", w.order),
            });
        }
    }

    let mut distances: Vec<f64> = waypoints.iter().map(|w| w.distance).collect();
    distances.sort_by(|a, b| a.total_cmp(b));
    if let Some(pair) = distances.windows(2).find(|p| p[0] == p[1]) {
        return Err(PacingError::InvalidWaypoints {
            message: format!("two waypoints share distance {}", pair[0]),
        });
    }
    Ok(())
}
