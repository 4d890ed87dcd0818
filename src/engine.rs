//! # Grade-Adjusted Time Engine
//!
//! Predicts cumulative arrival time at every waypoint of a course.
//!
//! ## Algorithm
//!
//! 1. Convert the plan's pace to seconds per meter (or derive it from the
//!    target time in time mode). A normalized plan's flat-ground effort pace
//!    becomes a course average of `pace × E / D`
//! 2. For each waypoint-to-waypoint stretch, integrate the terrain-response
//!    curve over fixed sample steps to get a distance-weighted equivalent
//!    factor `F`
//! 3. Normalize course-wide with `S = D / E`, where `D` is the total distance
//!    and `E = Σ distance × F` is the equivalent distance
//! 4. Stretch pace is `base × F × S`, so the total travel time equals
//!    `base × D` whatever the terrain
//! 5. Add stoppage time at each waypoint and accumulate
//!
//! The mean of factors is used rather than the factor of the mean grade
//! because the curve is nonlinear.
//!
//! Missing data never fails: without a profile, segments or pace the engine
//! falls back to plain `distance × base` per stretch.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::adjustment::clamped_factor;
use crate::error::{PacingError, Result};
use crate::grade::grade_at;
use crate::plan::{resolve_stoppages, validate_waypoints, Plan, WaypointStoppageTime};
use crate::segments::ordered_waypoints;
use crate::strategy::{strategy_for, CoursePosition};
use crate::{
    ElevationPoint, GradeWindow, SmoothingConfig, Waypoint, WaypointSegment, MIN_SAMPLE_STEP_M,
};

// ============================================================================
// Input / Output Types
// ============================================================================

/// Everything the engine needs for one computation. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct PacingInput<'a> {
    pub waypoints: &'a [Waypoint],
    pub segments: &'a [WaypointSegment],
    pub profile: &'a [ElevationPoint],
    pub plan: &'a Plan,
    pub stoppages: &'a [WaypointStoppageTime],
    pub smoothing: SmoothingConfig,
}

/// Predicted timing at one waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointArrival {
    pub waypoint_id: String,
    pub order: i32,
    pub distance: f64,
    /// Travel time of the stretch ending here (0 at the start)
    pub travel_seconds: f64,
    /// Stoppage credited at this waypoint
    pub stoppage_seconds: f64,
    /// Running total of travel and stoppage, including this waypoint's stoppage
    pub cumulative_seconds: f64,
    /// `cumulative_seconds` rounded to whole seconds
    pub cumulative_rounded: i64,
}

/// Per-stretch diagnostics for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDiagnostics {
    pub from_waypoint: String,
    pub to_waypoint: String,
    /// Meters
    pub distance: f64,
    /// Distance-weighted mean grade (percent)
    pub average_grade: f64,
    /// Distance-weighted mean pace multiplier `F`
    pub equivalent_factor: f64,
    /// `F × S`, the multiplier actually applied to the base pace
    pub normalized_factor: f64,
    /// Seconds per plan unit
    pub adjusted_pace: f64,
    pub travel_seconds: f64,
    pub estimated_minutes: f64,
}

/// Full engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingResult {
    /// In waypoint order
    pub arrivals: Vec<WaypointArrival>,
    /// One per consecutive waypoint pair
    pub segments: Vec<SegmentDiagnostics>,
    /// `D` in meters
    pub total_distance: f64,
    /// `E` in meters
    pub equivalent_distance: f64,
    /// `S = D / E`
    pub scale: f64,
    pub base_pace_per_meter: f64,
    pub total_travel_seconds: f64,
    pub total_stoppage_seconds: f64,
    pub finish_seconds: f64,
    /// Whether terrain adjustment was applied or the flat fallback was used
    pub grade_adjusted: bool,
}

impl PacingResult {
    /// Waypoint id → cumulative time in whole seconds.
    pub fn arrival_map(&self) -> HashMap<String, i64> {
        self.arrivals
            .iter()
            .map(|a| (a.waypoint_id.clone(), a.cumulative_rounded))
            .collect()
    }

    /// Serialize the result for the presentation layer.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ============================================================================
// Building Blocks
// ============================================================================

/// Terrain response integrated over one stretch of course.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchFactor {
    /// Distance-weighted mean of the clamped pace multiplier
    pub equivalent_factor: f64,
    /// Distance-weighted mean grade (percent)
    pub average_grade: f64,
}

impl StretchFactor {
    pub const NEUTRAL: StretchFactor = StretchFactor {
        equivalent_factor: 1.0,
        average_grade: 0.0,
    };
}

/// Integrate the pace multiplier between two distances.
///
/// The stretch is cut into `step`-meter sub-intervals (the last one partial);
/// each is sampled at its midpoint. Steps below [`MIN_SAMPLE_STEP_M`] are
/// raised to it. Zero-length stretches and series with
/// fewer than two points are neutral.
pub fn integrate_factor(
    profile: &[ElevationPoint],
    from: f64,
    to: f64,
    window: GradeWindow,
    step: f64,
) -> StretchFactor {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    let length = hi - lo;
    if !(length > 0.0) || profile.len() < 2 || !(step > 0.0) {
        return StretchFactor::NEUTRAL;
    }

    let step = step.max(MIN_SAMPLE_STEP_M);
    let samples = (length / step).ceil() as usize;
    let mut weighted_factor = 0.0;
    let mut weighted_grade = 0.0;

    for k in 0..samples {
        let start = lo + k as f64 * step;
        let end = (lo + (k + 1) as f64 * step).min(hi);
        let len = end - start;
        if len <= 0.0 {
            continue;
        }
        let grade = grade_at(profile, start + len / 2.0, window);
        weighted_factor += clamped_factor(grade) * len;
        weighted_grade += grade * len;
    }

    StretchFactor {
        equivalent_factor: weighted_factor / length,
        average_grade: weighted_grade / length,
    }
}

/// Course-wide normalization of equivalent factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalization {
    /// `D`
    pub total_distance: f64,
    /// `E`
    pub equivalent_distance: f64,
    /// `S`
    pub scale: f64,
}

impl Normalization {
    /// Compute `D`, `E` and `S = D / E` from `(distance, factor)` pairs.
    /// `S` is 1.0 when `E` is not positive.
    pub fn from_stretches(stretches: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (total_distance, equivalent_distance) = stretches
            .into_iter()
            .fold((0.0, 0.0), |(d, e), (distance, factor)| {
                (d + distance, e + distance * factor)
            });
        let scale = if equivalent_distance > 0.0 {
            total_distance / equivalent_distance
        } else {
            1.0
        };

        Self {
            total_distance,
            equivalent_distance,
            scale,
        }
    }

    /// No rescaling: `E = D`, `S = 1`.
    pub fn neutral(total_distance: f64) -> Self {
        Self {
            total_distance,
            equivalent_distance: total_distance,
            scale: 1.0,
        }
    }
}

/// Integrate factors for each `(from, to)` stretch, in order.
pub(crate) fn integrate_stretches(
    profile: &[ElevationPoint],
    bounds: &[(f64, f64)],
    smoothing: &SmoothingConfig,
) -> Vec<StretchFactor> {
    let step = smoothing.sample_step.meters();
    let window = smoothing.grade_window;

    #[cfg(feature = "parallel")]
    let factors = bounds
        .par_iter()
        .map(|&(from, to)| integrate_factor(profile, from, to, window, step))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let factors = bounds
        .iter()
        .map(|&(from, to)| integrate_factor(profile, from, to, window, step))
        .collect();

    factors
}

/// Apply the plan's strategy to terrain factors.
pub(crate) fn apply_strategy(
    plan: &Plan,
    bounds: &[(f64, f64)],
    factors: &mut [StretchFactor],
) {
    let strategy = strategy_for(plan);
    let span: f64 = bounds.iter().map(|(a, b)| (b - a).abs()).sum();
    if span <= 0.0 {
        return;
    }

    let mut covered = 0.0;
    for (factor, (a, b)) in factors.iter_mut().zip(bounds) {
        let length = (b - a).abs();
        let position = CoursePosition {
            start_fraction: covered / span,
            end_fraction: (covered + length) / span,
        };
        factor.equivalent_factor *= strategy.effort_multiplier(position);
        covered += length;
    }
    debug!("[Engine] Applied '{}' strategy over {:.0}m", strategy.name(), span);
}

/// Course-wide normalization of per-stretch factors.
pub(crate) fn normalize(distances: &[f64], factors: &[StretchFactor]) -> Normalization {
    Normalization::from_stretches(
        distances
            .iter()
            .zip(factors)
            .map(|(&d, f)| (d, f.equivalent_factor)),
    )
}

// ============================================================================
// Engine
// ============================================================================

/// Compute arrival times and diagnostics for a course.
///
/// Never fails; see the module docs for fallbacks. Use
/// [`try_compute_arrival_times`] to reject malformed input first.
pub fn compute_arrival_times(input: &PacingInput) -> PacingResult {
    let plan = input.plan;
    let ordered = ordered_waypoints(input.waypoints);
    let stoppages = resolve_stoppages(&ordered, plan, input.stoppages);
    let total_stoppage: f64 = stoppages.iter().sum();

    let segment_lookup: HashMap<(&str, &str), &WaypointSegment> = input
        .segments
        .iter()
        .map(|s| ((s.from_waypoint.as_str(), s.to_waypoint.as_str()), s))
        .collect();

    let pairs: Vec<(&Waypoint, &Waypoint)> = ordered.windows(2).map(|p| (p[0], p[1])).collect();
    let bounds: Vec<(f64, f64)> = pairs.iter().map(|(a, b)| (a.distance, b.distance)).collect();
    let matched: Vec<Option<&WaypointSegment>> = pairs
        .iter()
        .map(|(a, b)| segment_lookup.get(&(a.id.as_str(), b.id.as_str())).copied())
        .collect();
    let distances: Vec<f64> = pairs
        .iter()
        .zip(&matched)
        .map(|((a, b), seg)| seg.map(|s| s.distance).unwrap_or((b.distance - a.distance).abs()))
        .collect();

    let total_distance: f64 = distances.iter().sum();
    let stated_base = plan.base_pace_per_meter(total_distance, total_stoppage);

    let grade_adjusted = plan.use_grade_adjustment
        && input.profile.len() >= 2
        && !input.segments.is_empty()
        && !pairs.is_empty()
        && stated_base > 0.0;

    let (factors, normalization) = if grade_adjusted {
        let mut factors = integrate_stretches(input.profile, &bounds, &input.smoothing);
        apply_strategy(plan, &bounds, &mut factors);
        let normalization = normalize(&distances, &factors);
        (factors, normalization)
    } else {
        let factors = distances
            .iter()
            .zip(&matched)
            .map(|(&d, seg)| StretchFactor {
                equivalent_factor: 1.0,
                average_grade: seg.map(|s| net_grade(s, d)).unwrap_or(0.0),
            })
            .collect();
        (factors, Normalization::neutral(total_distance))
    };
    let base = plan.course_base_pace(
        stated_base,
        normalization.total_distance,
        normalization.equivalent_distance,
    );

    let unit_meters = plan.pace_unit.meters();
    let mut segments = Vec::with_capacity(pairs.len());
    let mut travel = Vec::with_capacity(pairs.len());

    for (((from, to), &distance), factor) in pairs.iter().zip(&distances).zip(&factors) {
        let normalized_factor = factor.equivalent_factor * normalization.scale;
        let pace_per_meter = base * normalized_factor;
        let travel_seconds = distance * pace_per_meter;
        travel.push(travel_seconds);

        segments.push(SegmentDiagnostics {
            from_waypoint: from.id.clone(),
            to_waypoint: to.id.clone(),
            distance,
            average_grade: factor.average_grade,
            equivalent_factor: factor.equivalent_factor,
            normalized_factor,
            adjusted_pace: pace_per_meter * unit_meters,
            travel_seconds,
            estimated_minutes: travel_seconds / 60.0,
        });
    }

    let mut cumulative = 0.0;
    let arrivals: Vec<WaypointArrival> = ordered
        .iter()
        .enumerate()
        .map(|(k, w)| {
            let travel_seconds = if k == 0 { 0.0 } else { travel[k - 1] };
            cumulative += travel_seconds + stoppages[k];
            WaypointArrival {
                waypoint_id: w.id.clone(),
                order: w.order,
                distance: w.distance,
                travel_seconds,
                stoppage_seconds: stoppages[k],
                cumulative_seconds: cumulative,
                cumulative_rounded: cumulative.round() as i64,
            }
        })
        .collect();

    let total_travel_seconds: f64 = travel.iter().sum();

    debug!(
        "[Engine] {} waypoints, D={:.0}m E={:.0}m S={:.5}, travel {:.0}s + stoppage {:.0}s \
         (adjusted: {})",
        arrivals.len(),
        normalization.total_distance,
        normalization.equivalent_distance,
        normalization.scale,
        total_travel_seconds,
        total_stoppage,
        grade_adjusted
    );

    PacingResult {
        finish_seconds: arrivals.last().map(|a| a.cumulative_seconds).unwrap_or(0.0),
        arrivals,
        segments,
        total_distance: normalization.total_distance,
        equivalent_distance: normalization.equivalent_distance,
        scale: normalization.scale,
        base_pace_per_meter: base,
        total_travel_seconds,
        total_stoppage_seconds: total_stoppage,
        grade_adjusted,
    }
}

/// Validate the plan, waypoints and segment references, then compute.
pub fn try_compute_arrival_times(input: &PacingInput) -> Result<PacingResult> {
    input.plan.validate()?;
    validate_waypoints(input.waypoints)?;

    for segment in input.segments {
        for id in [&segment.from_waypoint, &segment.to_waypoint] {
            if !input.waypoints.iter().any(|w| &w.id == id) {
                return Err(PacingError::InvalidWaypoints {
                    message: format!("segment references unknown waypoint '{}'", id),
                });
            }
        }
    }

    Ok(compute_arrival_times(input))
}

/// Net grade of a segment from its gain/loss.
fn net_grade(segment: &WaypointSegment, distance: f64) -> f64 {
    if distance > 0.0 {
        (segment.elevation_gain - segment.elevation_loss) / distance * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PaceMode;
    use crate::segments::build_segments;

    fn flat_profile(length: f64) -> Vec<ElevationPoint> {
        let n = (length / 100.0) as usize;
        (0..=n)
            .map(|i| ElevationPoint::new(i as f64 * 100.0, 250.0))
            .collect()
    }

    /// Climb 5% for the first half, descend 5% for the second.
    fn hill_profile(length: f64) -> Vec<ElevationPoint> {
        let n = (length / 100.0) as usize;
        (0..=n)
            .map(|i| {
                let d = i as f64 * 100.0;
                let half = length / 2.0;
                let e = if d <= half { d * 0.05 } else { half * 0.05 - (d - half) * 0.05 };
                ElevationPoint::new(d, e)
            })
            .collect()
    }

    fn input<'a>(
        waypoints: &'a [Waypoint],
        segments: &'a [WaypointSegment],
        profile: &'a [ElevationPoint],
        plan: &'a Plan,
    ) -> PacingInput<'a> {
        PacingInput {
            waypoints,
            segments,
            profile,
            plan,
            stoppages: &[],
            smoothing: SmoothingConfig::default(),
        }
    }

    #[test]
    fn test_flat_ten_km() {
        let profile = flat_profile(10_000.0);
        let waypoints = vec![
            Waypoint::new("start", 0.0, 0),
            Waypoint::new("finish", 10_000.0, 1),
        ];
        let segments = build_segments(&waypoints, Some(&profile));

        for adjust in [true, false] {
            let plan = Plan {
                use_grade_adjustment: adjust,
                ..Plan::with_pace_per_km(480.0)
            };
            let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));
            assert_eq!(result.grade_adjusted, adjust);
            assert_eq!(result.arrival_map()["finish"], 4800);
            assert_eq!(result.arrival_map()["start"], 0);
            assert!((result.finish_seconds - 4800.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_flat_course_equivalence() {
        let profile = flat_profile(6000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("a", 1500.0, 1),
            Waypoint::new("b", 4200.0, 2),
            Waypoint::new("f", 6000.0, 3),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(300.0);
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));

        assert!((result.scale - 1.0).abs() < 1e-9);
        for seg in &result.segments {
            assert!((seg.equivalent_factor - 1.0).abs() < 1e-9);
            assert!((seg.adjusted_pace - 300.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normalization_invariant_on_hill() {
        let profile = hill_profile(8000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("top", 4000.0, 1),
            Waypoint::new("f", 8000.0, 2),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(360.0);
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));

        assert!(result.grade_adjusted);
        let expected = 0.36 * 8000.0;
        assert!((result.total_travel_seconds - expected).abs() < 1e-6);
        // Climb is slower than the descent
        assert!(result.segments[0].travel_seconds > result.segments[1].travel_seconds);
        assert!(result.segments[0].average_grade > 4.0);
        assert!(result.segments[1].average_grade < -4.0);
    }

    #[test]
    fn test_two_segment_example() {
        let n = Normalization::from_stretches([(5000.0, 1.10), (5000.0, 0.95)]);
        assert!((n.equivalent_distance - 10_250.0).abs() < 1e-9);
        assert!((n.scale - 0.975_609_756).abs() < 1e-8);

        let base = 0.48;
        let t1 = 5000.0 * base * 1.10 * n.scale;
        let t2 = 5000.0 * base * 0.95 * n.scale;
        assert!((t1 - 2575.61).abs() < 0.01);
        assert!((t2 - 2224.39).abs() < 0.01);
        assert!((t1 + t2 - 4800.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_zero_equivalent_distance() {
        let n = Normalization::from_stretches([(0.0, 1.3)]);
        assert_eq!(n.scale, 1.0);
        let empty = Normalization::from_stretches(std::iter::empty());
        assert_eq!(empty.scale, 1.0);
    }

    #[test]
    fn test_integrate_factor_neutral_cases() {
        let profile = hill_profile(2000.0);
        let window = GradeWindow::Meters(100.0);
        assert_eq!(integrate_factor(&profile, 500.0, 500.0, window, 50.0), StretchFactor::NEUTRAL);
        assert_eq!(integrate_factor(&[], 0.0, 500.0, window, 50.0), StretchFactor::NEUTRAL);
    }

    #[test]
    fn test_integrate_factor_constant_grade() {
        // Constant 10% climb: every sample sees the same factor
        let profile: Vec<ElevationPoint> = (0..=20)
            .map(|i| ElevationPoint::new(i as f64 * 100.0, i as f64 * 10.0))
            .collect();
        let f = integrate_factor(&profile, 200.0, 1730.0, GradeWindow::Raw, 50.0);
        let expected = clamped_factor(10.0);
        assert!((f.equivalent_factor - expected).abs() < 1e-9);
        assert!((f.average_grade - 10.0).abs() < 1e-9);

        // Direction of the bounds does not matter
        let reversed = integrate_factor(&profile, 1730.0, 200.0, GradeWindow::Raw, 50.0);
        assert_eq!(f, reversed);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_integration_matches_serial() {
        let profile = hill_profile(20_000.0);
        let bounds: Vec<(f64, f64)> = (0..40)
            .map(|i| (i as f64 * 500.0, (i + 1) as f64 * 500.0 - 17.0))
            .collect();
        let smoothing = SmoothingConfig::default();

        let parallel = integrate_stretches(&profile, &bounds, &smoothing);
        let serial: Vec<StretchFactor> = bounds
            .iter()
            .map(|&(from, to)| {
                integrate_factor(
                    &profile,
                    from,
                    to,
                    smoothing.grade_window,
                    smoothing.sample_step.meters(),
                )
            })
            .collect();

        assert_eq!(parallel.len(), serial.len());
        for (p, s) in parallel.iter().zip(&serial) {
            assert_eq!(p.equivalent_factor.to_bits(), s.equivalent_factor.to_bits());
            assert_eq!(p.average_grade.to_bits(), s.average_grade.to_bits());
        }
    }

    #[test]
    fn test_stoppage_exemption_and_accumulation() {
        let profile = flat_profile(3000.0);
        let waypoints = vec![
            Waypoint::new("start", 0.0, 0),
            Waypoint::new("aid1", 1000.0, 1),
            Waypoint::new("aid2", 2000.0, 2),
            Waypoint::new("finish", 3000.0, 3),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan {
            default_stoppage_time: 300.0,
            ..Plan::with_pace_per_km(600.0)
        };
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));

        let stoppages: Vec<f64> = result.arrivals.iter().map(|a| a.stoppage_seconds).collect();
        assert_eq!(stoppages, vec![0.0, 300.0, 300.0, 0.0]);
        assert_eq!(result.total_stoppage_seconds, 600.0);

        let map = result.arrival_map();
        assert_eq!(map["start"], 0);
        assert_eq!(map["aid1"], 900);
        assert_eq!(map["aid2"], 1800);
        assert_eq!(map["finish"], 2400);
    }

    #[test]
    fn test_custom_stoppage_at_start() {
        let waypoints = vec![
            Waypoint::new("start", 0.0, 0),
            Waypoint::new("finish", 1000.0, 1),
        ];
        let plan = Plan::with_pace_per_km(300.0);
        let overrides = vec![WaypointStoppageTime::new("p", "start", 45.0)];
        let result = compute_arrival_times(&PacingInput {
            waypoints: &waypoints,
            segments: &[],
            profile: &[],
            plan: &plan,
            stoppages: &overrides,
            smoothing: SmoothingConfig::default(),
        });
        assert_eq!(result.arrival_map()["start"], 45);
        assert_eq!(result.arrival_map()["finish"], 345);
    }

    #[test]
    fn test_fallback_without_profile_matches_disabled() {
        let profile = hill_profile(4000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("m", 2000.0, 1),
            Waypoint::new("f", 4000.0, 2),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(420.0);

        let no_profile = compute_arrival_times(&input(&waypoints, &segments, &[], &plan));
        let no_segments = compute_arrival_times(&input(&waypoints, &[], &profile, &plan));
        let disabled_plan = Plan {
            use_grade_adjustment: false,
            ..plan.clone()
        };
        let disabled =
            compute_arrival_times(&input(&waypoints, &segments, &profile, &disabled_plan));

        assert!(!no_profile.grade_adjusted);
        assert!(!no_segments.grade_adjusted);
        assert_eq!(no_profile.arrival_map(), disabled.arrival_map());
        assert_eq!(no_segments.arrival_map(), disabled.arrival_map());
        assert_eq!(disabled.arrival_map()["m"], 840);
    }

    #[test]
    fn test_no_pace_yields_zero_travel() {
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("f", 5000.0, 1),
        ];
        let plan = Plan::default();
        let result = compute_arrival_times(&input(&waypoints, &[], &[], &plan));
        assert_eq!(result.total_travel_seconds, 0.0);
        assert_eq!(result.arrival_map()["f"], 0);
    }

    #[test]
    fn test_degenerate_waypoints() {
        let plan = Plan::with_pace_per_km(300.0);
        let empty = compute_arrival_times(&input(&[], &[], &[], &plan));
        assert!(empty.arrivals.is_empty());
        assert_eq!(empty.finish_seconds, 0.0);

        let single = vec![Waypoint::new("only", 0.0, 0)];
        let result = compute_arrival_times(&input(&single, &[], &[], &plan));
        assert_eq!(result.arrival_map()["only"], 0);
        assert!(result.segments.is_empty());
    }

    #[test]
    fn test_time_mode_hits_target() {
        let profile = hill_profile(10_000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("aid", 5000.0, 1),
            Waypoint::new("f", 10_000.0, 2),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan {
            default_stoppage_time: 120.0,
            ..Plan::with_target_time(3600.0)
        };
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));
        assert!((result.total_travel_seconds - 3480.0).abs() < 1e-6);
        assert_eq!(result.arrival_map()["f"], 3600);
    }

    #[test]
    fn test_normalized_mode_keeps_travel_invariant() {
        let profile = hill_profile(8000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("top", 4000.0, 1),
            Waypoint::new("f", 8000.0, 2),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let effort = Plan {
            pace_mode: PaceMode::Normalized,
            ..Plan::with_pace_per_km(360.0)
        };
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &effort));

        // Course scale still applies
        let expected_scale = result.total_distance / result.equivalent_distance;
        assert!(result.scale < 1.0);
        assert!((result.scale - expected_scale).abs() < 1e-12);

        // The effort pace is stretched into a slower course-average base
        let expected_base = 0.36 * result.equivalent_distance / result.total_distance;
        assert!((result.base_pace_per_meter - expected_base).abs() < 1e-12);

        // Total travel equals base × D
        let travel = result.base_pace_per_meter * result.total_distance;
        assert!((result.total_travel_seconds - travel).abs() < 1e-6);

        let average = Plan::with_pace_per_km(360.0);
        let baseline = compute_arrival_times(&input(&waypoints, &segments, &profile, &average));
        assert!((baseline.total_travel_seconds - 2880.0).abs() < 1e-6);
        assert!(result.total_travel_seconds > baseline.total_travel_seconds);
    }

    #[test]
    fn test_try_compute_rejects_bad_input() {
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("f", 1000.0, 1),
        ];
        let bad_plan = Plan::with_pace_per_km(f64::NAN);
        assert!(try_compute_arrival_times(&input(&waypoints, &[], &[], &bad_plan)).is_err());

        let plan = Plan::with_pace_per_km(300.0);
        let orphan = vec![WaypointSegment {
            from_waypoint: "s".to_string(),
            to_waypoint: "ghost".to_string(),
            distance: 1000.0,
            elevation_gain: 0.0,
            elevation_loss: 0.0,
        }];
        assert!(matches!(
            try_compute_arrival_times(&input(&waypoints, &orphan, &[], &plan)),
            Err(PacingError::InvalidWaypoints { .. })
        ));

        assert!(try_compute_arrival_times(&input(&waypoints, &[], &[], &plan)).is_ok());
    }

    #[test]
    fn test_diagnostics_units_and_json() {
        let profile = hill_profile(4000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("f", 4000.0, 1),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_mile(600.0);
        let result = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));

        let seg = &result.segments[0];
        // A single segment always normalizes back to the base pace
        assert!((seg.normalized_factor - 1.0).abs() < 1e-9);
        assert!((seg.adjusted_pace - 600.0).abs() < 1e-6);
        assert!((seg.estimated_minutes * 60.0 - seg.travel_seconds).abs() < 1e-9);

        let json = result.to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["arrivals"].is_array());
        assert!(value["segments"][0]["adjustedPace"].is_number());
    }

    #[test]
    fn test_idempotent() {
        let profile = hill_profile(6000.0);
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("m", 2500.0, 1),
            Waypoint::new("f", 6000.0, 2),
        ];
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(330.0);
        let a = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));
        let b = compute_arrival_times(&input(&waypoints, &segments, &profile, &plan));
        assert_eq!(a, b);
    }
}
