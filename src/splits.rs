//! Fixed-distance splits (per kilometer or per mile).
//!
//! Split factors are integrated on their own boundaries, which do not line up
//! with the waypoint stretches the engine normalizes over. Summed split times
//! therefore drift slightly from the engine's total; every cumulative travel
//! time is back-scaled so the last split lands exactly on the intended total.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::{
    apply_strategy, compute_arrival_times, integrate_stretches, PacingInput, StretchFactor,
};
use crate::error::Result;
use crate::plan::{resolve_stoppages, validate_waypoints};
use crate::segments::ordered_waypoints;

/// One unit-length split of the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    /// 1-based
    pub index: usize,
    pub start_distance: f64,
    pub end_distance: f64,
    /// Meters; the last split may be partial
    pub distance: f64,
    /// Percent
    pub average_grade: f64,
    /// Applied pace multiplier (`F × S`)
    pub factor: f64,
    /// Seconds per plan unit after back-scaling
    pub pace: f64,
    pub travel_seconds: f64,
    /// Stoppage credited at waypoints inside this split
    pub stoppage_seconds: f64,
    /// Elapsed time at the end of the split, stoppage included
    pub elapsed_seconds: f64,
    pub elapsed_rounded: i64,
}

/// Course range covered by splits: start to finish waypoint, or the profile
/// when fewer than two waypoints exist.
fn split_range(input: &PacingInput) -> Option<(f64, f64)> {
    let ordered = ordered_waypoints(input.waypoints);
    let range = match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) if ordered.len() >= 2 => (first.distance, last.distance),
        _ => {
            let first = input.profile.first()?;
            let last = input.profile.last()?;
            (first.distance, last.distance)
        }
    };
    (range.0.is_finite() && range.1.is_finite() && range.1 > range.0).then_some(range)
}

/// Boundaries at every whole unit from `start`, plus `end`.
fn unit_bounds(start: f64, end: f64, unit: f64) -> Vec<(f64, f64)> {
    let mut bounds = Vec::new();
    let mut k = 1usize;
    let mut from = start;
    loop {
        let to = start + k as f64 * unit;
        if to >= end {
            bounds.push((from, end));
            break;
        }
        bounds.push((from, to));
        from = to;
        k += 1;
    }
    bounds
}

/// Compute splits for a course.
///
/// Uses the engine's base pace and course-wide scale. Raw cumulative travel is
/// multiplied by `desired / raw_final`, where `desired` is the target minus
/// stoppage in time mode and the rounded raw total otherwise. In time mode the
/// final elapsed time equals the target exactly.
pub fn compute_splits(input: &PacingInput) -> Vec<Split> {
    let Some((start, end)) = split_range(input) else {
        return Vec::new();
    };

    let plan = input.plan;
    let unit = plan.pace_unit.meters();
    let course = compute_arrival_times(input);
    let base = course.base_pace_per_meter;

    let bounds = unit_bounds(start, end, unit);
    let factors: Vec<StretchFactor> = if course.grade_adjusted {
        let mut factors = integrate_stretches(input.profile, &bounds, &input.smoothing);
        apply_strategy(plan, &bounds, &mut factors);
        factors
    } else {
        vec![StretchFactor::NEUTRAL; bounds.len()]
    };

    // Raw cumulative travel at each boundary
    let mut raw_cumulative = Vec::with_capacity(bounds.len());
    let mut running = 0.0;
    for ((from, to), factor) in bounds.iter().zip(&factors) {
        running += (to - from) * base * factor.equivalent_factor * course.scale;
        raw_cumulative.push(running);
    }

    let raw_final = running;
    let target = plan.time_target().filter(|_| base > 0.0);
    let desired = match target {
        Some(target) => target - course.total_stoppage_seconds,
        None => raw_final.round(),
    };
    let extra_scale = if raw_final > 0.0 { desired / raw_final } else { 1.0 };

    let ordered = ordered_waypoints(input.waypoints);
    let stoppages = resolve_stoppages(&ordered, plan, input.stoppages);
    let stoppage_until = |boundary: f64| -> f64 {
        ordered
            .iter()
            .zip(&stoppages)
            .filter(|(w, _)| w.distance <= boundary)
            .map(|(_, s)| s)
            .sum()
    };

    let last = bounds.len() - 1;
    let mut splits = Vec::with_capacity(bounds.len());
    let mut previous_travel = 0.0;
    let mut previous_stoppage = 0.0;

    for (i, ((from, to), factor)) in bounds.iter().zip(&factors).enumerate() {
        let travel_cumulative = if i == last && raw_final > 0.0 {
            desired
        } else {
            raw_cumulative[i] * extra_scale
        };
        // The final split picks up every waypoint, including any past the range
        let stoppage_cumulative = if i == last {
            stoppages.iter().sum()
        } else {
            stoppage_until(*to)
        };

        let mut elapsed = travel_cumulative + stoppage_cumulative;
        if i == last {
            if let Some(target) = target {
                elapsed = target;
            }
        }

        let distance = to - from;
        let travel_seconds = travel_cumulative - previous_travel;
        let applied = factor.equivalent_factor * course.scale;
        let pace = if distance > 0.0 {
            travel_seconds / distance * unit
        } else {
            0.0
        };

        splits.push(Split {
            index: i + 1,
            start_distance: *from,
            end_distance: *to,
            distance,
            average_grade: factor.average_grade,
            factor: applied,
            pace,
            travel_seconds,
            stoppage_seconds: stoppage_cumulative - previous_stoppage,
            elapsed_seconds: elapsed,
            elapsed_rounded: elapsed.round() as i64,
        });

        previous_travel = travel_cumulative;
        previous_stoppage = stoppage_cumulative;
    }

    debug!(
        "[Splits] {} splits over {:.0}m, raw {:.1}s -> {:.1}s (x{:.6})",
        splits.len(),
        end - start,
        raw_final,
        desired,
        extra_scale
    );

    splits
}

/// Validate the plan and waypoints, then compute splits.
pub fn try_compute_splits(input: &PacingInput) -> Result<Vec<Split>> {
    input.plan.validate()?;
    validate_waypoints(input.waypoints)?;
    Ok(compute_splits(input))
}
