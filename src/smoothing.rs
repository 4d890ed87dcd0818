//! Display pace chart.
//!
//! Per-point adjusted pace along the profile, optionally smoothed with a
//! centered distance window. Display only: nothing here feeds back into the
//! arrival times.

use serde::{Deserialize, Serialize};

use crate::adjustment::clamped_factor;
use crate::engine::{compute_arrival_times, PacingInput};
use crate::grade::grade_at;
use crate::ChartWindow;

/// One point of the pace chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceChartPoint {
    pub distance: f64,
    pub elevation: f64,
    /// Percent
    pub grade: f64,
    /// Clamped pace multiplier
    pub factor: f64,
    /// Seconds per plan unit
    pub pace: f64,
    /// `pace` after the chart window
    pub smoothed_pace: f64,
}

/// Centered moving average over distance.
///
/// Each output is the mean of all `values[j]` with
/// `|distances[j] - distances[i]| <= window / 2`. `distances` must be sorted
/// ascending. Runs in O(N) with two pointers and a running sum.
///
/// # Example
/// ```
/// use gradepace::sliding_window_mean;
///
/// let d = [0.0, 10.0, 20.0, 30.0];
/// let v = [1.0, 2.0, 3.0, 4.0];
/// let m = sliding_window_mean(&d, &v, 20.0);
/// assert_eq!(m, vec![1.5, 2.0, 3.0, 3.5]);
/// ```
pub fn sliding_window_mean(distances: &[f64], values: &[f64], window: f64) -> Vec<f64> {
    let n = distances.len().min(values.len());
    if !(window > 0.0) {
        return values[..n].to_vec();
    }

    let half = window / 2.0;
    let mut out = Vec::with_capacity(n);
    let mut lo = 0;
    let mut hi = 0;
    let mut sum = 0.0;

    for i in 0..n {
        let center = distances[i];
        while hi < n && distances[hi] - center <= half {
            sum += values[hi];
            hi += 1;
        }
        while center - distances[lo] > half {
            sum -= values[lo];
            lo += 1;
        }
        out.push(sum / (hi - lo) as f64);
    }
    out
}

/// Pace chart for a course, in the plan's unit.
///
/// Uses the engine's base pace and course scale so the chart agrees with the
/// arrival times. Without grade adjustment every point sits at the base pace.
pub fn pace_chart(input: &PacingInput) -> Vec<PaceChartPoint> {
    let profile = input.profile;
    if profile.is_empty() {
        return Vec::new();
    }

    let course = compute_arrival_times(input);
    let unit = input.plan.pace_unit.meters();
    let flat_pace = course.base_pace_per_meter * course.scale * unit;

    let mut points: Vec<PaceChartPoint> = profile
        .iter()
        .map(|p| {
            let grade = grade_at(profile, p.distance, input.smoothing.grade_window);
            let factor = if course.grade_adjusted {
                clamped_factor(grade)
            } else {
                1.0
            };
            let pace = flat_pace * factor;
            PaceChartPoint {
                distance: p.distance,
                elevation: p.elevation,
                grade,
                factor,
                pace,
                smoothed_pace: pace,
            }
        })
        .collect();

    if let ChartWindow::Meters(window) = input.smoothing.pace_window {
        let distances: Vec<f64> = points.iter().map(|p| p.distance).collect();
        let paces: Vec<f64> = points.iter().map(|p| p.pace).collect();
        let smoothed = sliding_window_mean(&distances, &paces, window);
        for (point, value) in points.iter_mut().zip(smoothed) {
            point.smoothed_pace = value;
        }
    }

    points
}
