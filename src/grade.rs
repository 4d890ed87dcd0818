//! Grade estimation over a distance-indexed elevation series.
//!
//! Lookups binary-search the series, so each estimate is O(log n).

use crate::{ElevationPoint, GradeWindow};

/// Grades are clamped to this magnitude (percent).
pub const MAX_GRADE_PERCENT: f64 = 100.0;

/// Index of the first point strictly beyond `distance`.
fn upper_index(series: &[ElevationPoint], distance: f64) -> usize {
    series.partition_point(|p| p.distance <= distance)
}

/// Linearly interpolated elevation at `distance`.
///
/// Distances outside the series take the nearest endpoint's elevation.
/// Returns `None` for an empty series.
pub fn elevation_at(series: &[ElevationPoint], distance: f64) -> Option<f64> {
    let first = series.first()?;
    let last = series.last()?;

    if distance <= first.distance {
        return Some(first.elevation);
    }
    if distance >= last.distance {
        return Some(last.elevation);
    }

    let idx = upper_index(series, distance).clamp(1, series.len() - 1);
    let a = &series[idx - 1];
    let b = &series[idx];
    let span = b.distance - a.distance;
    if span <= 0.0 {
        return Some(a.elevation);
    }

    let t = (distance - a.distance) / span;
    Some(a.elevation + (b.elevation - a.elevation) * t)
}

/// Slope of the pair of consecutive points bracketing `distance`, or of the
/// nearest edge pair when outside the series.
pub fn raw_grade(series: &[ElevationPoint], distance: f64) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let idx = upper_index(series, distance).clamp(1, series.len() - 1);
    let a = &series[idx - 1];
    let b = &series[idx];
    let run = b.distance - a.distance;
    if run <= 0.0 {
        return 0.0;
    }

    clamp_grade((b.elevation - a.elevation) / run * 100.0)
}

/// Slope across a window of `window` meters centered on `distance`.
pub fn windowed_grade(series: &[ElevationPoint], distance: f64, window: f64) -> f64 {
    if series.len() < 2 || !(window > 0.0) {
        return raw_grade(series, distance);
    }

    let start = distance - window / 2.0;
    let end = distance + window / 2.0;
    let (Some(e_start), Some(e_end)) = (elevation_at(series, start), elevation_at(series, end))
    else {
        return 0.0;
    };

    clamp_grade((e_end - e_start) / (end - start) * 100.0)
}

/// Estimated grade (percent) at `distance` using the configured window.
///
/// # Example
/// ```
/// use gradepace::{grade_at, ElevationPoint, GradeWindow};
///
/// let series = vec![ElevationPoint::new(0.0, 0.0), ElevationPoint::new(1000.0, 50.0)];
/// assert!((grade_at(&series, 500.0, GradeWindow::Raw) - 5.0).abs() < 1e-9);
/// assert!((grade_at(&series, 500.0, GradeWindow::Meters(100.0)) - 5.0).abs() < 1e-9);
/// ```
pub fn grade_at(series: &[ElevationPoint], distance: f64, window: GradeWindow) -> f64 {
    match window {
        GradeWindow::Raw => raw_grade(series, distance),
        GradeWindow::Meters(w) => windowed_grade(series, distance, w),
    }
}

/// Clamp a grade to ±[`MAX_GRADE_PERCENT`], mapping NaN to 0.
pub fn clamp_grade(grade: f64) -> f64 {
    if grade.is_nan() {
        return 0.0;
    }
    grade.clamp(-MAX_GRADE_PERCENT, MAX_GRADE_PERCENT)
}
