//! Waypoint segment decomposition.
//!
//! Splits an ordered waypoint list into consecutive segments carrying distance
//! and elevation gain/loss. Segments never overlap and never skip a waypoint.

use crate::grade::elevation_at;
use crate::{ElevationPoint, Waypoint, WaypointSegment};

/// Waypoints sorted by `order` (stable for equal orders).
pub fn ordered_waypoints(waypoints: &[Waypoint]) -> Vec<&Waypoint> {
    let mut ordered: Vec<&Waypoint> = waypoints.iter().collect();
    ordered.sort_by_key(|w| w.order);
    ordered
}

/// Build one segment per consecutive pair of waypoints in `order`.
///
/// With a non-empty profile, gain/loss is summed from the profile points lying
/// between the two waypoints. Without one, the waypoints' stored elevations
/// give a single net change.
///
/// # Example
/// ```
/// use gradepace::{build_segments, Waypoint};
///
/// let waypoints = vec![
///     Waypoint::new("aid", 5000.0, 1).with_elevation(900.0),
///     Waypoint::new("start", 0.0, 0).with_elevation(1000.0),
/// ];
/// let segments = build_segments(&waypoints, None);
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].from_waypoint, "start");
/// assert_eq!(segments[0].elevation_loss, 100.0);
/// ```
pub fn build_segments(
    waypoints: &[Waypoint],
    profile: Option<&[ElevationPoint]>,
) -> Vec<WaypointSegment> {
    let profile = profile.filter(|p| !p.is_empty());
    let ordered = ordered_waypoints(waypoints);

    ordered
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            let (gain, loss) = match profile {
                Some(series) => profile_gain_loss(series, from.distance, to.distance),
                None => net_gain_loss(from.elevation, to.elevation),
            };

            WaypointSegment {
                from_waypoint: from.id.clone(),
                to_waypoint: to.id.clone(),
                distance: (to.distance - from.distance).abs(),
                elevation_gain: gain,
                elevation_loss: loss,
            }
        })
        .collect()
}

/// Sum of positive and negative deltas between consecutive profile points whose
/// distance lies in `[min(a, b), max(a, b)]`.
fn profile_gain_loss(series: &[ElevationPoint], a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let start = series.partition_point(|p| p.distance < lo);
    let end = series.partition_point(|p| p.distance <= hi);
    let in_range = &series[start..end.max(start)];

    if in_range.len() < 2 {
        let from = elevation_at(series, a);
        let to = elevation_at(series, b);
        return net_gain_loss(from, to);
    }

    in_range.windows(2).fold((0.0, 0.0), |(gain, loss), w| {
        let delta = w[1].elevation - w[0].elevation;
        if delta > 0.0 {
            (gain + delta, loss)
        } else {
            (gain, loss - delta)
        }
    })
}

/// Net change between two elevations, as (gain, loss).
fn net_gain_loss(from: Option<f64>, to: Option<f64>) -> (f64, f64) {
    match (from, to) {
        (Some(from), Some(to)) if to >= from => (to - from, 0.0),
        (Some(from), Some(to)) => (0.0, from - to),
        _ => (0.0, 0.0),
    }
}

/// Total (gain, loss) across a set of segments.
pub fn course_elevation_totals(segments: &[WaypointSegment]) -> (f64, f64) {
    segments.iter().fold((0.0, 0.0), |(gain, loss), s| {
        (gain + s.elevation_gain, loss + s.elevation_loss)
    })
}
