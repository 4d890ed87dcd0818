//! Elevation profile extraction.
//!
//! Converts raw track geometry into a single distance-indexed elevation series:
//!
//! 1. Flatten all geometries into coordinate lists
//! 2. Stitch split recordings onto the longest list (see [`StitchPolicy`])
//! 3. Drop invalid and consecutive duplicate coordinates
//! 4. Accumulate haversine distance
//! 5. Drop points whose distance regresses far below the running maximum
//!
//! An empty result means "no elevation data"; consumers fall back to flat
//! pacing rather than failing.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo_utils::{haversine_distance, is_valid_lat_lng};
use crate::track::{FeatureCollection, TrackCoord};
use crate::{Bounds, ElevationPoint};

/// Coordinate delta (degrees) below which consecutive points are duplicates.
const DUPLICATE_EPSILON_DEG: f64 = 1e-6;

/// Points falling this far (meters) below the maximum distance seen are dropped.
const MAX_DISTANCE_REGRESSION_M: f64 = 500.0;

// ============================================================================
// Stitching
// ============================================================================

/// Decides how multiple coordinate lists become one track.
///
/// Implementations receive every non-empty list in document order and return
/// the single ordered track the extractor should walk.
pub trait StitchPolicy: Send + Sync {
    fn stitch(&self, lists: Vec<Vec<TrackCoord>>) -> Vec<TrackCoord>;
}

/// Splices secondary recordings onto whichever end of the primary track they
/// start or finish near.
///
/// Recordings split by a GPS dropout have endpoints a few meters apart, while
/// out-and-back branches and POI clusters do not. Lists are only considered
/// when they are long enough to be real track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProximityStitcher {
    /// Endpoints must be at least this close (meters) to be a candidate.
    /// Default: 1000.0
    pub candidate_radius_m: f64,

    /// The closest endpoint pair must be within this distance (meters) to splice.
    /// Default: 500.0
    pub splice_radius_m: f64,

    /// Lists shorter than this are never stitched.
    /// Default: 10
    pub min_points: usize,
}

impl Default for ProximityStitcher {
    fn default() -> Self {
        Self {
            candidate_radius_m: 1000.0,
            splice_radius_m: 500.0,
            min_points: 10,
        }
    }
}

/// Where a secondary list attaches to the primary track.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Splice {
    Append,
    AppendReversed,
    Prepend,
    PrependReversed,
}

impl ProximityStitcher {
    /// Find the closest endpoint connection between `primary` and `other`.
    fn closest_splice(
        &self,
        primary: &[TrackCoord],
        other: &[TrackCoord],
    ) -> Option<(Splice, f64)> {
        let (p_first, p_last) = (primary.first()?.coord(), primary.last()?.coord());
        let (o_first, o_last) = (other.first()?.coord(), other.last()?.coord());

        [
            (Splice::Append, haversine_distance(p_last, o_first)),
            (Splice::AppendReversed, haversine_distance(p_last, o_last)),
            (Splice::Prepend, haversine_distance(p_first, o_last)),
            (Splice::PrependReversed, haversine_distance(p_first, o_first)),
        ]
        .into_iter()
        .filter(|(_, d)| d.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl StitchPolicy for ProximityStitcher {
    fn stitch(&self, mut lists: Vec<Vec<TrackCoord>>) -> Vec<TrackCoord> {
        if lists.is_empty() {
            return Vec::new();
        }

        // First longest list wins ties
        let primary_idx = lists
            .iter()
            .enumerate()
            .fold(0, |best, (i, l)| if l.len() > lists[best].len() { i } else { best });
        let mut track = lists.remove(primary_idx);

        // Longest candidates first so large pieces anchor before small ones
        lists.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut spliced = 0usize;
        for mut other in lists {
            if other.len() < self.min_points {
                continue;
            }
            let Some((splice, gap)) = self.closest_splice(&track, &other) else {
                continue;
            };
            if gap > self.candidate_radius_m {
                debug!(
                    "[Profile] Skipping unrelated track of {} points ({:.0}m away)",
                    other.len(),
                    gap
                );
                continue;
            }
            if gap > self.splice_radius_m {
                debug!(
                    "[Profile] Track of {} points is nearby ({:.0}m) but beyond splice radius",
                    other.len(),
                    gap
                );
                continue;
            }

            match splice {
                Splice::Append => track.extend(other),
                Splice::AppendReversed => {
                    other.reverse();
                    track.extend(other);
                }
                Splice::Prepend => {
                    other.extend(track);
                    track = other;
                }
                Splice::PrependReversed => {
                    other.reverse();
                    other.extend(track);
                    track = other;
                }
            }
            spliced += 1;
        }

        if spliced > 0 {
            info!("[Profile] Stitched {} additional track(s) onto primary", spliced);
        }
        track
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Builds elevation profiles with a configurable stitching policy.
pub struct ProfileExtractor {
    policy: Box<dyn StitchPolicy>,
}

impl Default for ProfileExtractor {
    fn default() -> Self {
        Self::new(Box::new(ProximityStitcher::default()))
    }
}

impl ProfileExtractor {
    pub fn new(policy: Box<dyn StitchPolicy>) -> Self {
        Self { policy }
    }

    /// Extract an elevation series from raw coordinate lists.
    pub fn extract(&self, lists: &[Vec<TrackCoord>]) -> Vec<ElevationPoint> {
        let non_empty: Vec<Vec<TrackCoord>> =
            lists.iter().filter(|l| !l.is_empty()).cloned().collect();
        let track = self.policy.stitch(non_empty);

        let mut points: Vec<ElevationPoint> = Vec::with_capacity(track.len());
        let mut prev: Option<TrackCoord> = None;
        let mut distance = 0.0;
        let mut invalid = 0usize;
        let mut duplicates = 0usize;

        for (idx, c) in track.iter().enumerate() {
            if !is_valid_lat_lng(c.lat, c.lng) {
                invalid += 1;
                continue;
            }
            if let Some(p) = prev {
                if (c.lng - p.lng).abs() < DUPLICATE_EPSILON_DEG
                    && (c.lat - p.lat).abs() < DUPLICATE_EPSILON_DEG
                {
                    duplicates += 1;
                    continue;
                }
                distance += haversine_distance(p.coord(), c.coord());
            }

            points.push(ElevationPoint {
                distance,
                elevation: c.elevation.filter(|e| e.is_finite()).unwrap_or(0.0),
                lat: c.lat,
                lng: c.lng,
                original_index: idx as i32,
            });
            prev = Some(*c);
        }

        if invalid > 0 {
            warn!("[Profile] Dropped {} invalid coordinate(s)", invalid);
        }
        if duplicates > 0 {
            debug!("[Profile] Dropped {} duplicate coordinate(s)", duplicates);
        }

        let before = points.len();
        let points = drop_distance_regressions(points);
        if points.len() < before {
            warn!(
                "[Profile] Dropped {} point(s) with regressing distance",
                before - points.len()
            );
        }

        debug!(
            "[Profile] Extracted {} points over {:.0}m",
            points.len(),
            points.last().map(|p| p.distance).unwrap_or(0.0)
        );
        points
    }

    /// Extract an elevation series from a parsed feature collection.
    pub fn extract_collection(&self, collection: &FeatureCollection) -> Vec<ElevationPoint> {
        self.extract(&collection.coordinate_lists())
    }
}

/// Drop any point lying more than [`MAX_DISTANCE_REGRESSION_M`] below the
/// maximum distance seen so far.
fn drop_distance_regressions(points: Vec<ElevationPoint>) -> Vec<ElevationPoint> {
    let mut max_seen = f64::NEG_INFINITY;
    points
        .into_iter()
        .filter(|p| {
            if p.distance < max_seen - MAX_DISTANCE_REGRESSION_M {
                return false;
            }
            max_seen = max_seen.max(p.distance);
            true
        })
        .collect()
}

/// Extract an elevation series using the default stitching policy.
pub fn extract_elevation_profile(lists: &[Vec<TrackCoord>]) -> Vec<ElevationPoint> {
    ProfileExtractor::default().extract(lists)
}

/// Parse a GeoJSON `FeatureCollection` and extract its elevation series.
pub fn extract_from_geojson_str(json: &str) -> Result<Vec<ElevationPoint>> {
    let collection = FeatureCollection::from_json(json)?;
    Ok(ProfileExtractor::default().extract_collection(&collection))
}

// ============================================================================
// Summary
// ============================================================================

/// Course-level metrics derived from an elevation series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub point_count: usize,
    /// Total distance in meters
    pub total_distance: f64,
    pub elevation_gain: f64,
    pub elevation_loss: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub bounds: Option<Bounds>,
}

/// Summarize an elevation series. An empty series yields all zeros.
pub fn summarize_profile(points: &[ElevationPoint]) -> ProfileSummary {
    if points.is_empty() {
        return ProfileSummary::default();
    }

    let (gain, loss) = points.windows(2).fold((0.0, 0.0), |(gain, loss), w| {
        let delta = w[1].elevation - w[0].elevation;
        if delta > 0.0 {
            (gain + delta, loss)
        } else {
            (gain, loss - delta)
        }
    });

    let min_elevation = points.iter().map(|p| p.elevation).fold(f64::INFINITY, f64::min);
    let max_elevation = points
        .iter()
        .map(|p| p.elevation)
        .fold(f64::NEG_INFINITY, f64::max);

    ProfileSummary {
        point_count: points.len(),
        total_distance: points.last().map(|p| p.distance).unwrap_or(0.0),
        elevation_gain: gain,
        elevation_loss: loss,
        min_elevation,
        max_elevation,
        bounds: Bounds::from_points(points),
    }
}
