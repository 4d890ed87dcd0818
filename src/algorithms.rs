//! # Algorithm Toolbox
//!
//! Direct access to the standalone pacing algorithms, for integrating single
//! steps into your own systems without running the full engine.
//!
//! ## Core Algorithms
//!
//! - **Profile Extraction**: Track stitching and cumulative distance
//! - **Grade Estimation**: Raw and distance-windowed grade
//! - **Terrain Response**: Grade to pace multiplier
//! - **Factor Integration**: Distance-weighted mean multiplier over a stretch
//! - **Normalization**: Course-wide rescaling so total time is preserved
//! - **Chart Smoothing**: O(N) centered moving average
//!
//! ## Geographic Utilities
//!
//! - **Haversine Distance**: Great-circle distance between coordinates
//! - **Polyline Length**: Total distance along a path
//!
//! # Example
//!
//! ```rust
//! use gradepace::algorithms::{clamped_factor, haversine_distance, Coord};
//!
//! let a = Coord { x: 6.8652, y: 45.8326 };
//! let b = Coord { x: 6.8700, y: 45.8400 };
//! println!("{:.0} m", haversine_distance(a, b));
//!
//! assert!(clamped_factor(12.0) > 1.0);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, ElevationPoint, GradeWindow, SmoothingConfig, Waypoint, WaypointSegment};
pub use geo::Coord;

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    haversine_distance, is_valid_lat_lng, meters_to_degrees, polyline_length, EARTH_RADIUS_M,
};

// =============================================================================
// Profile Extraction
// =============================================================================

pub use crate::profile::{extract_elevation_profile, ProximityStitcher, StitchPolicy};

// =============================================================================
// Grade and Terrain Response
// =============================================================================

pub use crate::adjustment::{
    clamped_factor, left_tangent, pace_factor, right_tangent, LEFT_BREAKPOINT, MAX_FACTOR,
    MIN_FACTOR, RIGHT_BREAKPOINT,
};
pub use crate::grade::{clamp_grade, elevation_at, grade_at, raw_grade, windowed_grade};

// =============================================================================
// Integration and Normalization
// =============================================================================

pub use crate::engine::{integrate_factor, Normalization, StretchFactor};

// =============================================================================
// Smoothing
// =============================================================================

pub use crate::smoothing::sliding_window_mean;
