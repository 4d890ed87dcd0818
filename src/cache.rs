//! # Pacing Cache
//!
//! Memoizes engine results for repeated identical inputs, e.g. a UI
//! recomputing on every render. Keys are 64-bit fingerprints of every input
//! value (floats by bit pattern), so any edit produces a miss.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use log::debug;
use lru::LruCache;

use crate::engine::{compute_arrival_times, PacingInput, PacingResult};
use crate::{ChartWindow, GradeWindow};

/// Default number of cached results.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Caller-owned memo around [`compute_arrival_times`].
pub struct PacingCache {
    store: LruCache<u64, PacingResult>,
    hits: u64,
    misses: u64,
}

impl Default for PacingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PacingCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached result for `input`, computing it on a miss.
    pub fn get_or_compute(&mut self, input: &PacingInput) -> PacingResult {
        let key = fingerprint(input);
        if let Some(result) = self.store.get(&key) {
            self.hits += 1;
            return result.clone();
        }

        self.misses += 1;
        let result = compute_arrival_times(input);
        self.store.put(key, result.clone());
        debug!(
            "[Cache] Miss {:016x}, {} cached ({} hits / {} misses)",
            key,
            self.store.len(),
            self.hits,
            self.misses
        );
        result
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// (hits, misses) since creation or the last clear.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    value.to_bits().hash(state);
}

fn hash_opt_f64<H: Hasher>(value: Option<f64>, state: &mut H) {
    value.map(f64::to_bits).hash(state);
}

/// 64-bit fingerprint of every value the engine reads.
pub fn fingerprint(input: &PacingInput) -> u64 {
    let mut h = DefaultHasher::new();

    input.waypoints.len().hash(&mut h);
    for w in input.waypoints {
        w.id.hash(&mut h);
        hash_f64(w.distance, &mut h);
        w.order.hash(&mut h);
        hash_opt_f64(w.elevation, &mut h);
    }

    input.segments.len().hash(&mut h);
    for s in input.segments {
        s.from_waypoint.hash(&mut h);
        s.to_waypoint.hash(&mut h);
        hash_f64(s.distance, &mut h);
        hash_f64(s.elevation_gain, &mut h);
        hash_f64(s.elevation_loss, &mut h);
    }

    input.profile.len().hash(&mut h);
    for p in input.profile {
        hash_f64(p.distance, &mut h);
        hash_f64(p.elevation, &mut h);
    }

    let plan = input.plan;
    hash_opt_f64(plan.pace, &mut h);
    plan.pace_unit.hash(&mut h);
    plan.pace_mode.hash(&mut h);
    hash_opt_f64(plan.target_time_seconds, &mut h);
    hash_f64(plan.default_stoppage_time, &mut h);
    plan.use_grade_adjustment.hash(&mut h);
    plan.pacing_strategy.hash(&mut h);
    hash_f64(plan.pacing_linear_percent, &mut h);

    input.stoppages.len().hash(&mut h);
    for s in input.stoppages {
        s.waypoint_id.hash(&mut h);
        hash_f64(s.stoppage_time, &mut h);
    }

    let smoothing = &input.smoothing;
    match smoothing.grade_window {
        GradeWindow::Raw => 0u8.hash(&mut h),
        GradeWindow::Meters(m) => {
            1u8.hash(&mut h);
            hash_f64(m, &mut h);
        }
    }
    match smoothing.pace_window {
        ChartWindow::Raw => 0u8.hash(&mut h),
        ChartWindow::Meters(m) => {
            1u8.hash(&mut h);
            hash_f64(m, &mut h);
        }
    }
    hash_f64(smoothing.sample_step.meters(), &mut h);

    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;
    use crate::segments::build_segments;
    use crate::{ElevationPoint, SmoothingConfig, Waypoint};

    fn course() -> (Vec<Waypoint>, Vec<ElevationPoint>) {
        let profile: Vec<ElevationPoint> = (0..=40)
            .map(|i| ElevationPoint::new(i as f64 * 100.0, (i as f64 * 0.3).sin() * 40.0))
            .collect();
        let waypoints = vec![
            Waypoint::new("s", 0.0, 0),
            Waypoint::new("m", 1800.0, 1),
            Waypoint::new("f", 4000.0, 2),
        ];
        (waypoints, profile)
    }

    #[test]
    fn test_least_recent_result_evicted() {
        let (waypoints, profile) = course();
        let segments = build_segments(&waypoints, Some(&profile));
        let plans: Vec<Plan> = [300.0, 330.0, 360.0]
            .iter()
            .map(|&pace| Plan::with_pace_per_km(pace))
            .collect();
        let inputs: Vec<PacingInput> = plans
            .iter()
            .map(|plan| PacingInput {
                waypoints: &waypoints,
                segments: &segments,
                profile: &profile,
                plan,
                stoppages: &[],
                smoothing: SmoothingConfig::default(),
            })
            .collect();

        let mut cache = PacingCache::new(2);
        cache.get_or_compute(&inputs[0]);
        cache.get_or_compute(&inputs[1]);
        // Touch the first plan so the second becomes least recent
        cache.get_or_compute(&inputs[0]);
        cache.get_or_compute(&inputs[2]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), (1, 3));

        cache.get_or_compute(&inputs[0]);
        assert_eq!(cache.stats(), (2, 3));
        cache.get_or_compute(&inputs[1]);
        assert_eq!(cache.stats(), (2, 4));
    }

    #[test]
    fn test_zero_capacity_still_caches() {
        let (waypoints, profile) = course();
        let plan = Plan::with_pace_per_km(300.0);
        let input = PacingInput {
            waypoints: &waypoints,
            segments: &[],
            profile: &profile,
            plan: &plan,
            stoppages: &[],
            smoothing: SmoothingConfig::default(),
        };
        let mut cache = PacingCache::new(0);
        cache.get_or_compute(&input);
        cache.get_or_compute(&input);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_cache_returns_identical_results() {
        let (waypoints, profile) = course();
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(390.0);
        let input = PacingInput {
            waypoints: &waypoints,
            segments: &segments,
            profile: &profile,
            plan: &plan,
            stoppages: &[],
            smoothing: SmoothingConfig::default(),
        };

        let mut cache = PacingCache::default();
        let first = cache.get_or_compute(&input);
        let second = cache.get_or_compute(&input);
        assert_eq!(first, second);
        assert_eq!(first, compute_arrival_times(&input));
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }

    #[test]
    fn test_any_edit_misses() {
        let (waypoints, profile) = course();
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan::with_pace_per_km(390.0);
        let base = PacingInput {
            waypoints: &waypoints,
            segments: &segments,
            profile: &profile,
            plan: &plan,
            stoppages: &[],
            smoothing: SmoothingConfig::default(),
        };

        let faster = Plan::with_pace_per_km(389.0);
        assert_ne!(fingerprint(&base), fingerprint(&PacingInput { plan: &faster, ..base }));

        let mut moved = waypoints.clone();
        moved[1].distance = 1800.5;
        assert_ne!(fingerprint(&base), fingerprint(&PacingInput { waypoints: &moved, ..base }));

        let mut smoothing = SmoothingConfig::default();
        smoothing.grade_window = GradeWindow::Raw;
        assert_ne!(fingerprint(&base), fingerprint(&PacingInput { smoothing, ..base }));

        assert_eq!(fingerprint(&base), fingerprint(&base));
    }
}
