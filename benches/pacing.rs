//! Pacing engine benchmarks.
//!
//! Run with: `cargo bench --bench pacing`
//! With parallel integration: `cargo bench --bench pacing --features parallel`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gradepace::{
    build_segments, compute_arrival_times, compute_splits, pace_chart, ElevationPoint,
    PacingInput, Plan, SmoothingConfig, Waypoint,
};

/// Rolling course sampled every 20 m with an aid station every 5 km.
fn course(length_km: usize) -> (Vec<ElevationPoint>, Vec<Waypoint>) {
    let length = length_km as f64 * 1000.0;
    let count = (length / 20.0) as usize;
    let profile: Vec<ElevationPoint> = (0..=count)
        .map(|i| {
            let d = i as f64 * 20.0;
            let e = 800.0 + 300.0 * (d / 4000.0).sin() + 40.0 * (d / 350.0).sin();
            ElevationPoint::new(d, e)
        })
        .collect();

    let mut waypoints: Vec<Waypoint> = (0..length_km / 5)
        .map(|i| Waypoint::new(format!("aid{}", i), i as f64 * 5000.0, i as i32))
        .collect();
    waypoints.push(Waypoint::new("finish", length, waypoints.len() as i32));
    (profile, waypoints)
}

fn bench_arrival_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrival_times");

    for length_km in [10, 50, 170] {
        let (profile, waypoints) = course(length_km);
        let segments = build_segments(&waypoints, Some(&profile));
        let plan = Plan {
            default_stoppage_time: 180.0,
            ..Plan::with_pace_per_km(420.0)
        };
        let input = PacingInput {
            waypoints: &waypoints,
            segments: &segments,
            profile: &profile,
            plan: &plan,
            stoppages: &[],
            smoothing: SmoothingConfig::default(),
        };

        group.bench_with_input(BenchmarkId::new("km", length_km), &input, |b, input| {
            b.iter(|| compute_arrival_times(input));
        });
    }

    group.finish();
}

fn bench_splits_and_chart(c: &mut Criterion) {
    let (profile, waypoints) = course(50);
    let segments = build_segments(&waypoints, Some(&profile));
    let plan = Plan::with_target_time(6.0 * 3600.0);
    let input = PacingInput {
        waypoints: &waypoints,
        segments: &segments,
        profile: &profile,
        plan: &plan,
        stoppages: &[],
        smoothing: SmoothingConfig::default(),
    };

    c.bench_function("splits_50km", |b| b.iter(|| compute_splits(&input)));
    c.bench_function("pace_chart_50km", |b| b.iter(|| pace_chart(&input)));
}

criterion_group!(benches, bench_arrival_times, bench_splits_and_chart);
criterion_main!(benches);
