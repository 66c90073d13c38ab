//! Tick throughput: one full classification pass over n tracked entities,
//! alternating every entity between on and off the platform.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use knockoff_core::{point, PlatformTracker, PositionMap, TrackerConfig};

fn make_tracker(n: usize) -> (PlatformTracker, PositionMap, PositionMap) {
    let mut cfg = TrackerConfig::every_tick();
    cfg.platform.auto_detect_platform = false;
    let mut tracker = PlatformTracker::new(cfg).unwrap();

    let mut on = PositionMap::with_capacity(n);
    let mut off = PositionMap::with_capacity(n);
    for i in 0..n {
        let id = tracker.spawn("crate");
        let angle = i as f64 * 0.1;
        let (x, z) = (angle.cos() * 5.0, angle.sin() * 5.0);
        on.insert(id.clone(), point([x, 0.0, z]));
        off.insert(id, point([x, -8.0, z]));
    }
    (tracker, on, off)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_transitions");
    for &n in &[10usize, 100, 1000, 5000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let (mut tracker, on, off) = make_tracker(n);
            let mut now = 0.0;
            b.iter(|| {
                now += 0.016;
                black_box(tracker.tick(now, &off));
                now += 0.016;
                black_box(tracker.tick(now, &on));
            });
        });
    }
    group.finish();
}

fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_steady");
    for &n in &[10usize, 100, 1000, 5000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let (mut tracker, on, _) = make_tracker(n);
            let mut now = 0.0;
            b.iter(|| {
                now += 0.016;
                black_box(tracker.tick(now, &on));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_steady_state);
criterion_main!(benches);
