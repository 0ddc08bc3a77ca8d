use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use plume_tree::{Logger, LoggerPath, TreeCache};
use std::sync::Arc;

#[derive(Debug)]
struct EventConfig;

fn fresh_cache() -> TreeCache<Logger<EventConfig>> {
    TreeCache::with_root_factory(Arc::new(EventConfig))
}

/// Fresh cache + one deep logger: the cost of the first lookup at a call site.
fn bench_init_a_logger(c: &mut Criterion) {
    let path = LoggerPath::from(["com", "acmecorp", "app", "controller", "GreatestController"]);

    c.bench_function("init_a_logger", |b| {
        b.iter(|| {
            let cache = fresh_cache();
            black_box(cache.get_or_create(black_box(&path), Logger::derive));
        });
    });
}

/// Resolving an already created logger at increasing depths.
fn bench_find_existing(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_existing");

    for depth in [1usize, 4, 8] {
        let cache = fresh_cache();
        // Siblings at every level so the scan has something to skip.
        for sibling in 0..8 {
            let mut segments: Vec<String> =
                (0..depth).map(|level| format!("pkg{level}")).collect();
            if let Some(last) = segments.last_mut() {
                *last = format!("{last}_{sibling}");
            }
            cache.get_or_create(&LoggerPath::new(segments), Logger::derive);
        }
        let target = LoggerPath::new((0..depth).map(|level| format!("pkg{level}")));
        cache.get_or_create(&target, Logger::derive);

        group.bench_with_input(BenchmarkId::from_parameter(depth), &target, |b, target| {
            b.iter(|| black_box(cache.find(black_box(target))));
        });
    }

    group.finish();
}

/// Pushing a new event factory down a subtree of 1 + 10 + 100 loggers.
fn bench_update_subtree(c: &mut Criterion) {
    let cache = fresh_cache();
    for module in 0..10 {
        for class in 0..10 {
            let name = format!("app.module{module}.Class{class}");
            cache.logger_at(&name, Logger::derive).unwrap();
        }
    }
    let app = LoggerPath::from(["app"]);
    let factory = Arc::new(EventConfig);

    c.bench_function("update_subtree", |b| {
        b.iter(|| black_box(cache.update_logger_event_factory(&app, Arc::clone(&factory))));
    });
}

criterion_group!(benches, bench_init_a_logger, bench_find_existing, bench_update_subtree);
criterion_main!(benches);
