use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;
use uptimewatch_sdk::Registry;

const STATUS: &str = "uptimerobot_monitors_status";

fn status_registry() -> Registry {
    let registry = Registry::new();
    registry
        .register_gauge(STATUS, "Monitor status", &["url", "friendly_name", "interval"])
        .unwrap();
    registry
}

fn populated(series: usize) -> Registry {
    let registry = status_registry();
    for i in 0..series {
        let url = format!("https://site-{}.example.com", i);
        let name = format!("site-{}", i);
        registry
            .set_gauge(STATUS, &[url.as_str(), name.as_str(), "300"], 2.0)
            .unwrap();
    }
    registry
}

/// Benchmark updating an existing series
fn bench_set_existing(c: &mut Criterion) {
    let registry = populated(1);

    c.bench_function("set_existing_series", |b| {
        b.iter(|| {
            registry
                .set_gauge(
                    black_box(STATUS),
                    black_box(&["https://site-0.example.com", "site-0", "300"]),
                    black_box(2.0),
                )
                .unwrap();
        });
    });
}

/// Benchmark the create/delete cycle a disappearing monitor goes through
fn bench_set_delete_churn(c: &mut Criterion) {
    let registry = status_registry();

    c.bench_function("set_delete_churn", |b| {
        b.iter(|| {
            let labels = ["https://gone.example.com", "gone", "60"];
            registry.set_gauge(STATUS, &labels, 9.0).unwrap();
            black_box(registry.delete_gauge(STATUS, &labels).unwrap());
        });
    });
}

/// Benchmark rendering with a growing number of series
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for series in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*series as u64));
        group.bench_with_input(BenchmarkId::new("series", series), series, |b, &series| {
            let registry = populated(series);
            b.iter(|| black_box(registry.render()));
        });
    }
    group.finish();
}

/// Benchmark concurrent writers with a scraper rendering alongside
fn bench_concurrent_set_with_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_set_with_render");

    for thread_count in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements(*thread_count as u64 * 500));
        group.bench_with_input(
            BenchmarkId::from_parameter(thread_count),
            thread_count,
            |b, &thread_count| {
                let registry = populated(100);
                b.iter(|| {
                    thread::scope(|scope| {
                        for thread_id in 0..thread_count {
                            let registry = &registry;
                            scope.spawn(move || {
                                let name = format!("writer-{}", thread_id);
                                for i in 0..500 {
                                    registry
                                        .set_gauge(
                                            STATUS,
                                            &["https://writer.example.com", name.as_str(), "60"],
                                            black_box(i as f64),
                                        )
                                        .unwrap();
                                }
                            });
                        }
                        let registry = &registry;
                        scope.spawn(move || {
                            for _ in 0..10 {
                                black_box(registry.render());
                            }
                        });
                    });
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_set_existing,
    bench_set_delete_churn,
    bench_render,
    bench_concurrent_set_with_render,
);
criterion_main!(benches);
