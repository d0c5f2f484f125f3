//! Migration throughput over synthetic legacy dashboards

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use dashmig_document::Object;
use dashmig_engine::Migrator;

// =============================================================================
// Test Data Generation
// =============================================================================

fn legacy_panel(id: usize) -> Value {
    match id % 4 {
        0 => json!({
            "id": id,
            "type": "graphite",
            "span": 6,
            "legend": true,
            "grid": {"min": 0, "max": 100},
            "targets": [{"target": "a.b"}, {"target": "c.d"}]
        }),
        1 => json!({
            "id": id,
            "type": "singlestat",
            "span": 3,
            "thresholds": "0,50,80",
            "gauge": {"show": id % 8 == 1}
        }),
        2 => json!({
            "id": id,
            "type": "table",
            "span": 12,
            "styles": [{"type": "number", "thresholds": ["1", "2", "3"]}]
        }),
        _ => json!({
            "id": id,
            "type": "text2",
            "span": 4,
            "links": [{"type": "absolute", "url": "http://example.com", "params": "x=1"}]
        }),
    }
}

fn legacy_dashboard(panel_count: usize) -> Object {
    let rows: Vec<Value> = (0..panel_count)
        .collect::<Vec<_>>()
        .chunks(4)
        .enumerate()
        .map(|(index, ids)| {
            json!({
                "title": format!("row {index}"),
                "height": "250px",
                "collapse": index % 3 == 0,
                "panels": ids.iter().map(|id| legacy_panel(*id)).collect::<Vec<_>>()
            })
        })
        .collect();

    match json!({
        "title": "bench",
        "rows": rows,
        "templating": {"list": [
            {"name": "host", "type": "filter", "refresh": true, "multi": true,
             "current": {"value": "a", "text": "a"}}
        ]}
    }) {
        Value::Object(doc) => doc,
        _ => unreachable!(),
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_full_migration(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_migration");
    let migrator = Migrator::new();

    for panel_count in [8, 64, 512] {
        let doc = legacy_dashboard(panel_count);
        group.throughput(Throughput::Elements(panel_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(panel_count), &doc, |b, doc| {
            b.iter_batched(
                || doc.clone(),
                |mut doc| black_box(migrator.migrate(&mut doc)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_noop_migration(c: &mut Criterion) {
    let migrator = Migrator::new();
    let mut doc = legacy_dashboard(64);
    let _ = migrator.migrate(&mut doc);

    c.bench_function("already_latest", |b| {
        b.iter(|| black_box(migrator.migrate(&mut doc)));
    });
}

criterion_group!(benches, bench_full_migration, bench_noop_migration);
criterion_main!(benches);
