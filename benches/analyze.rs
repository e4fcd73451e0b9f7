//! Benchmarks for duplication analysis and report assembly
//!
//! Workspaces have at most a few hundred consumers; these sizes go well past
//! that to keep the grouping step honest.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use singlescope::analysis::{analyze, ResolutionRecord};
use singlescope::export::{export_to_string, ExportFormat};
use singlescope::report::Report;
use singlescope::workspace::Consumer;
use std::path::PathBuf;

/// Create records spread over `copies` distinct real paths, with every
/// tenth consumer unresolved
fn create_records(total: usize, copies: usize) -> (Vec<Consumer>, Vec<ResolutionRecord>) {
    let consumers = (0..total)
        .map(|i| Consumer::workspace(format!("/ws/packages/pkg-{i:05}"), None))
        .collect();

    let records = (0..total)
        .map(|i| {
            if i % 10 == 9 {
                return ResolutionRecord {
                    consumer: i,
                    resolved: None,
                    version: None,
                    failure: None,
                };
            }
            let copy = i % copies;
            ResolutionRecord::resolved(
                i,
                PathBuf::from(format!("/ws/node_modules/.pnpm/yjs@13.6.{copy}/node_modules/yjs/dist/yjs.cjs")),
                Some(format!("13.6.{copy}")),
            )
        })
        .collect();

    (consumers, records)
}

/// Benchmark grouping by real path
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for size in [100, 500, 1000, 5000].iter() {
        let (_, records) = create_records(*size, 3);

        group.bench_with_input(BenchmarkId::new("records", size), &records, |b, records| {
            b.iter(|| black_box(analyze(records)));
        });
    }

    group.finish();
}

/// Benchmark building and serializing the report
fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_json");

    for size in [100, 500, 1000].iter() {
        let (consumers, records) = create_records(*size, 2);
        let analysis = analyze(&records);

        group.bench_with_input(BenchmarkId::new("records", size), size, |b, _| {
            b.iter(|| {
                let report = Report::build(&consumers, &records, &analysis);
                black_box(export_to_string(ExportFormat::Json, &report))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_report);
criterion_main!(benches);
