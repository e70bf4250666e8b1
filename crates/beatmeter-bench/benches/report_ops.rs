//! Criterion micro-benchmarks for report assembly and rendering.

use std::hint::black_box;

use beatmeter_bench::{record, Workload};
use beatmeter_engine::{Session, SessionConfig};
use beatmeter_ledger::MeasurementRun;
use beatmeter_report::{publish, rank_top_n, MemorySink, Report, ReportConfig};
use beatmeter_test_utils::SteppingClock;
use criterion::{criterion_group, criterion_main, Criterion};

/// A closed run of the large workload with deterministic 1 µs steps.
fn large_run() -> MeasurementRun {
    let workload = Workload::LARGE;
    let mut session: Session<SteppingClock> =
        Session::with_clock(workload.config(), SteppingClock::new(0, 1_000)).unwrap();
    record(&mut session, &workload).unwrap();
    session.pop().unwrap()
}

fn bench_report_build(c: &mut Criterion) {
    let run = large_run();
    c.bench_function("report_build_large", |b| {
        b.iter(|| black_box(Report::build(black_box(&run), 5)));
    });
}

fn bench_rank_top_n(c: &mut Criterion) {
    let report = Report::build(&large_run(), 0);
    c.bench_function("rank_top_10", |b| {
        b.iter(|| black_box(rank_top_n(black_box(&report.steps), 10)));
    });
}

fn bench_publish(c: &mut Criterion) {
    let report = Report::build(&large_run(), 5);
    let config = ReportConfig {
        show_accumulated_time: true,
        ..SessionConfig::default().report
    };
    c.bench_function("publish_large_to_memory", |b| {
        b.iter(|| {
            let mut sink = MemorySink::new();
            publish(black_box(&report), &config, &mut sink);
            black_box(sink)
        });
    });
}

criterion_group!(benches, bench_report_build, bench_rank_top_n, bench_publish);
criterion_main!(benches);
