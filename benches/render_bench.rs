//! Parse and render benchmarks
//!
//! Tokenizing, record building and exposition rendering of `runmqsc` output

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mq_exporter::collector::{build_queue_records, tokenize};
use mq_exporter::transformer::{MetricRenderer, QUEUE_DEPTH_FAMILIES, QUEUE_MONITOR_FAMILIES};

fn depth_output(queues: usize) -> String {
    (0..queues)
        .map(|i| {
            format!(
                "AMQ8409I: Display Queue details.\n   QUEUE(APP.QUEUE.{i})   TYPE(QLOCAL)\n   \
                 CURDEPTH({})   MAXDEPTH(5000)\n",
                i % 100
            )
        })
        .collect()
}

fn monitor_output(queues: usize) -> String {
    (0..queues)
        .map(|i| {
            format!(
                "AMQ8450I: Display queue status details.\n   QUEUE(APP.QUEUE.{i})   TYPE(QUEUE)\n   \
                 CURDEPTH(0)   LGETDATE(2019-12-24)\n   LGETTIME(13.00.01)   LPUTDATE(2019-12-24)\n   \
                 LPUTTIME(13.00.00)   MONQ(MEDIUM)\n   MSGAGE({i})   QTIME(3231, 3232)\n"
            )
        })
        .collect()
}

fn benchmark_tokenize(c: &mut Criterion) {
    let line = "QUEUE(DEV.QUEUE.1) TYPE(QUEUE) CURDEPTH(0) LGETDATE(2019-12-24) \
                LGETTIME(13.00.01) LPUTDATE(2019-12-24) LPUTTIME(13.00.00) MONQ(MEDIUM) \
                MSGAGE(0) QTIME(3231, 3232)";

    c.bench_function("tokenize/monitor_line", |b| b.iter(|| tokenize(line)));
}

fn benchmark_build_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_queue_records");

    for queues in [10, 100, 1000] {
        let raw = monitor_output(queues);
        group.bench_with_input(BenchmarkId::new("monitor", queues), &raw, |b, raw| {
            b.iter(|| build_queue_records(raw))
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for queues in [10, 100, 1000] {
        let (depth, _) = build_queue_records(&depth_output(queues));
        let (monitor, _) = build_queue_records(&monitor_output(queues));

        let depth_renderer = MetricRenderer::new(QUEUE_DEPTH_FAMILIES);
        group.bench_with_input(BenchmarkId::new("depth", queues), &depth, |b, records| {
            b.iter(|| depth_renderer.render("QM1", records))
        });

        let monitor_renderer = MetricRenderer::new(QUEUE_MONITOR_FAMILIES);
        group.bench_with_input(
            BenchmarkId::new("monitor", queues),
            &monitor,
            |b, records| b.iter(|| monitor_renderer.render("QM1", records)),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_tokenize,
    benchmark_build_records,
    benchmark_render
);
criterion_main!(benches);
