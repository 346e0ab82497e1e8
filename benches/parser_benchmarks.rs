// ABOUTME: Benchmark suite for reply parsing and command encoding performance
// ABOUTME: Measures line dispatch, full multi-bulk assembly, and encoder throughput

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use respline::encoder;
use respline::parser::{self, ParseEvent};
use std::time::Duration;

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");
    group.measurement_time(Duration::from_secs(10));

    let lines: &[(&str, &[u8])] = &[
        ("status", b"+OK"),
        ("error_header", b"-ERR wrong number of arguments"),
        ("integer", b":1234567"),
        ("bulk_header", b"$11"),
        ("multi_bulk_header", b"*3"),
    ];

    for (name, line) in lines {
        group.bench_function(*name, |b| {
            b.iter(|| parser::parse_line(false, black_box(line)))
        });
    }

    group.bench_function("error_text", |b| {
        b.iter(|| parser::parse_line(true, black_box(b"wrong number of arguments")))
    });

    group.finish();
}

fn bench_multi_bulk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_bulk_header_sizes");
    group.measurement_time(Duration::from_secs(10));

    let sizes = [1, 10, 100, 1_000];
    for size in sizes {
        let line = format!("*{size}");
        group.bench_with_input(
            BenchmarkId::new("hold_count", size),
            &line,
            |b, line| {
                b.iter(|| {
                    let event = parser::parse_line(false, black_box(line.as_bytes())).unwrap();
                    debug_assert!(matches!(event, ParseEvent::HoldCount(_)));
                })
            },
        );
    }

    group.finish();
}

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("scall_no_args", |b| {
        b.iter(|| encoder::scall(black_box("PING"), black_box(&[])))
    });

    group.bench_function("scall_with_args", |b| {
        b.iter(|| encoder::scall(black_box("MSET"), black_box(&["a", "1", "b", "2"])))
    });

    let message_sizes = [10, 100, 1_024, 4_096];
    for size in message_sizes {
        let value = vec![b'x'; size];
        group.bench_with_input(BenchmarkId::new("set_call", size), &value, |b, value| {
            b.iter(|| encoder::set_call(black_box("SET"), black_box("key"), black_box(value)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_multi_bulk_sizes, bench_encoder);
criterion_main!(benches);
