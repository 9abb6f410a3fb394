//! Criterion micro-benchmarks for the format interpreter.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use linmem_bench::{bench_context, printf_fixture};
use linmem_format::{format, parse};
use linmem_host::OutputSink;

struct Discard;

impl OutputSink for Discard {
    fn write(&mut self, text: &str) {
        black_box(text);
    }
}

fn bench_parse_directives(c: &mut Criterion) {
    c.bench_function("parse_mixed_format", |b| {
        b.iter(|| black_box(parse(black_box("stack[%zu] = %d (%.*s) %.6f%c")).unwrap()));
    });
}

fn bench_render_from_region(c: &mut Criterion) {
    let mut ctx = bench_context();
    let (fmt, args) = printf_fixture(&mut ctx).unwrap();
    c.bench_function("render_printf_fixture", |b| {
        b.iter(|| black_box(format(ctx.region(), black_box(fmt), black_box(args)).unwrap()));
    });
}

fn bench_printfn_to_sink(c: &mut Criterion) {
    let mut ctx = bench_context();
    let (fmt, args) = printf_fixture(&mut ctx).unwrap();
    ctx.set_output(Some(Box::new(Discard)));
    c.bench_function("printfn_to_sink", |b| {
        b.iter(|| ctx.printfn(black_box(fmt), black_box(args)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_parse_directives,
    bench_render_from_region,
    bench_printfn_to_sink,
);
criterion_main!(benches);
