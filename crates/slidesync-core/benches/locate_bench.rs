//! Benchmarks for the slide locator hot path.
//!
//! The locator runs on every page event the watcher receives — including the
//! subtree-mutation proxy events that fire on unrelated DOM churn — so it has
//! to stay cheap enough to call eagerly.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slidesync_core::{plan_navigation, slide_index, PageLocation};

fn bench_locate(c: &mut Criterion) {
    let fragment = PageLocation::parse("http://localhost:3030/deck?x=1#5");
    let path = PageLocation::parse("http://localhost:3030/deck/12");
    let query = PageLocation::parse("http://localhost:3030/deck?slide=9");
    let unmarked = PageLocation::parse("http://localhost:3030/");

    c.bench_function("locate_fragment", |b| {
        b.iter(|| slide_index(black_box(&fragment)))
    });
    c.bench_function("locate_path", |b| b.iter(|| slide_index(black_box(&path))));
    c.bench_function("locate_query", |b| b.iter(|| slide_index(black_box(&query))));
    c.bench_function("locate_default", |b| {
        b.iter(|| slide_index(black_box(&unmarked)))
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_full_url", |b| {
        b.iter(|| PageLocation::parse(black_box("http://localhost:3030/deck/3?slide=4#5")))
    });
}

fn bench_plan(c: &mut Criterion) {
    let loc = PageLocation::parse("/deck/12");
    c.bench_function("plan_path_rewrite", |b| {
        b.iter(|| plan_navigation(black_box(&loc), black_box(13)))
    });
}

criterion_group!(benches, bench_locate, bench_parse, bench_plan);
criterion_main!(benches);
