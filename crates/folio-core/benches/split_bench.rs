// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for page-set planning in the folio-core crate.
// Covers range parsing and split resolution on a large synthetic document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use folio_core::{RangePolicy, SplitStrategy, parse_selection, resolve};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Parse a long, overlapping range expression against a 10,000 page document.
fn bench_parse_selection(c: &mut Criterion) {
    let expr = (0..500)
        .map(|i| format!("{}-{}", i * 20 + 1, i * 20 + 30))
        .collect::<Vec<_>>()
        .join(",");

    c.bench_function("parse_selection (500 tokens)", |b| {
        b.iter(|| parse_selection(black_box(&expr), 10_000, RangePolicy::Strict));
    });
}

/// Resolve count and every strategies over 10,000 pages.
fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve count(7) over 10k pages", |b| {
        b.iter(|| resolve(black_box(&SplitStrategy::Count(7)), 10_000));
    });
    c.bench_function("resolve every(3) over 10k pages", |b| {
        b.iter(|| resolve(black_box(&SplitStrategy::Every(3)), 10_000));
    });
}

criterion_group!(benches, bench_parse_selection, bench_resolve);
criterion_main!(benches);
