// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use larissa::query::{search, search_candidates, SearchMode};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `search.query`
// - Case IDs: `substring_small`, `fuzzy_small`, `fuzzy_large`.
fn benches_search(c: &mut Criterion) {
    let small = search_candidates(&fixtures::linked_workspace(64, 16));
    let large = search_candidates(&fixtures::linked_workspace(2048, 512));

    let mut group = c.benchmark_group("search.query");

    group.throughput(Throughput::Elements(small.len() as u64));
    group.bench_function("substring_small", |b| {
        b.iter(|| {
            let hits = search(black_box(&small), "bench note 0001", SearchMode::Substring)
                .expect("search");
            black_box(hits.len())
        })
    });

    group.throughput(Throughput::Elements(small.len() as u64));
    group.bench_function("fuzzy_small", |b| {
        b.iter(|| {
            let hits =
                search(black_box(&small), "bnch nt 31", SearchMode::Fuzzy).expect("search");
            black_box(hits.len())
        })
    });

    group.throughput(Throughput::Elements(large.len() as u64));
    group.bench_function("fuzzy_large", |b| {
        b.iter(|| {
            let hits =
                search(black_box(&large), "bnch nt 31", SearchMode::Fuzzy).expect("search");
            black_box(hits.len())
        })
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_search
}
criterion_main!(benches);
