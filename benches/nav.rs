// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Larissa-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Larissa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use larissa::model::{Contact, EntityRef, Note, Workspace};
use larissa::nav::{OverlayController, OverlaySurface};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `nav.drilldown`
// - Case IDs (the string after the `/`) must remain stable across refactors
//   so results stay comparable over time (e.g. `chain_16`, `chain_256`).
#[derive(Debug, Default)]
struct CountingSurface {
    shows: u64,
    closes: u64,
}

impl OverlaySurface for CountingSurface {
    fn show_note(&mut self, _note: &Note, _caller: Option<EntityRef>) {
        self.shows += 1;
    }

    fn show_contact(&mut self, _contact: &Contact, _caller: Option<EntityRef>) {
        self.shows += 1;
    }

    fn close_current(&mut self) {
        self.closes += 1;
    }
}

fn drilldown_chain(workspace: &Workspace, depth: usize) -> Vec<EntityRef> {
    let note_refs: Vec<EntityRef> =
        workspace.notes().keys().cloned().map(EntityRef::Note).collect();
    (0..depth).map(|idx| note_refs[idx % note_refs.len()].clone()).collect()
}

fn benches_nav(c: &mut Criterion) {
    let workspace = fixtures::linked_workspace(64, 16);
    let chain_16 = drilldown_chain(&workspace, 16);
    let chain_256 = drilldown_chain(&workspace, 256);

    let mut group = c.benchmark_group("nav.drilldown");

    for (case, chain) in [("chain_16", &chain_16), ("chain_256", &chain_256)] {
        group.throughput(Throughput::Elements(chain.len() as u64));
        group.bench_function(case, |b| {
            b.iter_batched(
                || (OverlayController::new(), CountingSurface::default()),
                |(mut controller, mut surface)| {
                    let mut current: Option<EntityRef> = None;
                    for target in chain {
                        controller.activate(
                            black_box(&workspace),
                            &mut surface,
                            current.clone(),
                            target,
                        );
                        current = Some(target.clone());
                    }
                    while let Some(shown) = current {
                        match controller.back(&workspace, &mut surface, shown) {
                            larissa::nav::BackOutcome::ReturnedTo(entity_ref) => {
                                current = Some(entity_ref);
                            }
                            _ => current = None,
                        }
                    }
                    black_box((surface.shows, surface.closes))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_nav
}
criterion_main!(benches);
