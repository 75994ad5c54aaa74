// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use glossa::config::GeometryConfig;
use glossa::geometry::{range_geometry, HighlightKey, Highlights, MonospaceLayout, Padding};
use glossa::model::{AppellationId, CharSpan};

mod profiler;

// Group names (`geometry.range`, `geometry.recompute`) and case ids stay stable so results
// remain comparable between runs.
const TEXT_LEN: usize = 20_000;

fn layout(columns: usize) -> MonospaceLayout {
    MonospaceLayout::new(TEXT_LEN, columns, 7.5, 18.0)
        .with_origin(120.0, 40.0)
        .with_padding(Padding { top: 8.0, right: 12.0, bottom: 8.0, left: 12.0 })
}

fn span(start: usize, end: usize) -> CharSpan {
    CharSpan::new(start, end).expect("span")
}

fn checksum(geometry: &glossa::geometry::SelectionGeometry) -> f32 {
    geometry.boxes().map(|(_, b)| b.top + b.left + b.width + b.height).sum()
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry.range");
    let config = GeometryConfig::default();
    let probe = layout(80);

    for (case, target) in [
        ("single_line", span(85, 130)),
        ("two_lines", span(150, 200)),
        ("paragraph", span(400, 2_400)),
        ("chapter", span(0, TEXT_LEN)),
    ] {
        group.bench_function(case, |b| {
            b.iter(|| checksum(&range_geometry(&probe, black_box(target), &config)))
        });
    }

    group.finish();
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry.recompute");
    let config = GeometryConfig::default();

    for count in [16_usize, 256] {
        let mut highlights = Highlights::new();
        for idx in 0..count {
            let start = (idx * 97) % (TEXT_LEN - 300);
            let key = HighlightKey::Appellation(AppellationId::new(idx as u64));
            highlights.track(key, span(start, start + 40 + idx % 250));
        }
        let narrow = layout(48);
        let wide = layout(120);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("resize_{count}"), |b| {
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let probe = if flip { &narrow } else { &wide };
                highlights.recompute(probe, &config);
                black_box(highlights.len())
            })
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = bench_range, bench_recompute
}
criterion_main!(benches);
