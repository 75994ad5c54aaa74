// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Criterion tuned through `GLOSSA_BENCH_*` variables, with a flamegraph per benchmark.
pub fn criterion() -> Criterion {
    let frequency = env_parse("GLOSSA_PROFILE_FREQ", 100_i32).clamp(1, 1000);
    let sample_size = env_parse("GLOSSA_BENCH_SAMPLES", 50_usize).clamp(10, 200);
    let warmup = env_parse("GLOSSA_BENCH_WARMUP_SECS", 2_u64).clamp(1, 60);
    let measurement = env_parse("GLOSSA_BENCH_MEASUREMENT_SECS", 4_u64).clamp(1, 120);

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
