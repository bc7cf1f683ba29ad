// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for artifact naming, filename validation, and integrity
// hashing in the blattwerk-store crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use blattwerk_core::ArtifactKind;
use blattwerk_store::{artifact_name, hash_bytes, validate_filename};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark SHA-256 fingerprinting at typical artifact sizes.
fn bench_integrity_hash(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[
        ("10 KiB", 10 * 1024),
        ("1 MiB", 1024 * 1024),
        ("10 MiB", 10 * 1024 * 1024),
    ];

    let mut group = c.benchmark_group("integrity_hash_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data))));
        });
    }
    group.finish();
}

/// Benchmark name generation followed by validation, the path every stored
/// artifact takes.
fn bench_name_then_validate(c: &mut Criterion) {
    c.bench_function("artifact_name + validate_filename", |b| {
        b.iter(|| {
            let name = artifact_name(black_box(Some("Quarterly Report 2026.pdf")), "part_3", ArtifactKind::Pdf);
            black_box(validate_filename(&name).ok());
        });
    });
}

criterion_group!(benches, bench_integrity_hash, bench_name_then_validate);
criterion_main!(benches);
