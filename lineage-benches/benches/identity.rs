//! Identity resolution and full pipeline benchmarks.
//!
//! Measures union-find identity resolution alone and the whole
//! records-to-graphs pipeline on synthetic faculty tables of growing size.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::SmallRng};

use lineage_benches::{
    error::BenchSetupError,
    synthetic::{SyntheticConfig, SyntheticFaculty},
};
use lineage_core::{PipelineBuilder, resolve_identities};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Professor counts to benchmark.
const PROFESSOR_COUNTS: &[usize] = &[1_000, 5_000, 20_000];

fn faculty(professors: usize) -> Result<SyntheticFaculty, BenchSetupError> {
    Ok(SyntheticFaculty::generate(&SyntheticConfig {
        professors,
        institutions: 60,
        first_year: 2004,
        last_year: 2024,
        seed: SEED,
    })?)
}

fn identity_resolution_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("resolve_identities");
    group.sample_size(20);

    for &professors in PROFESSOR_COUNTS {
        let records = faculty(professors)?.records;
        group.bench_with_input(
            BenchmarkId::from_parameter(professors),
            &records,
            |b, records| {
                b.iter(|| resolve_identities(records, &mut SmallRng::seed_from_u64(SEED)));
            },
        );
    }

    group.finish();
    Ok(())
}

fn pipeline_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    let pipeline = PipelineBuilder::new().with_seed(SEED).build()?;

    for &professors in PROFESSOR_COUNTS {
        let input = faculty(professors)?;
        group.bench_with_input(
            BenchmarkId::from_parameter(professors),
            &input,
            |b, input| {
                b.iter(|| {
                    pipeline.run(
                        input.records.clone(),
                        input.mapping.clone(),
                        input.registry.clone(),
                    )
                });
            },
        );
    }

    group.finish();
    Ok(())
}

fn identity_resolution(c: &mut Criterion) {
    if let Err(err) = identity_resolution_impl(c) {
        panic!("identity resolution benchmark setup failed: {err}");
    }
}

fn pipeline(c: &mut Criterion) {
    if let Err(err) = pipeline_impl(c) {
        panic!("pipeline benchmark setup failed: {err}");
    }
}

criterion_group!(benches, identity_resolution, pipeline);
criterion_main!(benches);
