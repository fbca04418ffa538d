//! Harness benchmarks
//!
//! - Challenge add (whole-collection rewrite cost as the catalog grows)
//! - Error-rate scoring and Hamming deviation
//! - Analysis join and Arrow conversion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use twizzle::analysis::AnalysisAdapter;
use twizzle::deviation::hamming_distance;
use twizzle::metadata::Metadata;
use twizzle::record::TestRecord;
use twizzle::runner::error_rate;
use twizzle::store::Database;

fn random_bits(rng: &mut StdRng, n: usize) -> Vec<bool> {
    (0..n).map(|_| rng.gen_bool(0.5)).collect()
}

fn seeded_db(challenges: usize, pairs: usize, tests_per_challenge: usize) -> Database {
    let db = Database::in_memory();
    let mut rng = StdRng::seed_from_u64(42);
    for c in 0..challenges {
        let name = format!("challenge_{c}");
        db.challenges()
            .add(
                &name,
                (0..pairs).map(|i| format!("o{i}.png")).collect(),
                (0..pairs).map(|i| format!("c{i}.png")).collect(),
                random_bits(&mut rng, pairs),
                Metadata::new().with("attack", "gamma").with("index", c),
            )
            .unwrap();
        for t in 0..tests_per_challenge {
            db.tests()
                .append(
                    TestRecord::new(
                        &name,
                        rng.gen_range(0.0..=1.0),
                        Metadata::new().with("algorithm", "dhash").with("run", t),
                    )
                    .unwrap(),
                )
                .unwrap();
        }
    }
    db
}

/// Benchmark one add against catalogs of increasing size
fn bench_challenge_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("challenge_add");

    for existing in [10, 100, 500] {
        group.bench_with_input(
            BenchmarkId::from_parameter(existing),
            &existing,
            |b, &existing| {
                let db = seeded_db(existing, 32, 0);
                let mut n = 0usize;
                b.iter(|| {
                    n += 1;
                    db.challenges()
                        .add(
                            &format!("extra_{n}"),
                            vec!["a.png".into()],
                            vec!["b.png".into()],
                            vec![true],
                            Metadata::new(),
                        )
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark scoring and deviation on hash-sized and dataset-sized inputs
fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let mut rng = StdRng::seed_from_u64(7);

    for n in [256, 4_096, 65_536] {
        let a = random_bits(&mut rng, n);
        let b = random_bits(&mut rng, n);

        group.bench_with_input(BenchmarkId::new("error_rate", n), &n, |bench, _| {
            bench.iter(|| error_rate(black_box(&a), black_box(&b)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("hamming", n), &n, |bench, _| {
            bench.iter(|| hamming_distance(black_box(&a), black_box(&b)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the join and Arrow conversion
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for challenges in [10, 50] {
        let db = seeded_db(challenges, 16, 20);
        group.bench_with_input(
            BenchmarkId::new("build_and_convert", challenges),
            &challenges,
            |b, _| {
                b.iter(|| {
                    let table = AnalysisAdapter::new(&db).build().unwrap();
                    black_box(table.to_record_batch().unwrap())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_challenge_add, bench_scoring, bench_analysis);
criterion_main!(benches);
