//! Benchmarks for descriptor construction and lookups.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use betatron::prelude::*;

/// Builds a descriptor with `nv` uniform variables at order `mo`.
fn uniform_desc(nv: usize, mo: u8) -> Descriptor {
    let bounds = vec![mo; nv];
    Descriptor::build(&DescSpec::new(bounds.clone(), bounds)).expect("valid spec")
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor_build");

    for (nv, mo) in [(4, 4), (6, 4), (6, 6)] {
        group.bench_with_input(
            BenchmarkId::new("build", format!("{nv}v_o{mo}")),
            &(nv, mo),
            |b, &(nv, mo)| b.iter(|| black_box(uniform_desc(nv, mo))),
        );
    }

    group.finish();
}

fn bench_index_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_lookup");

    let desc = uniform_desc(6, 6);
    let monos: Vec<Vec<u8>> = (0..desc.nc())
        .map(|i| desc.mono(i).unwrap().to_vec())
        .collect();

    group.bench_function("idx_dense_all", |b| {
        b.iter(|| {
            for m in &monos {
                black_box(desc.idx(&MonoRepr::Dense(m)));
            }
        });
    });

    group.bench_function("next_by_var_walk", |b| {
        b.iter(|| {
            let mut m = vec![0u8; desc.nv()];
            let mut count = 1usize;
            while let Some(next) = desc.next_by_var(&m) {
                m.copy_from_slice(next.exps());
                count += 1;
            }
            black_box(count)
        });
    });

    group.finish();
}

fn bench_pairing_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairing_tables");

    let desc = uniform_desc(6, 6);
    group.bench_function("walk_all_cells", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for oa in 0..=desc.mo() {
                for ob in 0..=desc.mo() {
                    for t in desc.mul_triples(oa, ob) {
                        sum += u64::from(t.ic);
                    }
                }
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_index_lookup,
    bench_pairing_walk
);
criterion_main!(benches);
