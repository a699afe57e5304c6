use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use debruijn_rs::{assemble, sliding_window, DeBruijnBuilder, PackedKmer};
use std::time::Duration;

/// Graph construction and Eulerian walk over sliding-window reads of a
/// random genome.

fn generate_genome(len: usize) -> String {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    let bases = b"ACGT";
    (0..len).map(|_| bases[rng.gen_range(0..4)] as char).collect()
}

fn encode_reads(genome: &str, k: usize) -> Vec<PackedKmer> {
    sliding_window(genome, k)
        .into_iter()
        .map(PackedKmer::encode)
        .collect()
}

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");
    group.measurement_time(Duration::from_secs(10));

    for len in [1_000, 10_000, 100_000].iter() {
        let genome = generate_genome(*len);
        let reads = encode_reads(&genome, 31);

        group.bench_with_input(BenchmarkId::new("insert", len), &reads, |b, reads| {
            b.iter(|| {
                let mut builder = DeBruijnBuilder::new(31);
                builder.extend(black_box(reads)).unwrap();
                builder.build()
            });
        });
    }

    group.finish();
}

fn bench_eulerian_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("eulerian_walk");
    group.measurement_time(Duration::from_secs(10));

    for len in [1_000, 10_000, 100_000].iter() {
        let genome = generate_genome(*len);
        let mut builder = DeBruijnBuilder::new(31);
        builder.extend(&encode_reads(&genome, 31)).unwrap();
        let graph = builder.build();

        group.bench_with_input(BenchmarkId::new("walk_and_assemble", len), &graph, |b, graph| {
            b.iter(|| {
                let walk = black_box(graph).compute_walk().unwrap();
                assemble(&walk).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_packing(c: &mut Criterion) {
    let genome = generate_genome(10_000);
    c.bench_function("encode_windows_k31", |b| {
        b.iter(|| encode_reads(black_box(&genome), 31));
    });
}

criterion_group!(
    benches,
    bench_graph_construction,
    bench_eulerian_walk,
    bench_packing
);
criterion_main!(benches);
