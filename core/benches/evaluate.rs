use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use heval_backend::{governing_modulus, ClearContext, LweContext, LweParameters};
use heval_core::{Bindings, CircuitRepo, Evaluator};

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let repo = CircuitRepo::standard();
    let names = ["add", "multiply-by-constant-2", "add-chain-4", "shared-double"];

    for name in names {
        let circuit = repo.lookup(name).unwrap();
        let mut bindings = Bindings::new();
        for (input, _) in circuit.inputs() {
            bindings = bindings.bind(input, &[55u8, 130, 7, 91]);
        }
        let words = bindings.to_words();

        let mut clear_ctx = ClearContext::<u8>::new(8);
        group.bench_with_input(BenchmarkId::new("clear-context", name), &(), |b, _| {
            b.iter(|| {
                let run = Evaluator::new(circuit)
                    .run(&mut clear_ctx, &bindings)
                    .unwrap();
                black_box(run.outputs);
            })
        });

        let mut lwe_ctx = LweContext::<u8>::new_seeded(
            LweParameters {
                dimension: 512,
                ..LweParameters::default()
            },
            [0u8; 32],
        );
        let modulus = governing_modulus(&lwe_ctx);
        group.bench_with_input(BenchmarkId::new("lwe-context", name), &(), |b, _| {
            b.iter(|| {
                let run = Evaluator::new(circuit).run(&mut lwe_ctx, &bindings).unwrap();
                black_box(run.outputs);
            })
        });

        group.bench_with_input(BenchmarkId::new("clear-reference", name), &(), |b, _| {
            b.iter(|| {
                let run = Evaluator::new(circuit).run_clear(modulus, &words).unwrap();
                black_box(run.outputs);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
