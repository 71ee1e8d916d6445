use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evalbench::evaluation::{ClassificationScores, Evaluator, SilentProgress};
use evalbench::training::{train_test_split, ModelRegistry, ModelSpec, ModelType, Split};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_split(n_rows: usize, n_features: usize) -> Split {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let y: Array1<usize> = (0..n_rows).map(|_| rng.gen_range(0..3)).collect();
    let x = Array2::from_shape_fn((n_rows, n_features), |(i, j)| {
        y[i] as f64 * 2.0 + j as f64 * 0.1 + rng.gen::<f64>()
    });

    train_test_split(&x, &y, 0.2, 62).unwrap()
}

fn bench_evaluation_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    group.sample_size(10); // Fewer samples for training benchmarks

    let specs = [
        ModelSpec::new(ModelType::knn()),
        ModelSpec::new(ModelType::naive_bayes()),
        ModelSpec::new(ModelType::decision_tree()),
        ModelSpec::new(ModelType::Majority),
    ];

    for n_rows in [500, 2000, 5000].iter() {
        let split = create_classification_split(*n_rows, 8);

        group.bench_with_input(BenchmarkId::new("evaluate", n_rows), &split, |b, split| {
            b.iter(|| {
                let registry = ModelRegistry::from_specs(&specs).unwrap();
                let mut progress = SilentProgress;
                Evaluator::new(&mut progress)
                    .evaluate(registry, black_box(split))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_scores(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let y_true: Vec<usize> = (0..100_000).map(|_| rng.gen_range(0..5)).collect();
    let y_pred: Vec<usize> = (0..100_000).map(|_| rng.gen_range(0..5)).collect();

    c.bench_function("scores_100k", |b| {
        b.iter(|| ClassificationScores::compute(black_box(&y_true), black_box(&y_pred)).unwrap())
    });
}

criterion_group!(benches, bench_evaluation_loop, bench_scores);
criterion_main!(benches);
