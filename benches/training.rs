use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use census_pipeline::training::RandomForest;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);

    // Positive class when the first two features sum past their midpoint
    let y = x
        .rows()
        .into_iter()
        .map(|row| if row[0] + row[1] > 10.0 { 1.0 } else { 0.0 })
        .collect();

    (x, y)
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000, 10000].iter() {
        let data = create_classification_data(*n_rows, 20);

        group.bench_with_input(
            BenchmarkId::new("fit", n_rows),
            &data,
            |b, (x, y)| {
                b.iter(|| {
                    let mut forest = RandomForest::new(50).with_max_depth(5).with_random_state(42);
                    forest.fit(black_box(x), black_box(y)).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let (x_train, y_train) = create_classification_data(5000, 20);
    let mut forest = RandomForest::new(200).with_max_depth(5).with_random_state(42);
    forest.fit(&x_train, &y_train).unwrap();

    for n_rows in [1, 100, 1000].iter() {
        let (x, _) = create_classification_data(*n_rows, 20);

        group.bench_with_input(
            BenchmarkId::new("predict", n_rows),
            &x,
            |b, x| {
                b.iter(|| {
                    forest.predict(black_box(x)).unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
