use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_validator::WeatherReading;
use feature_engine::{FeatureScaler, SequenceWindow};

fn bench_sequence_window(c: &mut Criterion) {
    let scaler = FeatureScaler::MinMax {
        min: vec![-2.0, -1.5],
        scale: vec![0.1, 0.025],
    };
    let reading = WeatherReading::new(25.0, 80.0).unwrap();

    c.bench_function("sequence_window", |b| {
        b.iter(|| SequenceWindow::from_reading(black_box(&reading), black_box(&scaler)).unwrap())
    });
}

criterion_group!(benches, bench_sequence_window);
criterion_main!(benches);
