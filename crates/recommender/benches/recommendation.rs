//! Benchmarks for matrix construction and both recommenders
//!
//! Run with: cargo bench --package recommender
//!
//! Uses a generated dataset so the benchmark runs without the MovieLens files.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{Dataset, Movie, Rating};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recommender::{Recommender, RecommenderConfig, UserMovieMatrix};
use std::sync::Arc;

const USERS: u32 = 2_000;
const MOVIES: u32 = 300;
const MIN_RATING_COUNT: usize = 200;

fn generate_dataset() -> Arc<Dataset> {
    let mut dataset = Dataset::new();
    for id in 1..=MOVIES {
        dataset.insert_movie(Movie {
            id,
            title: format!("Generated Movie {} (2000)", id),
            year: Some(2000),
            genres: vec![],
        });
    }

    // Fixed seed so every run benchmarks the same data
    let mut rng = StdRng::seed_from_u64(7);

    for user_id in 1..=USERS {
        for movie_id in 1..=MOVIES {
            if rng.random_range(0..4) != 0 {
                continue;
            }
            let noise = rng.random_range(0..2u32);
            let rating = ((user_id % 5 + movie_id % 3 + noise) % 10 + 1) as f32 / 2.0;
            dataset.insert_rating(Rating {
                user_id,
                movie_id,
                rating,
                timestamp: rng.random_range(0..1_000_000_000),
            });
        }
    }
    Arc::new(dataset)
}

fn bench_build_matrix(c: &mut Criterion) {
    let dataset = generate_dataset();

    c.bench_function("build_user_movie_matrix", |b| {
        b.iter(|| {
            let matrix = UserMovieMatrix::from_dataset(black_box(&dataset), MIN_RATING_COUNT);
            black_box(matrix)
        })
    });
}

fn bench_user_based(c: &mut Criterion) {
    let config = RecommenderConfig::default()
        .with_min_rating_count(MIN_RATING_COUNT)
        .with_correlation_threshold(0.3);
    let recommender = Recommender::new(generate_dataset(), config).expect("valid config");

    c.bench_function("user_based_recommendation", |b| {
        b.iter(|| black_box(recommender.user_based(black_box(1))))
    });
}

fn bench_item_based(c: &mut Criterion) {
    let config = RecommenderConfig::default().with_min_rating_count(MIN_RATING_COUNT);
    let recommender = Recommender::new(generate_dataset(), config).expect("valid config");

    c.bench_function("item_based_recommendation", |b| {
        b.iter(|| black_box(recommender.item_based(black_box(1))))
    });
}

criterion_group!(benches, bench_build_matrix, bench_user_based, bench_item_based);
criterion_main!(benches);
