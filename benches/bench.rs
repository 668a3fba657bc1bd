// Criterion benchmarks for Corazon Algo

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use corazon_algo::core::{
    distance::{calculate_bounding_box, haversine_distance},
    filters::eligible_candidate,
    scoring::compatibility_score,
};
use corazon_algo::models::{CandidateFilters, GeoPoint, ScoringWeights, UserProfile};

fn create_candidate(id: usize, lat: f64, lng: f64) -> UserProfile {
    let mut p: UserProfile =
        serde_json::from_value(serde_json::json!({ "userId": id.to_string() })).unwrap();
    p.age = 22 + (id % 15) as u8;
    p.gender = if id % 2 == 0 { "female" } else { "male" }.to_string();
    p.location = Some(GeoPoint { lat, lng });
    p.interests = vec!["music".to_string(), "travel".to_string(), "cooking".to_string()];
    p.relationship_goal = "serious".to_string();
    p.education_level = "bachelor".to_string();
    p.activity_score = 0.5 + (id % 5) as f64 * 0.1;
    p.reputation_score = 0.6;
    p.verification_level = "phone".to_string();
    p
}

fn create_requester() -> UserProfile {
    let mut p = create_candidate(0, 40.7128, -74.0060);
    p.user_id = "current_user".to_string();
    p.preferred_genders = vec!["female".to_string()];
    p
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(40.7128),
                black_box(-74.0060),
                black_box(40.72),
                black_box(-74.01),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| {
            calculate_bounding_box(black_box(40.7128), black_box(-74.0060), black_box(100.0))
        });
    });
}

fn bench_compatibility_score(c: &mut Criterion) {
    let user = create_requester();
    let candidate = create_candidate(1, 40.7200, -74.0100);
    let weights = ScoringWeights::default();
    let similar: HashSet<String> = HashSet::new();

    c.bench_function("compatibility_score", |b| {
        b.iter(|| {
            compatibility_score(
                black_box(&user),
                black_box(&candidate),
                black_box(&[]),
                black_box(&similar),
                black_box(&weights),
            )
        });
    });
}

fn bench_scoring_batch(c: &mut Criterion) {
    let user = create_requester();
    let weights = ScoringWeights::default();
    let similar: HashSet<String> = HashSet::new();

    let mut group = c.benchmark_group("scoring");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<UserProfile> = (0..*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.5;
                let lng_offset = (i as f64 * 0.001) % 0.5;
                create_candidate(i, 40.7128 + lat_offset, -74.0060 + lng_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("score_candidates", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    let scored: Vec<f64> = candidates
                        .iter()
                        .map(|candidate| {
                            compatibility_score(&user, candidate, &[], &similar, &weights).0
                        })
                        .collect();
                    black_box(scored)
                });
            },
        );
    }

    group.finish();
}

fn bench_pool_filtering(c: &mut Criterion) {
    let requester = create_requester();
    let filters = CandidateFilters {
        min_age: Some(21),
        max_age: Some(35),
        verification_level: None,
    };
    let candidates: Vec<UserProfile> = (0..100)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.5;
            let lng_offset = (i as f64 * 0.001) % 0.5;
            create_candidate(i, 40.7128 + lat_offset, -74.0060 + lng_offset)
        })
        .collect();

    c.bench_function("pool_filtering_100_candidates", |b| {
        b.iter(|| {
            let eligible: Vec<_> = candidates
                .iter()
                .filter(|p| eligible_candidate(&requester, p, &filters, 100.0))
                .collect();
            black_box(eligible)
        });
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_compatibility_score,
    bench_scoring_batch,
    bench_pool_filtering
);

criterion_main!(benches);
