// Unit tests for Corazon Algo

use std::collections::HashSet;

use corazon_algo::core::{
    distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box},
    filters::{eligible_candidate, matches_filters, matches_gender_preference},
    insights::{assess_risk_factors, predict_success_rate},
    scoring::{behavioral_score, compatibility_score, geographic_score},
};
use corazon_algo::models::{CandidateFilters, GeoPoint, ScoringWeights, UserProfile};

fn profile(id: &str) -> UserProfile {
    serde_json::from_value(serde_json::json!({ "userId": id })).unwrap()
}

fn nyc_profile(id: &str, age: u8, gender: &str) -> UserProfile {
    let mut p = profile(id);
    p.age = age;
    p.gender = gender.to_string();
    p.location = Some(GeoPoint { lat: 40.7128, lng: -74.0060 });
    p.interests = vec!["music".to_string(), "travel".to_string()];
    p.relationship_goal = "serious".to_string();
    p.activity_score = 0.8;
    p.reputation_score = 0.8;
    p.verification_level = "identity".to_string();
    p.photo_count = 3;
    p.bio_length = 150;
    p
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_manhattan_to_brooklyn() {
    // Manhattan to Brooklyn is approximately 5-10 km
    let manhattan_lat = 40.7580;
    let manhattan_lon = -73.9855;
    let brooklyn_lat = 40.6782;
    let brooklyn_lon = -73.9442;

    let distance = haversine_distance(manhattan_lat, manhattan_lon, brooklyn_lat, brooklyn_lon);
    assert!(distance > 5.0 && distance < 15.0);
}

#[test]
fn test_distance_km_symmetry() {
    let a = GeoPoint { lat: 40.7128, lng: -74.0060 };
    let b = GeoPoint { lat: 34.0522, lng: -118.2437 };

    let ab = distance_km(Some(&a), Some(&b));
    let ba = distance_km(Some(&b), Some(&a));
    assert!((ab - ba).abs() < 1e-9);
}

#[test]
fn test_distance_km_infinite_on_missing_input() {
    let a = GeoPoint { lat: 40.7128, lng: -74.0060 };
    assert!(distance_km(None, Some(&a)).is_infinite());
    assert!(distance_km(Some(&a), None).is_infinite());
}

#[test]
fn test_bounding_box_creation() {
    let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);

    assert!(bbox.min_lat < 40.7128);
    assert!(bbox.max_lat > 40.7128);
    assert!(bbox.min_lon < -74.0060);
    assert!(bbox.max_lon > -74.0060);

    // Bounding box should be roughly 0.18 degrees in latitude (10km / 111km per degree)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);
}

#[test]
fn test_point_within_bbox() {
    let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);

    assert!(is_within_bounding_box(40.7128, -74.0060, &bbox));
    assert!(is_within_bounding_box(40.71, -74.0, &bbox));
    assert!(!is_within_bounding_box(50.0, -80.0, &bbox));
    assert!(!is_within_bounding_box(bbox.max_lat + 0.01, -74.0, &bbox));
}

#[test]
fn test_score_stays_in_unit_range_across_extremes() {
    let weights = ScoringWeights::default();
    let empty = profile("a");
    let rich = nyc_profile("b", 30, "female");

    for (user, candidate) in [(&empty, &rich), (&rich, &empty), (&empty, &empty)] {
        let (score, _) = compatibility_score(user, candidate, &[], &HashSet::new(), &weights);
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[test]
fn test_reference_scenario_music_travel() {
    let mut user = nyc_profile("u1", 28, "male");
    user.interests = vec!["music".into(), "travel".into(), "cooking".into()];

    let mut candidate = nyc_profile("u2", 26, "female");
    candidate.interests = vec!["music".into(), "travel".into()];
    candidate.location = Some(GeoPoint { lat: 40.7200, lng: -74.0100 });

    // Distance is roughly a kilometer, which lands in the closest geo bucket
    let d = distance_km(user.location.as_ref(), candidate.location.as_ref());
    assert!(d < 2.0);
    assert_eq!(geographic_score(&user, &candidate), 1.0);

    let (score, reasons) = compatibility_score(
        &user,
        &candidate,
        &[],
        &HashSet::new(),
        &ScoringWeights::default(),
    );

    assert!(score > 0.6, "expected score > 0.6, got {}", score);
    let interests = reasons
        .iter()
        .find(|r| r.contains("Common interests"))
        .expect("common interests reason missing");
    assert!(interests.contains("music") && interests.contains("travel"));
}

#[test]
fn test_gender_preference_pairing() {
    let mut requester = nyc_profile("me", 28, "female");
    requester.preferred_genders = vec!["male".to_string()];

    let male = nyc_profile("a", 30, "male");
    let female = nyc_profile("b", 30, "female");

    assert!(matches_gender_preference(&requester, &male));
    assert!(!matches_gender_preference(&requester, &female));
}

#[test]
fn test_candidate_filters() {
    let filters = CandidateFilters {
        min_age: Some(25),
        max_age: Some(35),
        verification_level: None,
    };

    assert!(matches_filters(&nyc_profile("a", 30, "male"), &filters));
    assert!(!matches_filters(&nyc_profile("b", 20, "male"), &filters));
    assert!(!matches_filters(&nyc_profile("c", 40, "male"), &filters));
}

#[test]
fn test_pool_policy_distance_cutoff() {
    let requester = nyc_profile("me", 28, "female");
    let filters = CandidateFilters::default();

    let near = nyc_profile("near", 27, "male");
    assert!(eligible_candidate(&requester, &near, &filters, 100.0));

    let mut far = nyc_profile("far", 27, "male");
    far.location = Some(GeoPoint { lat: 34.0522, lng: -118.2437 });
    assert!(!eligible_candidate(&requester, &far, &filters, 100.0));
}

#[test]
fn test_behavioral_score_rewards_closeness() {
    let mut a = nyc_profile("a", 30, "male");
    let mut b = nyc_profile("b", 30, "female");
    a.activity_score = 0.9;
    b.activity_score = 0.9;

    let close = behavioral_score(&a, &b);

    b.activity_score = 0.1;
    let distant = behavioral_score(&a, &b);

    assert!(close > distant);
}

#[test]
fn test_success_rate_and_risks() {
    let user = nyc_profile("u1", 28, "male");
    let candidate = nyc_profile("u2", 27, "female");

    let rate = predict_success_rate(&user, &candidate);
    assert!((0.0..=1.0).contains(&rate));
    assert!(assess_risk_factors(&candidate).is_empty());

    let mut risky = nyc_profile("u3", 27, "female");
    risky.verification_level = "none".to_string();
    risky.photo_count = 0;
    let risks = assess_risk_factors(&risky);
    assert!(risks.contains(&"low_verification".to_string()));
    assert!(risks.contains(&"incomplete_profile".to_string()));
}
