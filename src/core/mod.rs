// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod insights;
pub mod ranker;
pub mod scoring;

pub use distance::{calculate_bounding_box, distance_km, haversine_distance, is_within_bounding_box};
pub use filters::{eligible_candidate, matches_filters, matches_gender_preference, within_distance};
pub use insights::{assess_risk_factors, predict_success_rate};
pub use ranker::{RankerOptions, RecommendationEngine};
pub use scoring::{behavioral_score, collaborative_score, compatibility_score, content_score, geographic_score};
