//! Corazon Algo - Matchmaking and call-session service for the Corazon dating app
//!
//! This library provides the compatibility scoring and candidate ranking
//! pipeline plus the in-memory video-call session state machine behind the
//! Corazon backend. HTTP routing delegates into these components; all call
//! state is ephemeral and process-local.

pub mod call;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::call::{CallError, CallSessionManager, CallSettings};
pub use crate::core::{
    compatibility_score, distance_km, haversine_distance, RankerOptions, RecommendationEngine,
};
pub use crate::models::{
    CandidateFilters, Recommendation, ScoringWeights, UserProfile, VideoCall,
};
