use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Both coordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Full user profile as served by the profile directory.
///
/// Constructed fresh on every scoring request and treated as immutable for
/// the duration of one ranking call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default = "default_age")]
    pub age: u8,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub relationship_goal: String,
    #[serde(default)]
    pub personality_traits: HashMap<String, f64>,
    #[serde(default)]
    pub preferences: HashMap<String, serde_json::Value>,
    #[serde(default = "default_half")]
    pub activity_score: f64,
    #[serde(default = "default_half")]
    pub reputation_score: f64,
    #[serde(default = "default_verification")]
    pub verification_level: String,
    #[serde(default)]
    pub photo_count: u32,
    #[serde(default)]
    pub bio_length: u32,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_no_preference")]
    pub smoking: String,
    #[serde(default = "default_no_preference")]
    pub drinking: String,
    #[serde(default = "default_no_preference")]
    pub exercise: String,
    #[serde(default = "default_no_preference")]
    pub religion: String,
    #[serde(default = "default_no_preference")]
    pub politics: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub preferred_genders: Vec<String>,
}

fn default_age() -> u8 {
    25
}

fn default_half() -> f64 {
    0.5
}

fn default_verification() -> String {
    "none".to_string()
}

fn default_no_preference() -> String {
    "no_preference".to_string()
}

fn default_true() -> bool {
    true
}

impl UserProfile {
    /// Interests present on both profiles, in this profile's order.
    pub fn common_interests(&self, other: &UserProfile) -> Vec<String> {
        self.interests
            .iter()
            .filter(|i| other.interests.contains(i))
            .cloned()
            .collect()
    }

    /// Lifestyle attributes in scoring order.
    pub fn lifestyle(&self) -> [&str; 5] {
        [
            &self.smoking,
            &self.drinking,
            &self.exercise,
            &self.religion,
            &self.politics,
        ]
    }
}

/// One past interaction by a user, folded from the directory's likes and
/// messages collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub user_id: String,
    pub target_user_id: String,
    pub interaction_type: InteractionType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Whether the interaction led to a match or a date.
    pub success_outcome: bool,
    pub interaction_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    Like,
    Message,
}

/// Recognized candidate-pool filters. Unknown filter keys are rejected at
/// deserialization instead of being silently carried along.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CandidateFilters {
    #[serde(default)]
    pub min_age: Option<u8>,
    #[serde(default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub verification_level: Option<String>,
}

/// One ranked recommendation for a requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub user_id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub compatibility_percentage: f64,
    pub distance_km: f64,
    pub common_interests: Vec<String>,
    pub predicted_success_rate: f64,
    pub risk_factors: Vec<String>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Top-level scoring weights. Must sum to 1.0 so the final score stays
/// within [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub collaborative: f64,
    pub content: f64,
    pub geographic: f64,
    pub behavioral: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            collaborative: 0.40,
            content: 0.30,
            geographic: 0.20,
            behavioral: 0.10,
        }
    }
}
