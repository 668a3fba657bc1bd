use serde::{Deserialize, Serialize};
use crate::models::domain::Recommendation;

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindRecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Boolean-result envelope for operations with false-not-error semantics
/// (reject invitation, participant status, quality update).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
}

/// Result of an invitation cleanup sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    pub expired: usize,
}
