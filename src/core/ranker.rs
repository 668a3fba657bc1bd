use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::distance::distance_km;
use crate::core::insights::{assess_risk_factors, predict_success_rate};
use crate::core::scoring::compatibility_score;
use crate::models::{CandidateFilters, Recommendation, ScoringWeights, UserProfile};
use crate::services::{DirectoryError, ProfileStore};

/// Ranker thresholds and limits
#[derive(Debug, Clone, Copy)]
pub struct RankerOptions {
    pub max_distance_km: f64,
    pub min_compatibility_score: f64,
    pub max_limit: usize,
}

impl Default for RankerOptions {
    fn default() -> Self {
        Self {
            max_distance_km: 100.0,
            min_compatibility_score: 0.6,
            max_limit: 50,
        }
    }
}

/// Recommendation orchestrator
///
/// Resolves the requester's profile and candidate pool through the injected
/// profile store, scores every candidate, and keeps those above the minimum
/// compatibility threshold, sorted by descending score.
///
/// Recommendations are a best-effort feature: every internal failure is
/// logged and surfaces to the caller as an empty list, never as an error.
pub struct RecommendationEngine {
    store: Arc<dyn ProfileStore>,
    weights: ScoringWeights,
    options: RankerOptions,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn ProfileStore>, weights: ScoringWeights, options: RankerOptions) -> Self {
        Self {
            store,
            weights,
            options,
        }
    }

    /// Generate up to `limit` recommendations for a user.
    pub async fn recommendations_for(
        &self,
        user_id: &str,
        limit: usize,
        filters: &CandidateFilters,
    ) -> Vec<Recommendation> {
        let limit = limit.min(self.options.max_limit);

        match self.try_recommendations(user_id, limit, filters).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                tracing::error!("Failed to generate recommendations for {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    async fn try_recommendations(
        &self,
        user_id: &str,
        limit: usize,
        filters: &CandidateFilters,
    ) -> Result<Vec<Recommendation>, DirectoryError> {
        let user = match self.store.get_profile(user_id).await? {
            Some(profile) => profile,
            None => {
                // Expected cold-start case: the user has no profile yet.
                tracing::info!("No profile for user {}, returning empty feed", user_id);
                return Ok(Vec::new());
            }
        };

        let candidates = self
            .store
            .get_candidates(&user, filters, self.options.max_distance_km)
            .await?;

        if candidates.is_empty() {
            tracing::info!("No candidates available for {}", user_id);
            return Ok(Vec::new());
        }

        // History failures degrade to "no history" rather than failing the
        // whole feed; the scorer treats that as a neutral signal.
        let history = match self.store.get_interaction_history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Failed to fetch interaction history for {}: {}", user_id, e);
                Vec::new()
            }
        };

        let mut recommendations = Vec::new();
        for candidate in candidates {
            let similar_users = match self.store.find_similar_users(&candidate).await {
                Ok(similar) => similar,
                Err(e) => {
                    tracing::warn!(
                        "Failed to find users similar to {}: {}",
                        candidate.user_id,
                        e
                    );
                    Default::default()
                }
            };

            let (score, reasons) =
                compatibility_score(&user, &candidate, &history, &similar_users, &self.weights);

            if score < self.options.min_compatibility_score {
                continue;
            }

            recommendations.push(Recommendation {
                score,
                reasons,
                compatibility_percentage: score * 100.0,
                distance_km: distance_km(user.location.as_ref(), candidate.location.as_ref()),
                common_interests: user.common_interests(&candidate),
                predicted_success_rate: predict_success_rate(&user, &candidate),
                risk_factors: assess_risk_factors(&candidate),
                user_id: candidate.user_id,
            });
        }

        // Stable sort: ties keep the pool provider's order
        recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        recommendations.truncate(limit);

        tracing::info!(
            "Generated {} recommendations for {}",
            recommendations.len(),
            user_id
        );

        Ok(recommendations)
    }
}
