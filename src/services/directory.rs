use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::core::filters::eligible_candidate;
use crate::models::{CandidateFilters, InteractionRecord, InteractionType, UserProfile};

/// Errors that can occur when talking to the profile directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only view of the external profile directory.
///
/// All operations are fallible remote calls; callers on best-effort read
/// paths are expected to downgrade every error to an empty or neutral
/// result rather than propagate it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile. `Ok(None)` is the expected cold-start case of a
    /// user without a profile yet.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DirectoryError>;

    /// Fetch the filtered candidate pool for a requester. Implementations
    /// must apply the full admission policy (active, gender pairing,
    /// explicit filters, distance cutoff, excluding the requester) before
    /// returning.
    async fn get_candidates(
        &self,
        requester: &UserProfile,
        filters: &CandidateFilters,
        max_distance_km: f64,
    ) -> Result<Vec<UserProfile>, DirectoryError>;

    /// Past likes and messages of a user, folded into interaction records.
    async fn get_interaction_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<InteractionRecord>, DirectoryError>;

    /// Users similar to the given profile (shared interest or shared
    /// relationship goal).
    async fn find_similar_users(
        &self,
        profile: &UserProfile,
    ) -> Result<HashSet<String>, DirectoryError>;
}

/// Collection IDs in the directory
#[derive(Debug, Clone)]
pub struct DirectoryCollections {
    pub user_profiles: String,
    pub likes: String,
    pub messages: String,
}

/// HTTP client for the profile directory
///
/// Handles all communication with the directory backend including:
/// - Fetching user profiles and candidate pools
/// - Reading like/message history for collaborative scoring
/// - Finding similar users for the collaborative signal
pub struct HttpProfileStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: DirectoryCollections,
}

impl HttpProfileStore {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: DirectoryCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    fn collection_url(&self, collection: &str, queries: &[String]) -> String {
        let url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        );

        if queries.is_empty() {
            return url;
        }

        let queries_json = serde_json::to_string(queries).unwrap_or_else(|_| "[]".to_string());
        format!("{}?query={}", url, urlencoding::encode(&queries_json))
    }

    /// Run one listing query and return the raw document array.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, DirectoryError> {
        let url = self.collection_url(collection, queries);

        tracing::debug!("Directory query: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Directory-Key", &self.api_key)
            .header("X-Directory-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DirectoryError::Unauthorized);
        }

        if !response.status().is_success() {
            return Err(DirectoryError::ApiError(format!(
                "Directory query failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| DirectoryError::InvalidResponse("Missing documents array".into()))?;

        Ok(documents.clone())
    }

    fn parse_profiles(documents: &[Value]) -> Vec<UserProfile> {
        documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .collect()
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DirectoryError> {
        let queries = vec![format!("equal(\"userId\", \"{}\")", user_id)];
        let documents = self
            .list_documents(&self.collections.user_profiles, &queries)
            .await?;

        let doc = match documents.first() {
            Some(doc) => doc,
            None => return Ok(None),
        };

        let data = doc.get("data").unwrap_or(doc);
        serde_json::from_value(data.clone())
            .map(Some)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse profile: {}", e)))
    }

    async fn get_candidates(
        &self,
        requester: &UserProfile,
        filters: &CandidateFilters,
        max_distance_km: f64,
    ) -> Result<Vec<UserProfile>, DirectoryError> {
        let mut queries = vec![
            "equal(\"isActive\", true)".to_string(),
            format!("notEqual(\"userId\", \"{}\")", requester.user_id),
        ];

        if !requester.preferred_genders.is_empty() {
            let gender_filter = requester
                .preferred_genders
                .iter()
                .map(|g| format!("\"{}\"", g))
                .collect::<Vec<_>>()
                .join(",");
            queries.push(format!("in(\"gender\", [{}])", gender_filter));
        }

        if let Some(min_age) = filters.min_age {
            queries.push(format!("greaterThan(\"age\", {})", min_age as i32 - 1));
        }
        if let Some(max_age) = filters.max_age {
            queries.push(format!("lessThan(\"age\", {})", max_age as i32 + 1));
        }
        if let Some(level) = &filters.verification_level {
            queries.push(format!("equal(\"verificationLevel\", \"{}\")", level));
        }

        let documents = self
            .list_documents(&self.collections.user_profiles, &queries)
            .await?;

        // The directory query is a coarse pre-filter; the authoritative
        // admission policy (distance cutoff included) runs locally.
        let candidates: Vec<UserProfile> = Self::parse_profiles(&documents)
            .into_iter()
            .filter(|p| eligible_candidate(requester, p, filters, max_distance_km))
            .collect();

        tracing::debug!(
            "Directory returned {} candidates for {}",
            candidates.len(),
            requester.user_id
        );

        Ok(candidates)
    }

    async fn get_interaction_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<InteractionRecord>, DirectoryError> {
        let mut interactions = Vec::new();

        // Likes given by the user
        let like_queries = vec![format!("equal(\"fromUserId\", \"{}\")", user_id)];
        let likes = self
            .list_documents(&self.collections.likes, &like_queries)
            .await?;

        for doc in &likes {
            let data = doc.get("data").unwrap_or(doc);
            let target = data
                .get("toUserId")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if target.is_empty() {
                continue;
            }
            let matched = data
                .get("matched")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            interactions.push(InteractionRecord {
                user_id: user_id.to_string(),
                target_user_id: target.to_string(),
                interaction_type: InteractionType::Like,
                timestamp: parse_timestamp(data),
                success_outcome: matched,
                interaction_score: if matched { 1.0 } else { 0.3 },
            });
        }

        // Messages sent by the user
        let message_queries = vec![format!("equal(\"senderId\", \"{}\")", user_id)];
        let messages = self
            .list_documents(&self.collections.messages, &message_queries)
            .await?;

        for doc in &messages {
            let data = doc.get("data").unwrap_or(doc);
            let target = data
                .get("receiverId")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if target.is_empty() {
                continue;
            }
            let led_to_date = data
                .get("ledToDate")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            interactions.push(InteractionRecord {
                user_id: user_id.to_string(),
                target_user_id: target.to_string(),
                interaction_type: InteractionType::Message,
                timestamp: parse_timestamp(data),
                success_outcome: led_to_date,
                interaction_score: if led_to_date { 0.8 } else { 0.5 },
            });
        }

        Ok(interactions)
    }

    async fn find_similar_users(
        &self,
        profile: &UserProfile,
    ) -> Result<HashSet<String>, DirectoryError> {
        let mut similar = HashSet::new();

        // Users sharing any of the profile's interests. Capped to the first
        // five interests to bound the request fan-out.
        for interest in profile.interests.iter().take(5) {
            let queries = vec![format!("contains(\"interests\", \"{}\")", interest)];
            let documents = self
                .list_documents(&self.collections.user_profiles, &queries)
                .await?;
            for candidate in Self::parse_profiles(&documents) {
                if candidate.user_id != profile.user_id {
                    similar.insert(candidate.user_id);
                }
            }
        }

        // Users sharing the relationship goal
        if !profile.relationship_goal.is_empty() {
            let queries = vec![format!(
                "equal(\"relationshipGoal\", \"{}\")",
                profile.relationship_goal
            )];
            let documents = self
                .list_documents(&self.collections.user_profiles, &queries)
                .await?;
            for candidate in Self::parse_profiles(&documents) {
                if candidate.user_id != profile.user_id {
                    similar.insert(candidate.user_id);
                }
            }
        }

        Ok(similar)
    }
}

fn parse_timestamp(data: &Value) -> chrono::DateTime<chrono::Utc> {
    data.get("timestamp")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(chrono::Utc::now)
}
