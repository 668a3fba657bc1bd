use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::CandidateFilters;
use crate::models::call::QualityReport;

/// Request to generate recommendations for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindRecommendationsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    pub filters: CandidateFilters,
}

fn default_limit() -> u16 {
    10
}

/// Request to create a call room
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCallRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "host_id", rename = "hostId")]
    pub host_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "display_name", rename = "displayName")]
    pub display_name: String,
    #[serde(default, alias = "max_participants", rename = "maxParticipants")]
    pub max_participants: Option<usize>,
    #[serde(default = "default_true", alias = "is_private", rename = "isPrivate")]
    pub is_private: bool,
}

fn default_true() -> bool {
    true
}

/// Request to invite a user to a call
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "caller_id", rename = "callerId")]
    pub caller_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "callee_id", rename = "calleeId")]
    pub callee_id: String,
    #[serde(default, alias = "callee_display_name", rename = "calleeDisplayName")]
    pub callee_display_name: String,
}

/// Request to accept an invitation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "display_name", rename = "displayName")]
    pub display_name: String,
}

/// Request to reject an invitation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectInvitationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Partial participant-status update; only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantStatusRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default, alias = "audio_enabled", rename = "audioEnabled")]
    pub audio_enabled: Option<bool>,
    #[serde(default, alias = "video_enabled", rename = "videoEnabled")]
    pub video_enabled: Option<bool>,
}

/// Request carrying only the acting user id (end, leave, recording ops).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CallActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Per-participant quality update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QualityUpdateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub report: QualityReport,
}

/// Content moderation check
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModerationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "content_type", rename = "contentType")]
    pub content_type: String,
    #[serde(default, alias = "content_data", rename = "contentData")]
    pub content_data: serde_json::Value,
}
