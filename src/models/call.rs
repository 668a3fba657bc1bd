use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Call lifecycle status.
///
/// Only `Initiated` and `Disconnected` are driven internally: a call stays
/// `Initiated` through active use and `end_call` is the sole transition to
/// the terminal `Disconnected`. `Ringing`, `Connected`, `Failed` and
/// `Timeout` are reserved for the external signaling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Initiated,
    Ringing,
    Connected,
    Disconnected,
    Failed,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    NotRecording,
    Recording,
    Paused,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

/// Per-user membership record inside a call. Owned exclusively by its
/// `VideoCall`, never shared across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParticipant {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub left_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_host: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub connection_quality: ConnectionQuality,
    pub network_stats: HashMap<String, serde_json::Value>,
}

impl CallParticipant {
    pub fn new(user_id: &str, display_name: &str, joined_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            joined_at,
            left_at: None,
            is_host: false,
            audio_enabled: true,
            video_enabled: true,
            connection_quality: ConnectionQuality::Good,
            network_stats: HashMap::new(),
        }
    }

    pub fn host(user_id: &str, display_name: &str, joined_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            is_host: true,
            ..Self::new(user_id, display_name, joined_at)
        }
    }

    pub fn is_present(&self) -> bool {
        self.left_at.is_none()
    }
}

/// A moderation event recorded against a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFlag {
    pub kind: String,
    pub user_id: String,
    pub content_type: String,
    pub action: ModerationAction,
    pub reason: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One ephemeral two-party call session.
///
/// Invariants: `participants.len() <= max_participants`, exactly one
/// participant is the host for the lifetime of the call, and once status
/// reaches `Disconnected` no further participant or recording mutation is
/// permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCall {
    pub call_id: String,
    pub room_code: String,
    pub participants: HashMap<String, CallParticipant>,
    pub status: CallStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub max_participants: usize,
    pub is_private: bool,
    pub recording_status: RecordingStatus,
    pub recording_url: Option<String>,
    pub quality_metrics: HashMap<String, serde_json::Value>,
    pub security_flags: Vec<SecurityFlag>,
}

impl VideoCall {
    /// Participants that have not left yet.
    pub fn present_participants(&self) -> usize {
        self.participants.values().filter(|p| p.is_present()).count()
    }

    pub fn is_ended(&self) -> bool {
        self.status == CallStatus::Disconnected
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.participants
            .get(user_id)
            .map(|p| p.is_host)
            .unwrap_or(false)
    }
}

/// A time-boxed offer for a specific user to join a specific call.
/// Kept in the store for audit after resolution; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallInvitation {
    pub invitation_id: String,
    pub call_id: String,
    pub caller_id: String,
    pub callee_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub status: InvitationStatus,
    pub accepted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Bookkeeping for one recording of a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    pub recording_id: String,
    pub call_id: String,
    pub started_by: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub status: RecordingStatus,
    pub participants: Vec<String>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_seconds: Option<f64>,
}

/// A STUN/TURN server entry, returned verbatim to the media layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub credential: String,
}

/// WebRTC peer-connection configuration handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    pub ice_servers: Vec<IceServer>,
    pub bundle_policy: String,
    pub rtcp_mux_policy: String,
    pub ice_candidate_pool_size: u32,
}

impl RtcConfiguration {
    pub fn with_servers(ice_servers: Vec<IceServer>) -> Self {
        Self {
            ice_servers,
            bundle_policy: "max-bundle".to_string(),
            rtcp_mux_policy: "require".to_string(),
            ice_candidate_pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Allow,
    Warn,
    Block,
}

/// Result of a content moderation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationOutcome {
    pub action: ModerationAction,
    pub reason: String,
    pub confidence: f64,
    pub suggested_action: Option<String>,
}

impl ModerationOutcome {
    pub fn allow() -> Self {
        Self {
            action: ModerationAction::Allow,
            reason: String::new(),
            confidence: 0.95,
            suggested_action: None,
        }
    }

    pub fn warn(reason: &str) -> Self {
        Self {
            action: ModerationAction::Warn,
            reason: reason.to_string(),
            confidence: 0.95,
            suggested_action: None,
        }
    }

    pub fn block(reason: &str) -> Self {
        Self {
            action: ModerationAction::Block,
            reason: reason.to_string(),
            confidence: 0.95,
            suggested_action: None,
        }
    }
}

/// Quality report submitted by a client for one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub overall_quality: ConnectionQuality,
    #[serde(default)]
    pub network_stats: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Serializable projections returned by the manager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub user_id: String,
    pub display_name: String,
    pub is_host: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub connection_quality: ConnectionQuality,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl From<&CallParticipant> for ParticipantInfo {
    fn from(p: &CallParticipant) -> Self {
        Self {
            user_id: p.user_id.clone(),
            display_name: p.display_name.clone(),
            is_host: p.is_host,
            audio_enabled: p.audio_enabled,
            video_enabled: p.video_enabled,
            connection_quality: p.connection_quality,
            joined_at: p.joined_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallCreated {
    pub call_id: String,
    pub room_code: String,
    pub ice_servers: Vec<IceServer>,
    pub rtc_config: RtcConfiguration,
    pub join_url: String,
    pub host_controls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerInfo {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCreated {
    pub invitation_id: String,
    pub call_id: String,
    pub room_code: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub caller_info: CallerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallJoined {
    pub call_id: String,
    pub room_code: String,
    pub ice_servers: Vec<IceServer>,
    pub rtc_config: RtcConfiguration,
    pub participants: Vec<ParticipantInfo>,
    pub call_controls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStarted {
    pub recording_id: String,
    pub call_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingStopped {
    pub call_id: String,
    pub ended_at: chrono::DateTime<chrono::Utc>,
    pub recording_info: Option<RecordingInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEndSummary {
    pub call_id: String,
    pub ended_at: chrono::DateTime<chrono::Utc>,
    pub duration_seconds: f64,
    pub final_participants: usize,
    pub quality_metrics: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantLeft {
    pub call_id: String,
    pub left_at: chrono::DateTime<chrono::Utc>,
    pub remaining_participants: usize,
}

/// Leaving as host terminates the whole call, so `leave_call` yields either
/// a per-participant record or the full end-of-call summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeaveOutcome {
    Ended(CallEndSummary),
    Left(ParticipantLeft),
}

/// Detailed read-only snapshot of a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSnapshot {
    pub call_id: String,
    pub room_code: String,
    pub status: CallStatus,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_seconds: Option<f64>,
    pub max_participants: usize,
    pub current_participants: usize,
    pub total_participants: usize,
    pub is_private: bool,
    pub recording_status: RecordingStatus,
    pub recording_url: Option<String>,
    pub participants: Vec<ParticipantInfo>,
    pub quality_metrics: HashMap<String, serde_json::Value>,
    pub security_flags: Vec<SecurityFlag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCallSummary {
    pub call_id: String,
    pub room_code: String,
    pub status: CallStatus,
    pub is_host: bool,
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
    pub current_participants: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatistics {
    pub active_calls: usize,
    pub total_participants: usize,
    pub total_calls_created: u64,
    pub successful_connections: u64,
    pub failed_connections: u64,
    pub connection_success_rate: f64,
    pub total_call_duration_seconds: f64,
    pub average_call_duration_seconds: f64,
    pub active_invitations: usize,
    pub total_recordings: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_present_participants_excludes_left() {
        let now = Utc::now();
        let mut call = VideoCall {
            call_id: "c1".into(),
            room_code: "ABCD1234".into(),
            participants: HashMap::new(),
            status: CallStatus::Initiated,
            started_at: now,
            ended_at: None,
            max_participants: 2,
            is_private: true,
            recording_status: RecordingStatus::NotRecording,
            recording_url: None,
            quality_metrics: HashMap::new(),
            security_flags: Vec::new(),
        };
        call.participants
            .insert("h".into(), CallParticipant::host("h", "Host", now));
        let mut guest = CallParticipant::new("g", "Guest", now);
        guest.left_at = Some(now);
        call.participants.insert("g".into(), guest);

        assert_eq!(call.present_participants(), 1);
        assert_eq!(call.participants.len(), 2);
        assert!(call.is_host("h"));
        assert!(!call.is_host("g"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&CallStatus::Disconnected).unwrap();
        assert_eq!(json, r#""disconnected""#);
        let json = serde_json::to_string(&RecordingStatus::NotRecording).unwrap();
        assert_eq!(json, r#""not_recording""#);
    }

    #[test]
    fn test_rtc_configuration_defaults() {
        let cfg = RtcConfiguration::with_servers(vec![]);
        assert_eq!(cfg.bundle_policy, "max-bundle");
        assert_eq!(cfg.rtcp_mux_policy, "require");
        assert_eq!(cfg.ice_candidate_pool_size, 10);
    }
}
