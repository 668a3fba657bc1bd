use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::call::error::CallError;
use crate::call::moderation;
use crate::call::store::CallStore;
use crate::models::{
    CallCreated, CallEndSummary, CallInvitation, CallJoined, CallParticipant, CallSnapshot,
    CallStatus, CallerInfo, IceServer, InvitationCreated, InvitationStatus, LeaveOutcome,
    ModerationOutcome, ParticipantInfo, ParticipantLeft, QualityReport, RecordingInfo,
    RecordingStarted, RecordingStatus, RecordingStopped, RtcConfiguration, SecurityFlag,
    SystemStatistics, UserCallSummary, VideoCall,
};

/// Injectable time source so expiry and duration logic is deterministic
/// under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> chrono::DateTime<chrono::Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

/// Injectable identifier source (call/invitation/recording ids and room
/// codes).
pub trait IdSource: Send + Sync {
    fn call_id(&self) -> String;
    fn invitation_id(&self) -> String;
    fn recording_id(&self) -> String;
    fn room_code(&self) -> String;
}

const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CODE_LEN: usize = 8;

/// UUIDv4 identifiers and random 8-character room codes
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn call_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn invitation_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn recording_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn room_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_CHARS[rng.gen_range(0..ROOM_CODE_CHARS.len())] as char)
            .collect()
    }
}

/// Call-session policy knobs
#[derive(Debug, Clone, Copy)]
pub struct CallSettings {
    pub invitation_timeout_secs: i64,
    /// Hard cap; this is a strict one-to-one calling system.
    pub max_participants: usize,
    pub max_call_duration_minutes: i64,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            invitation_timeout_secs: 60,
            max_participants: 2,
            max_call_duration_minutes: 120,
        }
    }
}

fn default_ice_servers() -> Vec<IceServer> {
    vec![
        IceServer {
            urls: vec!["stun:stun.l.google.com:19302".to_string()],
            username: String::new(),
            credential: String::new(),
        },
        IceServer {
            urls: vec!["stun:stun1.l.google.com:19302".to_string()],
            username: String::new(),
            credential: String::new(),
        },
    ]
}

fn host_controls() -> Vec<String> {
    [
        "mute_participants",
        "remove_participants",
        "start_recording",
        "stop_recording",
        "end_call",
        "lock_room",
        "enable_waiting_room",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn call_controls(is_host: bool) -> Vec<String> {
    let mut controls: Vec<String> = ["toggle_audio", "toggle_video", "share_screen", "leave_call"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    if is_host {
        controls.extend(
            [
                "mute_participants",
                "remove_participants",
                "start_recording",
                "stop_recording",
                "end_call",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
    }

    controls
}

/// State machine over the in-memory call store.
///
/// Owns membership, invitation and recording bookkeeping. Status stays
/// `Initiated` through active use and only `end_call` drives the terminal
/// `Disconnected` transition; live media states (`Ringing`, `Connected`,
/// `Failed`, `Timeout`) belong to the external signaling layer.
pub struct CallSessionManager {
    store: CallStore,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    settings: CallSettings,
    ice_servers: Vec<IceServer>,
}

impl CallSessionManager {
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
        settings: CallSettings,
        ice_servers: Option<Vec<IceServer>>,
    ) -> Self {
        Self {
            store: CallStore::new(),
            clock,
            ids,
            settings,
            ice_servers: ice_servers.unwrap_or_else(default_ice_servers),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(UuidIdSource),
            CallSettings::default(),
            None,
        )
    }

    fn rtc_config(&self) -> RtcConfiguration {
        RtcConfiguration::with_servers(self.ice_servers.clone())
    }

    /// Generate a room code not currently in use.
    fn fresh_room_code(&self) -> String {
        loop {
            let code = self.ids.room_code();
            if !self.store.room_code_in_use(&code) {
                return code;
            }
        }
    }

    // ─── lifecycle commands ─────────────────────────────────────────────

    /// Create a new call room with the caller as host.
    pub fn create_call(
        &self,
        host_id: &str,
        display_name: &str,
        max_participants: Option<usize>,
        is_private: bool,
    ) -> CallCreated {
        let call_id = self.ids.call_id();
        let room_code = self.fresh_room_code();
        let now = self.clock.now();

        // The 1-to-1 cap is enforced regardless of the requested size.
        let max_participants = max_participants
            .unwrap_or(self.settings.max_participants)
            .min(self.settings.max_participants);

        let mut participants = HashMap::new();
        participants.insert(
            host_id.to_string(),
            CallParticipant::host(host_id, display_name, now),
        );

        let call = VideoCall {
            call_id: call_id.clone(),
            room_code: room_code.clone(),
            participants,
            status: CallStatus::Initiated,
            started_at: now,
            ended_at: None,
            max_participants,
            is_private,
            recording_status: RecordingStatus::NotRecording,
            recording_url: None,
            quality_metrics: HashMap::new(),
            security_flags: Vec::new(),
        };

        self.store.insert_call(call);
        self.store.add_session(host_id, &call_id);
        self.store.record_call_created();

        tracing::info!("Call {} created by {}", call_id, host_id);

        CallCreated {
            call_id: call_id.clone(),
            room_code: room_code.clone(),
            ice_servers: self.ice_servers.clone(),
            rtc_config: self.rtc_config(),
            join_url: format!("/video-chat/join/{}", room_code),
            host_controls: host_controls(),
        }
    }

    /// Invite a user to an existing call.
    pub fn invite_to_call(
        &self,
        call_id: &str,
        caller_id: &str,
        callee_id: &str,
    ) -> Result<InvitationCreated, CallError> {
        let call = self
            .store
            .call(call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.to_string()))?;
        let call = call.lock().unwrap();

        if call.is_ended() {
            return Err(CallError::CallEnded(call_id.to_string()));
        }

        let caller = call
            .participants
            .get(caller_id)
            .ok_or_else(|| CallError::NotAParticipant {
                call_id: call_id.to_string(),
                user_id: caller_id.to_string(),
            })?;

        if call.is_full() {
            return Err(CallError::CallFull(call_id.to_string()));
        }

        if self.store.has_pending_invitation(call_id, callee_id) {
            return Err(CallError::DuplicateInvitation);
        }

        let now = self.clock.now();
        let invitation_id = self.ids.invitation_id();
        let expires_at = now + chrono::Duration::seconds(self.settings.invitation_timeout_secs);

        let invitation = CallInvitation {
            invitation_id: invitation_id.clone(),
            call_id: call_id.to_string(),
            caller_id: caller_id.to_string(),
            callee_id: callee_id.to_string(),
            created_at: now,
            expires_at,
            status: InvitationStatus::Pending,
            accepted_at: None,
        };

        let caller_info = CallerInfo {
            user_id: caller_id.to_string(),
            display_name: caller.display_name.clone(),
        };
        let room_code = call.room_code.clone();

        self.store.insert_invitation(invitation);

        tracing::info!("Invitation {} created for {}", invitation_id, callee_id);

        Ok(InvitationCreated {
            invitation_id,
            call_id: call_id.to_string(),
            room_code,
            expires_at,
            caller_info,
        })
    }

    /// Accept a pending invitation and join the call.
    pub fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
        display_name: &str,
    ) -> Result<CallJoined, CallError> {
        let invitation = self
            .store
            .invitation(invitation_id)
            .ok_or_else(|| CallError::InvitationNotFound(invitation_id.to_string()))?;

        if invitation.callee_id != user_id {
            return Err(CallError::PermissionDenied {
                action: "accept an invitation addressed to another user",
            });
        }

        if invitation.status != InvitationStatus::Pending {
            return Err(CallError::InvitationNotPending(invitation_id.to_string()));
        }

        let now = self.clock.now();
        if now > invitation.expires_at {
            self.store.update_invitation(invitation_id, |inv| {
                if inv.status == InvitationStatus::Pending {
                    inv.status = InvitationStatus::Expired;
                }
            });
            return Err(CallError::InvitationExpired(invitation_id.to_string()));
        }

        let call_id = invitation.call_id.clone();
        let call = self
            .store
            .call(&call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.clone()))?;

        let (room_code, participants, is_host) = {
            let mut call = call.lock().unwrap();

            if call.is_ended() {
                return Err(CallError::CallEnded(call_id.clone()));
            }

            if call.is_full() {
                return Err(CallError::CallFull(call_id.clone()));
            }

            // Claim the invitation while holding the call lock so a racing
            // second accept of the same invitation cannot also pass the
            // pending check.
            let mut claimed = false;
            self.store.update_invitation(invitation_id, |inv| {
                if inv.status == InvitationStatus::Pending {
                    inv.status = InvitationStatus::Accepted;
                    inv.accepted_at = Some(now);
                    claimed = true;
                }
            });
            if !claimed {
                return Err(CallError::InvitationNotPending(invitation_id.to_string()));
            }

            call.participants.insert(
                user_id.to_string(),
                CallParticipant::new(user_id, display_name, now),
            );

            let infos: Vec<ParticipantInfo> =
                call.participants.values().map(ParticipantInfo::from).collect();
            (call.room_code.clone(), infos, call.is_host(user_id))
        };

        self.store.add_session(user_id, &call_id);
        self.store.record_successful_connection();

        tracing::info!("Invitation {} accepted by {}", invitation_id, user_id);

        Ok(CallJoined {
            call_id,
            room_code,
            ice_servers: self.ice_servers.clone(),
            rtc_config: self.rtc_config(),
            participants,
            call_controls: call_controls(is_host),
        })
    }

    /// Reject an invitation. Not-found and wrong-recipient cases report
    /// `false` rather than an error.
    pub fn reject_invitation(&self, invitation_id: &str, user_id: &str) -> bool {
        let invitation = match self.store.invitation(invitation_id) {
            Some(invitation) => invitation,
            None => return false,
        };

        if invitation.callee_id != user_id {
            return false;
        }

        self.store.update_invitation(invitation_id, |inv| {
            inv.status = InvitationStatus::Rejected;
        });

        tracing::info!("Invitation {} rejected by {}", invitation_id, user_id);
        true
    }

    /// Partial audio/video toggle update; only provided fields change.
    pub fn update_participant_status(
        &self,
        call_id: &str,
        user_id: &str,
        audio_enabled: Option<bool>,
        video_enabled: Option<bool>,
    ) -> bool {
        let call = match self.store.call(call_id) {
            Some(call) => call,
            None => return false,
        };
        let mut call = call.lock().unwrap();

        if call.is_ended() {
            return false;
        }

        let participant = match call.participants.get_mut(user_id) {
            Some(participant) => participant,
            None => return false,
        };

        if let Some(audio) = audio_enabled {
            participant.audio_enabled = audio;
        }
        if let Some(video) = video_enabled {
            participant.video_enabled = video;
        }

        true
    }

    /// Start recording; host only.
    pub fn start_recording(
        &self,
        call_id: &str,
        user_id: &str,
    ) -> Result<RecordingStarted, CallError> {
        let call = self
            .store
            .call(call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.to_string()))?;
        let mut call = call.lock().unwrap();

        if call.is_ended() {
            return Err(CallError::CallEnded(call_id.to_string()));
        }

        if !call.is_host(user_id) {
            return Err(CallError::PermissionDenied {
                action: "start recording",
            });
        }

        if call.recording_status == RecordingStatus::Recording {
            return Err(CallError::AlreadyRecording);
        }

        let now = self.clock.now();
        let recording_id = self.ids.recording_id();
        let participants: Vec<String> = call.participants.keys().cloned().collect();

        call.recording_status = RecordingStatus::Recording;

        self.store.insert_recording(RecordingInfo {
            recording_id: recording_id.clone(),
            call_id: call_id.to_string(),
            started_by: user_id.to_string(),
            started_at: now,
            status: RecordingStatus::Recording,
            participants: participants.clone(),
            ended_at: None,
            duration_seconds: None,
        });

        tracing::info!("Recording {} started for call {}", recording_id, call_id);

        Ok(RecordingStarted {
            recording_id,
            call_id: call_id.to_string(),
            started_at: now,
            participants,
        })
    }

    /// Stop the active recording; host only.
    pub fn stop_recording(
        &self,
        call_id: &str,
        user_id: &str,
    ) -> Result<RecordingStopped, CallError> {
        let call = self
            .store
            .call(call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.to_string()))?;
        let mut call = call.lock().unwrap();

        if !call.is_host(user_id) {
            return Err(CallError::PermissionDenied {
                action: "stop recording",
            });
        }

        if call.recording_status != RecordingStatus::Recording {
            return Err(CallError::NotRecording);
        }

        let now = self.clock.now();
        call.recording_status = RecordingStatus::Completed;

        let recording_info = self.store.update_active_recording(call_id, |rec| {
            rec.status = RecordingStatus::Completed;
            rec.ended_at = Some(now);
            rec.duration_seconds = Some((now - rec.started_at).num_milliseconds() as f64 / 1000.0);
        });

        tracing::info!("Recording stopped for call {}", call_id);

        Ok(RecordingStopped {
            call_id: call_id.to_string(),
            ended_at: now,
            recording_info,
        })
    }

    /// End the call; host only. Terminal: sets `Disconnected`, stamps every
    /// still-present participant and clears the session index. Idempotent
    /// in effect: a repeated call re-reports the summary without
    /// re-stamping or double-counting duration.
    pub fn end_call(&self, call_id: &str, user_id: &str) -> Result<CallEndSummary, CallError> {
        let call = self
            .store
            .call(call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.to_string()))?;
        let mut call = call.lock().unwrap();

        if !call.is_host(user_id) {
            return Err(CallError::PermissionDenied {
                action: "end the call",
            });
        }

        let now = self.clock.now();
        let already_ended = call.is_ended();

        call.status = CallStatus::Disconnected;
        let ended_at = *call.ended_at.get_or_insert(now);

        for participant in call.participants.values_mut() {
            if participant.left_at.is_none() {
                participant.left_at = Some(ended_at);
            }
        }

        let duration = ended_at - call.started_at;
        if !already_ended {
            self.store.record_call_duration(duration);
            for participant_id in call.participants.keys() {
                self.store.remove_session(participant_id, call_id);
            }
        }

        tracing::info!("Call {} ended by {}", call_id, user_id);

        Ok(CallEndSummary {
            call_id: call_id.to_string(),
            ended_at,
            duration_seconds: duration.num_milliseconds() as f64 / 1000.0,
            final_participants: call.participants.len(),
            quality_metrics: call.quality_metrics.clone(),
        })
    }

    /// Leave a call. A departing host terminates the whole call; there is
    /// no host-transfer mechanism.
    pub fn leave_call(&self, call_id: &str, user_id: &str) -> Result<LeaveOutcome, CallError> {
        let call = self
            .store
            .call(call_id)
            .ok_or_else(|| CallError::CallNotFound(call_id.to_string()))?;

        let is_host = {
            let call = call.lock().unwrap();
            let participant =
                call.participants
                    .get(user_id)
                    .ok_or_else(|| CallError::NotAParticipant {
                        call_id: call_id.to_string(),
                        user_id: user_id.to_string(),
                    })?;
            participant.is_host
        };

        if is_host {
            return self.end_call(call_id, user_id).map(LeaveOutcome::Ended);
        }

        let now = self.clock.now();
        let remaining = {
            let mut call = call.lock().unwrap();
            if let Some(participant) = call.participants.get_mut(user_id) {
                if participant.left_at.is_none() {
                    participant.left_at = Some(now);
                }
            }
            call.present_participants()
        };

        self.store.remove_session(user_id, call_id);

        tracing::info!("User {} left call {}", user_id, call_id);

        Ok(LeaveOutcome::Left(ParticipantLeft {
            call_id: call_id.to_string(),
            left_at: now,
            remaining_participants: remaining,
        }))
    }

    /// Store a participant's quality report; false if call or user is
    /// unknown or the call has ended.
    pub fn update_quality(&self, call_id: &str, user_id: &str, report: QualityReport) -> bool {
        let call = match self.store.call(call_id) {
            Some(call) => call,
            None => return false,
        };
        let mut call = call.lock().unwrap();

        if call.is_ended() {
            return false;
        }

        let participant = match call.participants.get_mut(user_id) {
            Some(participant) => participant,
            None => return false,
        };

        participant.connection_quality = report.overall_quality;
        participant.network_stats = report.network_stats.clone();

        let serialized = serde_json::to_value(&report).unwrap_or(serde_json::Value::Null);
        call.quality_metrics.insert(user_id.to_string(), serialized);

        true
    }

    /// Moderate in-call content. Never errors: unknown call or participant
    /// yields a block outcome with a diagnostic reason, and any non-allow
    /// outcome is appended to the call's security flags.
    pub fn moderate_content(
        &self,
        call_id: &str,
        user_id: &str,
        content_type: &str,
        content_data: &serde_json::Value,
    ) -> ModerationOutcome {
        let call = match self.store.call(call_id) {
            Some(call) => call,
            None => return ModerationOutcome::block("call_not_found"),
        };
        let mut call = call.lock().unwrap();

        if !call.participants.contains_key(user_id) {
            return ModerationOutcome::block("user_not_in_call");
        }

        let outcome = moderation::moderate(content_type, content_data);

        if outcome.action != crate::models::ModerationAction::Allow {
            call.security_flags.push(SecurityFlag {
                kind: "content_moderation".to_string(),
                user_id: user_id.to_string(),
                content_type: content_type.to_string(),
                action: outcome.action,
                reason: outcome.reason.clone(),
                timestamp: self.clock.now(),
            });
        }

        outcome
    }

    /// Sweep pending invitations past their expiry; returns the number
    /// transitioned. Intended to run on an external schedule.
    pub fn cleanup_expired_invitations(&self) -> usize {
        let expired = self.store.expire_pending_before(self.clock.now());
        if expired > 0 {
            tracing::info!("Expired {} stale invitations", expired);
        }
        expired
    }

    // ─── read-only projections ──────────────────────────────────────────

    pub fn get_call_info(&self, call_id: &str) -> Option<CallSnapshot> {
        let call = self.store.call(call_id)?;
        let call = call.lock().unwrap();

        Some(CallSnapshot {
            call_id: call.call_id.clone(),
            room_code: call.room_code.clone(),
            status: call.status,
            started_at: call.started_at,
            ended_at: call.ended_at,
            duration_seconds: call
                .ended_at
                .map(|ended| (ended - call.started_at).num_milliseconds() as f64 / 1000.0),
            max_participants: call.max_participants,
            current_participants: call.present_participants(),
            total_participants: call.participants.len(),
            is_private: call.is_private,
            recording_status: call.recording_status,
            recording_url: call.recording_url.clone(),
            participants: call.participants.values().map(ParticipantInfo::from).collect(),
            quality_metrics: call.quality_metrics.clone(),
            security_flags: call.security_flags.clone(),
        })
    }

    pub fn get_user_active_calls(&self, user_id: &str) -> Vec<UserCallSummary> {
        let mut summaries = Vec::new();

        for call_id in self.store.user_calls(user_id) {
            let Some(call) = self.store.call(&call_id) else {
                continue;
            };
            let call = call.lock().unwrap();
            let participant = call.participants.get(user_id);

            summaries.push(UserCallSummary {
                call_id: call.call_id.clone(),
                room_code: call.room_code.clone(),
                status: call.status,
                is_host: participant.map(|p| p.is_host).unwrap_or(false),
                joined_at: participant.map(|p| p.joined_at),
                current_participants: call.present_participants(),
            });
        }

        summaries
    }

    pub fn get_system_statistics(&self) -> SystemStatistics {
        let successful = self.store.successful_connections();
        let failed = self.store.failed_connections();
        let total_connections = successful + failed;
        let success_rate = if total_connections > 0 {
            successful as f64 / total_connections as f64 * 100.0
        } else {
            0.0
        };

        let calls_created = self.store.calls_created();
        let total_duration = self.store.total_duration_seconds();
        let average_duration = if calls_created > 0 {
            total_duration / calls_created as f64
        } else {
            0.0
        };

        SystemStatistics {
            active_calls: self.store.call_count(),
            total_participants: self.store.total_participants(),
            total_calls_created: calls_created,
            successful_connections: successful,
            failed_connections: failed,
            connection_success_rate: success_rate,
            total_call_duration_seconds: total_duration,
            average_call_duration_seconds: average_duration,
            active_invitations: self.store.pending_invitation_count(),
            total_recordings: self.store.completed_recording_count(),
        }
    }
}
