use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::models::{CallInvitation, InvitationStatus, RecordingInfo, VideoCall};

/// In-memory registry of calls, invitations, recordings and per-user
/// session indices.
///
/// Each call sits behind its own mutex so every mutating operation on a
/// given call is serialized, preserving the participant-count and host
/// invariants under concurrent invite/accept/leave/end races. Lock order
/// is always: calls map -> call mutex -> invitations -> sessions; no code
/// path acquires them in the opposite direction.
///
/// State is process-local by design: a restart loses all active calls,
/// matching the ephemeral nature of the sessions.
#[derive(Default)]
pub struct CallStore {
    calls: RwLock<HashMap<String, Arc<Mutex<VideoCall>>>>,
    invitations: RwLock<HashMap<String, CallInvitation>>,
    sessions: RwLock<HashMap<String, HashSet<String>>>,
    recordings: RwLock<HashMap<String, RecordingInfo>>,

    calls_created: AtomicU64,
    successful_connections: AtomicU64,
    failed_connections: AtomicU64,
    /// Accumulated call duration in milliseconds.
    total_duration_ms: AtomicU64,
}

impl CallStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── calls ──────────────────────────────────────────────────────────

    pub fn insert_call(&self, call: VideoCall) {
        let mut calls = self.calls.write().unwrap();
        calls.insert(call.call_id.clone(), Arc::new(Mutex::new(call)));
    }

    pub fn call(&self, call_id: &str) -> Option<Arc<Mutex<VideoCall>>> {
        let calls = self.calls.read().unwrap();
        calls.get(call_id).cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Sum of participants across all calls (left participants included,
    /// as the snapshot reflects total membership).
    pub fn total_participants(&self) -> usize {
        let calls = self.calls.read().unwrap();
        calls
            .values()
            .map(|call| call.lock().unwrap().participants.len())
            .sum()
    }

    pub fn room_code_in_use(&self, room_code: &str) -> bool {
        let calls = self.calls.read().unwrap();
        calls
            .values()
            .any(|call| call.lock().unwrap().room_code == room_code)
    }

    // ─── invitations ────────────────────────────────────────────────────

    pub fn insert_invitation(&self, invitation: CallInvitation) {
        let mut invitations = self.invitations.write().unwrap();
        invitations.insert(invitation.invitation_id.clone(), invitation);
    }

    pub fn invitation(&self, invitation_id: &str) -> Option<CallInvitation> {
        let invitations = self.invitations.read().unwrap();
        invitations.get(invitation_id).cloned()
    }

    /// Apply a mutation to one invitation. Returns false if it is absent.
    pub fn update_invitation<F>(&self, invitation_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut CallInvitation),
    {
        let mut invitations = self.invitations.write().unwrap();
        match invitations.get_mut(invitation_id) {
            Some(invitation) => {
                f(invitation);
                true
            }
            None => false,
        }
    }

    /// A pending invitation already exists for this (call, callee) pair.
    pub fn has_pending_invitation(&self, call_id: &str, callee_id: &str) -> bool {
        let invitations = self.invitations.read().unwrap();
        invitations.values().any(|inv| {
            inv.call_id == call_id
                && inv.callee_id == callee_id
                && inv.status == InvitationStatus::Pending
        })
    }

    pub fn pending_invitation_count(&self) -> usize {
        let invitations = self.invitations.read().unwrap();
        invitations
            .values()
            .filter(|inv| inv.status == InvitationStatus::Pending)
            .count()
    }

    /// Transition every pending invitation past its expiry to `Expired`.
    /// Returns the number of invitations transitioned.
    pub fn expire_pending_before(&self, now: chrono::DateTime<chrono::Utc>) -> usize {
        let mut invitations = self.invitations.write().unwrap();
        let mut expired = 0;
        for invitation in invitations.values_mut() {
            if invitation.status == InvitationStatus::Pending && now > invitation.expires_at {
                invitation.status = InvitationStatus::Expired;
                expired += 1;
            }
        }
        expired
    }

    // ─── session index ──────────────────────────────────────────────────

    pub fn add_session(&self, user_id: &str, call_id: &str) {
        let mut sessions = self.sessions.write().unwrap();
        sessions
            .entry(user_id.to_string())
            .or_default()
            .insert(call_id.to_string());
    }

    pub fn remove_session(&self, user_id: &str, call_id: &str) {
        let mut sessions = self.sessions.write().unwrap();
        if let Some(call_ids) = sessions.get_mut(user_id) {
            call_ids.remove(call_id);
        }
    }

    pub fn user_calls(&self, user_id: &str) -> Vec<String> {
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(user_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    // ─── recordings ─────────────────────────────────────────────────────

    pub fn insert_recording(&self, recording: RecordingInfo) {
        let mut recordings = self.recordings.write().unwrap();
        recordings.insert(recording.recording_id.clone(), recording);
    }

    /// Apply a mutation to the active recording of a call, if any, and
    /// return the updated record.
    pub fn update_active_recording<F>(&self, call_id: &str, f: F) -> Option<RecordingInfo>
    where
        F: FnOnce(&mut RecordingInfo),
    {
        let mut recordings = self.recordings.write().unwrap();
        let recording = recordings.values_mut().find(|rec| {
            rec.call_id == call_id && rec.status == crate::models::RecordingStatus::Recording
        })?;
        f(recording);
        Some(recording.clone())
    }

    pub fn completed_recording_count(&self) -> usize {
        let recordings = self.recordings.read().unwrap();
        recordings
            .values()
            .filter(|rec| rec.status == crate::models::RecordingStatus::Completed)
            .count()
    }

    // ─── counters ───────────────────────────────────────────────────────

    pub fn record_call_created(&self) {
        self.calls_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_successful_connection(&self) {
        self.successful_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_connection(&self) {
        self.failed_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_call_duration(&self, duration: chrono::Duration) {
        let ms = duration.num_milliseconds().max(0) as u64;
        self.total_duration_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn calls_created(&self) -> u64 {
        self.calls_created.load(Ordering::Relaxed)
    }

    pub fn successful_connections(&self) -> u64 {
        self.successful_connections.load(Ordering::Relaxed)
    }

    pub fn failed_connections(&self) -> u64 {
        self.failed_connections.load(Ordering::Relaxed)
    }

    pub fn total_duration_seconds(&self) -> f64 {
        self.total_duration_ms.load(Ordering::Relaxed) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallStatus, RecordingStatus};
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    fn call(id: &str, room_code: &str) -> VideoCall {
        VideoCall {
            call_id: id.to_string(),
            room_code: room_code.to_string(),
            participants: HashMap::new(),
            status: CallStatus::Initiated,
            started_at: Utc::now(),
            ended_at: None,
            max_participants: 2,
            is_private: true,
            recording_status: RecordingStatus::NotRecording,
            recording_url: None,
            quality_metrics: HashMap::new(),
            security_flags: Vec::new(),
        }
    }

    fn invitation(id: &str, call_id: &str, callee: &str, expires_in_secs: i64) -> CallInvitation {
        let now = Utc::now();
        CallInvitation {
            invitation_id: id.to_string(),
            call_id: call_id.to_string(),
            caller_id: "caller".to_string(),
            callee_id: callee.to_string(),
            created_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
            status: InvitationStatus::Pending,
            accepted_at: None,
        }
    }

    #[test]
    fn test_call_roundtrip() {
        let store = CallStore::new();
        store.insert_call(call("c1", "AAAA1111"));

        assert!(store.call("c1").is_some());
        assert!(store.call("missing").is_none());
        assert!(store.room_code_in_use("AAAA1111"));
        assert!(!store.room_code_in_use("BBBB2222"));
        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn test_pending_invitation_lookup() {
        let store = CallStore::new();
        store.insert_invitation(invitation("i1", "c1", "bob", 60));

        assert!(store.has_pending_invitation("c1", "bob"));
        assert!(!store.has_pending_invitation("c1", "alice"));
        assert!(!store.has_pending_invitation("c2", "bob"));

        store.update_invitation("i1", |inv| inv.status = InvitationStatus::Rejected);
        assert!(!store.has_pending_invitation("c1", "bob"));
    }

    #[test]
    fn test_expire_pending_before() {
        let store = CallStore::new();
        store.insert_invitation(invitation("stale", "c1", "bob", -10));
        store.insert_invitation(invitation("fresh", "c1", "carol", 60));

        let expired = store.expire_pending_before(Utc::now());
        assert_eq!(expired, 1);
        assert_eq!(
            store.invitation("stale").unwrap().status,
            InvitationStatus::Expired
        );
        assert_eq!(
            store.invitation("fresh").unwrap().status,
            InvitationStatus::Pending
        );

        // A second sweep finds nothing new
        assert_eq!(store.expire_pending_before(Utc::now()), 0);
    }

    #[test]
    fn test_session_index() {
        let store = CallStore::new();
        store.add_session("alice", "c1");
        store.add_session("alice", "c2");
        store.remove_session("alice", "c1");

        assert_eq!(store.user_calls("alice"), vec!["c2".to_string()]);
        assert!(store.user_calls("nobody").is_empty());
    }

    #[test]
    fn test_duration_accumulation() {
        let store = CallStore::new();
        store.record_call_duration(Duration::seconds(90));
        store.record_call_duration(Duration::milliseconds(500));

        assert!((store.total_duration_seconds() - 90.5).abs() < 1e-9);
    }
}
