// Integration tests for Corazon Algo

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use corazon_algo::call::{CallSessionManager, CallSettings, Clock, IdSource, UuidIdSource};
use corazon_algo::core::{RankerOptions, RecommendationEngine};
use corazon_algo::models::{
    CallStatus, CandidateFilters, GeoPoint, InteractionRecord, LeaveOutcome, ModerationAction,
    ScoringWeights, UserProfile,
};
use corazon_algo::services::{DirectoryError, ProfileStore};
use corazon_algo::CallError;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct InMemoryDirectory {
    profiles: HashMap<String, UserProfile>,
    candidates: Vec<UserProfile>,
    history: Vec<InteractionRecord>,
    similar: HashSet<String>,
}

#[async_trait]
impl ProfileStore for InMemoryDirectory {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.profiles.get(user_id).cloned())
    }

    async fn get_candidates(
        &self,
        requester: &UserProfile,
        filters: &CandidateFilters,
        max_distance_km: f64,
    ) -> Result<Vec<UserProfile>, DirectoryError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| corazon_algo::core::eligible_candidate(requester, c, filters, max_distance_km))
            .cloned()
            .collect())
    }

    async fn get_interaction_history(
        &self,
        _user_id: &str,
    ) -> Result<Vec<InteractionRecord>, DirectoryError> {
        Ok(self.history.clone())
    }

    async fn find_similar_users(
        &self,
        _profile: &UserProfile,
    ) -> Result<HashSet<String>, DirectoryError> {
        Ok(self.similar.clone())
    }
}

struct ManualClock {
    now: Mutex<chrono::DateTime<chrono::Utc>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: Mutex::new("2024-06-01T12:00:00Z".parse().unwrap()),
        }
    }

    fn advance_secs(&self, secs: i64) {
        *self.now.lock().unwrap() += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        *self.now.lock().unwrap()
    }
}

fn test_profile(id: &str, age: u8, gender: &str, lat: f64, lng: f64) -> UserProfile {
    let mut p: UserProfile = serde_json::from_value(serde_json::json!({ "userId": id })).unwrap();
    p.age = age;
    p.gender = gender.to_string();
    p.location = Some(GeoPoint { lat, lng });
    p.interests = vec!["music".to_string(), "travel".to_string()];
    p.relationship_goal = "serious".to_string();
    p.activity_score = 0.8;
    p.reputation_score = 0.8;
    p.verification_level = "identity".to_string();
    p.photo_count = 3;
    p.bio_length = 150;
    p
}

fn engine_with(directory: InMemoryDirectory) -> RecommendationEngine {
    RecommendationEngine::new(
        Arc::new(directory),
        ScoringWeights::default(),
        RankerOptions::default(),
    )
}

fn call_manager() -> (CallSessionManager, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let manager = CallSessionManager::new(
        clock.clone(),
        Arc::new(UuidIdSource),
        CallSettings::default(),
        None,
    );
    (manager, clock)
}

// ---------------------------------------------------------------------------
// Recommendation pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_ranking() {
    let mut directory = InMemoryDirectory::default();
    let mut requester = test_profile("me", 28, "male", 40.7128, -74.0060);
    requester.preferred_genders = vec!["female".to_string()];
    directory.profiles.insert("me".to_string(), requester);

    directory.candidates = vec![
        test_profile("close", 27, "female", 40.7200, -74.0100),
        test_profile("metro", 29, "female", 40.9000, -74.0060),
        test_profile("wrong_gender", 27, "male", 40.7200, -74.0100),
        test_profile("too_far", 27, "female", 34.0522, -118.2437),
    ];

    let engine = engine_with(directory);
    let recommendations = engine
        .recommendations_for("me", 10, &CandidateFilters::default())
        .await;

    // Distance cutoff and gender pairing run before scoring
    let ids: Vec<&str> = recommendations.iter().map(|r| r.user_id.as_str()).collect();
    assert!(!ids.contains(&"wrong_gender"));
    assert!(!ids.contains(&"too_far"));
    assert!(ids.contains(&"close"));

    // Sorted non-increasing, all above threshold
    for pair in recommendations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(recommendations.iter().all(|r| r.score >= 0.6));
}

#[tokio::test]
async fn test_ranking_respects_limit_and_filters() {
    let mut directory = InMemoryDirectory::default();
    directory.profiles.insert(
        "me".to_string(),
        test_profile("me", 28, "male", 40.7128, -74.0060),
    );

    for i in 0..30 {
        let age = 22 + (i % 12) as u8;
        directory.candidates.push(test_profile(
            &format!("c{}", i),
            age,
            "female",
            40.7150 + i as f64 * 0.0005,
            -74.0080,
        ));
    }

    let engine = engine_with(directory);

    let filters = CandidateFilters {
        min_age: Some(25),
        max_age: Some(30),
        verification_level: None,
    };
    let recommendations = engine.recommendations_for("me", 5, &filters).await;

    assert!(recommendations.len() <= 5);
}

#[tokio::test]
async fn test_cold_start_user_gets_empty_feed() {
    let engine = engine_with(InMemoryDirectory::default());
    let recommendations = engine
        .recommendations_for("nobody", 10, &CandidateFilters::default())
        .await;
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_collaborative_history_shifts_scores() {
    let mut directory = InMemoryDirectory::default();
    directory.profiles.insert(
        "me".to_string(),
        test_profile("me", 28, "male", 40.7128, -74.0060),
    );
    directory
        .candidates
        .push(test_profile("cand", 27, "female", 40.7200, -74.0100));

    // All past interactions with similar users succeeded
    directory.similar = ["friendly".to_string()].into_iter().collect();
    directory.history = vec![InteractionRecord {
        user_id: "me".to_string(),
        target_user_id: "friendly".to_string(),
        interaction_type: corazon_algo::models::InteractionType::Like,
        timestamp: chrono::Utc::now(),
        success_outcome: true,
        interaction_score: 1.0,
    }];

    let with_history = engine_with(directory).recommendations_for("me", 10, &CandidateFilters::default()).await;

    let mut directory = InMemoryDirectory::default();
    directory.profiles.insert(
        "me".to_string(),
        test_profile("me", 28, "male", 40.7128, -74.0060),
    );
    directory
        .candidates
        .push(test_profile("cand", 27, "female", 40.7200, -74.0100));
    let without_history = engine_with(directory).recommendations_for("me", 10, &CandidateFilters::default()).await;

    // A perfect collaborative record beats the neutral default
    assert!(with_history[0].score > without_history[0].score);
}

// ---------------------------------------------------------------------------
// Call session lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_call_lifecycle_end_to_end() {
    let (manager, clock) = call_manager();

    let created = manager.create_call("alice", "Alice", None, true);
    assert_eq!(created.room_code.len(), 8);
    assert!(created
        .room_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert!(!created.ice_servers.is_empty());

    let invited = manager
        .invite_to_call(&created.call_id, "alice", "bob")
        .unwrap();
    let joined = manager
        .accept_invitation(&invited.invitation_id, "bob", "Bob")
        .unwrap();
    assert_eq!(joined.participants.len(), 2);

    // Bob reports degraded quality
    assert!(manager.update_quality(
        &created.call_id,
        "bob",
        corazon_algo::models::QualityReport {
            overall_quality: corazon_algo::models::ConnectionQuality::Fair,
            network_stats: HashMap::new(),
        },
    ));

    // Alice records part of the call
    manager.start_recording(&created.call_id, "alice").unwrap();
    clock.advance_secs(45);
    let stopped = manager.stop_recording(&created.call_id, "alice").unwrap();
    assert!(
        (stopped.recording_info.unwrap().duration_seconds.unwrap() - 45.0).abs() < 1e-9
    );

    clock.advance_secs(15);
    let summary = manager.end_call(&created.call_id, "alice").unwrap();
    assert!((summary.duration_seconds - 60.0).abs() < 1e-9);

    let info = manager.get_call_info(&created.call_id).unwrap();
    assert_eq!(info.status, CallStatus::Disconnected);
    assert!(info.participants.iter().all(|p| manager
        .get_user_active_calls(&p.user_id)
        .is_empty()));
}

#[test]
fn test_invite_beyond_capacity_fails() {
    let (manager, _) = call_manager();

    let created = manager.create_call("host1", "Host", None, true);
    let invited = manager
        .invite_to_call(&created.call_id, "host1", "guest1")
        .unwrap();
    manager
        .accept_invitation(&invited.invitation_id, "guest1", "Guest")
        .unwrap();

    let err = manager
        .invite_to_call(&created.call_id, "host1", "guest2")
        .unwrap_err();
    assert!(matches!(err, CallError::CallFull(_)));
}

#[test]
fn test_expired_invitation_cannot_be_accepted() {
    let (manager, clock) = call_manager();

    let created = manager.create_call("host1", "Host", None, true);
    let invited = manager
        .invite_to_call(&created.call_id, "host1", "guest1")
        .unwrap();

    clock.advance_secs(120);

    let err = manager
        .accept_invitation(&invited.invitation_id, "guest1", "Guest")
        .unwrap_err();
    assert!(matches!(err, CallError::InvitationExpired(_)));

    // The cleanup sweep has nothing left to do for this invitation
    assert_eq!(manager.cleanup_expired_invitations(), 0);
}

#[test]
fn test_host_leaving_terminates_call() {
    let (manager, _) = call_manager();

    let created = manager.create_call("host1", "Host", None, true);
    let invited = manager
        .invite_to_call(&created.call_id, "host1", "guest1")
        .unwrap();
    manager
        .accept_invitation(&invited.invitation_id, "guest1", "Guest")
        .unwrap();

    let outcome = manager.leave_call(&created.call_id, "host1").unwrap();
    assert!(matches!(outcome, LeaveOutcome::Ended(_)));

    let info = manager.get_call_info(&created.call_id).unwrap();
    assert_eq!(info.status, CallStatus::Disconnected);
    assert_eq!(info.current_participants, 0);
}

#[test]
fn test_moderation_scenario_long_message() {
    let (manager, _) = call_manager();

    let created = manager.create_call("host1", "Host", None, true);
    let text: String = "a".repeat(501);
    let outcome = manager.moderate_content(
        &created.call_id,
        "host1",
        "chat_message",
        &serde_json::json!({ "text": text }),
    );

    assert_eq!(outcome.action, ModerationAction::Warn);
    assert_eq!(outcome.reason, "message_too_long");

    let info = manager.get_call_info(&created.call_id).unwrap();
    assert_eq!(info.security_flags.len(), 1);
}

#[test]
fn test_statistics_track_lifecycle() {
    let (manager, clock) = call_manager();

    let created = manager.create_call("host1", "Host", None, true);
    let invited = manager
        .invite_to_call(&created.call_id, "host1", "guest1")
        .unwrap();
    manager
        .accept_invitation(&invited.invitation_id, "guest1", "Guest")
        .unwrap();
    clock.advance_secs(30);
    manager.end_call(&created.call_id, "host1").unwrap();

    let stats = manager.get_system_statistics();
    assert_eq!(stats.total_calls_created, 1);
    assert_eq!(stats.successful_connections, 1);
    assert!((stats.connection_success_rate - 100.0).abs() < 1e-9);
    assert!((stats.average_call_duration_seconds - 30.0).abs() < 1e-9);
    assert_eq!(stats.active_invitations, 0);
}

/// `IdSource` that always returns the same room code first, to exercise the
/// collision-regeneration loop.
struct CollidingIds {
    calls: Mutex<u32>,
}

impl IdSource for CollidingIds {
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
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        // The first two draws repeat the same code, forcing the second
        // call's creation through the regeneration loop.
        if *calls <= 2 {
            "SAMECODE".to_string()
        } else {
            format!("CODE{:04}", *calls)
        }
    }
}

#[test]
fn test_room_code_collision_regenerates() {
    let manager = CallSessionManager::new(
        Arc::new(ManualClock::new()),
        Arc::new(CollidingIds { calls: Mutex::new(0) }),
        CallSettings::default(),
        None,
    );

    let first = manager.create_call("a", "A", None, true);
    let second = manager.create_call("b", "B", None, true);

    assert_eq!(first.room_code, "SAMECODE");
    assert_ne!(second.room_code, "SAMECODE");
}
