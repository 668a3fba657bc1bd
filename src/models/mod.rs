// Model exports
pub mod call;
pub mod domain;
pub mod requests;
pub mod responses;

pub use call::{
    CallCreated, CallEndSummary, CallInvitation, CallJoined, CallParticipant, CallSnapshot,
    CallStatus, CallerInfo, ConnectionQuality, IceServer, InvitationCreated, InvitationStatus,
    LeaveOutcome, ModerationAction, ModerationOutcome, ParticipantInfo, ParticipantLeft,
    QualityReport, RecordingInfo, RecordingStarted, RecordingStatus, RecordingStopped,
    RtcConfiguration, SecurityFlag, SystemStatistics, UserCallSummary, VideoCall,
};
pub use domain::{
    BoundingBox, CandidateFilters, GeoPoint, InteractionRecord, InteractionType, Recommendation,
    ScoringWeights, UserProfile,
};
pub use requests::{
    AcceptInvitationRequest, CallActionRequest, CreateCallRequest, FindRecommendationsRequest,
    InviteRequest, ModerationRequest, ParticipantStatusRequest, QualityUpdateRequest,
    RejectInvitationRequest,
};
pub use responses::{
    AckResponse, CleanupResponse, ErrorResponse, FindRecommendationsResponse, HealthResponse,
};
