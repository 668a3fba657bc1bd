use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Typed failures of call lifecycle commands.
///
/// Command paths surface these to the caller as distinguishable errors;
/// only reject/status/quality updates use boolean-false semantics instead.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("Call '{0}' was not found")]
    CallNotFound(String),

    #[error("Invitation '{0}' was not found")]
    InvitationNotFound(String),

    #[error("User '{user_id}' is not a participant of call '{call_id}'")]
    NotAParticipant { call_id: String, user_id: String },

    #[error("Not permitted to {action}")]
    PermissionDenied { action: &'static str },

    #[error("Call '{0}' is full")]
    CallFull(String),

    #[error("Call '{0}' has already ended")]
    CallEnded(String),

    #[error("Invitation '{0}' has expired")]
    InvitationExpired(String),

    #[error("Invitation '{0}' is no longer pending")]
    InvitationNotPending(String),

    #[error("A pending invitation for this user already exists")]
    DuplicateInvitation,

    #[error("Recording is already in progress")]
    AlreadyRecording,

    #[error("No recording is in progress")]
    NotRecording,
}

impl CallError {
    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            CallError::CallNotFound(_) => "call_not_found",
            CallError::InvitationNotFound(_) => "invitation_not_found",
            CallError::NotAParticipant { .. } => "not_a_participant",
            CallError::PermissionDenied { .. } => "permission_denied",
            CallError::CallFull(_) => "call_full",
            CallError::CallEnded(_) => "call_ended",
            CallError::InvitationExpired(_) => "invitation_expired",
            CallError::InvitationNotPending(_) => "invitation_not_pending",
            CallError::DuplicateInvitation => "duplicate_invitation",
            CallError::AlreadyRecording => "already_recording",
            CallError::NotRecording => "not_recording",
        }
    }
}

impl actix_web::error::ResponseError for CallError {
    fn status_code(&self) -> StatusCode {
        match self {
            CallError::CallNotFound(_)
            | CallError::InvitationNotFound(_)
            | CallError::NotAParticipant { .. } => StatusCode::NOT_FOUND,
            CallError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            CallError::CallFull(_)
            | CallError::CallEnded(_)
            | CallError::InvitationNotPending(_)
            | CallError::DuplicateInvitation
            | CallError::AlreadyRecording
            | CallError::NotRecording => StatusCode::CONFLICT,
            CallError::InvitationExpired(_) => StatusCode::GONE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        tracing::warn!(code = self.code(), status = status.as_u16(), "{}", self);

        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
