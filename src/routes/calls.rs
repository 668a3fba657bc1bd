use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::call::CallError;
use crate::models::{
    AckResponse, CallActionRequest, CleanupResponse, CreateCallRequest, ErrorResponse,
    AcceptInvitationRequest, InviteRequest, ModerationRequest, ParticipantStatusRequest,
    QualityUpdateRequest, RejectInvitationRequest,
};
use crate::routes::recommendations::AppState;

/// Configure call lifecycle routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/calls/create", web::post().to(create_call))
        .route("/calls/statistics", web::get().to(system_statistics))
        .route("/calls/user/{user_id}", web::get().to(user_active_calls))
        .route("/calls/{call_id}", web::get().to(call_info))
        .route("/calls/{call_id}/invite", web::post().to(invite_to_call))
        .route("/calls/{call_id}/participant-status", web::post().to(participant_status))
        .route("/calls/{call_id}/recording/start", web::post().to(start_recording))
        .route("/calls/{call_id}/recording/stop", web::post().to(stop_recording))
        .route("/calls/{call_id}/end", web::post().to(end_call))
        .route("/calls/{call_id}/leave", web::post().to(leave_call))
        .route("/calls/{call_id}/quality", web::post().to(update_quality))
        .route("/calls/{call_id}/moderate", web::post().to(moderate_content))
        .route("/invitations/cleanup", web::post().to(cleanup_invitations))
        .route("/invitations/{invitation_id}/accept", web::post().to(accept_invitation))
        .route("/invitations/{invitation_id}/reject", web::post().to(reject_invitation));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

async fn create_call(
    state: web::Data<AppState>,
    req: web::Json<CreateCallRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let created = state.calls.create_call(
        &req.host_id,
        &req.display_name,
        req.max_participants,
        req.is_private,
    );

    HttpResponse::Ok().json(created)
}

async fn invite_to_call(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<InviteRequest>,
) -> Result<HttpResponse, CallError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_error(errors));
    }

    let invitation = state
        .calls
        .invite_to_call(&path.into_inner(), &req.caller_id, &req.callee_id)?;

    Ok(HttpResponse::Ok().json(invitation))
}

async fn accept_invitation(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AcceptInvitationRequest>,
) -> Result<HttpResponse, CallError> {
    if let Err(errors) = req.validate() {
        return Ok(validation_error(errors));
    }

    let joined = state
        .calls
        .accept_invitation(&path.into_inner(), &req.user_id, &req.display_name)?;

    Ok(HttpResponse::Ok().json(joined))
}

async fn reject_invitation(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RejectInvitationRequest>,
) -> impl Responder {
    let success = state.calls.reject_invitation(&path.into_inner(), &req.user_id);
    HttpResponse::Ok().json(AckResponse { success })
}

async fn participant_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ParticipantStatusRequest>,
) -> impl Responder {
    let success = state.calls.update_participant_status(
        &path.into_inner(),
        &req.user_id,
        req.audio_enabled,
        req.video_enabled,
    );
    HttpResponse::Ok().json(AckResponse { success })
}

async fn start_recording(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CallActionRequest>,
) -> Result<HttpResponse, CallError> {
    let started = state.calls.start_recording(&path.into_inner(), &req.user_id)?;
    Ok(HttpResponse::Ok().json(started))
}

async fn stop_recording(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CallActionRequest>,
) -> Result<HttpResponse, CallError> {
    let stopped = state.calls.stop_recording(&path.into_inner(), &req.user_id)?;
    Ok(HttpResponse::Ok().json(stopped))
}

async fn end_call(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CallActionRequest>,
) -> Result<HttpResponse, CallError> {
    let summary = state.calls.end_call(&path.into_inner(), &req.user_id)?;
    Ok(HttpResponse::Ok().json(summary))
}

async fn leave_call(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CallActionRequest>,
) -> Result<HttpResponse, CallError> {
    let outcome = state.calls.leave_call(&path.into_inner(), &req.user_id)?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn update_quality(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<QualityUpdateRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let success = state
        .calls
        .update_quality(&path.into_inner(), &req.user_id, req.report);
    HttpResponse::Ok().json(AckResponse { success })
}

async fn moderate_content(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ModerationRequest>,
) -> impl Responder {
    let outcome = state.calls.moderate_content(
        &path.into_inner(),
        &req.user_id,
        &req.content_type,
        &req.content_data,
    );
    HttpResponse::Ok().json(outcome)
}

async fn cleanup_invitations(state: web::Data<AppState>) -> impl Responder {
    let expired = state.calls.cleanup_expired_invitations();
    HttpResponse::Ok().json(CleanupResponse { expired })
}

async fn call_info(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.calls.get_call_info(&path.into_inner()) {
        Some(snapshot) => HttpResponse::Ok().json(snapshot),
        None => HttpResponse::Ok().json(serde_json::json!({})),
    }
}

async fn user_active_calls(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let calls = state.calls.get_user_active_calls(&path.into_inner());
    HttpResponse::Ok().json(calls)
}

async fn system_statistics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.calls.get_system_statistics())
}
