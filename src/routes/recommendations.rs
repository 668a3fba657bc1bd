use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::call::CallSessionManager;
use crate::core::RecommendationEngine;
use crate::models::{ErrorResponse, FindRecommendationsRequest, FindRecommendationsResponse, HealthResponse};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub calls: Arc<CallSessionManager>,
}

/// Configure recommendation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/recommendations/find", web::post().to(find_recommendations));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find recommendations endpoint
///
/// POST /api/v1/recommendations/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 10,
///   "filters": {"minAge": 25, "maxAge": 35, "verificationLevel": "identity"}
/// }
/// ```
///
/// This is a best-effort read path: internal failures surface as an empty
/// list, never as a server error.
async fn find_recommendations(
    state: web::Data<AppState>,
    req: web::Json<FindRecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_recommendations request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!(
        "Finding recommendations for user: {}, limit: {}",
        req.user_id,
        req.limit
    );

    let recommendations = state
        .engine
        .recommendations_for(&req.user_id, req.limit as usize, &req.filters)
        .await;

    let response = FindRecommendationsResponse {
        total_results: recommendations.len(),
        recommendations,
    };

    HttpResponse::Ok().json(response)
}
