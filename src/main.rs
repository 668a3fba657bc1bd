mod call;
mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::call::{CallSessionManager, CallSettings, SystemClock, UuidIdSource};
use crate::config::Settings;
use crate::core::{RankerOptions, RecommendationEngine};
use crate::models::{IceServer, ScoringWeights};
use crate::routes::AppState;
use crate::services::{DirectoryCollections, HttpProfileStore};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Corazon Algo service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the profile directory client
    let collections = DirectoryCollections {
        user_profiles: settings.collection.user_profiles,
        likes: settings.collection.likes,
        messages: settings.collection.messages,
    };

    let store = Arc::new(HttpProfileStore::new(
        settings.directory.endpoint,
        settings.directory.api_key,
        settings.directory.project_id,
        settings.directory.database_id,
        collections,
    ));

    info!("Profile directory client initialized");

    // Initialize the recommendation engine with configured weights
    let weights = ScoringWeights {
        collaborative: settings.scoring.weights.collaborative,
        content: settings.scoring.weights.content,
        geographic: settings.scoring.weights.geographic,
        behavioral: settings.scoring.weights.behavioral,
    };

    let ranker_options = RankerOptions {
        max_distance_km: settings.matching.max_distance_km,
        min_compatibility_score: settings.matching.min_compatibility_score,
        max_limit: settings.matching.max_limit as usize,
    };

    let engine = Arc::new(RecommendationEngine::new(store, weights, ranker_options));

    info!("Recommendation engine initialized with weights: {:?}", weights);

    // Initialize the call session manager
    let call_settings = CallSettings {
        invitation_timeout_secs: settings.calls.invitation_timeout_secs,
        max_participants: settings.calls.max_participants,
        max_call_duration_minutes: settings.calls.max_call_duration_minutes,
    };

    let ice_servers = if settings.calls.stun_servers.is_empty() {
        None
    } else {
        Some(
            settings
                .calls
                .stun_servers
                .iter()
                .map(|url| IceServer {
                    urls: vec![url.clone()],
                    username: String::new(),
                    credential: String::new(),
                })
                .collect(),
        )
    };

    let calls = Arc::new(CallSessionManager::new(
        Arc::new(SystemClock),
        Arc::new(UuidIdSource),
        call_settings,
        ice_servers,
    ));

    info!("Call session manager initialized (invitation timeout: {}s)", call_settings.invitation_timeout_secs);

    // Build application state
    let app_state = AppState { engine, calls };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
