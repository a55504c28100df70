use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use cigars_skill::alexa::{self, RequestEnvelope, ResponseEnvelope};
use cigars_skill::config::Config;
use cigars_skill::SkillService;

#[derive(Clone)]
struct AppState {
    service: Arc<SkillService>,
    config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing to stderr so stdout stays clean
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Arc::new(Config::load());

    let service = Arc::new(SkillService::new(Arc::clone(&config))?);

    let bind: SocketAddr = config
        .http
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.http.bind_address))?;

    let state = AppState {
        service,
        config: Arc::clone(&config),
    };
    let router = Router::new()
        .route(config.http.route_path(), post(handle_skill_request))
        .route("/health", get(|| async { "ok" }))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, path = %config.http.route_path(), "Starting Cigars skill server");

    axum::serve(listener, router).await?;
    Ok(())
}

async fn handle_skill_request(
    State(state): State<AppState>,
    Json(envelope): Json<RequestEnvelope>,
) -> Response {
    if !alexa::verify_application_id(&envelope, &state.config.skill.application_id) {
        return (StatusCode::BAD_REQUEST, "Unknown application").into_response();
    }

    let request = match alexa::to_intent_request(&envelope) {
        Ok(Some(request)) => request,
        // Session-ended and unrecognized request types get an empty envelope
        Ok(None) => return Json(ResponseEnvelope::empty()).into_response(),
        Err(e) => {
            tracing::error!("Undispatchable request: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let outcome = state.service.dispatch(&request).await;
    match alexa::envelope_for_turn(outcome, state.config.skill.speak_errors) {
        Some(envelope) => Json(envelope).into_response(),
        // Default policy on failure: end the turn with no speech
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
