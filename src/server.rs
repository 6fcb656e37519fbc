//! HTTP service
//!
//! Thin JSON routes over a shared [`SessionController`]. All session access goes
//! through one async mutex, so start and tick requests are applied one at a time.

use crate::error::EngineError;
use crate::puzzle::{PuzzleBank, PuzzlePrompt};
use crate::session::SessionController;
use crate::types::{SessionSummary, StartAck, TickReport};
use crate::COGNILOCK_VERSION;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    controller: Arc<Mutex<SessionController>>,
    puzzles: PuzzleBank,
}

impl AppState {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            puzzles: PuzzleBank::default(),
        }
    }

    pub async fn start(&self, mode: Option<&str>) -> StartAck {
        self.controller.lock().await.start(mode)
    }

    pub async fn tick(&self) -> Result<TickReport, EngineError> {
        self.controller.lock().await.tick()
    }

    pub async fn sessions(&self) -> Vec<SessionSummary> {
        self.controller.lock().await.sessions()
    }

    pub async fn health(&self) -> HealthReport {
        let controller = self.controller.lock().await;
        HealthReport {
            status: "ok".to_string(),
            version: COGNILOCK_VERSION.to_string(),
            session_id: controller.state().session_id,
            ticks: controller.state().ticks,
        }
    }

    pub fn puzzle(&self) -> Option<PuzzlePrompt> {
        let mut rng = rand::thread_rng();
        self.puzzles.pick(&mut rng).map(PuzzlePrompt::from)
    }

    pub fn validate_puzzle(&self, answer: Option<&str>) -> PuzzleVerdict {
        PuzzleVerdict {
            success: answer.is_some_and(|a| self.puzzles.validate(a)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleAnswer {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleVerdict {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub session_id: Uuid,
    pub ticks: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Engine error rendered as a JSON response
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!(code = self.0.code(), error = %self.0, "request failed");

        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.0.code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the service routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/start", post(start_session))
        .route("/tick", post(tick))
        .route("/sessions", get(sessions))
        .route("/puzzle", get(puzzle))
        .route("/validate_puzzle", post(validate_puzzle))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until the listener fails
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "cognilock listening");
    axum::serve(listener, router(state)).await
}

async fn start_session(
    State(app): State<AppState>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Json<StartAck> {
    let request = body.map(|Json(r)| r).unwrap_or_else(|rejection| {
        warn!(error = %rejection, "unreadable start body, using defaults");
        StartRequest::default()
    });
    Json(app.start(request.mode.as_deref()).await)
}

async fn tick(State(app): State<AppState>) -> Result<Json<TickReport>, ApiError> {
    Ok(Json(app.tick().await?))
}

async fn sessions(State(app): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(app.sessions().await)
}

async fn puzzle(State(app): State<AppState>) -> Result<Json<PuzzlePrompt>, StatusCode> {
    app.puzzle().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn validate_puzzle(
    State(app): State<AppState>,
    body: Result<Json<PuzzleAnswer>, JsonRejection>,
) -> Json<PuzzleVerdict> {
    let answer = match body {
        Ok(Json(payload)) => Some(payload.answer),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable puzzle answer");
            None
        }
    };
    Json(app.validate_puzzle(answer.as_deref()))
}

async fn health(State(app): State<AppState>) -> Json<HealthReport> {
    Json(app.health().await)
}
