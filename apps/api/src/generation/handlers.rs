//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use crate::access::{AccessDecision, AccessGate, UserEmail};
use crate::errors::AppError;
use crate::generation::generator::{adapt_cv, generate_letter, GenerationRequest};
use crate::llm_client::LlmError;
use crate::state::AppState;

const ACCESS_DENIED_MESSAGE: &str = "Free access already used or subscription expired";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// Upstream failures are reported in the body with a 200 status; only
/// identity and access problems become error statuses.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AdaptCvResponse {
    Cv { cv: String },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LetterResponse {
    Letter { letter: String },
    Failed { error: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /adapt-cv
pub async fn handle_adapt_cv(
    State(state): State<AppState>,
    UserEmail(email): UserEmail,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<AdaptCvResponse>, AppError> {
    require_access(&state.gate, &email).await?;

    let response = match adapt_cv(&state.llm, &request.job_text, &request.cv_text).await {
        Ok(cv) => AdaptCvResponse::Cv { cv },
        Err(e) => AdaptCvResponse::Failed {
            error: upstream_failure(&email, e),
        },
    };
    Ok(Json(response))
}

/// POST /generate
pub async fn handle_generate_letter(
    State(state): State<AppState>,
    UserEmail(email): UserEmail,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<LetterResponse>, AppError> {
    require_access(&state.gate, &email).await?;

    let response = match generate_letter(&state.llm, &request.job_text, &request.cv_text).await {
        Ok(letter) => LetterResponse::Letter { letter },
        Err(e) => LetterResponse::Failed {
            error: upstream_failure(&email, e),
        },
    };
    Ok(Json(response))
}

async fn require_access(gate: &AccessGate, email: &str) -> Result<(), AppError> {
    match gate.authorize(email).await? {
        AccessDecision::Granted(_) => Ok(()),
        AccessDecision::Denied => Err(AppError::Forbidden(ACCESS_DENIED_MESSAGE.to_string())),
    }
}

fn upstream_failure(email: &str, err: LlmError) -> String {
    error!(email, "Generation failed: {err}");
    err.to_string()
}
