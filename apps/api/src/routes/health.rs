use axum::Json;
use serde::Serialize;

use crate::generation::generator::MODEL;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Model every generation is sent to.
    pub model: &'static str,
}

/// GET /health
/// Liveness only: the store and the upstream model are not contacted.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        model: MODEL,
    })
}
