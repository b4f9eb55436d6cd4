use crate::access::AccessGate;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup from [`crate::config::Config`]; tests assemble it
/// from an in-memory store and a mock upstream.
#[derive(Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub llm: LlmClient,
}
