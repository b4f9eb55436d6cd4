use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use vpechatli_api::access::AccessGate;
use vpechatli_api::db::create_user_store;
use vpechatli_api::generation::generator::MODEL;
use vpechatli_api::llm_client::LlmClient;
use vpechatli_api::routes::{build_router, cors_layer};
use vpechatli_api::{logging, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    logging::init(&config.rust_log);

    info!("Starting vpechatli API v{}", env!("CARGO_PKG_VERSION"));

    let store = create_user_store(&config.database).await?;
    let gate = AccessGate::new(store);

    let llm = LlmClient::new(config.openai_api_key.clone(), &config.openai_base_url);
    info!("LLM client initialized (model: {MODEL})");

    let state = AppState { gate, llm };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origin)?);
    info!("CORS restricted to {}", config.cors_origin);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
