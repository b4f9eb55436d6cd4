use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CORS_ORIGIN: &str = "https://vpechatli.tech";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub cors_origin: String,
    pub port: u16,
    pub rust_log: String,
}

/// Where user records live. Loadable on its own so the admin binary
/// does not need LLM credentials.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    /// `USER_STORE=memory` swaps MongoDB for a process-local store.
    pub in_memory: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database: DatabaseConfig::from_env()?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            cors_origin: env_or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let in_memory = match std::env::var("USER_STORE") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "memory" => true,
                "mongodb" | "" => false,
                other => anyhow::bail!("USER_STORE must be 'mongodb' or 'memory', got '{other}'"),
            },
            Err(_) => false,
        };

        Ok(DatabaseConfig {
            mongodb_uri: env_or("MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_database: env_or("MONGODB_DATABASE", "vpechatli"),
            in_memory,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
