pub mod access;
pub mod config;
pub mod db;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod logging;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use state::AppState;
