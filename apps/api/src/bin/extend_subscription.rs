//! Out-of-band subscription management. Not reachable over HTTP.

use anyhow::Result;
use clap::Parser;

use vpechatli_api::access::{AccessGate, DEFAULT_SUBSCRIPTION_DAYS};
use vpechatli_api::config::DatabaseConfig;
use vpechatli_api::db::create_user_store;
use vpechatli_api::logging;

/// Extend (or start) a user's subscription by a number of days
#[derive(Parser)]
#[command(name = "extend-subscription", version, about, long_about = None)]
struct Cli {
    /// Email of the user record to update; created if missing
    #[arg(long)]
    email: String,

    /// Days to add to an active subscription, or to now otherwise
    #[arg(long, default_value_t = DEFAULT_SUBSCRIPTION_DAYS, value_parser = clap::value_parser!(i64).range(1..))]
    days: i64,

    /// Log level for this run
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = DatabaseConfig::from_env()?;
    if config.in_memory {
        anyhow::bail!("USER_STORE=memory has nothing to extend; point MONGODB_URI at the real store");
    }

    let gate = AccessGate::new(create_user_store(&config).await?);
    let new_end = gate.extend_subscription(&cli.email, cli.days).await?;

    println!("{}: subscription now ends {}", cli.email, new_end.to_rfc3339());
    Ok(())
}
