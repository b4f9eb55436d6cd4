use std::sync::Arc;

use anyhow::Result;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Database, IndexModel};
use tracing::{debug, info};

use crate::access::{InMemoryUserStore, MongoUserStore, UserStore};
use crate::config::DatabaseConfig;
use crate::models::user::USERS_COLLECTION;

/// Connects to MongoDB and verifies the connection with a round trip.
pub async fn connect(uri: &str, database_name: &str) -> Result<Database> {
    info!("Connecting to MongoDB...");

    let client = Client::with_uri_str(uri).await?;
    let database = client.database(database_name);
    database.list_collection_names().await?;

    info!("Connected to MongoDB database: {database_name}");
    Ok(database)
}

/// Lookups go by `email`. The index is deliberately not unique: existing
/// data may already hold duplicates and the gate reads the first match.
pub async fn ensure_indexes(database: &Database) -> Result<()> {
    let users = database.collection::<Document>(USERS_COLLECTION);
    let index = IndexModel::builder().keys(doc! { "email": 1 }).build();

    match users.create_index(index).await {
        Ok(_) => info!("Index ensured: {USERS_COLLECTION}(email)"),
        Err(e) => debug!("Index on {USERS_COLLECTION}(email) not created: {e}"),
    }
    Ok(())
}

/// Builds the configured user store.
pub async fn create_user_store(config: &DatabaseConfig) -> Result<Arc<dyn UserStore>> {
    if config.in_memory {
        info!("Using in-memory user store; records are lost on exit");
        return Ok(Arc::new(InMemoryUserStore::new()));
    }

    let database = connect(&config.mongodb_uri, &config.mongodb_database).await?;
    ensure_indexes(&database).await?;
    Ok(Arc::new(MongoUserStore::new(&database)))
}
