// Access Gate: subscription / free-trial authorization backed by the users collection.
// Nothing here depends on the generation module.

pub mod gate;
pub mod identity;
pub mod store;
pub mod timestamp;

pub use gate::{AccessDecision, AccessError, AccessGate, GrantReason, DEFAULT_SUBSCRIPTION_DAYS};
pub use identity::UserEmail;
pub use store::{InMemoryUserStore, MongoUserStore, StoreError, UserStore};
