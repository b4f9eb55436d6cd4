use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Deserializer, Serialize};

/// Name of the collection holding one document per user email.
pub const USERS_COLLECTION: &str = "users";

/// A user document as stored in the `users` collection.
///
/// `subscription_end` is kept as raw BSON: older writers stored it as a
/// native datetime, a `{_seconds, _nanoseconds}` document, or an ISO-8601
/// string. See [`crate::access::timestamp::normalize_subscription_end`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(rename = "freeUsed", default, deserialize_with = "null_as_false")]
    pub free_used: bool,
    #[serde(default)]
    pub subscription_end: Option<Bson>,
}

impl UserRecord {
    /// A freshly created record. The request that creates it consumes the
    /// free trial, so `free_used` always starts out `true`.
    pub fn new(email: &str, subscription_end: Option<Bson>) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            free_used: true,
            subscription_end,
        }
    }
}

/// A stored `null` counts as "not used", same as a missing field.
fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
