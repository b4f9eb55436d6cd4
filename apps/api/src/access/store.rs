//! Persistence seam for user records.
//!
//! The gate only needs four operations, so they sit behind [`UserStore`]:
//! MongoDB in production, a process-local vector for tests and local runs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};
use thiserror::Error;

use crate::access::timestamp::to_bson;
use crate::models::user::{UserRecord, USERS_COLLECTION};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("user record has no _id")]
    MissingId,

    #[error("user record {0} no longer exists")]
    NotFound(ObjectId),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// First record whose `email` equals `email`, in insertion order.
    /// Duplicates are not prevented; later ones are never returned.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn insert(&self, record: UserRecord) -> Result<ObjectId, StoreError>;

    /// Sets `freeUsed = true` only if it is not already true.
    /// Returns `true` when this call performed the transition.
    async fn claim_free_use(&self, id: ObjectId) -> Result<bool, StoreError>;

    async fn set_subscription_end(
        &self,
        id: ObjectId,
        end: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MongoDB
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<UserRecord>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = self
            .users
            .find_one(doc! { "email": email })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(record)
    }

    async fn insert(&self, record: UserRecord) -> Result<ObjectId, StoreError> {
        let result = self.users.insert_one(&record).await?;
        result.inserted_id.as_object_id().ok_or(StoreError::MissingId)
    }

    async fn claim_free_use(&self, id: ObjectId) -> Result<bool, StoreError> {
        // `$ne: true` also matches documents where the field was never written.
        let result = self
            .users
            .update_one(
                doc! { "_id": id, "freeUsed": { "$ne": true } },
                doc! { "$set": { "freeUsed": true } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn set_subscription_end(
        &self,
        id: ObjectId,
        end: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = self
            .users
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "subscription_end": to_bson(end) } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

/// Vector-backed store. Keeps insertion order so first-match lookups behave
/// like the MongoDB implementation.
#[derive(Default)]
pub struct InMemoryUserStore {
    records: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, assigning ids to records that lack one.
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.id.get_or_insert_with(ObjectId::new);
                record
            })
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of every stored record, in insertion order.
    pub fn records(&self) -> Vec<UserRecord> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UserRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.lock().iter().find(|r| r.email == email).cloned())
    }

    async fn insert(&self, mut record: UserRecord) -> Result<ObjectId, StoreError> {
        let id = *record.id.get_or_insert_with(ObjectId::new);
        self.lock().push(record);
        Ok(id)
    }

    async fn claim_free_use(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut records = self.lock();
        match records.iter_mut().find(|r| r.id == Some(id)) {
            Some(record) if !record.free_used => {
                record.free_used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_subscription_end(
        &self,
        id: ObjectId,
        end: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        record.subscription_end = Some(to_bson(end));
        Ok(())
    }
}
