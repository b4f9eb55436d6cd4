//! Access Gate — decides whether an email may run a generation, and
//! extends subscriptions out-of-band.
//!
//! Rules, in order:
//! 1. unknown email: create the record with the free trial consumed, grant;
//! 2. `subscription_end` strictly in the future: grant, no writes;
//! 3. free trial unused: consume it atomically, grant;
//! 4. otherwise deny.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::access::store::{StoreError, UserStore};
use crate::access::timestamp::{normalize_subscription_end, to_bson, TimestampError};
use crate::models::user::UserRecord;

pub const DEFAULT_SUBSCRIPTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(GrantReason),
    /// Free trial already spent and no active subscription.
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantReason {
    NewUser,
    ActiveSubscription,
    FreeTrial,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("subscription extension of {days} days overflows the calendar")]
    ExpiryOverflow { days: i64 },
}

#[derive(Clone)]
pub struct AccessGate {
    store: Arc<dyn UserStore>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn authorize(&self, email: &str) -> Result<AccessDecision, AccessError> {
        self.authorize_at(email, Utc::now()).await
    }

    pub async fn authorize_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessDecision, AccessError> {
        let Some(record) = self.store.find_by_email(email).await? else {
            self.store.insert(UserRecord::new(email, None)).await?;
            info!(email, "Created user record; free trial consumed");
            return Ok(AccessDecision::Granted(GrantReason::NewUser));
        };

        let subscription_end = normalize_subscription_end(record.subscription_end.as_ref())?;
        if subscription_end.is_some_and(|end| end > now) {
            info!(email, "Access granted by active subscription");
            return Ok(AccessDecision::Granted(GrantReason::ActiveSubscription));
        }

        if !record.free_used {
            let id = record.id.ok_or(StoreError::MissingId)?;
            // A concurrent request may have consumed the trial since the read.
            if self.store.claim_free_use(id).await? {
                info!(email, "Access granted by free trial");
                return Ok(AccessDecision::Granted(GrantReason::FreeTrial));
            }
        }

        warn!(email, "Access denied: free trial used and no active subscription");
        Ok(AccessDecision::Denied)
    }

    /// Pushes the subscription expiry `days` further out and returns the new
    /// expiry. An active subscription is extended from its current end,
    /// anything else from now. `freeUsed` is never touched on existing users.
    pub async fn extend_subscription(
        &self,
        email: &str,
        days: i64,
    ) -> Result<DateTime<Utc>, AccessError> {
        self.extend_subscription_at(email, days, Utc::now()).await
    }

    pub async fn extend_subscription_at(
        &self,
        email: &str,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AccessError> {
        let Some(record) = self.store.find_by_email(email).await? else {
            let new_end = add_days(now, days)?;
            self.store
                .insert(UserRecord::new(email, Some(to_bson(new_end))))
                .await?;
            info!(email, %new_end, "Created user record with subscription");
            return Ok(new_end);
        };

        let current_end = normalize_subscription_end(record.subscription_end.as_ref())?;
        let base = match current_end {
            Some(end) if end > now => end,
            _ => now,
        };
        let new_end = add_days(base, days)?;

        let id = record.id.ok_or(StoreError::MissingId)?;
        self.store.set_subscription_end(id, new_end).await?;
        info!(email, %new_end, "Subscription extended");

        Ok(new_end)
    }
}

fn add_days(from: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>, AccessError> {
    Duration::try_days(days)
        .and_then(|delta| from.checked_add_signed(delta))
        .ok_or(AccessError::ExpiryOverflow { days })
}
