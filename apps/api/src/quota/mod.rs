//! Quota Gate: monthly admission control per user.
//!
//! The check and the later usage write are separate steps, so two concurrent
//! requests near the limit can both be admitted. This is an accepted
//! best-effort limit; the record is written only after the model call succeeds.

pub mod store;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::models::usage::UsageRecord;
use crate::quota::store::UsageStore;

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit { used: i64 },
    Deny { reason: String },
}

/// Current-period usage for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaUsage {
    pub used: i64,
    pub limit: i64,
    pub remaining: i64,
    pub period_start: DateTime<Utc>,
}

#[derive(Clone)]
pub struct QuotaGate {
    store: Arc<dyn UsageStore>,
    monthly_limit: i64,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn UsageStore>, monthly_limit: i64) -> Self {
        Self {
            store,
            monthly_limit,
        }
    }

    pub fn monthly_limit(&self) -> i64 {
        self.monthly_limit
    }

    /// Counts this calendar month's analyses for `user_id` (server-local month).
    pub async fn usage(&self, user_id: Uuid) -> Result<QuotaUsage> {
        let period_start = start_of_month(Local::now());
        let used = self.store.count_since(user_id, period_start).await?;
        Ok(QuotaUsage {
            used,
            limit: self.monthly_limit,
            remaining: (self.monthly_limit - used).max(0),
            period_start,
        })
    }

    /// Admits the caller unless the monthly allowance is used up.
    pub async fn check_and_admit(&self, user_id: Uuid) -> Result<Admission> {
        let usage = self.usage(user_id).await?;
        if usage.used >= self.monthly_limit {
            warn!(
                "Quota exhausted for user {user_id}: {}/{}",
                usage.used, self.monthly_limit
            );
            return Ok(Admission::Deny {
                reason: format!(
                    "Monthly analysis limit reached ({} per month). Please try again next month.",
                    self.monthly_limit
                ),
            });
        }
        Ok(Admission::Admit { used: usage.used })
    }

    /// Appends the usage record for a completed analysis.
    pub async fn record(&self, record: &UsageRecord) -> Result<()> {
        self.store.insert(record).await
    }
}

/// Midnight on the first day of `now`'s month, in `now`'s timezone.
pub fn start_of_month<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let first_day = now
        .date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0));

    let Some(naive) = first_day else {
        return now.with_timezone(&Utc);
    };

    // A DST gap at midnight leaves no local instant; fall back to UTC midnight.
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}
