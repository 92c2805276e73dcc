use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One successful analysis, appended to `usage_records`.
/// Only ever counted; the content is not read back.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub user_id: Uuid,
    pub file_name: String,
    pub project_name: Option<String>,
    pub bid_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}
