//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::BytesMut;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::extract::{extract, UploadedDocument};
use crate::analysis::invoke::invoke;
use crate::analysis::normalize::normalize;
use crate::analysis::report::render_markdown;
use crate::analysis::schema::TenderAnalysis;
use crate::errors::AppError;
use crate::models::usage::UsageRecord;
use crate::models::user::AuthUser;
use crate::quota::{Admission, QuotaUsage};
use crate::state::AppState;

/// Multipart field carrying the tender document.
pub const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Json,
    Markdown,
}

impl AnalyzeParams {
    fn report_format(&self) -> Result<ReportFormat, AppError> {
        match self.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("json") => Ok(ReportFormat::Json),
            Some("markdown") | Some("md") => Ok(ReportFormat::Markdown),
            Some(other) => Err(AppError::BadUpload(format!(
                "Unsupported report format '{other}'. Use 'json' or 'markdown'."
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub file_name: String,
    pub file_size: usize,
    /// Characters sent to the model; absent when the document went as a binary attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
    pub analysis: TenderAnalysis,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub success: bool,
    #[serde(flatten)]
    pub usage: QuotaUsage,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze
///
/// Full pipeline: auth → quota → upload checks → extract → model → normalize →
/// usage record. Every failure is terminal and carries no partial analysis.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    params: Result<Query<AnalyzeParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadUpload(e.body_text()))?;
    let format = params.report_format()?;

    match state.quota.check_and_admit(user.id).await? {
        Admission::Deny { reason } => return Err(AppError::QuotaExceeded(reason)),
        Admission::Admit { used } => debug!(
            "User {} admitted ({used}/{} this month)",
            user.id,
            state.quota.monthly_limit()
        ),
    }

    let multipart = multipart.map_err(|e| AppError::BadUpload(e.body_text()))?;
    let document = read_upload(multipart, state.settings.max_upload_bytes).await?;
    let file_name = document.file_name.clone();
    let file_size = document.size();

    let pdf_strategy = state.settings.pdf_strategy;
    let extraction = tokio::task::spawn_blocking(move || extract(&document, pdf_strategy))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    let text_length = extraction.text_len();

    let raw = invoke(state.model.as_ref(), &extraction).await?;
    let analysis = normalize(&raw)?;

    let record = UsageRecord {
        user_id: user.id,
        file_name: file_name.clone(),
        project_name: analysis.project_name().map(str::to_string),
        bid_score: i32::try_from(analysis.bid_score.score).ok(),
        created_at: Utc::now(),
    };
    // Best-effort: the analysis is delivered even if accounting fails.
    if let Err(e) = state.quota.record(&record).await {
        warn!("Failed to record usage for user {}: {e:#}", user.id);
    }

    info!(
        "Analysis completed for user {}: file={file_name} size={file_size} score={} recommendation={}",
        user.id,
        analysis.bid_score.score,
        analysis.bid_score.recommendation.as_str()
    );

    Ok(match format {
        ReportFormat::Json => Json(AnalyzeResponse {
            success: true,
            file_name,
            file_size,
            text_length,
            analysis,
        })
        .into_response(),
        ReportFormat::Markdown => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render_markdown(&file_name, &analysis),
        )
            .into_response(),
    })
}

/// GET /api/usage
///
/// Returns the caller's analysis count for the current month.
pub async fn handle_usage(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UsageResponse>, AppError> {
    let usage = state.quota.usage(user.id).await?;
    Ok(Json(UsageResponse {
        success: true,
        usage,
    }))
}

/// Reads the `file` field, rejecting it as soon as it grows past `max_bytes`.
async fn read_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<UploadedDocument, AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadUpload(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadUpload("No file uploaded".to_string()))?;

        let mut content = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadUpload(e.body_text()))?
        {
            if content.len() + chunk.len() > max_bytes {
                return Err(AppError::BadUpload(format!(
                    "File too large. Maximum size is {}.",
                    describe_size(max_bytes)
                )));
            }
            content.extend_from_slice(&chunk);
        }

        return Ok(UploadedDocument::new(file_name, content.freeze()));
    }

    Err(AppError::BadUpload("No file uploaded".to_string()))
}

fn describe_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
