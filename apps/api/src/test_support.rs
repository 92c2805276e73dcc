//! In-memory fakes and fixtures shared by unit tests.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{AuthError, TokenVerifier};
use crate::config::AnalysisSettings;
use crate::llm_client::{GenerativeModel, LlmError, ModelRequest};
use crate::models::usage::UsageRecord;
use crate::models::user::AuthUser;
use crate::quota::store::UsageStore;
use crate::quota::QuotaGate;
use crate::state::AppState;

pub const TEST_TOKEN: &str = "test-session-token";
pub const TEST_USER_ID: Uuid = Uuid::from_u128(0x5f1e_2c3a_0000_4000_8000_0000_0000_0001);
pub const BOUNDARY: &str = "bidlyze-test-boundary";

/// Accepts exactly `TEST_TOKEN`.
pub struct StaticTokenVerifier;

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok((token == TEST_TOKEN).then(|| AuthUser {
            id: TEST_USER_ID,
            email: Some("analyst@example.com".to_string()),
        }))
    }
}

/// Behaves like an auth provider that cannot be reached.
pub struct UnavailableTokenVerifier;

#[async_trait]
impl TokenVerifier for UnavailableTokenVerifier {
    async fn verify(&self, _token: &str) -> Result<Option<AuthUser>, AuthError> {
        Err(AuthError::Provider(503))
    }
}

/// Returns a canned reply and records every request it receives.
pub struct ScriptedModel {
    reply: std::result::Result<String, (u16, String)>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ModelRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> std::result::Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[derive(Default)]
pub struct InMemoryUsageStore {
    records: Mutex<Vec<UsageRecord>>,
    fail_inserts: bool,
}

impl InMemoryUsageStore {
    pub fn with_records(records: Vec<UsageRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_inserts: false,
        }
    }

    pub fn failing_inserts() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_inserts: true,
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn count_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id && r.created_at >= since)
            .count() as i64)
    }

    async fn insert(&self, record: &UsageRecord) -> Result<()> {
        if self.fail_inserts {
            bail!("usage store unavailable");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn usage_record(user_id: Uuid, created_at: DateTime<Utc>) -> UsageRecord {
    UsageRecord {
        user_id,
        file_name: "earlier.pdf".to_string(),
        project_name: Some("Earlier tender".to_string()),
        bid_score: Some(55),
        created_at,
    }
}

pub fn test_state(
    model: Arc<ScriptedModel>,
    store: Arc<InMemoryUsageStore>,
    settings: AnalysisSettings,
) -> AppState {
    AppState {
        auth: Arc::new(StaticTokenVerifier),
        quota: QuotaGate::new(store, settings.monthly_limit),
        model,
        settings,
    }
}

/// `POST /api/analyze` with one `file` field.
pub fn multipart_request(file_name: &str, content: &[u8], token: Option<&str>) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

/// A plausible tender notice of at least `min_bytes` bytes.
pub fn realistic_tender_text(min_bytes: usize) -> String {
    const HEADER: &str = "INVITATION TO TENDER\n\
        Tender Reference: MWU-2026-014\n\
        Issuing Authority: City of Riverton Department of Public Works\n\
        Project: Municipal Water Treatment Upgrade\n\
        Closing Date: 30 November 2026 at 12:00 noon\n\n";
    const CLAUSES: &[&str] = &[
        "1. Scope of Works. The contractor shall design, supply, install and commission a 20 ML/day filtration train, including civil works, mechanical and electrical installation, and SCADA integration.\n",
        "2. Eligibility. Bidders must hold a valid CIDB grading of 7CE or higher and submit a valid tax clearance certificate.\n",
        "3. Financial Requirements. A bid bond of 2% of the tender price is required. The successful bidder shall furnish a performance guarantee of 10% of the contract value. Minimum annual turnover: ZAR 50 million over the last three years.\n",
        "4. Evaluation. Bids will be evaluated on price (80 points) and specific goals (20 points). Functionality threshold: 70%.\n",
        "5. Contract Period. The works shall be completed within 18 months of site handover. Penalties of 0.1% per day apply for late completion.\n",
        "6. Compulsory Briefing. A compulsory site briefing will be held on 4 November 2026 at the Riverton treatment works.\n",
    ];

    let mut text = HEADER.to_string();
    let mut i = 0;
    while text.len() < min_bytes {
        text.push_str(CLAUSES[i % CLAUSES.len()]);
        i += 1;
    }
    text
}

/// A well-formed model reply matching the analysis contract.
pub fn sample_analysis_json() -> String {
    serde_json::json!({
        "summary": {
            "projectName": "Municipal Water Treatment Upgrade",
            "issuingAuthority": "City of Riverton Department of Public Works",
            "tenderReference": "MWU-2026-014",
            "estimatedValue": 120000000,
            "currency": "ZAR",
            "submissionDeadline": "30 November 2026, 12:00",
            "projectDuration": "18 months",
            "location": "Riverton",
            "sector": "Water & Sanitation",
            "briefDescription": "Design, supply and commissioning of a 20 ML/day filtration train."
        },
        "requirements": [
            {
                "category": "Technical",
                "requirement": "CIDB grading 7CE or higher",
                "mandatory": true,
                "priority": "HIGH"
            }
        ],
        "complianceChecklist": [
            {"item": "Valid tax clearance certificate", "category": "Legal", "critical": true}
        ],
        "riskFlags": [
            {
                "risk": "Late completion penalties of 0.1% per day",
                "severity": "MEDIUM",
                "recommendation": "Build schedule float into the programme"
            }
        ],
        "keyDates": [
            {"event": "Compulsory site briefing", "date": "4 November 2026"},
            {"event": "Tender closing", "date": "30 November 2026"}
        ],
        "evaluationCriteria": [
            {"criterion": "Price", "weight": "80", "details": "Lowest acceptable price scores highest"},
            {"criterion": "Specific goals", "weight": 20, "details": "Preferential procurement points"}
        ],
        "financialRequirements": {
            "bidBond": "2% of tender price",
            "performanceBond": "10% of contract value",
            "minimumTurnover": "ZAR 50 million",
            "otherFinancial": "Not specified"
        },
        "bidScore": {
            "score": 72,
            "recommendation": "BID",
            "reasoning": "Scope matches core capability; turnover threshold is met."
        }
    })
    .to_string()
}

/// A minimal DOCX package whose body holds one paragraph per entry.
/// Entries are inserted verbatim, so they must already be XML-escaped.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    docx_with_body(&body)
}

/// A minimal DOCX package with `body` as the raw contents of `w:body`.
pub fn docx_with_body(body: &str) -> Vec<u8> {
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file("[Content_Types].xml", options)
        .unwrap();
    writer
        .write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>")
        .unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// A single-page PDF drawing `text` in Helvetica, with a correct xref table.
/// `text` must not contain parentheses or backslashes.
pub fn pdf_with_text(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_start = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}
