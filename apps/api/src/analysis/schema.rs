//! Typed shape of a tender analysis as returned by the model.
//!
//! Field names serialize in camelCase; this is the wire format clients consume.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Sentinel the model uses for information absent from the document.
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderAnalysis {
    pub summary: TenderSummary,
    pub requirements: Vec<Requirement>,
    pub compliance_checklist: Vec<ComplianceItem>,
    pub risk_flags: Vec<RiskFlag>,
    pub key_dates: Vec<KeyDate>,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
    pub financial_requirements: FinancialRequirements,
    pub bid_score: BidScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderSummary {
    #[serde(deserialize_with = "free_text")]
    pub project_name: String,
    #[serde(deserialize_with = "free_text")]
    pub issuing_authority: String,
    #[serde(deserialize_with = "free_text")]
    pub tender_reference: String,
    #[serde(deserialize_with = "free_text")]
    pub estimated_value: String,
    #[serde(deserialize_with = "free_text")]
    pub currency: String,
    #[serde(deserialize_with = "free_text")]
    pub submission_deadline: String,
    #[serde(deserialize_with = "free_text")]
    pub project_duration: String,
    #[serde(deserialize_with = "free_text")]
    pub location: String,
    #[serde(deserialize_with = "free_text")]
    pub sector: String,
    #[serde(deserialize_with = "free_text")]
    pub brief_description: String,
}

/// Shared HIGH/MEDIUM/LOW scale for requirement priority and risk severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::High => "HIGH",
            Level::Medium => "MEDIUM",
            Level::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    #[serde(deserialize_with = "free_text")]
    pub category: String,
    #[serde(deserialize_with = "free_text")]
    pub requirement: String,
    pub mandatory: bool,
    pub priority: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceItem {
    #[serde(deserialize_with = "free_text")]
    pub item: String,
    #[serde(deserialize_with = "free_text")]
    pub category: String,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    #[serde(deserialize_with = "free_text")]
    pub risk: String,
    pub severity: Level,
    #[serde(deserialize_with = "free_text")]
    pub recommendation: String,
}

/// `date` stays free text; tenders express dates in too many forms to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDate {
    #[serde(deserialize_with = "free_text")]
    pub event: String,
    #[serde(deserialize_with = "free_text")]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationCriterion {
    #[serde(deserialize_with = "free_text")]
    pub criterion: String,
    #[serde(deserialize_with = "free_text")]
    pub weight: String,
    #[serde(deserialize_with = "free_text")]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRequirements {
    #[serde(deserialize_with = "free_text")]
    pub bid_bond: String,
    #[serde(deserialize_with = "free_text")]
    pub performance_bond: String,
    #[serde(deserialize_with = "free_text")]
    pub minimum_turnover: String,
    #[serde(deserialize_with = "free_text")]
    pub other_financial: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "BID")]
    Bid,
    #[serde(rename = "NO-BID")]
    NoBid,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Bid => "BID",
            Recommendation::NoBid => "NO-BID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidScore {
    /// Integer in `0..=100`; the range is checked by the normalizer.
    pub score: u32,
    pub recommendation: Recommendation,
    #[serde(deserialize_with = "free_text")]
    pub reasoning: String,
}

impl TenderAnalysis {
    /// Project name for bookkeeping, or `None` when the model could not find one.
    pub fn project_name(&self) -> Option<&str> {
        let name = self.summary.project_name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(NOT_SPECIFIED) {
            None
        } else {
            Some(name)
        }
    }
}

/// Accepts a JSON string, or a JSON number kept in its textual form.
/// Values like `estimatedValue` and `weight` come back as numbers often enough.
fn free_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct FreeText;

    impl<'de> de::Visitor<'de> for FreeText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(FreeText)
}
