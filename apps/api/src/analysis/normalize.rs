//! Turns raw model output into a validated `TenderAnalysis`.
//!
//! Two stages: strict JSON parsing (after stripping code fences), then a
//! structural check against the typed schema. Nothing is salvaged from a
//! response that fails either stage.

use thiserror::Error;

use crate::analysis::schema::TenderAnalysis;

/// Longest slice of the offending output kept for diagnostics.
const FRAGMENT_CHARS: usize = 200;

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("The analysis service returned malformed JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        fragment: String,
    },

    #[error("The analysis service returned an invalid analysis: {0}")]
    SchemaViolation(String),
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Either fence may appear without the other.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text)
        .trim();
    text.strip_suffix("```").map(str::trim).unwrap_or(text)
}

/// Parses and validates raw model output.
pub fn normalize(raw: &str) -> Result<TenderAnalysis, NormalizeError> {
    let cleaned = strip_json_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|source| NormalizeError::Parse {
            source,
            fragment: cleaned.chars().take(FRAGMENT_CHARS).collect(),
        })?;

    let analysis: TenderAnalysis = serde_json::from_value(value)
        .map_err(|e| NormalizeError::SchemaViolation(e.to_string()))?;

    validate(&analysis)?;
    Ok(analysis)
}

/// Checks the invariants serde cannot express.
fn validate(analysis: &TenderAnalysis) -> Result<(), NormalizeError> {
    if analysis.bid_score.score > MAX_SCORE {
        return Err(NormalizeError::SchemaViolation(format!(
            "bidScore.score must be between 0 and {MAX_SCORE}, got {}",
            analysis.bid_score.score
        )));
    }
    Ok(())
}
