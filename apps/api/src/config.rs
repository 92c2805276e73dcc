use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Default monthly allowance of analyses per user.
pub const DEFAULT_MONTHLY_LIMIT: i64 = 3;
/// Default upload ceiling (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// How PDF uploads reach the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PdfStrategy {
    /// Forward the PDF binary to the model as an inline attachment.
    #[default]
    Inline,
    /// Extract text locally and send it through the text path.
    Extract,
}

impl FromStr for PdfStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(PdfStrategy::Inline),
            "extract" => Ok(PdfStrategy::Extract),
            other => bail!("PDF_STRATEGY must be 'inline' or 'extract', got '{other}'"),
        }
    }
}

/// Limits applied by the analysis endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub monthly_limit: i64,
    pub max_upload_bytes: usize,
    pub pdf_strategy: PdfStrategy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            monthly_limit: DEFAULT_MONTHLY_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pdf_strategy: PdfStrategy::Inline,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout_secs: u64,
    pub analysis: AnalysisSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            port: optional_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: optional_env("REQUEST_TIMEOUT_SECS", 60)
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            analysis: AnalysisSettings {
                monthly_limit: optional_env("MONTHLY_ANALYSIS_LIMIT", DEFAULT_MONTHLY_LIMIT)
                    .context("MONTHLY_ANALYSIS_LIMIT must be an integer")?,
                max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                pdf_strategy: optional_env("PDF_STRATEGY", PdfStrategy::default())?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}")),
        Err(_) => Ok(default),
    }
}
