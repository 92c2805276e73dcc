use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::AnalysisSettings;
use crate::llm_client::GenerativeModel;
use crate::quota::QuotaGate;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external collaborator is a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    /// Bearer-token verification against the hosted auth provider.
    pub auth: Arc<dyn TokenVerifier>,
    /// Monthly admission control backed by the usage store.
    pub quota: QuotaGate,
    /// The one generative model used for analyses.
    pub model: Arc<dyn GenerativeModel>,
    pub settings: AnalysisSettings,
}
