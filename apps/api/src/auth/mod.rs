//! Bearer-token authentication against the hosted auth provider.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::AuthUser;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth provider returned status {0}")]
    Provider(u16),
}

/// Resolves a bearer token to a user.
///
/// `Ok(None)` means the token is unknown or expired; `Err` means the
/// provider itself could not be asked.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// Supabase GoTrue `/auth/v1/user` lookup.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }
}

#[async_trait]
impl TokenVerifier for SupabaseAuth {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!("Auth provider rejected token ({status})");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::Provider(status.as_u16()));
        }

        Ok(Some(response.json::<AuthUser>().await?))
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        match state.auth.verify(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AppError::Unauthorized),
            // Provider unreachable: no verdict on the credential.
            Err(e) => Err(AppError::Internal(
                anyhow::Error::new(e).context("token verification failed"),
            )),
        }
    }
}
