use crate::core::config::IdpConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::clients::IdpTokenManager;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response from subject token creation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTokenResponse {
    pub subject_token: String,
    pub expires_in: u64,
}

/// Response from the OIDC token exchange
#[derive(Debug, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Request body for subject token creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubjectTokenRequest {
    user_id: String,
}

/// Service for minting user access tokens via subject token exchange.
///
/// The service never signs tokens itself; the provider does, so the same
/// JWKS validation path covers interactive and exchanged tokens.
pub struct TokenService {
    config: IdpConfig,
    token_manager: Arc<IdpTokenManager>,
    http_client: reqwest::Client,
}

impl TokenService {
    pub fn new(config: IdpConfig, token_manager: Arc<IdpTokenManager>) -> Self {
        Self {
            config,
            token_manager,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an access token for the given user.
    ///
    /// Flow:
    /// 1. Create subject token via the management API
    /// 2. Exchange subject token for an access token via the OIDC token endpoint
    pub async fn create_token(&self, user_id: &str) -> Result<TokenExchangeResponse> {
        let subject_token = self.create_subject_token(user_id).await?;
        self.exchange_subject_token(&subject_token).await
    }

    /// Create a subject token for the user via the management API
    async fn create_subject_token(&self, user_id: &str) -> Result<String> {
        let m2m_token = self.token_manager.get_access_token().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to get M2M token: {}", e))
        })?;

        let url = format!("{}/api/subject-tokens", self.token_manager.api_base_url());

        let request_body = CreateSubjectTokenRequest {
            user_id: user_id.to_string(),
        };

        tracing::debug!("Creating subject token for user: {}", user_id);

        let response = self
            .http_client
            .post(&url)
            .timeout(self.config.request_timeout)
            .bearer_auth(&m2m_token.access_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to create subject token: {}", e);
                AppError::ExternalServiceError(format!("Failed to create subject token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "Identity provider error creating subject token: HTTP {} - {}",
                status,
                body
            );
            return Err(AppError::ExternalServiceError(format!(
                "Failed to create subject token: HTTP {}",
                status
            )));
        }

        let subject_token_response: SubjectTokenResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse subject token response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse subject token response: {}", e))
        })?;

        tracing::debug!(
            "Subject token created, expires in {} seconds",
            subject_token_response.expires_in
        );

        Ok(subject_token_response.subject_token)
    }

    /// Exchange subject token for access token via the OIDC token endpoint
    async fn exchange_subject_token(&self, subject_token: &str) -> Result<TokenExchangeResponse> {
        // Build Basic auth header
        let credentials = format!(
            "{}:{}",
            self.config.exchange_app_id, self.config.exchange_app_secret
        );
        let auth_header = format!("Basic {}", BASE64.encode(credentials.as_bytes()));

        let form_body = [
            (
                "grant_type",
                "urn:ietf:params:oauth:grant-type:token-exchange",
            ),
            ("subject_token", subject_token),
            (
                "subject_token_type",
                "urn:ietf:params:oauth:token-type:access_token",
            ),
            ("resource", &self.config.resource),
            ("scope", &self.config.scope),
        ];

        tracing::debug!("Exchanging subject token for access token");

        let response = self
            .http_client
            .post(&self.config.token_url)
            .timeout(self.config.request_timeout)
            .header("Authorization", auth_header)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&form_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to exchange subject token: {}", e);
                AppError::ExternalServiceError(format!("Failed to exchange subject token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token exchange failed: HTTP {} - {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Token exchange failed: HTTP {} - {}",
                status, body
            )));
        }

        let token_response: TokenExchangeResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse token exchange response: {}", e);
            AppError::ExternalServiceError(format!(
                "Failed to parse token exchange response: {}",
                e
            ))
        })?;

        tracing::info!(
            "Token exchange successful, expires in {} seconds",
            token_response.expires_in
        );

        Ok(token_response)
    }
}
