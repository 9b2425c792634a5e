use crate::core::error::{AppError, Result};
use crate::features::auth::clients::IdpTokenManager;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// User record returned by the identity provider's management API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpUserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub primary_email_verified: bool,
    #[serde(default)]
    pub is_suspended: bool,
}

/// Request to create a new user at the provider
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    primary_email: String,
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_data: Option<serde_json::Value>,
}

/// Request to verify user password
#[derive(Debug, Serialize)]
struct VerifyPasswordRequest {
    password: String,
}

/// Provider error response
#[derive(Debug, Deserialize)]
struct IdpErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

/// Client for the identity provider's management API.
///
/// Covers everything the service delegates to the provider: account
/// creation, credential verification, profile lookup and session
/// revocation. Callers surface the errors once; nothing here retries.
pub struct IdpClient {
    token_manager: Arc<IdpTokenManager>,
    http_client: reqwest::Client,
}

impl IdpClient {
    pub fn new(token_manager: Arc<IdpTokenManager>) -> Self {
        Self {
            token_manager,
            http_client: reqwest::Client::new(),
        }
    }

    async fn m2m_token(&self) -> Result<String> {
        let token_response = self.token_manager.get_access_token().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to get M2M token: {}", e))
        })?;
        Ok(token_response.access_token)
    }

    /// Create a new user at the provider
    ///
    /// Returns Conflict error if email already exists
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        phone_number: Option<&str>,
        country: Option<&str>,
    ) -> Result<IdpUserResponse> {
        let token = self.m2m_token().await?;

        let url = format!("{}/api/users", self.token_manager.api_base_url());

        // Profile fields the provider has no first-class slot for ride in
        // custom_data
        let custom_data = match (phone_number, country) {
            (None, None) => None,
            _ => Some(json!({
                "phoneNumber": phone_number,
                "country": country,
            })),
        };

        let request_body = CreateUserRequest {
            primary_email: email.to_string(),
            password: password.to_string(),
            name: name.map(String::from),
            custom_data,
        };

        tracing::debug!("Creating user at identity provider: {}", email);

        let response = self
            .http_client
            .post(&url)
            .timeout(self.token_manager.request_timeout())
            .bearer_auth(&token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to create user at identity provider: {}", e);
                AppError::ExternalServiceError(format!("Failed to create user: {}", e))
            })?;

        let status = response.status();

        if status.is_success() {
            let user = response.json::<IdpUserResponse>().await.map_err(|e| {
                tracing::error!("Failed to parse user response: {}", e);
                AppError::ExternalServiceError(format!("Failed to parse user response: {}", e))
            })?;

            tracing::info!("Successfully created user: {}", user.id);
            return Ok(user);
        }

        // Handle error responses
        let body = response.text().await.unwrap_or_default();

        // Check for duplicate email (HTTP 422 with user.email.exists code)
        if status.as_u16() == 422 {
            if let Ok(error_response) = serde_json::from_str::<IdpErrorResponse>(&body) {
                if error_response.code == "user.email.exists"
                    || error_response.message.contains("already")
                {
                    return Err(AppError::Conflict("Email already registered".to_string()));
                }
            }
            // Generic 422 error
            return Err(AppError::Validation(format!("Invalid request: {}", body)));
        }

        tracing::error!("Identity provider error: HTTP {} - {}", status, body);
        Err(AppError::ExternalServiceError(format!(
            "Identity provider error: HTTP {}",
            status
        )))
    }

    /// Find user by email
    ///
    /// Returns None if user not found
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<IdpUserResponse>> {
        let token = self.m2m_token().await?;

        let url = format!(
            "{}/api/users?search=%{}%",
            self.token_manager.api_base_url(),
            urlencoding::encode(email)
        );

        let response = self
            .http_client
            .get(&url)
            .timeout(self.token_manager.request_timeout())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to search users: {}", e);
                AppError::ExternalServiceError(format!("Failed to search users: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Identity provider error searching users: HTTP {}", status);
            return Err(AppError::ExternalServiceError(format!(
                "Identity provider error: HTTP {}",
                status
            )));
        }

        let users = response.json::<Vec<IdpUserResponse>>().await.map_err(|e| {
            tracing::error!("Failed to parse user search response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse user search response: {}", e))
        })?;

        // The search is a substring match; require an exact email hit
        Ok(users
            .into_iter()
            .find(|u| u.primary_email.as_deref() == Some(email)))
    }

    /// Verify a user's password
    ///
    /// Returns false when the provider rejects the credentials
    pub async fn verify_password(&self, user_id: &str, password: &str) -> Result<bool> {
        let token = self.m2m_token().await?;

        let url = format!(
            "{}/api/users/{}/password/verify",
            self.token_manager.api_base_url(),
            user_id
        );

        let response = self
            .http_client
            .post(&url)
            .timeout(self.token_manager.request_timeout())
            .bearer_auth(&token)
            .json(&VerifyPasswordRequest {
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to verify password: {}", e);
                AppError::ExternalServiceError(format!("Failed to verify password: {}", e))
            })?;

        let status = response.status();

        if status.is_success() {
            return Ok(true);
        }

        // The provider answers 422 for a wrong password
        if status.as_u16() == 422 || status.as_u16() == 401 {
            return Ok(false);
        }

        tracing::error!("Identity provider error verifying password: HTTP {}", status);
        Err(AppError::ExternalServiceError(format!(
            "Identity provider error: HTTP {}",
            status
        )))
    }

    /// Fetch a user by id
    ///
    /// Returns None when the account no longer exists
    pub async fn get_user(&self, user_id: &str) -> Result<Option<IdpUserResponse>> {
        let token = self.m2m_token().await?;

        let url = format!(
            "{}/api/users/{}",
            self.token_manager.api_base_url(),
            user_id
        );

        let response = self
            .http_client
            .get(&url)
            .timeout(self.token_manager.request_timeout())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user: {}", e);
                AppError::ExternalServiceError(format!("Failed to fetch user: {}", e))
            })?;

        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            tracing::error!("Identity provider error fetching user: HTTP {}", status);
            return Err(AppError::ExternalServiceError(format!(
                "Identity provider error: HTTP {}",
                status
            )));
        }

        let user = response.json::<IdpUserResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse user response: {}", e);
            AppError::ExternalServiceError(format!("Failed to parse user response: {}", e))
        })?;

        Ok(Some(user))
    }

    /// Revoke all of a user's sessions at the provider.
    ///
    /// Sign-out must succeed locally (the cookie is cleared regardless), so
    /// failures here are logged and swallowed.
    pub async fn revoke_sessions(&self, user_id: &str) {
        let token = match self.m2m_token().await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Skipping session revocation for {}: {}", user_id, e);
                return;
            }
        };

        let url = format!(
            "{}/api/users/{}/sessions",
            self.token_manager.api_base_url(),
            user_id
        );

        match self
            .http_client
            .delete(&url)
            .timeout(self.token_manager.request_timeout())
            .bearer_auth(&token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Revoked provider sessions for {}", user_id);
            }
            Ok(response) => {
                tracing::warn!(
                    "Provider session revocation for {} answered HTTP {}",
                    user_id,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("Provider session revocation for {} failed: {}", user_id, e);
            }
        }
    }
}
