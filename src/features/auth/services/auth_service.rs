use crate::core::error::{AppError, Result};
use crate::features::auth::clients::{IdpClient, IdpUserResponse};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, MeResponseDto, SignupRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::TokenService;
use std::sync::Arc;

/// Service for authentication operations (signup, login, logout)
pub struct AuthService {
    idp_client: Arc<IdpClient>,
    token_service: Arc<TokenService>,
    session_cookie_ttl_secs: u64,
}

impl AuthService {
    pub fn new(
        idp_client: Arc<IdpClient>,
        token_service: Arc<TokenService>,
        session_cookie_ttl_secs: u64,
    ) -> Self {
        Self {
            idp_client,
            token_service,
            session_cookie_ttl_secs,
        }
    }

    /// Max-Age applied to session cookies issued at signup/login
    pub fn session_cookie_ttl_secs(&self) -> u64 {
        self.session_cookie_ttl_secs
    }

    /// Sign up a new user
    pub async fn sign_up(&self, dto: SignupRequestDto) -> Result<AuthResponseDto> {
        // Create user at the provider
        let user = self
            .idp_client
            .create_user(
                &dto.email,
                &dto.password,
                dto.full_name.as_deref(),
                dto.phone_number.as_deref(),
                dto.country.as_deref(),
            )
            .await?;

        // Mint an access token via token exchange
        let token_response = self.token_service.create_token(&user.id).await?;

        Ok(AuthResponseDto {
            access_token: token_response.access_token,
            token_type: token_response.token_type,
            expires_in: token_response.expires_in,
            user: user_to_auth_user_dto(user),
        })
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        // Find user by email; a missing account and a wrong password are
        // reported the same way so login probing learns nothing
        let user = self
            .idp_client
            .find_user_by_email(&dto.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if user.is_suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }

        let password_valid = self
            .idp_client
            .verify_password(&user.id, &dto.password)
            .await?;

        if !password_valid {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token_response = self.token_service.create_token(&user.id).await?;

        Ok(AuthResponseDto {
            access_token: token_response.access_token,
            token_type: token_response.token_type,
            expires_in: token_response.expires_in,
            user: user_to_auth_user_dto(user),
        })
    }

    /// Sign out: revoke provider sessions (best-effort).
    ///
    /// The handler clears the session cookie regardless of the outcome here.
    pub async fn sign_out(&self, user: &AuthenticatedUser) {
        self.idp_client.revoke_sessions(&user.sub).await;
        tracing::info!("User signed out: {}", user.sub);
    }

    /// Get current user info (for /me endpoint)
    pub async fn current_user(&self, user: AuthenticatedUser) -> Result<MeResponseDto> {
        Ok(user.into())
    }
}

/// Convert a provider user record to the auth user DTO
fn user_to_auth_user_dto(user: IdpUserResponse) -> AuthUserDto {
    AuthUserDto {
        id: user.id,
        name: user.name,
        email: user.primary_email,
        email_verified: user.primary_email_verified,
    }
}
