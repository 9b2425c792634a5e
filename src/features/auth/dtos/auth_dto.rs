use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;

/// Request DTO for account signup
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SignupRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(min = 1, max = 30, message = "Phone number must be 1-30 characters"))]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, max = 60, message = "Country must be 1-60 characters"))]
    pub country: Option<String>,
}

/// Request DTO for login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for signup/login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    /// JWT access token, also issued as the session cookie
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
    /// Authenticated user info
    pub user: AuthUserDto,
}

/// User info included in auth responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    /// Provider user ID
    pub id: String,
    /// Display name (optional)
    pub name: Option<String>,
    /// Email address (optional, may be null if not verified)
    pub email: Option<String>,
    /// Whether email is verified
    pub email_verified: bool,
}

/// Response DTO for the current-user endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub sub: String,
    pub email: Option<String>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            sub: user.sub,
            email: user.email,
        }
    }
}

/// Response DTO for sign-out
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignedOutDto {
    pub signed_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_signup_dto_accepts_valid_input() {
        let dto = SignupRequestDto {
            email: SafeEmail().fake(),
            password: "correct-horse-battery".to_string(),
            full_name: Some("Ada Lovelace".to_string()),
            phone_number: None,
            country: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_signup_dto_rejects_short_password() {
        let dto = SignupRequestDto {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
            full_name: None,
            phone_number: None,
            country: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_login_dto_rejects_malformed_email() {
        let dto = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
