use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::core::middleware::{clear_session_cookie, issue_session_cookie};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, SignedOutDto, SignupRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::AppendHeaders,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Sign up a new user
///
/// On success the access token is returned in the body and issued as the
/// session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn signup(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<SignupRequestDto>,
) -> Result<(
    StatusCode,
    AppendHeaders<[(header::HeaderName, String); 1]>,
    Json<ApiResponse<AuthResponseDto>>,
)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let auth_response = service.sign_up(dto).await?;
    let cookie = issue_session_cookie(
        &auth_response.access_token,
        service.session_cookie_ttl_secs(),
    );

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success(Some(auth_response), None, None)),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account suspended")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<(
    AppendHeaders<[(header::HeaderName, String); 1]>,
    Json<ApiResponse<AuthResponseDto>>,
)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let auth_response = service.sign_in(dto).await?;
    let cookie = issue_session_cookie(
        &auth_response.access_token,
        service.session_cookie_ttl_secs(),
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success(Some(auth_response), None, None)),
    ))
}

/// Sign out the current user
///
/// Clears the session cookie; provider-side session revocation is
/// best-effort.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = ApiResponse<SignedOutDto>),
        (status = 401, description = "Authentication required")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<(
    AppendHeaders<[(header::HeaderName, String); 1]>,
    Json<ApiResponse<SignedOutDto>>,
)> {
    service.sign_out(&user).await;

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(ApiResponse::success(
            Some(SignedOutDto { signed_out: true }),
            None,
            None,
        )),
    ))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    let user_data = service.current_user(user).await?;
    Ok(Json(ApiResponse::success(Some(user_data), None, None)))
}
