use crate::core::error::AppError;
use crate::features::auth::JwtValidator;
use crate::shared::constants::{LOGIN_PATH, SESSION_COOKIE, SIGNUP_PATH};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).unwrap()))
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(auth_header) = auth_header {
                if let Some(encoded) = auth_header.strip_prefix("Basic ") {
                    if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                        if let Ok(creds) = String::from_utf8(decoded) {
                            if creds == *credentials {
                                return Ok(next.run(req).await);
                            }
                        }
                    }
                }
            }

            let response = Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .header(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")
                .body(Body::from("Unauthorized"))
                .unwrap();

            Err(response)
        })
    }
}

/// Extract a bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Extract a named cookie value from the Cookie header(s)
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Build the Set-Cookie value that issues or refreshes the session cookie
pub fn issue_session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// Build the Set-Cookie value that clears the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Classification of a request path for the session middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session handling beyond cookie refresh: root, health, docs and the
    /// `/api` surface (which answers 401 through the route guard instead of
    /// redirecting)
    Exempt,
    /// Login/signup pages: an authenticated browser is sent back to root
    PublicAuth,
    /// Everything else requires a session
    Protected,
}

impl RouteClass {
    pub fn classify(path: &str) -> Self {
        if path == "/"
            || path == "/health"
            || path == "/api"
            || path.starts_with("/api/")
            || path.starts_with("/swagger-ui")
            || path.starts_with("/api-docs")
        {
            return RouteClass::Exempt;
        }
        if path.starts_with(LOGIN_PATH) || path.starts_with(SIGNUP_PATH) {
            return RouteClass::PublicAuth;
        }
        RouteClass::Protected
    }
}

/// State for the per-request session middleware
pub struct SessionLayer {
    validator: Arc<JwtValidator>,
    cookie_ttl_secs: u64,
}

impl SessionLayer {
    pub fn new(validator: Arc<JwtValidator>, cookie_ttl_secs: u64) -> Self {
        Self {
            validator,
            cookie_ttl_secs,
        }
    }
}

/// Session middleware, run once per request before routing.
///
/// Validates the session token (cookie or bearer), refreshes the cookie on
/// the outgoing response, and applies the redirect rules for browser-facing
/// paths. Validation failures of any kind (bad token, unreachable JWKS) are
/// treated as "no session", so protected routes fail closed.
pub async fn session_middleware(
    State(layer): State<Arc<SessionLayer>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers())
        .or_else(|| cookie_value(req.headers(), SESSION_COOKIE))
        .map(str::to_owned);

    let session = match token.as_deref() {
        Some(t) => match layer.validator.validate_token(t).await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                None
            }
        },
        None => None,
    };

    match (session.is_some(), RouteClass::classify(req.uri().path())) {
        (false, RouteClass::Protected) => {
            return Redirect::temporary(LOGIN_PATH).into_response();
        }
        (true, RouteClass::PublicAuth) => {
            return Redirect::temporary("/").into_response();
        }
        _ => {}
    }

    let refresh = session.is_some();
    if let Some(user) = session {
        req.extensions_mut().insert(user);
    }

    let mut response = next.run(req).await;

    // Re-issue the cookie with a renewed expiry on every authenticated request
    if refresh {
        if let Some(token) = token {
            if let Ok(value) =
                HeaderValue::from_str(&issue_session_cookie(&token, layer.cookie_ttl_secs))
            {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }

    response
}

/// Route guard for the `/api` surface.
///
/// Accepts the session token from the Authorization header or the session
/// cookie and rejects with 401 when absent or invalid.
pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .or_else(|| cookie_value(req.headers(), SESSION_COOKIE))
        .map(str::to_owned)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let user = validator.validate_token(&token).await?;

    // Insert authenticated user into request extensions
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::JwksClient;
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use std::time::Duration;

    #[test]
    fn test_route_classification() {
        assert_eq!(RouteClass::classify("/"), RouteClass::Exempt);
        assert_eq!(RouteClass::classify("/health"), RouteClass::Exempt);
        assert_eq!(RouteClass::classify("/api/todos"), RouteClass::Exempt);
        assert_eq!(RouteClass::classify("/swagger-ui/"), RouteClass::Exempt);
        assert_eq!(RouteClass::classify("/auth/login"), RouteClass::PublicAuth);
        assert_eq!(RouteClass::classify("/auth/signup"), RouteClass::PublicAuth);
        assert_eq!(RouteClass::classify("/dashboard"), RouteClass::Protected);
        assert_eq!(RouteClass::classify("/settings/profile"), RouteClass::Protected);
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; tn_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = issue_session_cookie("tok", 3600);
        assert!(cookie.starts_with("tn_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    fn test_validator() -> Arc<JwtValidator> {
        let jwks = Arc::new(JwksClient::new(
            "http://localhost:1/oidc",
            Duration::from_secs(60),
        ));
        Arc::new(JwtValidator::new(
            jwks,
            "http://localhost:1/oidc".to_string(),
            "https://api.test".to_string(),
            Duration::from_secs(0),
        ))
    }

    fn test_session_layer() -> Arc<SessionLayer> {
        Arc::new(SessionLayer::new(test_validator(), 3600))
    }

    fn test_router() -> Router {
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/auth/login", get(|| async { "login" }))
            .layer(axum::middleware::from_fn_with_state(
                test_session_layer(),
                session_middleware,
            ))
    }

    #[tokio::test]
    async fn test_protected_path_without_session_redirects_to_login() {
        let server = TestServer::new(test_router()).unwrap();
        let response = server.get("/dashboard").await;
        assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("location"), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_exempt_and_public_paths_pass_without_session() {
        let server = TestServer::new(test_router()).unwrap();
        server.get("/").await.assert_status_ok();
        server.get("/auth/login").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_api_guard_rejects_missing_token() {
        let app = Router::new()
            .route("/api/todos", get(|| async { "ok" }))
            .route_layer(axum::middleware::from_fn_with_state(
                test_validator(),
                auth_middleware,
            ));
        let server = TestServer::new(app).unwrap();
        let response = server.get("/api/todos").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
