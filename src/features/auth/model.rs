use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Principal extracted from a validated session token.
///
/// The identity provider owns the account; this is the read-only view the
/// rest of the application sees. Every data-access operation is scoped to
/// `sub`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
