use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_sets_flag_and_data() {
        let resp = ApiResponse::success(Some(42), None, Some(Meta { total: 1 }));
        assert!(resp.success);
        assert_eq!(resp.data, Some(42));
        assert!(resp.errors.is_none());
    }

    #[test]
    fn test_error_carries_messages() {
        let resp = ApiResponse::<()>::error(
            Some("title is required".to_string()),
            Some(vec!["title is required".to_string()]),
        );
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.as_ref().map(|e| e.len()), Some(1));
    }
}
