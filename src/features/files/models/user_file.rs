use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for file attachment metadata
#[derive(Debug, Clone, FromRow)]
pub struct UserFile {
    pub id: Uuid,
    pub user_id: String,
    /// Original display name as uploaded
    pub file_name: String,
    /// Storage object key, unique per blob
    pub file_path: String,
    /// Durable public URL
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}
