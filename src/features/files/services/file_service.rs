use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::UserFile;
use crate::modules::storage::StorageClient;

const FILE_COLUMNS: &str =
    "id, user_id, file_name, file_path, file_url, file_size, file_type, uploaded_at";

/// Service for file attachment operations
pub struct FileService {
    pool: PgPool,
    storage: Arc<StorageClient>,
}

impl FileService {
    pub fn new(pool: PgPool, storage: Arc<StorageClient>) -> Self {
        Self { pool, storage }
    }

    /// Upload a blob and record its metadata.
    ///
    /// The blob is written first. If the metadata insert then fails, the
    /// just-written blob is deleted as a compensating action before the
    /// error propagates, so an orphaned blob is never left behind silently.
    pub async fn upload(
        &self,
        user_id: &str,
        data: Vec<u8>,
        display_name: &str,
        content_type: &str,
    ) -> Result<FileResponseDto> {
        let file_size = data.len() as i64;
        let upload_millis = Utc::now().timestamp_millis();
        let file_path = StorageClient::object_key(user_id, upload_millis, display_name);

        self.storage.upload(&file_path, data, content_type).await?;

        debug!("Blob uploaded: {}", file_path);

        let file_url = self.storage.public_url(&file_path);

        let inserted = sqlx::query_as::<_, UserFile>(&format!(
            "INSERT INTO user_files (user_id, file_name, file_path, file_url, file_size, file_type) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(display_name)
        .bind(&file_path)
        .bind(&file_url)
        .bind(file_size)
        .bind(content_type)
        .fetch_one(&self.pool)
        .await;

        let file = match inserted {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to record file metadata: {:?}", e);
                // Compensating action: the blob must not outlive its record
                if let Err(cleanup_err) = self.storage.delete(&file_path).await {
                    warn!(
                        "Orphaned blob '{}' left after failed metadata insert: {}",
                        file_path, cleanup_err
                    );
                }
                return Err(AppError::Database(e));
            }
        };

        info!(
            "File uploaded: id={}, path={}, size={}",
            file.id, file.file_path, file.file_size
        );

        Ok(file.into())
    }

    /// List the caller's files, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<FileResponseDto>> {
        let files = sqlx::query_as::<_, UserFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM user_files WHERE user_id = $1 ORDER BY uploaded_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(files.into_iter().map(|f| f.into()).collect())
    }

    /// Delete a file by id: blob first, then the record
    pub async fn delete(&self, file_id: Uuid, user_id: &str) -> Result<()> {
        let file = sqlx::query_as::<_, UserFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM user_files WHERE id = $1 AND user_id = $2"
        ))
        .bind(file_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch file for deletion: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.remove(&file).await
    }

    /// Delete a file addressed by its public URL.
    ///
    /// Used by the todo cascade, which only holds the attachment's URL.
    pub async fn delete_by_url(&self, url: &str, user_id: &str) -> Result<()> {
        let file = sqlx::query_as::<_, UserFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM user_files WHERE file_url = $1 AND user_id = $2"
        ))
        .bind(url)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch file by url: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.remove(&file).await
    }

    /// Blob-first removal of a fetched record.
    ///
    /// When the blob delete succeeds but the record delete fails, the
    /// window where a record points at a missing blob is logged before the
    /// error propagates. No retry.
    async fn remove(&self, file: &UserFile) -> Result<()> {
        self.storage.delete(&file.file_path).await?;

        debug!("Blob deleted: {}", file.file_path);

        let result = sqlx::query("DELETE FROM user_files WHERE id = $1 AND user_id = $2")
            .bind(file.id)
            .bind(&file.user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(
                    "Record for deleted blob '{}' could not be removed: {:?}",
                    file.file_path, e
                );
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            // A concurrent delete removed the record after our fetch
            return Err(AppError::NotFound("File not found".to_string()));
        }

        info!("File deleted: id={}, path={}", file.id, file.file_path);

        Ok(())
    }
}
