//! Storage module for file attachments
//!
//! Provides a MinIO/S3-compatible client for uploading, deleting and
//! addressing user file blobs.

mod object_store;

pub use object_store::StorageClient;
