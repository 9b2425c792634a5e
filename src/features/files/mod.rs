//! User file attachments.
//!
//! Blobs live in object storage, metadata in the `user_files` table. Blob
//! and record are created blob-first with compensating cleanup, and deleted
//! blob-first.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/files/upload` | Yes | Upload an attachment |
//! | GET | `/api/files` | Yes | List caller's files, newest first |
//! | DELETE | `/api/files/{id}` | Yes | Delete blob and record |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::FileService;
