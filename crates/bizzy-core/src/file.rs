//! StoredFile — metadata for an uploaded blob.
//!
//! Only metadata lives in the record store; the bytes themselves are
//! kept by a [`BlobStore`](crate::store::BlobStore) keyed by `file_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
  pub file_id:    Uuid,
  /// Original filename as uploaded.
  pub name:       String,
  pub media_type: String,
  pub size_bytes: u64,
  pub created_at: DateTime<Utc>,
}

/// Caller-supplied metadata for an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFile {
  pub name:       String,
  pub media_type: String,
}

/// Capability download URL for a stored blob.
pub fn download_url(base_url: &str, file_id: Uuid) -> String {
  format!("{}/files/{file_id}", base_url.trim_end_matches('/'))
}
