//! Handlers for `/files` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/files` | Raw body upload; `?name=` and `?media_type=` |
//! | `GET`  | `/files/{id}/url` | Capability download URL + advisory expiry |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bizzy_core::{
  Error, file,
  file::{NewFile, StoredFile},
  store::{BlobStore, CardStore},
};
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiState, auth::Identity, error::ApiError};

/// `POST /files?name=...&media_type=...` — body is the raw bytes.
/// Returns 201 + the metadata row. Bytes land in the blob store before
/// the metadata row is written.
pub async fn upload<S, B>(
  State(state): State<ApiState<S, B>>,
  _identity: Identity,
  Query(meta): Query<NewFile>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let file_id = Uuid::new_v4();
  let size_bytes = body.len() as u64;

  state
    .blobs
    .write(file_id, body.to_vec())
    .await
    .map_err(ApiError::store)?;

  let stored = state
    .store
    .record_file(file_id, meta, size_bytes)
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Serialize)]
pub struct DownloadUrl {
  pub url:        String,
  /// Advisory only; the capability URL itself does not expire.
  pub expires_at: DateTime<Utc>,
}

/// `GET /files/{id}/url`
pub async fn download_url<S, B>(
  State(state): State<ApiState<S, B>>,
  _identity: Identity,
  Path(file_id): Path<Uuid>,
) -> Result<Json<DownloadUrl>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let stored: StoredFile = state
    .store
    .file_by_id(file_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError(Error::FileNotFound(file_id)))?;

  Ok(Json(DownloadUrl {
    url:        file::download_url(&state.base_url, stored.file_id),
    expires_at: Utc::now() + Duration::hours(1),
  }))
}
