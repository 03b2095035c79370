//! Capability blob download: `GET /files/{file_id}`.
//!
//! Serves the bytes behind the photo/resume URLs embedded in public
//! card projections. The UUID is the capability; there is nothing else
//! to guess.

use axum::{
  body::Body,
  http::{StatusCode, header},
  response::Response,
};
use bizzy_core::store::{BlobStore, CardStore};
use uuid::Uuid;

use crate::{AppState, error::Error};

pub async fn handler<S, B>(
  state: &AppState<S, B>,
  file_id: Uuid,
) -> Result<Response, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let file = state
    .store
    .file_by_id(file_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FileNotFound)?;

  let bytes = state
    .blobs
    .read(file_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FileNotFound)?;

  Ok(
    Response::builder()
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, file.media_type)
      .header(header::CONTENT_LENGTH, bytes.len())
      .body(Body::from(bytes))
      .expect("static response"),
  )
}
