//! Resume download: `GET /public/{token}/resume`.

use axum::{
  body::Body,
  http::{StatusCode, header},
  response::Response,
};
use bizzy_core::store::{BlobStore, CardStore};

use crate::{AppState, error::Error, handlers::card_by_token};

pub async fn handler<S, B>(
  state: &AppState<S, B>,
  token: &str,
) -> Result<Response, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let card = card_by_token(state, token).await?;

  let file_id = card.resume_file_id.ok_or(Error::ResumeNotFound)?;

  let file = state
    .store
    .file_by_id(file_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ResumeNotFound)?;

  let bytes = state
    .blobs
    .read(file_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ResumeNotFound)?;

  Ok(
    Response::builder()
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, file.media_type)
      .header(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", file.name),
      )
      .header(header::CONTENT_LENGTH, bytes.len())
      .body(Body::from(bytes))
      .expect("static response"),
  )
}
