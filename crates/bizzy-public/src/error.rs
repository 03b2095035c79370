//! Error types and axum `IntoResponse` implementation for the public
//! surface.
//!
//! Public responses never leak backend detail: lookups miss with a
//! small JSON body, everything else is an opaque 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("card not found")]
  CardNotFound,
  #[error("resume not found")]
  ResumeNotFound,
  #[error("file not found")]
  FileNotFound,
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Error::CardNotFound => (StatusCode::NOT_FOUND, "Card not found"),
      Error::ResumeNotFound => (StatusCode::NOT_FOUND, "Resume not found"),
      Error::FileNotFound => (StatusCode::NOT_FOUND, "File not found"),
      Error::Store(e) => {
        tracing::error!(error = %e, "public handler store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
