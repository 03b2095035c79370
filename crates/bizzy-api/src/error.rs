//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Wraps [`bizzy_core::Error`] and maps each condition onto a status
//! code; bodies are `{"error": "<message>"}`.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use bizzy_core::Error;
use serde_json::json;
use thiserror::Error as ThisError;

/// An error returned by an API handler.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  /// Wrap a backend error from a store or blob-store implementation.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self(Error::store(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::Unauthenticated => StatusCode::UNAUTHORIZED,

      Error::UserNotFound
      | Error::CardNotFound
      | Error::ContactNotFound(_)
      | Error::LinkNotFound(_)
      | Error::FileNotFound(_)
      | Error::RecipientNotFound(_) => StatusCode::NOT_FOUND,

      Error::NotContactOwner(_) | Error::NotLinkOwner(_) => {
        StatusCode::FORBIDDEN
      }

      Error::Validation(_)
      | Error::FileTooLarge { .. }
      | Error::SelfContact
      | Error::SelfSend => StatusCode::BAD_REQUEST,

      Error::CardExists | Error::PlatformExists(_) => StatusCode::CONFLICT,

      Error::CardRequired => StatusCode::PRECONDITION_FAILED,

      Error::ShareTokenExhausted(_) | Error::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut res =
      (status, Json(json!({ "error": self.0.to_string() }))).into_response();

    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }

    res
  }
}
