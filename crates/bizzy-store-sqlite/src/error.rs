//! Error type for `bizzy-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown platform: {0:?}")]
  UnknownPlatform(String),

  /// A row vanished between the statements of a read-modify-write.
  #[error("row not found: {0}")]
  RowNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
