//! Error types for `bizzy-core`.
//!
//! Variants map one-to-one onto the conditions surfaced to callers:
//! unauthenticated, not-found, ownership mismatch, validation, conflict,
//! and invalid-operation failures.

use thiserror::Error;
use uuid::Uuid;

use crate::link::Platform;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not authenticated")]
  Unauthenticated,

  #[error("user not found")]
  UserNotFound,

  #[error("card not found")]
  CardNotFound,

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("social link not found: {0}")]
  LinkNotFound(Uuid),

  #[error("file not found: {0}")]
  FileNotFound(Uuid),

  #[error("recipient not found: {0}")]
  RecipientNotFound(Uuid),

  #[error("contact {0} does not belong to the current user")]
  NotContactOwner(Uuid),

  #[error("link {0} does not belong to your card")]
  NotLinkOwner(Uuid),

  #[error("{0}")]
  Validation(String),

  #[error("user already has a card")]
  CardExists,

  #[error("a {0} link already exists for this card; use update instead")]
  PlatformExists(Platform),

  #[error("cannot add own card as contact")]
  SelfContact,

  #[error("cannot send card to self")]
  SelfSend,

  #[error("current user does not have a card")]
  CardRequired,

  #[error("could not generate a unique share token after {0} attempts")]
  ShareTokenExhausted(usize),

  #[error("file size exceeds {limit_mb} MB limit")]
  FileTooLarge { limit_mb: u64 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`CardStore`](crate::store::CardStore)
  /// or [`BlobStore`](crate::store::BlobStore) implementation.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  /// Construct a [`Error::Validation`] from any message.
  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
