//! Gateway-secret verification and identity-subject extraction.
//!
//! Authentication itself is delegated to the external identity
//! provider. Requests reach this API through a gateway that has already
//! validated the end-user session; the gateway proves itself with a
//! shared bearer secret (argon2-hashed in config) and forwards the
//! provider subject in `X-Identity-Subject`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use bizzy_core::{Error, store::{BlobStore, CardStore}};

use crate::{ApiState, error::ApiError};

/// Header carrying the identity-provider subject of the end user.
pub const SUBJECT_HEADER: &str = "x-identity-subject";

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub gateway_secret_hash: String,
}

/// Zero-size marker: present in the handler means the gateway secret
/// verified. Used by routes that act on no particular end user
/// (identity sync, lookups).
pub struct Gateway;

/// A resolved end-user identity: gateway secret verified and a subject
/// header present.
pub struct Identity {
  pub subject: String,
}

/// Verify the bearer secret directly from headers.
pub fn verify_gateway(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError(Error::Unauthenticated))?;

  let secret = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError(Error::Unauthenticated))?;

  let parsed_hash = PasswordHash::new(&config.gateway_secret_hash)
    .map_err(|_| ApiError(Error::Unauthenticated))?;

  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError(Error::Unauthenticated))?;

  Ok(())
}

/// Pull the identity-provider subject out of the headers.
pub fn identity_subject(headers: &HeaderMap) -> Result<String, ApiError> {
  headers
    .get(SUBJECT_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .ok_or(ApiError(Error::Unauthenticated))
}

impl<S, B> FromRequestParts<ApiState<S, B>> for Gateway
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    verify_gateway(&parts.headers, &state.auth)?;
    Ok(Gateway)
  }
}

impl<S, B> FromRequestParts<ApiState<S, B>> for Identity
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    verify_gateway(&parts.headers, &state.auth)?;
    let subject = identity_subject(&parts.headers)?;
    Ok(Identity { subject })
  }
}
