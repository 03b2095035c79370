//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/sync` | Gateway-only; upsert from an auth event |
//! | `GET`  | `/users/me` | The caller's user record |
//! | `GET`  | `/users/lookup` | `?email=` or `?phone=`, exact match |

use axum::{
  Json,
  extract::{Query, State},
};
use bizzy_core::{
  Error, sharing,
  store::{BlobStore, CardStore},
  user::{IdentitySync, User, UserRef},
};
use serde::Deserialize;

use crate::{
  ApiState,
  auth::{Gateway, Identity},
  error::ApiError,
  resolve_caller,
};

/// `POST /users/sync` — body: [`IdentitySync`]. Called by the gateway
/// whenever the identity provider reports an auth event.
pub async fn sync<S, B>(
  State(state): State<ApiState<S, B>>,
  _gateway: Gateway,
  Json(body): Json<IdentitySync>,
) -> Result<Json<User>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = state
    .store
    .upsert_user(body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}

/// `GET /users/me`
pub async fn me<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<User>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
  pub email: Option<String>,
  pub phone: Option<String>,
}

/// `GET /users/lookup?email=...` or `?phone=...` — minimal projection
/// or `null`.
pub async fn lookup<S, B>(
  State(state): State<ApiState<S, B>>,
  _gateway: Gateway,
  Query(params): Query<LookupParams>,
) -> Result<Json<Option<UserRef>>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let found = match (params.email, params.phone) {
    (Some(email), _) => sharing::lookup_by_email(state.store.as_ref(), &email).await?,
    (None, Some(phone)) => {
      sharing::lookup_by_phone(state.store.as_ref(), &phone).await?
    }
    (None, None) => {
      return Err(ApiError(Error::validation(
        "either email or phone is required",
      )));
    }
  };
  Ok(Json(found))
}
