//! Handlers for `/cards` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cards` | Create the caller's card; 409 if one exists |
//! | `GET`  | `/cards/me` | 404 without a card |
//! | `PATCH` | `/cards/me` | Partial update, re-validated per field |
//! | `POST` | `/cards/me/regenerate-token` | Invalidates old share links |
//! | `PUT`/`DELETE` | `/cards/me/photo` | Attach/detach profile photo |
//! | `PUT`/`DELETE` | `/cards/me/resume` | Attach/detach resume (10 MB cap) |
//! | `GET`  | `/cards/by-token/{token}` | Gateway-only token resolution |
//! | `GET`  | `/cards/{card_id}/links` | Sorted social links |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bizzy_core::{
  Error,
  card::{self, Card, CardPatch, NewCard},
  link::SocialLink,
  store::{BlobStore, CardStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  auth::{Gateway, Identity},
  error::ApiError,
  resolve_caller,
};

/// `POST /cards` — returns 201 + the stored [`Card`].
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<NewCard>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let created = card::create_card(state.store.as_ref(), &user, body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /cards/me`
pub async fn me<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let found = state
    .store
    .card_by_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError(Error::CardNotFound))?;
  Ok(Json(found))
}

/// `PATCH /cards/me` — body: [`CardPatch`].
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<CardPatch>,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated = card::update_card(state.store.as_ref(), &user, body).await?;
  Ok(Json(updated))
}

/// `POST /cards/me/regenerate-token`
pub async fn regenerate_token<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated = card::regenerate_share_token(state.store.as_ref(), &user).await?;
  Ok(Json(updated))
}

/// JSON body naming an uploaded file.
#[derive(Debug, Deserialize)]
pub struct FileRef {
  pub file_id: Uuid,
}

/// `PUT /cards/me/photo` — body: `{"file_id":"..."}`
pub async fn set_photo<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<FileRef>,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated =
    card::attach_photo(state.store.as_ref(), &user, body.file_id).await?;
  Ok(Json(updated))
}

/// `DELETE /cards/me/photo`
pub async fn remove_photo<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated = card::remove_photo(state.store.as_ref(), &user).await?;
  Ok(Json(updated))
}

/// `PUT /cards/me/resume` — body: `{"file_id":"..."}`; 400 over 10 MB.
pub async fn set_resume<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<FileRef>,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated =
    card::attach_resume(state.store.as_ref(), &user, body.file_id).await?;
  Ok(Json(updated))
}

/// `DELETE /cards/me/resume`
pub async fn remove_resume<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated = card::remove_resume(state.store.as_ref(), &user).await?;
  Ok(Json(updated))
}

/// `GET /cards/by-token/{token}` — 404 when the token resolves to
/// nothing (e.g. after regeneration).
pub async fn by_token<S, B>(
  State(state): State<ApiState<S, B>>,
  _gateway: Gateway,
  Path(token): Path<String>,
) -> Result<Json<Card>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let found = state
    .store
    .card_by_token(&token)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError(Error::CardNotFound))?;
  Ok(Json(found))
}

/// `GET /cards/{card_id}/links` — ascending by display order.
pub async fn links<S, B>(
  State(state): State<ApiState<S, B>>,
  _gateway: Gateway,
  Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<SocialLink>>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let links = state
    .store
    .links_by_card(card_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(links))
}
