//! Handlers for `/links` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/links` | 409 when the platform already exists on the card |
//! | `PATCH` | `/links/{id}` | Update URL and/or order |
//! | `DELETE` | `/links/{id}` | Hard delete |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use bizzy_core::{
  link::{self, NewLink, SocialLink},
  store::{BlobStore, CardStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::Identity, error::ApiError, resolve_caller};

/// `POST /links` — body: [`NewLink`]; returns 201 + the stored link.
pub async fn add<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<NewLink>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let created = link::add_link(state.store.as_ref(), &user, body).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct LinkPatch {
  pub url:   Option<String>,
  pub order: Option<u32>,
}

/// `PATCH /links/{id}`
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(link_id): Path<Uuid>,
  Json(body): Json<LinkPatch>,
) -> Result<Json<SocialLink>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated = link::update_link(
    state.store.as_ref(),
    &user,
    link_id,
    body.url,
    body.order,
  )
  .await?;
  Ok(Json(updated))
}

/// `DELETE /links/{id}`
pub async fn remove<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(link_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  link::remove_link(state.store.as_ref(), &user, link_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
