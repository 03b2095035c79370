//! Handlers for `/share` endpoints — the sharing facade.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/share/link` | Share URL + QR payload for the caller's card |
//! | `POST` | `/share/send` | Validated no-op acknowledgement |

use axum::{Json, extract::State};
use bizzy_core::{
  Error, sharing,
  store::{BlobStore, CardStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, auth::Identity, error::ApiError, resolve_caller};

#[derive(Debug, Serialize)]
pub struct ShareLink {
  pub url:     String,
  pub qr_data: String,
}

/// `GET /share/link` — 404 when the caller has no card yet.
pub async fn link<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<ShareLink>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let card = state
    .store
    .card_by_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError(Error::CardNotFound))?;

  Ok(Json(ShareLink {
    url:     sharing::share_link_url(&state.base_url, &card.share_token),
    qr_data: sharing::qr_code_data(&state.base_url, &card.share_token),
  }))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub recipient_user_id: Uuid,
}

/// `POST /share/send` — the hand-off itself happens out of band.
pub async fn send<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<SendBody>,
) -> Result<Json<sharing::SendAck>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let ack =
    sharing::send_card(state.store.as_ref(), &user, body.recipient_user_id)
      .await?;
  Ok(Json(ack))
}
