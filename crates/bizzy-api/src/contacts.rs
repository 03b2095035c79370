//! Handlers for `/contacts` endpoints — the contact ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contacts/accept` | Dedup merge-or-insert; reports `is_update` |
//! | `GET`  | `/contacts` | Joined list view, tombstone-filtered |
//! | `GET`  | `/contacts/{id}` | Joined single view |
//! | `PUT`  | `/contacts/{id}/tags` | Full tag replacement |
//! | `PUT`  | `/contacts/{id}/meeting` | Create-or-overwrite metadata |
//! | `DELETE` | `/contacts/{id}` | Removes metadata with the contact |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use bizzy_core::{
  contact::{
    self, AcceptOutcome, Contact, ContactView, MeetingInput, MeetingMetadata,
  },
  store::{BlobStore, CardStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::Identity, error::ApiError, resolve_caller};

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
  pub source_card_id: Uuid,
  pub source_user_id: Uuid,
}

/// `POST /contacts/accept` — body: [`AcceptBody`].
pub async fn accept<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Json(body): Json<AcceptBody>,
) -> Result<Json<AcceptOutcome>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let outcome = contact::accept_card(
    state.store.as_ref(),
    &user,
    body.source_card_id,
    body.source_user_id,
  )
  .await?;
  Ok(Json(outcome))
}

/// `GET /contacts`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
) -> Result<Json<Vec<ContactView>>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let views = contact::list_contacts(state.store.as_ref(), &user).await?;
  Ok(Json(views))
}

/// `GET /contacts/{id}`
pub async fn get_one<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(contact_id): Path<Uuid>,
) -> Result<Json<ContactView>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let view =
    contact::contact_detail(state.store.as_ref(), &user, contact_id).await?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct TagsBody {
  pub tags: Vec<String>,
}

/// `PUT /contacts/{id}/tags` — full replacement, not a merge.
pub async fn set_tags<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(contact_id): Path<Uuid>,
  Json(body): Json<TagsBody>,
) -> Result<Json<Contact>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let updated =
    contact::update_tags(state.store.as_ref(), &user, contact_id, body.tags)
      .await?;
  Ok(Json(updated))
}

/// `PUT /contacts/{id}/meeting` — body: [`MeetingInput`]; overwrite-only.
pub async fn set_meeting<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(contact_id): Path<Uuid>,
  Json(body): Json<MeetingInput>,
) -> Result<Json<MeetingMetadata>, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  let meeting = contact::add_meeting_metadata(
    state.store.as_ref(),
    &user,
    contact_id,
    body,
  )
  .await?;
  Ok(Json(meeting))
}

/// `DELETE /contacts/{id}`
pub async fn remove<S, B>(
  State(state): State<ApiState<S, B>>,
  identity: Identity,
  Path(contact_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let user = resolve_caller(&state, &identity).await?;
  contact::remove_contact(state.store.as_ref(), &user, contact_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
