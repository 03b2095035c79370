//! Public card view: `GET /public/{token}`.

use axum::{Json, response::Response};
use axum::response::IntoResponse as _;
use bizzy_core::store::{BlobStore, CardStore};
use serde_json::json;

use crate::{
  AppState,
  error::Error,
  handlers::{card_by_token, public_card},
};

pub async fn handler<S, B>(
  state: &AppState<S, B>,
  token: &str,
) -> Result<Response, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let card = card_by_token(state, token).await?;
  let public = public_card(state, &card).await?;
  Ok(Json(json!({ "card": public })).into_response())
}
