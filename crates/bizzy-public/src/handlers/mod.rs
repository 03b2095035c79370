//! Handlers for the public share surface.

pub mod blob;
pub mod resume;
pub mod vcf;
pub mod view;

use bizzy_core::{
  card::Card,
  sharing::PublicCard,
  store::{BlobStore, CardStore},
};

use crate::{AppState, error::Error};

/// Resolve a share token to its card, or the public not-found signal.
pub(crate) async fn card_by_token<S, B>(
  state: &AppState<S, B>,
  token: &str,
) -> Result<Card, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  state
    .store
    .card_by_token(token)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardNotFound)
}

/// Assemble the public projection: sorted links plus blob URLs resolved
/// only for the blob ids actually present on the card.
pub(crate) async fn public_card<S, B>(
  state: &AppState<S, B>,
  card: &Card,
) -> Result<PublicCard, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let links = state
    .store
    .links_by_card(card.card_id)
    .await
    .map_err(Error::store)?;

  Ok(PublicCard::assemble(&state.config.base_url, card, &links))
}
