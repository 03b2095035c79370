//! SocialLink — the ordered external profile links attached to a card.
//!
//! At most one link per (card, platform); the display order is a plain
//! integer, assigned `max + 1` when the caller leaves it out.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::CardStore, user::User, validate};

/// The recognised social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  LinkedIn,
  GitHub,
  Twitter,
  Bluesky,
  Facebook,
  Instagram,
  Portfolio,
  Custom,
}

impl Platform {
  /// The lowercase wire/database form; must match the serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::LinkedIn => "linkedin",
      Self::GitHub => "github",
      Self::Twitter => "twitter",
      Self::Bluesky => "bluesky",
      Self::Facebook => "facebook",
      Self::Instagram => "instagram",
      Self::Portfolio => "portfolio",
      Self::Custom => "custom",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
  pub link_id:    Uuid,
  pub card_id:    Uuid,
  pub platform:   Platform,
  pub url:        String,
  pub order:      u32,
  pub created_at: DateTime<Utc>,
}

/// Input to [`add_link`]. An omitted order means "append".
#[derive(Debug, Clone, Deserialize)]
pub struct NewLink {
  pub platform: Platform,
  pub url:      String,
  pub order:    Option<u32>,
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Add a link to the caller's card.
///
/// Fails with [`Error::PlatformExists`] when the card already carries a
/// link for that platform — callers must update instead.
pub async fn add_link<S: CardStore>(
  store: &S,
  user: &User,
  input: NewLink,
) -> Result<SocialLink> {
  let card = store
    .card_by_user(user.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardNotFound)?;

  let url = validate::checked_url(&input.url)?;

  let existing = store
    .links_by_card(card.card_id)
    .await
    .map_err(Error::store)?;

  if existing.iter().any(|l| l.platform == input.platform) {
    return Err(Error::PlatformExists(input.platform));
  }

  let order = input
    .order
    .unwrap_or_else(|| existing.iter().map(|l| l.order + 1).max().unwrap_or(0));

  store
    .insert_link(card.card_id, input.platform, url, order)
    .await
    .map_err(Error::store)
}

/// Update the URL and/or order of a link on the caller's card.
pub async fn update_link<S: CardStore>(
  store: &S,
  user: &User,
  link_id: Uuid,
  url: Option<String>,
  order: Option<u32>,
) -> Result<SocialLink> {
  owned_link(store, user, link_id).await?;

  let url = url.as_deref().map(validate::checked_url).transpose()?;

  store
    .update_link(link_id, url, order)
    .await
    .map_err(Error::store)
}

/// Hard-delete a link on the caller's card.
pub async fn remove_link<S: CardStore>(
  store: &S,
  user: &User,
  link_id: Uuid,
) -> Result<()> {
  owned_link(store, user, link_id).await?;
  store.delete_link(link_id).await.map_err(Error::store)
}

/// Resolve a link and check it hangs off the caller's own card.
async fn owned_link<S: CardStore>(
  store: &S,
  user: &User,
  link_id: Uuid,
) -> Result<SocialLink> {
  let card = store
    .card_by_user(user.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardNotFound)?;

  let link = store
    .link_by_id(link_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::LinkNotFound(link_id))?;

  if link.card_id != card.card_id {
    return Err(Error::NotLinkOwner(link_id));
  }

  Ok(link)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn platform_wire_names_round_trip() {
    for platform in [
      Platform::LinkedIn,
      Platform::GitHub,
      Platform::Twitter,
      Platform::Bluesky,
      Platform::Facebook,
      Platform::Instagram,
      Platform::Portfolio,
      Platform::Custom,
    ] {
      let json = serde_json::to_string(&platform).unwrap();
      assert_eq!(json, format!("\"{}\"", platform.as_str()));
      let back: Platform = serde_json::from_str(&json).unwrap();
      assert_eq!(back, platform);
    }
  }

  #[test]
  fn unknown_platform_is_rejected_at_deserialization() {
    assert!(serde_json::from_str::<Platform>("\"myspace\"").is_err());
  }
}
