//! Card Sharing Facade — share artifacts, inbound lookups, and the
//! public card projection.
//!
//! A share link is `base_url + "/public/" + share_token`; the token is
//! the only secret. QR payloads carry the same URL.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  card::Card,
  file,
  link::{Platform, SocialLink},
  store::CardStore,
  user::{User, UserRef},
};

/// The share URL distributed via link or QR code. No expiry, no
/// signature; regeneration is the revocation mechanism.
pub fn share_link_url(base_url: &str, share_token: &str) -> String {
  format!("{}/public/{share_token}", base_url.trim_end_matches('/'))
}

/// Data to encode into a QR code — identical to the share URL.
pub fn qr_code_data(base_url: &str, share_token: &str) -> String {
  share_link_url(base_url, share_token)
}

/// Acknowledgement returned by [`send_card`].
#[derive(Debug, Clone, Serialize)]
pub struct SendAck {
  pub success: bool,
}

/// Validate an in-app send and acknowledge it.
///
/// No pending-request record is written; the hand-off happens out of
/// band (QR scan or lookup, then accept).
pub async fn send_card<S: CardStore>(
  store: &S,
  sender: &User,
  recipient_user_id: Uuid,
) -> Result<SendAck> {
  store
    .user_by_id(recipient_user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::RecipientNotFound(recipient_user_id))?;

  if recipient_user_id == sender.user_id {
    return Err(Error::SelfSend);
  }

  store
    .card_by_user(sender.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardRequired)?;

  Ok(SendAck { success: true })
}

/// Exact-match user lookup by email, for in-app sharing.
pub async fn lookup_by_email<S: CardStore>(
  store: &S,
  email: &str,
) -> Result<Option<UserRef>> {
  Ok(
    store
      .user_by_email(email)
      .await
      .map_err(Error::store)?
      .as_ref()
      .map(UserRef::from),
  )
}

/// Exact-match user lookup by phone number, for in-app sharing.
pub async fn lookup_by_phone<S: CardStore>(
  store: &S,
  phone_number: &str,
) -> Result<Option<UserRef>> {
  Ok(
    store
      .user_by_phone(phone_number)
      .await
      .map_err(Error::store)?
      .as_ref()
      .map(UserRef::from),
  )
}

// ─── Public projection ───────────────────────────────────────────────────────

/// A social link as exposed to public viewers.
#[derive(Debug, Clone, Serialize)]
pub struct PublicLink {
  pub platform: Platform,
  pub url:      String,
}

/// The read-only card projection served to public viewers and fed to
/// the vCard serializer. Field names follow the public wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCard {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone_number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub role: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  pub tags: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile_photo_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resume_file_url: Option<String>,
  pub social_links: Vec<PublicLink>,
}

impl PublicCard {
  /// Assemble the projection from a card and its sorted links. Blob
  /// URLs are resolved only when the corresponding blob id is present.
  pub fn assemble(base_url: &str, card: &Card, links: &[SocialLink]) -> Self {
    Self {
      name:              card.name.clone(),
      title:             card.title.clone(),
      email:             card.email.clone(),
      phone_number:      card.phone_number.clone(),
      company:           card.company.clone(),
      role:              card.role.clone(),
      bio:               card.bio.clone(),
      tags:              card.tags.clone(),
      profile_photo_url: card
        .profile_photo_id
        .map(|id| file::download_url(base_url, id)),
      resume_file_url:   card
        .resume_file_id
        .map(|id| file::download_url(base_url, id)),
      social_links:      links
        .iter()
        .map(|l| PublicLink {
          platform: l.platform,
          url:      l.url.clone(),
        })
        .collect(),
    }
  }
}
