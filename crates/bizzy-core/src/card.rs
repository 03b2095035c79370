//! Card — the shareable business-card record and its registry
//! operations.
//!
//! A user owns at most one card. The public share token is the only
//! credential needed to read it; regenerating the token invalidates
//! every previously distributed link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  store::CardStore,
  token,
  user::User,
  validate,
};

/// Upper bound for attached resume files.
pub const RESUME_LIMIT_MB: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
  pub card_id:          Uuid,
  pub user_id:          Uuid,
  pub share_token:      String,
  pub name:             String,
  /// Stored trimmed and lower-cased.
  pub email:            String,
  pub title:            Option<String>,
  pub phone_number:     Option<String>,
  pub company:          Option<String>,
  pub role:             Option<String>,
  pub bio:              Option<String>,
  pub tags:             Vec<String>,
  pub profile_photo_id: Option<Uuid>,
  pub resume_file_id:   Option<Uuid>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`create_card`], before validation and normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCard {
  pub name:         String,
  pub email:        String,
  pub title:        Option<String>,
  pub phone_number: Option<String>,
  pub company:      Option<String>,
  pub role:         Option<String>,
  pub bio:          Option<String>,
  #[serde(default)]
  pub tags:         Vec<String>,
}

impl NewCard {
  /// Trim every field, lower-case the email, and reject malformed
  /// input. Optional fields that trim to nothing collapse to `None`.
  pub fn validated(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::validation("Name is required"));
    }

    let email = self.email.trim().to_lowercase();
    if !validate::is_valid_email(&email) {
      return Err(Error::validation("Valid email is required"));
    }

    let phone_number = validate::normalize_optional(self.phone_number);
    if let Some(phone) = &phone_number
      && !validate::is_valid_phone(phone)
    {
      return Err(Error::validation("Invalid phone number format"));
    }

    Ok(Self {
      name,
      email,
      phone_number,
      title: validate::normalize_optional(self.title),
      company: validate::normalize_optional(self.company),
      role: validate::normalize_optional(self.role),
      bio: validate::normalize_optional(self.bio),
      tags: self.tags,
    })
  }
}

/// Partial update accepted from callers. `None` leaves a field
/// untouched; optional display fields supplied as empty strings clear
/// the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardPatch {
  pub name:         Option<String>,
  pub email:        Option<String>,
  pub title:        Option<String>,
  pub phone_number: Option<String>,
  pub company:      Option<String>,
  pub role:         Option<String>,
  pub bio:          Option<String>,
  pub tags:         Option<Vec<String>>,
}

/// A validated [`CardPatch`]: the outer `Option` is "was the field
/// supplied", the inner one "set or clear".
#[derive(Debug, Clone, Default)]
pub struct CardChanges {
  pub name:         Option<String>,
  pub email:        Option<String>,
  pub title:        Option<Option<String>>,
  pub phone_number: Option<Option<String>>,
  pub company:      Option<Option<String>>,
  pub role:         Option<Option<String>>,
  pub bio:          Option<Option<String>>,
  pub tags:         Option<Vec<String>>,
}

impl CardPatch {
  pub fn validated(self) -> Result<CardChanges> {
    let name = match self.name {
      Some(name) => {
        let name = name.trim().to_owned();
        if name.is_empty() {
          return Err(Error::validation("Name cannot be empty"));
        }
        Some(name)
      }
      None => None,
    };

    let email = match self.email {
      Some(email) => {
        let email = email.trim().to_lowercase();
        if !validate::is_valid_email(&email) {
          return Err(Error::validation("Invalid email format"));
        }
        Some(email)
      }
      None => None,
    };

    let phone_number = match self.phone_number {
      Some(phone) => {
        let phone = validate::normalize_optional(Some(phone));
        if let Some(phone) = &phone
          && !validate::is_valid_phone(phone)
        {
          return Err(Error::validation("Invalid phone number format"));
        }
        Some(phone)
      }
      None => None,
    };

    Ok(CardChanges {
      name,
      email,
      phone_number,
      title: self.title.map(|v| validate::normalize_optional(Some(v))),
      company: self.company.map(|v| validate::normalize_optional(Some(v))),
      role: self.role.map(|v| validate::normalize_optional(Some(v))),
      bio: self.bio.map(|v| validate::normalize_optional(Some(v))),
      tags: self.tags,
    })
  }
}

// ─── Registry operations ─────────────────────────────────────────────────────

/// Create the caller's card, mint its share token, and mark onboarding
/// complete.
///
/// Fails with [`Error::CardExists`] when the user already owns a card.
pub async fn create_card<S: CardStore>(
  store: &S,
  user: &User,
  input: NewCard,
) -> Result<Card> {
  let input = input.validated()?;

  if store
    .card_by_user(user.user_id)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(Error::CardExists);
  }

  let share_token = unique_share_token(store).await?;

  store
    .insert_card(user.user_id, share_token, input)
    .await
    .map_err(Error::store)
}

/// Mint a share token nobody else holds yet. Exhausting the retry
/// bound is a terminal error.
async fn unique_share_token<S: CardStore>(store: &S) -> Result<String> {
  for _ in 0..token::GENERATION_ATTEMPTS {
    let candidate = token::generate(Utc::now());
    if store
      .card_by_token(&candidate)
      .await
      .map_err(Error::store)?
      .is_none()
    {
      return Ok(candidate);
    }
  }
  Err(Error::ShareTokenExhausted(token::GENERATION_ATTEMPTS))
}

/// Apply a partial update to the caller's card. `updated_at` is always
/// stamped, even for an empty patch.
pub async fn update_card<S: CardStore>(
  store: &S,
  user: &User,
  patch: CardPatch,
) -> Result<Card> {
  let changes = patch.validated()?;
  let card = require_card(store, user).await?;
  store
    .update_card(card.card_id, changes)
    .await
    .map_err(Error::store)
}

/// Replace the card's share token; previously distributed links stop
/// resolving.
pub async fn regenerate_share_token<S: CardStore>(
  store: &S,
  user: &User,
) -> Result<Card> {
  let card = require_card(store, user).await?;
  let share_token = unique_share_token(store).await?;
  store
    .set_share_token(card.card_id, share_token)
    .await
    .map_err(Error::store)
}

/// Attach an uploaded photo to the caller's card.
pub async fn attach_photo<S: CardStore>(
  store: &S,
  user: &User,
  file_id: Uuid,
) -> Result<Card> {
  let card = require_card(store, user).await?;
  require_file(store, file_id).await?;
  store
    .set_card_photo(card.card_id, Some(file_id))
    .await
    .map_err(Error::store)
}

pub async fn remove_photo<S: CardStore>(store: &S, user: &User) -> Result<Card> {
  let card = require_card(store, user).await?;
  store
    .set_card_photo(card.card_id, None)
    .await
    .map_err(Error::store)
}

/// Attach an uploaded resume to the caller's card; rejects blobs over
/// [`RESUME_LIMIT_MB`].
pub async fn attach_resume<S: CardStore>(
  store: &S,
  user: &User,
  file_id: Uuid,
) -> Result<Card> {
  let card = require_card(store, user).await?;
  let file = require_file(store, file_id).await?;

  if file.size_bytes > RESUME_LIMIT_MB * 1024 * 1024 {
    return Err(Error::FileTooLarge {
      limit_mb: RESUME_LIMIT_MB,
    });
  }

  store
    .set_card_resume(card.card_id, Some(file_id))
    .await
    .map_err(Error::store)
}

pub async fn remove_resume<S: CardStore>(store: &S, user: &User) -> Result<Card> {
  let card = require_card(store, user).await?;
  store
    .set_card_resume(card.card_id, None)
    .await
    .map_err(Error::store)
}

async fn require_card<S: CardStore>(store: &S, user: &User) -> Result<Card> {
  store
    .card_by_user(user.user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardNotFound)
}

async fn require_file<S: CardStore>(
  store: &S,
  file_id: Uuid,
) -> Result<crate::file::StoredFile> {
  store
    .file_by_id(file_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::FileNotFound(file_id))
}
