//! Contact Ledger — accepted cards, deduplication, tags, and meeting
//! metadata.
//!
//! Accepting a card either inserts a new contact or merges into an
//! existing one. The dedup policy is a pure function here; the
//! scan-and-write itself runs as one atomic store operation, backed by
//! a uniqueness constraint on (owner, source user).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, card::Card, store::CardStore, user::User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:     Uuid,
  pub owner_id:       Uuid,
  pub source_card_id: Uuid,
  pub source_user_id: Uuid,
  pub accepted_at:    DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  /// The owner's own labels for this contact — distinct from the tags
  /// on the source card.
  pub tags:           Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingMetadata {
  pub metadata_id: Uuid,
  pub contact_id:  Uuid,
  pub date:        DateTime<Utc>,
  pub location:    Option<String>,
  pub notes:       Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`add_meeting_metadata`]. Every field overwrites; partial
/// update is not supported.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingInput {
  pub date:     DateTime<Utc>,
  pub location: Option<String>,
  pub notes:    Option<String>,
}

/// Result of [`accept_card`]: the contact row plus whether an existing
/// row was refreshed rather than a new one inserted.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptOutcome {
  pub contact:   Contact,
  pub is_update: bool,
}

/// A contact joined with its live source card and metadata — the read
/// model, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ContactView {
  pub contact: Contact,
  pub card:    Card,
  pub meeting: Option<MeetingMetadata>,
}

// ─── Dedup policy ────────────────────────────────────────────────────────────

/// One of the owner's existing contacts paired with the contact fields
/// of its live source card. Contacts whose source card no longer
/// resolves are not candidates.
#[derive(Debug, Clone)]
pub struct DedupCandidate {
  pub contact_id:   Uuid,
  pub email:        String,
  pub phone_number: Option<String>,
}

/// Email-first, phone-fallback duplicate scan.
///
/// Candidates are examined in store enumeration order; the first match
/// wins. Emails compare case-insensitively, phone numbers verbatim.
pub fn find_duplicate(
  candidates: &[DedupCandidate],
  email: &str,
  phone_number: Option<&str>,
) -> Option<Uuid> {
  for candidate in candidates {
    if candidate.email.eq_ignore_ascii_case(email) {
      return Some(candidate.contact_id);
    }
  }

  if let Some(phone) = phone_number {
    for candidate in candidates {
      if candidate.phone_number.as_deref() == Some(phone) {
        return Some(candidate.contact_id);
      }
    }
  }

  None
}

// ─── Ledger operations ───────────────────────────────────────────────────────

/// Accept a shared card into the caller's network.
///
/// A duplicate (by the policy above) is refreshed to point at the
/// latest shared card without touching its tags or metadata; otherwise
/// a new contact is inserted with empty tags.
pub async fn accept_card<S: CardStore>(
  store: &S,
  owner: &User,
  source_card_id: Uuid,
  source_user_id: Uuid,
) -> Result<AcceptOutcome> {
  store
    .card_by_id(source_card_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CardNotFound)?;

  store
    .user_by_id(source_user_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::UserNotFound)?;

  if source_user_id == owner.user_id {
    return Err(Error::SelfContact);
  }

  store
    .accept_contact(owner.user_id, source_card_id, source_user_id)
    .await
    .map_err(Error::store)
}

/// Replace the full tag list of an owned contact.
pub async fn update_tags<S: CardStore>(
  store: &S,
  owner: &User,
  contact_id: Uuid,
  tags: Vec<String>,
) -> Result<Contact> {
  owned_contact(store, owner, contact_id).await?;
  store
    .set_contact_tags(contact_id, tags)
    .await
    .map_err(Error::store)
}

/// Create meeting metadata on first write; overwrite all fields on
/// every subsequent one.
pub async fn add_meeting_metadata<S: CardStore>(
  store: &S,
  owner: &User,
  contact_id: Uuid,
  input: MeetingInput,
) -> Result<MeetingMetadata> {
  owned_contact(store, owner, contact_id).await?;
  store
    .upsert_meeting(contact_id, input)
    .await
    .map_err(Error::store)
}

/// Remove an owned contact together with its metadata.
pub async fn remove_contact<S: CardStore>(
  store: &S,
  owner: &User,
  contact_id: Uuid,
) -> Result<()> {
  owned_contact(store, owner, contact_id).await?;
  store.delete_contact(contact_id).await.map_err(Error::store)
}

/// The caller's network, joined with live source cards and metadata.
/// Contacts whose source card was deleted are silently filtered out.
pub async fn list_contacts<S: CardStore>(
  store: &S,
  owner: &User,
) -> Result<Vec<ContactView>> {
  store
    .contact_views_by_owner(owner.user_id)
    .await
    .map_err(Error::store)
}

/// A single owned contact with its joined source card and metadata.
pub async fn contact_detail<S: CardStore>(
  store: &S,
  owner: &User,
  contact_id: Uuid,
) -> Result<ContactView> {
  owned_contact(store, owner, contact_id).await?;
  store
    .contact_view(contact_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ContactNotFound(contact_id))
}

async fn owned_contact<S: CardStore>(
  store: &S,
  owner: &User,
  contact_id: Uuid,
) -> Result<Contact> {
  let contact = store
    .contact_by_id(contact_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ContactNotFound(contact_id))?;

  if contact.owner_id != owner.user_id {
    return Err(Error::NotContactOwner(contact_id));
  }

  Ok(contact)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(email: &str, phone: Option<&str>) -> DedupCandidate {
    DedupCandidate {
      contact_id:   Uuid::new_v4(),
      email:        email.into(),
      phone_number: phone.map(str::to_owned),
    }
  }

  #[test]
  fn email_match_is_case_insensitive() {
    let existing = vec![candidate("Alice@Example.com", None)];
    let hit = find_duplicate(&existing, "alice@example.com", None);
    assert_eq!(hit, Some(existing[0].contact_id));
  }

  #[test]
  fn email_match_wins_over_phone_match() {
    let by_phone = candidate("other@example.com", Some("5551234567"));
    let by_email = candidate("alice@example.com", None);
    let existing = vec![by_phone, by_email.clone()];
    let hit = find_duplicate(&existing, "alice@example.com", Some("5551234567"));
    assert_eq!(hit, Some(by_email.contact_id));
  }

  #[test]
  fn phone_fallback_matches_verbatim() {
    let existing = vec![candidate("old@example.com", Some("5551234567"))];
    let hit = find_duplicate(&existing, "new@example.com", Some("5551234567"));
    assert_eq!(hit, Some(existing[0].contact_id));

    // Differently formatted numbers do not match.
    let miss = find_duplicate(&existing, "new@example.com", Some("555-123-4567"));
    assert_eq!(miss, None);
  }

  #[test]
  fn no_phone_on_new_card_skips_fallback() {
    let existing = vec![candidate("old@example.com", Some("5551234567"))];
    assert_eq!(find_duplicate(&existing, "new@example.com", None), None);
  }

  #[test]
  fn first_match_in_enumeration_order_wins() {
    let first = candidate("dup@example.com", None);
    let second = candidate("dup@example.com", None);
    let existing = vec![first.clone(), second];
    let hit = find_duplicate(&existing, "dup@example.com", None);
    assert_eq!(hit, Some(first.contact_id));
  }
}
