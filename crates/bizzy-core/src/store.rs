//! The `CardStore` and `BlobStore` traits.
//!
//! Implemented by storage backends (e.g. `bizzy-store-sqlite`). Higher
//! layers (`bizzy-api`, `bizzy-public`) depend on these abstractions,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  card::{Card, CardChanges, NewCard},
  contact::{AcceptOutcome, Contact, ContactView, MeetingInput, MeetingMetadata},
  file::{NewFile, StoredFile},
  link::{Platform, SocialLink},
  user::{IdentitySync, User},
};

// ─── Record store ────────────────────────────────────────────────────────────

/// Abstraction over a BizzyCard record store backend.
///
/// Workflow preconditions (ownership, validation, self-reference
/// checks) live in the operation modules; this trait carries the
/// storage-level invariants — one card per user, unique share tokens,
/// one platform per card, one contact per (owner, source user) — and
/// the atomic accept operation.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create or refresh the user row for an identity-provider subject.
  /// Existing rows keep their onboarding flag; email and phone are
  /// overwritten with the provider's latest values.
  fn upsert_user(
    &self,
    input: IdentitySync,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn user_by_subject<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn user_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn user_by_phone<'a>(
    &'a self,
    phone_number: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Insert a validated card and mark the owner's onboarding complete,
  /// as one atomic unit.
  fn insert_card(
    &self,
    user_id: Uuid,
    share_token: String,
    input: NewCard,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn card_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  fn card_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  fn card_by_token<'a>(
    &'a self,
    share_token: &'a str,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + 'a;

  /// Apply a validated partial update and stamp `updated_at`.
  fn update_card(
    &self,
    card_id: Uuid,
    changes: CardChanges,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn set_share_token(
    &self,
    card_id: Uuid,
    share_token: String,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn set_card_photo(
    &self,
    card_id: Uuid,
    file_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn set_card_resume(
    &self,
    card_id: Uuid,
    file_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  // ── Social links ──────────────────────────────────────────────────────

  fn insert_link(
    &self,
    card_id: Uuid,
    platform: Platform,
    url: String,
    order: u32,
  ) -> impl Future<Output = Result<SocialLink, Self::Error>> + Send + '_;

  fn link_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<SocialLink>, Self::Error>> + Send + '_;

  /// Ascending by display order.
  fn links_by_card(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SocialLink>, Self::Error>> + Send + '_;

  fn update_link(
    &self,
    link_id: Uuid,
    url: Option<String>,
    order: Option<u32>,
  ) -> impl Future<Output = Result<SocialLink, Self::Error>> + Send + '_;

  fn delete_link(
    &self,
    link_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Run the email-first/phone-fallback dedup scan and the resulting
  /// insert-or-patch as one atomic unit. A matched duplicate has its
  /// source card/user refreshed and `updated_at` stamped; tags and
  /// metadata stay untouched.
  fn accept_contact(
    &self,
    owner_id: Uuid,
    source_card_id: Uuid,
    source_user_id: Uuid,
  ) -> impl Future<Output = Result<AcceptOutcome, Self::Error>> + Send + '_;

  fn contact_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Full replacement of the tag list; stamps `updated_at`.
  fn set_contact_tags(
    &self,
    contact_id: Uuid,
    tags: Vec<String>,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Create-and-link on first write; overwrite every field thereafter.
  fn upsert_meeting(
    &self,
    contact_id: Uuid,
    input: MeetingInput,
  ) -> impl Future<Output = Result<MeetingMetadata, Self::Error>> + Send + '_;

  /// Delete the contact and any metadata row that hangs off it.
  fn delete_contact(
    &self,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Joined read model; `None` when the contact or its source card is
  /// gone.
  fn contact_view(
    &self,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactView>, Self::Error>> + Send + '_;

  /// Joined list view; contacts whose source card was deleted are
  /// silently filtered out.
  fn contact_views_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ContactView>, Self::Error>> + Send + '_;

  // ── Files ─────────────────────────────────────────────────────────────

  /// Record blob metadata under a caller-supplied id — the same id the
  /// bytes were written under in the [`BlobStore`].
  fn record_file(
    &self,
    file_id: Uuid,
    input: NewFile,
    size_bytes: u64,
  ) -> impl Future<Output = Result<StoredFile, Self::Error>> + Send + '_;

  fn file_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StoredFile>, Self::Error>> + Send + '_;
}

// ─── Blob store ──────────────────────────────────────────────────────────────

/// Abstraction over blob-byte persistence. Metadata lives in the
/// [`CardStore`]; this trait only moves bytes.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn write(
    &self,
    file_id: Uuid,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `None` when no blob was ever written under `file_id`.
  fn read(
    &self,
    file_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;
}
