//! User — the account record behind a card.
//!
//! Users are created by syncing from the external identity provider;
//! the provider's subject id is the unique key. Authentication itself
//! happens outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:              Uuid,
  /// Identity-provider subject id; one user per subject.
  pub subject:              String,
  pub email:                String,
  pub phone_number:         Option<String>,
  pub onboarding_completed: bool,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
}

/// Input to [`crate::store::CardStore::upsert_user`] — the fields the
/// identity provider reports on each auth event.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySync {
  pub subject:      String,
  pub email:        String,
  pub phone_number: Option<String>,
}

/// Minimal projection returned by the sharing lookups.
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
  pub user_id:      Uuid,
  pub email:        String,
  pub phone_number: Option<String>,
}

impl From<&User> for UserRef {
  fn from(user: &User) -> Self {
    Self {
      user_id:      user.user_id,
      email:        user.email.clone(),
      phone_number: user.phone_number.clone(),
    }
  }
}
