//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Tag lists are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use bizzy_core::{
  card::Card,
  contact::{Contact, MeetingMetadata},
  file::StoredFile,
  link::{Platform, SocialLink},
  user::User,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Platform ────────────────────────────────────────────────────────────────

pub fn encode_platform(p: Platform) -> &'static str { p.as_str() }

pub fn decode_platform(s: &str) -> Result<Platform> {
  match s {
    "linkedin" => Ok(Platform::LinkedIn),
    "github" => Ok(Platform::GitHub),
    "twitter" => Ok(Platform::Twitter),
    "bluesky" => Ok(Platform::Bluesky),
    "facebook" => Ok(Platform::Facebook),
    "instagram" => Ok(Platform::Instagram),
    "portfolio" => Ok(Platform::Portfolio),
    "custom" => Ok(Platform::Custom),
    other => Err(Error::UnknownPlatform(other.to_owned())),
  }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:              String,
  pub subject:              String,
  pub email:                String,
  pub phone_number:         Option<String>,
  pub onboarding_completed: bool,
  pub created_at:           String,
  pub updated_at:           String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:              decode_uuid(&self.user_id)?,
      subject:              self.subject,
      email:                self.email,
      phone_number:         self.phone_number,
      onboarding_completed: self.onboarding_completed,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `cards` row.
pub struct RawCard {
  pub card_id:          String,
  pub user_id:          String,
  pub share_token:      String,
  pub name:             String,
  pub email:            String,
  pub title:            Option<String>,
  pub phone_number:     Option<String>,
  pub company:          Option<String>,
  pub role:             Option<String>,
  pub bio:              Option<String>,
  pub tags:             String,
  pub profile_photo_id: Option<String>,
  pub resume_file_id:   Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawCard {
  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      card_id:          decode_uuid(&self.card_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      share_token:      self.share_token,
      name:             self.name,
      email:            self.email,
      title:            self.title,
      phone_number:     self.phone_number,
      company:          self.company,
      role:             self.role,
      bio:              self.bio,
      tags:             decode_tags(&self.tags)?,
      profile_photo_id: self
        .profile_photo_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      resume_file_id:   self
        .resume_file_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `social_links` row.
pub struct RawLink {
  pub link_id:    String,
  pub card_id:    String,
  pub platform:   String,
  pub url:        String,
  pub position:   u32,
  pub created_at: String,
}

impl RawLink {
  pub fn into_link(self) -> Result<SocialLink> {
    Ok(SocialLink {
      link_id:    decode_uuid(&self.link_id)?,
      card_id:    decode_uuid(&self.card_id)?,
      platform:   decode_platform(&self.platform)?,
      url:        self.url,
      order:      self.position,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:     String,
  pub owner_id:       String,
  pub source_card_id: String,
  pub source_user_id: String,
  pub accepted_at:    String,
  pub updated_at:     String,
  pub tags:           String,
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:     decode_uuid(&self.contact_id)?,
      owner_id:       decode_uuid(&self.owner_id)?,
      source_card_id: decode_uuid(&self.source_card_id)?,
      source_user_id: decode_uuid(&self.source_user_id)?,
      accepted_at:    decode_dt(&self.accepted_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      tags:           decode_tags(&self.tags)?,
    })
  }
}

/// Raw strings read directly from a `meeting_metadata` row.
pub struct RawMeeting {
  pub metadata_id: String,
  pub contact_id:  String,
  pub date:        String,
  pub location:    Option<String>,
  pub notes:       Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawMeeting {
  pub fn into_meeting(self) -> Result<MeetingMetadata> {
    Ok(MeetingMetadata {
      metadata_id: decode_uuid(&self.metadata_id)?,
      contact_id:  decode_uuid(&self.contact_id)?,
      date:        decode_dt(&self.date)?,
      location:    self.location,
      notes:       self.notes,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `files` row.
pub struct RawFile {
  pub file_id:    String,
  pub name:       String,
  pub media_type: String,
  pub size_bytes: u64,
  pub created_at: String,
}

impl RawFile {
  pub fn into_file(self) -> Result<StoredFile> {
    Ok(StoredFile {
      file_id:    decode_uuid(&self.file_id)?,
      name:       self.name,
      media_type: self.media_type,
      size_bytes: self.size_bytes,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
