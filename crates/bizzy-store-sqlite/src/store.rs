//! [`SqliteStore`] — the SQLite implementation of [`CardStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use bizzy_core::{
  card::{Card, CardChanges, NewCard},
  contact::{
    AcceptOutcome, Contact, ContactView, DedupCandidate, MeetingInput,
    MeetingMetadata, find_duplicate,
  },
  file::{NewFile, StoredFile},
  link::{Platform, SocialLink},
  store::CardStore,
  user::{IdentitySync, User},
};

use crate::{
  Error, Result,
  encode::{
    RawCard, RawContact, RawFile, RawLink, RawMeeting, RawUser, encode_dt,
    encode_platform, encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists and row mappers ────────────────────────────────────────────

const USER_COLS: &str = "user_id, subject, email, phone_number, \
                         onboarding_completed, created_at, updated_at";

const CARD_COLS: &str = "card_id, user_id, share_token, name, email, title, \
                         phone_number, company, role, bio, tags, \
                         profile_photo_id, resume_file_id, created_at, \
                         updated_at";

const LINK_COLS: &str = "link_id, card_id, platform, url, position, created_at";

const CONTACT_COLS: &str = "contact_id, owner_id, source_card_id, \
                            source_user_id, accepted_at, updated_at, tags";

const MEETING_COLS: &str =
  "metadata_id, contact_id, date, location, notes, created_at, updated_at";

const FILE_COLS: &str = "file_id, name, media_type, size_bytes, created_at";

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:              row.get(0)?,
    subject:              row.get(1)?,
    email:                row.get(2)?,
    phone_number:         row.get(3)?,
    onboarding_completed: row.get(4)?,
    created_at:           row.get(5)?,
    updated_at:           row.get(6)?,
  })
}

fn card_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCard> {
  Ok(RawCard {
    card_id:          row.get(0)?,
    user_id:          row.get(1)?,
    share_token:      row.get(2)?,
    name:             row.get(3)?,
    email:            row.get(4)?,
    title:            row.get(5)?,
    phone_number:     row.get(6)?,
    company:          row.get(7)?,
    role:             row.get(8)?,
    bio:              row.get(9)?,
    tags:             row.get(10)?,
    profile_photo_id: row.get(11)?,
    resume_file_id:   row.get(12)?,
    created_at:       row.get(13)?,
    updated_at:       row.get(14)?,
  })
}

fn link_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLink> {
  Ok(RawLink {
    link_id:    row.get(0)?,
    card_id:    row.get(1)?,
    platform:   row.get(2)?,
    url:        row.get(3)?,
    position:   row.get(4)?,
    created_at: row.get(5)?,
  })
}

fn contact_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContact> {
  Ok(RawContact {
    contact_id:     row.get(0)?,
    owner_id:       row.get(1)?,
    source_card_id: row.get(2)?,
    source_user_id: row.get(3)?,
    accepted_at:    row.get(4)?,
    updated_at:     row.get(5)?,
    tags:           row.get(6)?,
  })
}

fn meeting_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMeeting> {
  Ok(RawMeeting {
    metadata_id: row.get(0)?,
    contact_id:  row.get(1)?,
    date:        row.get(2)?,
    location:    row.get(3)?,
    notes:       row.get(4)?,
    created_at:  row.get(5)?,
    updated_at:  row.get(6)?,
  })
}

fn file_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFile> {
  Ok(RawFile {
    file_id:    row.get(0)?,
    name:       row.get(1)?,
    media_type: row.get(2)?,
    size_bytes: row.get(3)?,
    created_at: row.get(4)?,
  })
}

// ─── Synchronous fetch helpers (used inside `conn.call` closures) ────────────

fn fetch_card(
  conn: &rusqlite::Connection,
  card_id: &str,
) -> rusqlite::Result<Option<RawCard>> {
  conn
    .query_row(
      &format!("SELECT {CARD_COLS} FROM cards WHERE card_id = ?1"),
      rusqlite::params![card_id],
      card_row,
    )
    .optional()
}

fn fetch_contact(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLS} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![contact_id],
      contact_row,
    )
    .optional()
}

fn fetch_meeting_by_contact(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> rusqlite::Result<Option<RawMeeting>> {
  conn
    .query_row(
      &format!("SELECT {MEETING_COLS} FROM meeting_metadata WHERE contact_id = ?1"),
      rusqlite::params![contact_id],
      meeting_row,
    )
    .optional()
}

/// Lift a non-SQL error out of a `conn.call` closure.
fn other_err<E>(e: E) -> tokio_rusqlite::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A BizzyCard record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row SELECT and decode through `into`.
  async fn query_optional<R, T>(
    &self,
    sql: String,
    param: String,
    map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
    into: fn(R) -> Result<T>,
  ) -> Result<Option<T>>
  where
    R: Send + 'static,
    T: Send + 'static,
  {
    let raw: Option<R> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], map)
            .optional()?,
        )
      })
      .await?;

    raw.map(into).transpose()
  }
}

// ─── CardStore impl ──────────────────────────────────────────────────────────

impl CardStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn upsert_user(&self, input: IdentitySync) -> Result<User> {
    let candidate_id = encode_uuid(Uuid::new_v4());
    let now_str = encode_dt(Utc::now());

    let raw: RawUser = self
      .conn
      .call(move |conn| {
        let existing: Option<String> = conn
          .query_row(
            "SELECT user_id FROM users WHERE subject = ?1",
            rusqlite::params![input.subject],
            |r| r.get(0),
          )
          .optional()?;

        let user_id = match existing {
          Some(user_id) => {
            conn.execute(
              "UPDATE users SET email = ?1, phone_number = ?2, updated_at = ?3
               WHERE user_id = ?4",
              rusqlite::params![
                input.email,
                input.phone_number,
                now_str,
                user_id
              ],
            )?;
            user_id
          }
          None => {
            conn.execute(
              "INSERT INTO users (
                 user_id, subject, email, phone_number,
                 onboarding_completed, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
              rusqlite::params![
                candidate_id,
                input.subject,
                input.email,
                input.phone_number,
                now_str
              ],
            )?;
            candidate_id
          }
        };

        Ok(conn.query_row(
          &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
          rusqlite::params![user_id],
          user_row,
        )?)
      })
      .await?;

    raw.into_user()
  }

  async fn user_by_subject(&self, subject: &str) -> Result<Option<User>> {
    self
      .query_optional(
        format!("SELECT {USER_COLS} FROM users WHERE subject = ?1"),
        subject.to_owned(),
        user_row,
        RawUser::into_user,
      )
      .await
  }

  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    self
      .query_optional(
        format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
        encode_uuid(id),
        user_row,
        RawUser::into_user,
      )
      .await
  }

  async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
    self
      .query_optional(
        format!("SELECT {USER_COLS} FROM users WHERE email = ?1"),
        email.to_owned(),
        user_row,
        RawUser::into_user,
      )
      .await
  }

  async fn user_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
    self
      .query_optional(
        format!("SELECT {USER_COLS} FROM users WHERE phone_number = ?1"),
        phone_number.to_owned(),
        user_row,
        RawUser::into_user,
      )
      .await
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn insert_card(
    &self,
    user_id: Uuid,
    share_token: String,
    input: NewCard,
  ) -> Result<Card> {
    let now = Utc::now();
    let card = Card {
      card_id: Uuid::new_v4(),
      user_id,
      share_token,
      name: input.name,
      email: input.email,
      title: input.title,
      phone_number: input.phone_number,
      company: input.company,
      role: input.role,
      bio: input.bio,
      tags: input.tags,
      profile_photo_id: None,
      resume_file_id: None,
      created_at: now,
      updated_at: now,
    };

    let card_id_str = encode_uuid(card.card_id);
    let user_id_str = encode_uuid(user_id);
    let now_str     = encode_dt(now);
    let tags_str    = encode_tags(&card.tags)?;
    let insert      = card.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO cards (
             card_id, user_id, share_token, name, email, title,
             phone_number, company, role, bio, tags, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
          rusqlite::params![
            card_id_str,
            user_id_str,
            insert.share_token,
            insert.name,
            insert.email,
            insert.title,
            insert.phone_number,
            insert.company,
            insert.role,
            insert.bio,
            tags_str,
            now_str,
          ],
        )?;

        // Onboarding completes with the card; already-complete users
        // keep their timestamps.
        tx.execute(
          "UPDATE users SET onboarding_completed = 1, updated_at = ?1
           WHERE user_id = ?2 AND onboarding_completed = 0",
          rusqlite::params![now_str, user_id_str],
        )?;

        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(card)
  }

  async fn card_by_id(&self, id: Uuid) -> Result<Option<Card>> {
    self
      .query_optional(
        format!("SELECT {CARD_COLS} FROM cards WHERE card_id = ?1"),
        encode_uuid(id),
        card_row,
        RawCard::into_card,
      )
      .await
  }

  async fn card_by_user(&self, user_id: Uuid) -> Result<Option<Card>> {
    self
      .query_optional(
        format!("SELECT {CARD_COLS} FROM cards WHERE user_id = ?1"),
        encode_uuid(user_id),
        card_row,
        RawCard::into_card,
      )
      .await
  }

  async fn card_by_token(&self, share_token: &str) -> Result<Option<Card>> {
    self
      .query_optional(
        format!("SELECT {CARD_COLS} FROM cards WHERE share_token = ?1"),
        share_token.to_owned(),
        card_row,
        RawCard::into_card,
      )
      .await
  }

  async fn update_card(
    &self,
    card_id: Uuid,
    changes: CardChanges,
  ) -> Result<Card> {
    let id_str  = encode_uuid(card_id);
    let now_str = encode_dt(Utc::now());
    let tags_str = changes.tags.as_deref().map(encode_tags).transpose()?;

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        let Some(row) = fetch_card(conn, &id_str)? else {
          return Ok(None);
        };

        let name  = changes.name.unwrap_or(row.name);
        let email = changes.email.unwrap_or(row.email);
        let title = changes.title.unwrap_or(row.title);
        let phone_number = changes.phone_number.unwrap_or(row.phone_number);
        let company = changes.company.unwrap_or(row.company);
        let role = changes.role.unwrap_or(row.role);
        let bio = changes.bio.unwrap_or(row.bio);
        let tags = tags_str.unwrap_or(row.tags);

        conn.execute(
          "UPDATE cards SET name = ?1, email = ?2, title = ?3,
             phone_number = ?4, company = ?5, role = ?6, bio = ?7,
             tags = ?8, updated_at = ?9
           WHERE card_id = ?10",
          rusqlite::params![
            name, email, title, phone_number, company, role, bio, tags,
            now_str, id_str
          ],
        )?;

        fetch_card(conn, &id_str).map_err(Into::into)
      })
      .await?;

    raw
      .ok_or(Error::RowNotFound(card_id))
      .and_then(RawCard::into_card)
  }

  async fn set_share_token(
    &self,
    card_id: Uuid,
    share_token: String,
  ) -> Result<Card> {
    self
      .patch_card(
        card_id,
        "UPDATE cards SET share_token = ?1, updated_at = ?2 WHERE card_id = ?3",
        Some(share_token),
      )
      .await
  }

  async fn set_card_photo(
    &self,
    card_id: Uuid,
    file_id: Option<Uuid>,
  ) -> Result<Card> {
    self
      .patch_card(
        card_id,
        "UPDATE cards SET profile_photo_id = ?1, updated_at = ?2 WHERE card_id = ?3",
        file_id.map(encode_uuid),
      )
      .await
  }

  async fn set_card_resume(
    &self,
    card_id: Uuid,
    file_id: Option<Uuid>,
  ) -> Result<Card> {
    self
      .patch_card(
        card_id,
        "UPDATE cards SET resume_file_id = ?1, updated_at = ?2 WHERE card_id = ?3",
        file_id.map(encode_uuid),
      )
      .await
  }

  // ── Social links ──────────────────────────────────────────────────────────

  async fn insert_link(
    &self,
    card_id: Uuid,
    platform: Platform,
    url: String,
    order: u32,
  ) -> Result<SocialLink> {
    let now = Utc::now();
    let link = SocialLink {
      link_id: Uuid::new_v4(),
      card_id,
      platform,
      url,
      order,
      created_at: now,
    };

    let link_id_str = encode_uuid(link.link_id);
    let card_id_str = encode_uuid(card_id);
    let platform_str = encode_platform(platform).to_owned();
    let url_str = link.url.clone();
    let now_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO social_links (
             link_id, card_id, platform, url, position, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            link_id_str,
            card_id_str,
            platform_str,
            url_str,
            order,
            now_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(link)
  }

  async fn link_by_id(&self, id: Uuid) -> Result<Option<SocialLink>> {
    self
      .query_optional(
        format!("SELECT {LINK_COLS} FROM social_links WHERE link_id = ?1"),
        encode_uuid(id),
        link_row,
        RawLink::into_link,
      )
      .await
  }

  async fn links_by_card(&self, card_id: Uuid) -> Result<Vec<SocialLink>> {
    let card_id_str = encode_uuid(card_id);

    let raws: Vec<RawLink> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LINK_COLS} FROM social_links
           WHERE card_id = ?1 ORDER BY position ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![card_id_str], link_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLink::into_link).collect()
  }

  async fn update_link(
    &self,
    link_id: Uuid,
    url: Option<String>,
    order: Option<u32>,
  ) -> Result<SocialLink> {
    let id_str = encode_uuid(link_id);

    let raw: Option<RawLink> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            &format!("SELECT {LINK_COLS} FROM social_links WHERE link_id = ?1"),
            rusqlite::params![id_str],
            link_row,
          )
          .optional()?;
        let Some(row) = existing else {
          return Ok(None);
        };

        let url = url.unwrap_or(row.url);
        let position = order.unwrap_or(row.position);

        conn.execute(
          "UPDATE social_links SET url = ?1, position = ?2 WHERE link_id = ?3",
          rusqlite::params![url, position, id_str],
        )?;

        Ok(
          conn
            .query_row(
              &format!("SELECT {LINK_COLS} FROM social_links WHERE link_id = ?1"),
              rusqlite::params![id_str],
              link_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::RowNotFound(link_id))
      .and_then(RawLink::into_link)
  }

  async fn delete_link(&self, link_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(link_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM social_links WHERE link_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn accept_contact(
    &self,
    owner_id: Uuid,
    source_card_id: Uuid,
    source_user_id: Uuid,
  ) -> Result<AcceptOutcome> {
    let owner_str = encode_uuid(owner_id);
    let card_str = encode_uuid(source_card_id);
    let user_str = encode_uuid(source_user_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let now_str = encode_dt(Utc::now());

    let result: Option<(RawContact, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Contact fields of the card being accepted.
        let source: Option<(String, Option<String>)> = tx
          .query_row(
            "SELECT email, phone_number FROM cards WHERE card_id = ?1",
            rusqlite::params![card_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((src_email, src_phone)) = source else {
          return Ok(None);
        };

        // Dedup scan: the owner's contacts joined with their live
        // source cards, in enumeration order. Contacts whose card was
        // deleted drop out of the join and are not candidates.
        let candidates: Vec<DedupCandidate> = {
          let mut stmt = tx.prepare(
            "SELECT c.contact_id, k.email, k.phone_number
             FROM contacts c
             JOIN cards k ON k.card_id = c.source_card_id
             WHERE c.owner_id = ?1",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![owner_str], |r| {
              Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, Option<String>>(2)?,
              ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          rows
            .into_iter()
            .map(|(id, email, phone_number)| {
              Ok(DedupCandidate {
                contact_id: Uuid::parse_str(&id).map_err(other_err)?,
                email,
                phone_number,
              })
            })
            .collect::<std::result::Result<_, tokio_rusqlite::Error>>()?
        };

        let policy_match =
          find_duplicate(&candidates, &src_email, src_phone.as_deref())
            .map(encode_uuid);

        // The (owner, source user) invariant also covers accepts whose
        // earlier contact the policy scan cannot see because its source
        // card was deleted; without this the UNIQUE constraint would
        // reject the insert.
        let duplicate = match policy_match {
          Some(id) => Some(id),
          None => tx
            .query_row(
              "SELECT contact_id FROM contacts
               WHERE owner_id = ?1 AND source_user_id = ?2",
              rusqlite::params![owner_str, user_str],
              |r| r.get::<_, String>(0),
            )
            .optional()?,
        };

        let (contact_id_str, is_update) = match duplicate {
          Some(existing_str) => {
            tx.execute(
              "UPDATE contacts SET source_card_id = ?1, source_user_id = ?2,
                 updated_at = ?3
               WHERE contact_id = ?4",
              rusqlite::params![card_str, user_str, now_str, existing_str],
            )?;
            (existing_str, true)
          }
          None => {
            tx.execute(
              "INSERT INTO contacts (
                 contact_id, owner_id, source_card_id, source_user_id,
                 accepted_at, updated_at, tags
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?5, '[]')",
              rusqlite::params![new_id_str, owner_str, card_str, user_str, now_str],
            )?;
            (new_id_str, false)
          }
        };

        let raw = fetch_contact(&tx, &contact_id_str)?;
        tx.commit()?;
        Ok(raw.map(|raw| (raw, is_update)))
      })
      .await?;

    let (raw, is_update) = result.ok_or(Error::RowNotFound(source_card_id))?;
    Ok(AcceptOutcome {
      contact: raw.into_contact()?,
      is_update,
    })
  }

  async fn contact_by_id(&self, id: Uuid) -> Result<Option<Contact>> {
    self
      .query_optional(
        format!("SELECT {CONTACT_COLS} FROM contacts WHERE contact_id = ?1"),
        encode_uuid(id),
        contact_row,
        RawContact::into_contact,
      )
      .await
  }

  async fn set_contact_tags(
    &self,
    contact_id: Uuid,
    tags: Vec<String>,
  ) -> Result<Contact> {
    let id_str = encode_uuid(contact_id);
    let now_str = encode_dt(Utc::now());
    let tags_str = encode_tags(&tags)?;

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contacts SET tags = ?1, updated_at = ?2 WHERE contact_id = ?3",
          rusqlite::params![tags_str, now_str, id_str],
        )?;
        fetch_contact(conn, &id_str).map_err(Into::into)
      })
      .await?;

    raw
      .ok_or(Error::RowNotFound(contact_id))
      .and_then(RawContact::into_contact)
  }

  async fn upsert_meeting(
    &self,
    contact_id: Uuid,
    input: MeetingInput,
  ) -> Result<MeetingMetadata> {
    let contact_str = encode_uuid(contact_id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let now_str = encode_dt(Utc::now());
    let date_str = encode_dt(input.date);

    let raw: Option<RawMeeting> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing = fetch_meeting_by_contact(&tx, &contact_str)?;
        match existing {
          Some(row) => {
            // Overwrite-only contract: every field is replaced.
            tx.execute(
              "UPDATE meeting_metadata SET date = ?1, location = ?2,
                 notes = ?3, updated_at = ?4
               WHERE metadata_id = ?5",
              rusqlite::params![
                date_str,
                input.location,
                input.notes,
                now_str,
                row.metadata_id
              ],
            )?;
          }
          None => {
            tx.execute(
              "INSERT INTO meeting_metadata (
                 metadata_id, contact_id, date, location, notes,
                 created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
              rusqlite::params![
                new_id_str,
                contact_str,
                date_str,
                input.location,
                input.notes,
                now_str
              ],
            )?;
            // The first metadata write also stamps the contact.
            tx.execute(
              "UPDATE contacts SET updated_at = ?1 WHERE contact_id = ?2",
              rusqlite::params![now_str, contact_str],
            )?;
          }
        }

        let raw = fetch_meeting_by_contact(&tx, &contact_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw
      .ok_or(Error::RowNotFound(contact_id))
      .and_then(RawMeeting::into_meeting)
  }

  async fn delete_contact(&self, contact_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(contact_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM meeting_metadata WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM contacts WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn contact_view(&self, contact_id: Uuid) -> Result<Option<ContactView>> {
    let id_str = encode_uuid(contact_id);

    let raw: Option<(RawContact, RawCard, Option<RawMeeting>)> = self
      .conn
      .call(move |conn| {
        let Some(contact) = fetch_contact(conn, &id_str)? else {
          return Ok(None);
        };
        // A deleted source card tombstones the contact.
        let Some(card) = fetch_card(conn, &contact.source_card_id)? else {
          return Ok(None);
        };
        let meeting = fetch_meeting_by_contact(conn, &id_str)?;
        Ok(Some((contact, card, meeting)))
      })
      .await?;

    raw
      .map(|(contact, card, meeting)| {
        Ok(ContactView {
          contact: contact.into_contact()?,
          card:    card.into_card()?,
          meeting: meeting.map(RawMeeting::into_meeting).transpose()?,
        })
      })
      .transpose()
  }

  async fn contact_views_by_owner(
    &self,
    owner_id: Uuid,
  ) -> Result<Vec<ContactView>> {
    let owner_str = encode_uuid(owner_id);

    let raws: Vec<(RawContact, RawCard, Option<RawMeeting>)> = self
      .conn
      .call(move |conn| {
        let contacts: Vec<RawContact> = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLS} FROM contacts WHERE owner_id = ?1"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![owner_str], contact_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        let mut views = Vec::with_capacity(contacts.len());
        for contact in contacts {
          // Silently filter contacts whose source card was deleted.
          let Some(card) = fetch_card(conn, &contact.source_card_id)? else {
            continue;
          };
          let meeting = fetch_meeting_by_contact(conn, &contact.contact_id)?;
          views.push((contact, card, meeting));
        }
        Ok(views)
      })
      .await?;

    raws
      .into_iter()
      .map(|(contact, card, meeting)| {
        Ok(ContactView {
          contact: contact.into_contact()?,
          card:    card.into_card()?,
          meeting: meeting.map(RawMeeting::into_meeting).transpose()?,
        })
      })
      .collect()
  }

  // ── Files ─────────────────────────────────────────────────────────────────

  async fn record_file(
    &self,
    file_id: Uuid,
    input: NewFile,
    size_bytes: u64,
  ) -> Result<StoredFile> {
    let now = Utc::now();
    let file = StoredFile {
      file_id,
      name: input.name,
      media_type: input.media_type,
      size_bytes,
      created_at: now,
    };

    let id_str = encode_uuid(file_id);
    let name = file.name.clone();
    let media_type = file.media_type.clone();
    let now_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO files (file_id, name, media_type, size_bytes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, media_type, size_bytes, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(file)
  }

  async fn file_by_id(&self, id: Uuid) -> Result<Option<StoredFile>> {
    self
      .query_optional(
        format!("SELECT {FILE_COLS} FROM files WHERE file_id = ?1"),
        encode_uuid(id),
        file_row,
        RawFile::into_file,
      )
      .await
  }
}

// ─── Test support ────────────────────────────────────────────────────────────

#[cfg(test)]
impl SqliteStore {
  /// Simulate an out-of-band card deletion; no public operation deletes
  /// cards, but contacts must tombstone when one disappears.
  pub(crate) async fn delete_card(&self, card_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(card_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM social_links WHERE card_id = ?1",
          rusqlite::params![id_str],
        )?;
        conn.execute(
          "DELETE FROM cards WHERE card_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Shared card-patch helper ────────────────────────────────────────────────

impl SqliteStore {
  /// Run a single-column card UPDATE (`?1` value, `?2` stamp, `?3` id)
  /// and return the refreshed row.
  async fn patch_card(
    &self,
    card_id: Uuid,
    sql: &'static str,
    value: Option<String>,
  ) -> Result<Card> {
    let id_str = encode_uuid(card_id);
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        if fetch_card(conn, &id_str)?.is_none() {
          return Ok(None);
        }
        conn.execute(sql, rusqlite::params![value, now_str, id_str])?;
        fetch_card(conn, &id_str).map_err(Into::into)
      })
      .await?;

    raw
      .ok_or(Error::RowNotFound(card_id))
      .and_then(RawCard::into_card)
  }
}
