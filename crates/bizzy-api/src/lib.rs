//! Authenticated JSON API for BizzyCard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`bizzy_core::store::CardStore`] + [`bizzy_core::store::BlobStore`]
//! pair. TLS and transport concerns are the caller's responsibility;
//! end-user authentication is delegated to the external identity
//! provider (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bizzy_api::api_router(state))
//! ```

pub mod auth;
pub mod cards;
pub mod contacts;
pub mod error;
pub mod files;
pub mod links;
pub mod sharing;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use bizzy_core::{
  Error,
  store::{BlobStore, CardStore},
  user::User,
};

pub use auth::AuthConfig;
pub use error::ApiError;

use auth::Identity;

/// Uploads may exceed the resume cap (the cap is enforced at attach
/// time with a clean error), but not by much.
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S, B> {
  pub store:    Arc<S>,
  pub blobs:    Arc<B>,
  pub auth:     Arc<AuthConfig>,
  /// Public base URL used to mint share links and download URLs.
  pub base_url: Arc<String>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, B>(state: ApiState<S, B>) -> Router<()>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Users
    .route("/users/sync", post(users::sync::<S, B>))
    .route("/users/me", get(users::me::<S, B>))
    .route("/users/lookup", get(users::lookup::<S, B>))
    // Cards
    .route("/cards", post(cards::create::<S, B>))
    .route("/cards/me", get(cards::me::<S, B>).patch(cards::update::<S, B>))
    .route("/cards/me/regenerate-token", post(cards::regenerate_token::<S, B>))
    .route(
      "/cards/me/photo",
      axum::routing::put(cards::set_photo::<S, B>)
        .delete(cards::remove_photo::<S, B>),
    )
    .route(
      "/cards/me/resume",
      axum::routing::put(cards::set_resume::<S, B>)
        .delete(cards::remove_resume::<S, B>),
    )
    .route("/cards/by-token/{token}", get(cards::by_token::<S, B>))
    .route("/cards/{card_id}/links", get(cards::links::<S, B>))
    // Social links
    .route("/links", post(links::add::<S, B>))
    .route(
      "/links/{id}",
      axum::routing::patch(links::update::<S, B>)
        .delete(links::remove::<S, B>),
    )
    // Contacts
    .route("/contacts", get(contacts::list::<S, B>))
    .route("/contacts/accept", post(contacts::accept::<S, B>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S, B>).delete(contacts::remove::<S, B>),
    )
    .route("/contacts/{id}/tags", axum::routing::put(contacts::set_tags::<S, B>))
    .route(
      "/contacts/{id}/meeting",
      axum::routing::put(contacts::set_meeting::<S, B>),
    )
    // Sharing facade
    .route("/share/link", get(sharing::link::<S, B>))
    .route("/share/send", post(sharing::send::<S, B>))
    // Files
    .route("/files", post(files::upload::<S, B>))
    .route("/files/{id}/url", get(files::download_url::<S, B>))
    .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
    .with_state(state)
}

/// Resolve the caller's user record from a verified identity.
///
/// A subject the identity provider never synced cannot be resolved to
/// a user, which reads as unauthenticated.
pub(crate) async fn resolve_caller<S, B>(
  state: &ApiState<S, B>,
  identity: &Identity,
) -> Result<User, ApiError>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  state
    .store
    .user_by_subject(&identity.subject)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError(Error::Unauthenticated))
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bizzy_store_sqlite::{DiskBlobStore, SqliteStore};
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  type TestState = ApiState<SqliteStore, DiskBlobStore>;

  const SECRET: &str = "gateway-secret";

  async fn make_state() -> (TestState, tempfile::TempDir) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let blobs = DiskBlobStore::open(dir.path()).await.unwrap();

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(SECRET.as_bytes(), &salt)
      .unwrap()
      .to_string();

    let state = ApiState {
      store:    Arc::new(store),
      blobs:    Arc::new(blobs),
      auth:     Arc::new(AuthConfig {
        gateway_secret_hash: hash,
      }),
      base_url: Arc::new("http://localhost:8080".to_string()),
    };
    (state, dir)
  }

  async fn send_raw(
    state: &TestState,
    method: &str,
    uri: &str,
    subject: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, format!("Bearer {SECRET}"));
    if let Some(subject) = subject {
      builder = builder.header("x-identity-subject", subject);
    }
    let req = match body {
      Some(value) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    api_router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn sync_user(state: &TestState, subject: &str, email: &str) -> Value {
    let resp = send_raw(
      state,
      "POST",
      "/users/sync",
      None,
      Some(json!({ "subject": subject, "email": email })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
  }

  async fn create_card(
    state: &TestState,
    subject: &str,
    body: Value,
  ) -> axum::response::Response {
    send_raw(state, "POST", "/cards", Some(subject), Some(body)).await
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_bearer_returns_401() {
    let (state, _dir) = make_state().await;
    let req = Request::builder()
      .method("GET")
      .uri("/users/me")
      .body(Body::empty())
      .unwrap();
    let resp = api_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_secret_returns_401() {
    let (state, _dir) = make_state().await;
    let req = Request::builder()
      .method("GET")
      .uri("/users/me")
      .header(header::AUTHORIZATION, "Bearer wrong")
      .header("x-identity-subject", "sub-1")
      .body(Body::empty())
      .unwrap();
    let resp = api_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unsynced_subject_reads_as_unauthenticated() {
    let (state, _dir) = make_state().await;
    let resp = send_raw(&state, "GET", "/cards/me", Some("ghost"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Users ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_then_me_round_trips() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;

    let resp = send_raw(&state, "GET", "/users/me", Some("sub-1"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me = body_json(resp).await;
    assert_eq!(me["subject"], "sub-1");
    assert_eq!(me["email"], "a@example.com");
    assert_eq!(me["onboarding_completed"], false);
  }

  // ── Card registry ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_card_then_resolve_by_token() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;

    let resp = create_card(
      &state,
      "sub-1",
      json!({ "name": "  Alice  ", "email": "Alice@Co.COM" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let card = body_json(resp).await;
    assert_eq!(card["name"], "Alice");
    assert_eq!(card["email"], "alice@co.com");
    let token = card["share_token"].as_str().unwrap().to_owned();

    let resp = send_raw(
      &state,
      "GET",
      &format!("/cards/by-token/{token}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["name"], "Alice");
    assert_eq!(fetched["email"], "alice@co.com");

    // Creating the card completes onboarding.
    let me =
      body_json(send_raw(&state, "GET", "/users/me", Some("sub-1"), None).await)
        .await;
    assert_eq!(me["onboarding_completed"], true);
  }

  #[tokio::test]
  async fn second_card_returns_409() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;

    let first =
      create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second =
      create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn malformed_email_rejected_and_nothing_written() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;

    for email in ["no-at-sign", "missing@dot"] {
      let resp = create_card(
        &state,
        "sub-1",
        json!({ "name": "Alice", "email": email }),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "email {email:?}");
    }

    let resp = send_raw(&state, "GET", "/cards/me", Some("sub-1"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "no card written");
  }

  #[tokio::test]
  async fn malformed_phone_rejected() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;

    let resp = create_card(
      &state,
      "sub-1",
      json!({ "name": "Alice", "email": "a@b.com", "phone_number": "12345" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn regenerate_token_invalidates_old_links() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    let card = body_json(
      create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
        .await,
    )
    .await;
    let old_token = card["share_token"].as_str().unwrap().to_owned();

    let resp = send_raw(
      &state,
      "POST",
      "/cards/me/regenerate-token",
      Some("sub-1"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let regenerated = body_json(resp).await;
    assert_ne!(regenerated["share_token"], old_token.as_str());

    let resp = send_raw(
      &state,
      "GET",
      &format!("/cards/by-token/{old_token}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Social links ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_platform_returns_409() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
      .await;

    let first = send_raw(
      &state,
      "POST",
      "/links",
      Some("sub-1"),
      Some(json!({ "platform": "github", "url": "https://github.com/a" })),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let link = body_json(first).await;
    // Order auto-assigned from an empty list.
    assert_eq!(link["order"], 0);

    let second = send_raw(
      &state,
      "POST",
      "/links",
      Some("sub-1"),
      Some(json!({ "platform": "github", "url": "https://github.com/b" })),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn non_http_url_rejected() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
      .await;

    let resp = send_raw(
      &state,
      "POST",
      "/links",
      Some("sub-1"),
      Some(json!({ "platform": "github", "url": "ftp://github.com/a" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Sharing + contact ledger ────────────────────────────────────────────────

  #[tokio::test]
  async fn end_to_end_lookup_send_and_accept() {
    let (state, _dir) = make_state().await;

    // User A creates a card.
    let alice = sync_user(&state, "alice", "alice@co.com").await;
    let alice_card = body_json(
      create_card(
        &state,
        "alice",
        json!({ "name": "Alice", "email": "alice@co.com" }),
      )
      .await,
    )
    .await;

    // User B looks A up by email.
    sync_user(&state, "bob", "bob@co.com").await;
    create_card(&state, "bob", json!({ "name": "Bob", "email": "bob@co.com" }))
      .await;
    let found = body_json(
      send_raw(&state, "GET", "/users/lookup?email=alice@co.com", None, None)
        .await,
    )
    .await;
    assert_eq!(found["user_id"], alice["user_id"]);

    // Send is a validated no-op acknowledgement.
    let ack = send_raw(
      &state,
      "POST",
      "/share/send",
      Some("bob"),
      Some(json!({ "recipient_user_id": alice["user_id"] })),
    )
    .await;
    assert_eq!(ack.status(), StatusCode::OK);
    assert_eq!(body_json(ack).await["success"], true);

    // Independently, B resolves A's share token (QR scan) and accepts.
    let token = alice_card["share_token"].as_str().unwrap();
    let resolved = body_json(
      send_raw(&state, "GET", &format!("/cards/by-token/{token}"), None, None)
        .await,
    )
    .await;

    let outcome = body_json(
      send_raw(
        &state,
        "POST",
        "/contacts/accept",
        Some("bob"),
        Some(json!({
          "source_card_id": resolved["card_id"],
          "source_user_id": alice["user_id"],
        })),
      )
      .await,
    )
    .await;
    assert_eq!(outcome["is_update"], false);

    let contacts =
      body_json(send_raw(&state, "GET", "/contacts", Some("bob"), None).await)
        .await;
    assert_eq!(contacts.as_array().unwrap().len(), 1);
    assert_eq!(contacts[0]["card"]["name"], "Alice");
  }

  #[tokio::test]
  async fn accept_twice_merges_and_preserves_tags() {
    let (state, _dir) = make_state().await;
    let alice = sync_user(&state, "alice", "alice@co.com").await;
    let alice_card = body_json(
      create_card(
        &state,
        "alice",
        json!({ "name": "Alice", "email": "alice@co.com" }),
      )
      .await,
    )
    .await;
    sync_user(&state, "bob", "bob@co.com").await;

    let accept_body = json!({
      "source_card_id": alice_card["card_id"],
      "source_user_id": alice["user_id"],
    });

    let first = body_json(
      send_raw(
        &state,
        "POST",
        "/contacts/accept",
        Some("bob"),
        Some(accept_body.clone()),
      )
      .await,
    )
    .await;
    assert_eq!(first["is_update"], false);
    let contact_id = first["contact"]["contact_id"].as_str().unwrap().to_owned();

    let tagged = send_raw(
      &state,
      "PUT",
      &format!("/contacts/{contact_id}/tags"),
      Some("bob"),
      Some(json!({ "tags": ["conference"] })),
    )
    .await;
    assert_eq!(tagged.status(), StatusCode::OK);

    let second = body_json(
      send_raw(
        &state,
        "POST",
        "/contacts/accept",
        Some("bob"),
        Some(accept_body),
      )
      .await,
    )
    .await;
    assert_eq!(second["is_update"], true);
    assert_eq!(second["contact"]["contact_id"], contact_id.as_str());
    assert_eq!(second["contact"]["tags"], json!(["conference"]));
  }

  #[tokio::test]
  async fn self_accept_returns_400() {
    let (state, _dir) = make_state().await;
    let alice = sync_user(&state, "alice", "alice@co.com").await;
    let alice_card = body_json(
      create_card(
        &state,
        "alice",
        json!({ "name": "Alice", "email": "alice@co.com" }),
      )
      .await,
    )
    .await;

    let resp = send_raw(
      &state,
      "POST",
      "/contacts/accept",
      Some("alice"),
      Some(json!({
        "source_card_id": alice_card["card_id"],
        "source_user_id": alice["user_id"],
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn send_without_card_returns_412() {
    let (state, _dir) = make_state().await;
    let alice = sync_user(&state, "alice", "alice@co.com").await;
    sync_user(&state, "bob", "bob@co.com").await;

    let resp = send_raw(
      &state,
      "POST",
      "/share/send",
      Some("bob"),
      Some(json!({ "recipient_user_id": alice["user_id"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
  }

  #[tokio::test]
  async fn share_link_uses_public_base_url() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    let card = body_json(
      create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
        .await,
    )
    .await;
    let token = card["share_token"].as_str().unwrap();

    let link = body_json(
      send_raw(&state, "GET", "/share/link", Some("sub-1"), None).await,
    )
    .await;
    let expected = format!("http://localhost:8080/public/{token}");
    assert_eq!(link["url"], expected.as_str());
    assert_eq!(link["qr_data"], expected.as_str());
  }

  // ── Files ───────────────────────────────────────────────────────────────────

  async fn upload(
    state: &TestState,
    subject: &str,
    name: &str,
    media_type: &str,
    bytes: Vec<u8>,
  ) -> Value {
    let req = Request::builder()
      .method("POST")
      .uri(format!("/files?name={name}&media_type={media_type}"))
      .header(header::AUTHORIZATION, format!("Bearer {SECRET}"))
      .header("x-identity-subject", subject)
      .body(Body::from(bytes))
      .unwrap();
    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }

  #[tokio::test]
  async fn upload_attach_photo_and_mint_download_url() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
      .await;

    let file =
      upload(&state, "sub-1", "photo.png", "image/png", vec![0u8; 128]).await;
    assert_eq!(file["size_bytes"], 128);
    let file_id = file["file_id"].as_str().unwrap().to_owned();

    let resp = send_raw(
      &state,
      "PUT",
      "/cards/me/photo",
      Some("sub-1"),
      Some(json!({ "file_id": file_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let card = body_json(resp).await;
    assert_eq!(card["profile_photo_id"], file_id.as_str());

    let url = body_json(
      send_raw(
        &state,
        "GET",
        &format!("/files/{file_id}/url"),
        Some("sub-1"),
        None,
      )
      .await,
    )
    .await;
    assert_eq!(
      url["url"],
      format!("http://localhost:8080/files/{file_id}").as_str()
    );
  }

  #[tokio::test]
  async fn oversized_resume_rejected_at_attach() {
    let (state, _dir) = make_state().await;
    sync_user(&state, "sub-1", "a@example.com").await;
    create_card(&state, "sub-1", json!({ "name": "A", "email": "a@b.com" }))
      .await;

    let big = vec![0u8; 10 * 1024 * 1024 + 1];
    let file =
      upload(&state, "sub-1", "resume.pdf", "application/pdf", big).await;

    let resp = send_raw(
      &state,
      "PUT",
      "/cards/me/resume",
      Some("sub-1"),
      Some(json!({ "file_id": file["file_id"] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // A card never gains a resume reference from a failed attach.
    let card =
      body_json(send_raw(&state, "GET", "/cards/me", Some("sub-1"), None).await)
        .await;
    assert!(card["resume_file_id"].is_null());
  }
}
