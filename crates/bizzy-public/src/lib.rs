//! Public share surface for BizzyCard.
//!
//! Exposes an axum [`Router`] serving the unauthenticated, CORS-open
//! endpoints a share link or QR scan lands on:
//!
//! - `GET /public/{token}` — read-only card projection (JSON)
//! - `GET /public/{token}/vcf` — vCard 3.0 download
//! - `GET /public/{token}/resume` — attached resume bytes
//! - anything else under `/public/` — `400 Invalid path`
//! - `GET /files/{file_id}` — capability blob download
//!
//! The server binary mounts this next to the private JSON API
//! (`bizzy-api`) under `/api`.

pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{any, get},
};
use bizzy_core::store::{BlobStore, CardStore};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  /// Public base URL share links and blob URLs are minted against.
  pub base_url:            String,
  pub store_path:          PathBuf,
  pub files_dir:           PathBuf,
  /// PHC string the private API verifies gateway bearers against.
  pub gateway_secret_hash: String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all public handlers.
#[derive(Clone)]
pub struct AppState<S, B> {
  pub store:  Arc<S>,
  pub blobs:  Arc<B>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the public router. CORS is wide open — these endpoints exist
/// to be fetched from arbitrary origins.
pub fn public_router<S, B>(state: AppState<S, B>) -> Router
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/public/{token}", get(card_view_route::<S, B>))
    .route("/public/{token}/{action}", get(card_action_route::<S, B>))
    .route("/public", any(invalid_path))
    .route("/public/", any(invalid_path))
    .route("/public/{*rest}", any(invalid_path))
    .route("/files/{file_id}", get(blob_route::<S, B>))
    .layer(CorsLayer::permissive())
    .with_state(state)
}

async fn card_view_route<S, B>(
  State(state): State<AppState<S, B>>,
  Path(token): Path<String>,
) -> Response
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  handlers::view::handler(&state, &token)
    .await
    .into_response_or_err()
}

async fn card_action_route<S, B>(
  State(state): State<AppState<S, B>>,
  Path((token, action)): Path<(String, String)>,
) -> Response
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  match action.as_str() {
    "vcf" => {
      handlers::vcf::handler(&state, &token)
        .await
        .into_response_or_err()
    }
    "resume" => {
      handlers::resume::handler(&state, &token)
        .await
        .into_response_or_err()
    }
    _ => invalid_path().await,
  }
}

async fn blob_route<S, B>(
  State(state): State<AppState<S, B>>,
  Path(file_id): Path<Uuid>,
) -> Response
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  handlers::blob::handler(&state, file_id)
    .await
    .into_response_or_err()
}

async fn invalid_path() -> Response {
  (StatusCode::BAD_REQUEST, "Invalid path").into_response()
}

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self) -> Response;
}

impl IntoResponseOrErr for Result<Response, Error> {
  fn into_response_or_err(self) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.into_response(),
    }
  }
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, header},
  };
  use bizzy_core::{
    card::{Card, NewCard},
    file::NewFile,
    link::Platform,
    store::CardStore as _,
    user::{IdentitySync, User},
  };
  use bizzy_store_sqlite::{DiskBlobStore, SqliteStore};
  use serde_json::Value;
  use tower::ServiceExt as _;

  type TestState = AppState<SqliteStore, DiskBlobStore>;

  async fn make_state() -> (TestState, tempfile::TempDir) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let blobs = DiskBlobStore::open(dir.path()).await.unwrap();

    let state = AppState {
      store:  Arc::new(store),
      blobs:  Arc::new(blobs),
      config: Arc::new(ServerConfig {
        host:                "127.0.0.1".to_string(),
        port:                8080,
        base_url:            "http://localhost:8080".to_string(),
        store_path:          PathBuf::from(":memory:"),
        files_dir:           dir.path().to_path_buf(),
        gateway_secret_hash: String::new(),
      }),
    };
    (state, dir)
  }

  async fn seed_card(state: &TestState, token: &str) -> (User, Card) {
    let user = state
      .store
      .upsert_user(IdentitySync {
        subject:      "alice".into(),
        email:        "alice@co.com".into(),
        phone_number: None,
      })
      .await
      .unwrap();

    let card = state
      .store
      .insert_card(user.user_id, token.to_owned(), NewCard {
        name: "Alice Smith".into(),
        email: "alice@co.com".into(),
        phone_number: Some("+1 (555) 123-4567".into()),
        title: Some("Engineer".into()),
        company: Some("Acme".into()),
        ..NewCard::default()
      })
      .await
      .unwrap();

    state
      .store
      .insert_link(
        card.card_id,
        Platform::GitHub,
        "https://github.com/alice".into(),
        1,
      )
      .await
      .unwrap();
    state
      .store
      .insert_link(
        card.card_id,
        Platform::LinkedIn,
        "https://linkedin.com/in/alice".into(),
        0,
      )
      .await
      .unwrap();

    (user, card)
  }

  async fn get(state: &TestState, uri: &str) -> axum::response::Response {
    let req = Request::builder()
      .method("GET")
      .uri(uri)
      .header(header::ORIGIN, "https://viewer.example")
      .body(Body::empty())
      .unwrap();
    public_router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  // ── Card view ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn card_view_serves_projection_with_sorted_links() {
    let (state, _dir) = make_state().await;
    seed_card(&state, "tok-abc").await;

    let resp = get(&state, "/public/tok-abc").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok()),
      Some("*"),
      "public surface must be CORS-open"
    );

    let json: Value =
      serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let card = &json["card"];
    assert_eq!(card["name"], "Alice Smith");
    assert_eq!(card["email"], "alice@co.com");
    assert_eq!(card["phoneNumber"], "+1 (555) 123-4567");
    assert_eq!(card["company"], "Acme");
    // No blobs attached: the URL keys are omitted entirely.
    assert!(card.get("profilePhotoUrl").is_none());
    assert!(card.get("resumeFileUrl").is_none());
    // Links sorted by order.
    assert_eq!(card["socialLinks"][0]["platform"], "linkedin");
    assert_eq!(card["socialLinks"][1]["platform"], "github");
  }

  #[tokio::test]
  async fn unknown_token_returns_404_with_error_body() {
    let (state, _dir) = make_state().await;
    let resp = get(&state, "/public/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: Value =
      serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "Card not found");
  }

  // ── vCard download ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn vcf_download_has_headers_and_content() {
    let (state, _dir) = make_state().await;
    seed_card(&state, "tok-abc").await;

    let resp = get(&state, "/public/tok-abc/vcf").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok()),
      Some("text/vcard")
    );
    assert_eq!(
      resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok()),
      Some("attachment; filename=\"Alice_Smith.vcf\"")
    );

    let body = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(body.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"));
    assert!(body.contains("FN:Alice Smith\r\n"));
    assert!(body.contains("EMAIL:alice@co.com\r\n"));
    assert!(body.contains("TEL:+15551234567\r\n"), "got:\n{body}");
    assert!(body.contains("URL;TYPE=LINKEDIN:https://linkedin.com/in/alice\r\n"));
    assert!(body.ends_with("END:VCARD\r\n"));
  }

  #[tokio::test]
  async fn vcf_for_unknown_token_returns_404() {
    let (state, _dir) = make_state().await;
    let resp = get(&state, "/public/nope/vcf").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Resume download ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn resume_missing_returns_404() {
    let (state, _dir) = make_state().await;
    seed_card(&state, "tok-abc").await;

    let resp = get(&state, "/public/tok-abc/resume").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json: Value =
      serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["error"], "Resume not found");
  }

  #[tokio::test]
  async fn resume_served_with_stored_content_type_and_name() {
    let (state, _dir) = make_state().await;
    let (_user, card) = seed_card(&state, "tok-abc").await;

    let file_id = Uuid::new_v4();
    bizzy_core::store::BlobStore::write(
      state.blobs.as_ref(),
      file_id,
      b"%PDF-1.7 fake".to_vec(),
    )
    .await
    .unwrap();
    state
      .store
      .record_file(
        file_id,
        NewFile {
          name:       "alice-resume.pdf".into(),
          media_type: "application/pdf".into(),
        },
        13,
      )
      .await
      .unwrap();
    state
      .store
      .set_card_resume(card.card_id, Some(file_id))
      .await
      .unwrap();

    let resp = get(&state, "/public/tok-abc/resume").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok()),
      Some("application/pdf")
    );
    assert_eq!(
      resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok()),
      Some("attachment; filename=\"alice-resume.pdf\"")
    );
    assert_eq!(body_bytes(resp).await, b"%PDF-1.7 fake");
  }

  // ── Invalid paths ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_action_and_deep_paths_return_400() {
    let (state, _dir) = make_state().await;
    seed_card(&state, "tok-abc").await;

    for uri in ["/public/tok-abc/unknown", "/public/a/b/c", "/public/"] {
      let resp = get(&state, uri).await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri {uri}");
    }
  }

  // ── Blob downloads ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn photo_blob_served_by_capability_url() {
    let (state, _dir) = make_state().await;

    let file_id = Uuid::new_v4();
    bizzy_core::store::BlobStore::write(
      state.blobs.as_ref(),
      file_id,
      vec![0x89, 0x50, 0x4e, 0x47],
    )
    .await
    .unwrap();
    state
      .store
      .record_file(
        file_id,
        NewFile {
          name:       "photo.png".into(),
          media_type: "image/png".into(),
        },
        4,
      )
      .await
      .unwrap();

    let resp = get(&state, &format!("/files/{file_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok()),
      Some("image/png")
    );

    let missing = get(&state, &format!("/files/{}", Uuid::new_v4())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
  }
}
