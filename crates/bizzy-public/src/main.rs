//! BizzyCard server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens
//! the SQLite record store and the on-disk blob store, and serves the
//! public share surface at `/` plus the private JSON API under `/api`.
//!
//! # Gateway secret generation
//!
//! To generate the argon2 PHC string for `gateway_secret_hash` in
//! config.toml:
//!
//! ```
//! cargo run -p bizzy-public --bin server -- --hash-secret
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use bizzy_api::{ApiState, AuthConfig, api_router};
use bizzy_public::{AppState, ServerConfig, public_router};
use bizzy_store_sqlite::{DiskBlobStore, SqliteStore};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "BizzyCard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a secret entered on stdin and exit.
  #[arg(long)]
  hash_secret: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a gateway secret and exit.
  if cli.hash_secret {
    let secret = read_secret_from_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("BIZZY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in storage paths.
  let store_path = expand_tilde(&server_cfg.store_path);
  let files_dir = expand_tilde(&server_cfg.files_dir);

  // Open the record store and the blob store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let blobs = DiskBlobStore::open(&files_dir)
    .await
    .with_context(|| format!("failed to open blob store at {files_dir:?}"))?;

  let store = Arc::new(store);
  let blobs = Arc::new(blobs);

  // Build application state for both surfaces.
  let public_state = AppState {
    store:  store.clone(),
    blobs:  blobs.clone(),
    config: Arc::new(server_cfg.clone()),
  };
  let api_state = ApiState {
    store,
    blobs,
    auth: Arc::new(AuthConfig {
      gateway_secret_hash: server_cfg.gateway_secret_hash.clone(),
    }),
    base_url: Arc::new(server_cfg.base_url.clone()),
  };

  let app = public_router(public_state)
    .nest("/api", api_router(api_state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a secret from stdin.
fn read_secret_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
