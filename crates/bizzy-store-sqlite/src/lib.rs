//! SQLite backend for the BizzyCard store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Blob bytes live on disk
//! next to the database ([`DiskBlobStore`]); only metadata is kept in
//! SQLite.

mod encode;
mod files;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use files::DiskBlobStore;
pub use store::SqliteStore;
