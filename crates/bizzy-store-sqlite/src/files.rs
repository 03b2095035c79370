//! [`DiskBlobStore`] — blob bytes on the local filesystem.
//!
//! Each blob is a single file named by its UUID under the configured
//! root directory. Metadata (name, media type, size) lives in SQLite,
//! not here.

use std::{io, path::PathBuf};

use bizzy_core::store::BlobStore;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DiskBlobStore {
  root: PathBuf,
}

impl DiskBlobStore {
  /// Open a blob store rooted at `root`, creating the directory if
  /// needed.
  pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
    let root = root.into();
    tokio::fs::create_dir_all(&root).await?;
    Ok(Self { root })
  }

  fn blob_path(&self, file_id: Uuid) -> PathBuf {
    self.root.join(file_id.hyphenated().to_string())
  }
}

impl BlobStore for DiskBlobStore {
  type Error = io::Error;

  async fn write(&self, file_id: Uuid, bytes: Vec<u8>) -> io::Result<()> {
    tokio::fs::write(self.blob_path(file_id), bytes).await
  }

  async fn read(&self, file_id: Uuid) -> io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(self.blob_path(file_id)).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = DiskBlobStore::open(dir.path()).await.unwrap();

    let id = Uuid::new_v4();
    blobs.write(id, b"resume bytes".to_vec()).await.unwrap();

    let back = blobs.read(id).await.unwrap();
    assert_eq!(back.as_deref(), Some(b"resume bytes".as_slice()));
  }

  #[tokio::test]
  async fn missing_blob_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = DiskBlobStore::open(dir.path()).await.unwrap();
    assert!(blobs.read(Uuid::new_v4()).await.unwrap().is_none());
  }
}
