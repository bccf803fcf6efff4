//! Local-disk blob store for souvenir and profile images.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Public URL under which a stored file is served.
    pub fn url_for(&self, id: Uuid) -> String {
        format!("{}/api/storage/{}", self.public_base_url, id)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/storage", self.public_base_url)
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(id.simple().to_string())
    }

    pub async fn write(&self, id: Uuid, bytes: &[u8]) -> std::io::Result<()> {
        self.ensure_root().await?;
        fs::write(self.path_for(id), bytes).await
    }

    pub async fn read(&self, id: Uuid) -> std::io::Result<Vec<u8>> {
        fs::read(self.path_for(id)).await
    }

    /// Removes the blob; a blob that is already gone is not an error.
    pub async fn remove(&self, id: Uuid) -> std::io::Result<()> {
        match fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_strip_trailing_slash() {
        let storage = FileStorage::new("/tmp/unused", "https://shop.example/");
        let id = Uuid::nil();
        assert_eq!(
            storage.url_for(id),
            "https://shop.example/api/storage/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(storage.upload_url(), "https://shop.example/api/storage");
    }

    #[tokio::test]
    async fn write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("blobs"), "http://localhost");
        let id = Uuid::new_v4();

        storage.write(id, b"png-bytes").await.unwrap();
        assert_eq!(storage.read(id).await.unwrap(), b"png-bytes");

        storage.remove(id).await.unwrap();
        assert!(storage.read(id).await.is_err());
        // second removal is a no-op
        storage.remove(id).await.unwrap();
    }
}
