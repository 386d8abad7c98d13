//! Artifact storage: durable home for stitched audio.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::error::{PodforgeError, Result};

/// Write-once artifact store. `put` returns a URL the artifact can be
/// fetched from.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Filesystem-backed artifact store returning `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    base_dir: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mpeg" => "mp3",
        "application/json" => "json",
        _ => "bin",
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(&self, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        if bytes.is_empty() {
            return Err(PodforgeError::Validation(
                "Artifact payload cannot be empty".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.base_dir).await?;
        let file_name = format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            extension_for(content_type)
        );
        let path = self.base_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), size = bytes.len(), "stored artifact");
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_names_by_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        let url = store.put(vec![1, 2, 3], "audio/wav").await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".wav"));

        let path = url.strip_prefix("file://").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn rejects_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        assert!(store.put(Vec::new(), "audio/wav").await.is_err());
    }
}
