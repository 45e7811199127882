//! Document store: the working location uploads pass through while they are extracted.
//!
//! Uploads are saved, read back for extraction, then removed. Keys are namespaced with
//! a UUID and the client filename is sanitized, so two uploads never collide and a
//! filename can never escape the upload directory.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Fallback name for uploads whose filename sanitizes to nothing.
const DEFAULT_FILENAME: &str = "document";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists `bytes` and returns the key to read them back with.
    async fn save(&self, filename: &str, bytes: Bytes) -> Result<String>;
    async fn load(&self, key: &str) -> Result<Bytes>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Reduces a client-supplied filename to a safe single path component.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn namespaced_key(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(filename))
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryDocumentStore {
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, filename: &str, bytes: Bytes) -> Result<String> {
        let key = namespaced_key(filename);
        self.documents.write().await.insert(key.clone(), bytes);
        Ok(key)
    }

    async fn load(&self, key: &str) -> Result<Bytes> {
        self.documents
            .read()
            .await
            .get(key)
            .cloned()
            .with_context(|| format!("Document '{key}' is not in the store"))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.documents.write().await.remove(key);
        Ok(())
    }
}

/// Writes uploads under a directory on disk.
pub struct DiskDocumentStore {
    root: PathBuf,
}

impl DiskDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_filename(key))
    }
}

#[async_trait]
impl DocumentStore for DiskDocumentStore {
    async fn save(&self, filename: &str, bytes: Bytes) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create upload dir {}", self.root.display()))?;

        let key = namespaced_key(filename);
        let path = self.path_for(&key);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;
        debug!("Stored upload at {}", path.display());
        Ok(key)
    }

    async fn load(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read upload {}", path.display()))?;
        Ok(Bytes::from(bytes))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove upload {}", path.display())),
        }
    }
}
