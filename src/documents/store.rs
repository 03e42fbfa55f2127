//! JSONL chunk store and the vector retriever built on it.
//!
//! Each line of the store file is one [`Chunk`]. The whole file is loaded
//! into memory on first query and ranked by brute-force cosine similarity,
//! which is plenty for a single document collection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::embedding::{cosine_similarity, Embedder};
use super::DocumentRetriever;
use crate::error::RetrievalError;

/// One embedded piece of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Read every chunk from a store file.
///
/// A missing file means nothing has been ingested yet.
pub async fn load_chunks(path: &Path) -> Result<Vec<Chunk>, RetrievalError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RetrievalError::NotInitialized(path.display().to_string()));
        }
        Err(e) => return Err(RetrievalError::Store(format!("failed to read store: {e}"))),
    };

    data.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| {
                RetrievalError::Store(format!("invalid chunk on line {}: {e}", n + 1))
            })
        })
        .collect()
}

/// Append chunks to a store file, creating it (and its directory) if needed.
pub async fn append_chunks(path: &Path, chunks: &[Chunk]) -> Result<(), RetrievalError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RetrievalError::Store(format!("failed to create dir: {e}")))?;
    }

    let mut buf = String::new();
    for chunk in chunks {
        let line = serde_json::to_string(chunk)
            .map_err(|e| RetrievalError::Store(format!("failed to serialize chunk: {e}")))?;
        buf.push_str(&line);
        buf.push('\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| RetrievalError::Store(format!("failed to open store: {e}")))?;
    file.write_all(buf.as_bytes())
        .await
        .map_err(|e| RetrievalError::Store(format!("failed to write store: {e}")))?;
    file.flush()
        .await
        .map_err(|e| RetrievalError::Store(format!("failed to flush store: {e}")))?;

    Ok(())
}

/// Length and modification time of the store file when it was loaded.
///
/// `ingest` only ever appends, so a change in either means new chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoreStamp {
    len: u64,
    modified: Option<SystemTime>,
}

struct LoadedStore {
    stamp: StoreStamp,
    chunks: Arc<Vec<Chunk>>,
}

/// Similarity search over a chunk store file.
pub struct VectorRetriever {
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    cache: RwLock<Option<LoadedStore>>,
}

impl VectorRetriever {
    /// Create a retriever; the store is read lazily on the first query.
    ///
    /// The loaded chunks are kept in memory and re-read whenever the file's
    /// length or modification time changes, so a long-running server sees
    /// chunks added by a later ingest.
    pub fn new(path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            path: path.into(),
            embedder,
            cache: RwLock::new(None),
        }
    }

    async fn stamp(&self) -> Result<StoreStamp, RetrievalError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(StoreStamp {
                len: meta.len(),
                modified: meta.modified().ok(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                RetrievalError::NotInitialized(self.path.display().to_string()),
            ),
            Err(e) => Err(RetrievalError::Store(format!("failed to stat store: {e}"))),
        }
    }

    async fn chunks(&self) -> Result<Arc<Vec<Chunk>>, RetrievalError> {
        let stamp = self.stamp().await?;

        if let Some(loaded) = self.cache.read().await.as_ref() {
            if loaded.stamp == stamp {
                return Ok(Arc::clone(&loaded.chunks));
            }
        }

        let mut slot = self.cache.write().await;
        if let Some(loaded) = slot.as_ref() {
            if loaded.stamp == stamp {
                return Ok(Arc::clone(&loaded.chunks));
            }
        }

        let chunks = Arc::new(load_chunks(&self.path).await?);
        info!(path = %self.path.display(), count = chunks.len(), "Document store loaded");
        *slot = Some(LoadedStore {
            stamp,
            chunks: Arc::clone(&chunks),
        });
        Ok(chunks)
    }
}

#[async_trait]
impl DocumentRetriever for VectorRetriever {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let chunks = self.chunks().await?;
        let query = self.embedder.embed(text).await?;

        // Vectors from another embedding backend cannot be compared
        if let Some(stored) = chunks.iter().find(|c| c.embedding.len() != query.len()) {
            return Err(RetrievalError::Store(format!(
                "embedding dimension mismatch: store has {}, query has {}; re-run ingest",
                stored.embedding.len(),
                query.len()
            )));
        }

        let mut scored: Vec<(f32, &Chunk)> = chunks
            .iter()
            .map(|c| (cosine_similarity(&query, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(
            k,
            ids = ?scored.iter().map(|(_, c)| c.id.as_str()).collect::<Vec<_>>(),
            "Retrieved chunks"
        );

        Ok(scored.into_iter().map(|(_, c)| c.text.clone()).collect())
    }
}
