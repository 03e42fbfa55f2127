//! # Documents Module
//!
//! The private document collection: the [`DocumentRetriever`] seam the
//! document agent queries, a JSONL vector store behind it, embedders, and
//! the ingest step that fills the store.

use async_trait::async_trait;

use crate::error::RetrievalError;

pub mod embedding;
pub mod ingest;
pub mod store;

pub use embedding::{cosine_similarity, Embedder, HashEmbedder, OllamaEmbedder};
pub use ingest::{ingest_files, pdf_pages, read_pages, split_pages, IngestReport};
pub use store::{Chunk, VectorRetriever};

/// Similarity query against the document collection.
#[async_trait]
pub trait DocumentRetriever: Send + Sync {
    /// Return the text of the `k` chunks most similar to `text`, best first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<String>, RetrievalError>;
}
