//! Loading source documents into the chunk store.
//!
//! PDF files (by `.pdf` extension) contribute the extracted text of each page.
//! Other files are read as UTF-8 text and split into pages on form feed
//! characters; a file without form feeds is a single page. Every non-empty
//! page becomes one chunk.

use lopdf::Document;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::embedding::Embedder;
use super::store::{append_chunks, load_chunks, Chunk};
use crate::error::RetrievalError;

/// What an ingest run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// New chunks written to the store
    pub added: usize,
    /// Pages skipped because identical text was already stored
    pub skipped: usize,
    /// Chunks in the store after the run
    pub total: usize,
}

/// Split document text into trimmed, non-empty pages.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracted text of every page of a PDF, in page order.
///
/// A page whose text cannot be extracted comes back empty and is dropped
/// with the other blank pages.
pub fn pdf_pages(bytes: &[u8]) -> Result<Vec<String>, RetrievalError> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| RetrievalError::Store(format!("failed to parse PDF: {e}")))?;

    Ok(doc
        .get_pages()
        .into_keys()
        .map(|number| {
            doc.extract_text(&[number]).unwrap_or_else(|e| {
                warn!(page = number, error = %e, "Could not extract page text");
                String::new()
            })
        })
        .collect())
}

/// Read one source file as a list of trimmed, non-empty pages.
pub async fn read_pages(file: &Path) -> Result<Vec<String>, RetrievalError> {
    let is_pdf = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            RetrievalError::Store(format!("failed to read {}: {e}", file.display()))
        })?;
        let pages = tokio::task::spawn_blocking(move || pdf_pages(&bytes))
            .await
            .map_err(|e| RetrievalError::Store(format!("PDF extraction panicked: {e}")))??;

        Ok(pages
            .iter()
            .map(|page| page.trim())
            .filter(|page| !page.is_empty())
            .map(str::to_string)
            .collect())
    } else {
        let text = tokio::fs::read_to_string(file).await.map_err(|e| {
            RetrievalError::Store(format!("failed to read {}: {e}", file.display()))
        })?;
        Ok(split_pages(&text))
    }
}

/// Read, split, embed and append every file in `files`.
///
/// Ids continue as `doc_id_<n>` after the chunks already stored. A page whose
/// text is already present is skipped, so re-ingesting the same file is a no-op.
pub async fn ingest_files(
    store_path: &Path,
    files: &[PathBuf],
    embedder: &dyn Embedder,
) -> Result<IngestReport, RetrievalError> {
    let existing = match load_chunks(store_path).await {
        Ok(chunks) => chunks,
        Err(RetrievalError::NotInitialized(_)) => {
            info!(path = %store_path.display(), "Document store not found. Creating...");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let mut seen: HashSet<String> = existing.iter().map(|c| c.text.clone()).collect();
    let mut next_id = existing.len() + 1;
    let mut report = IngestReport::default();

    let mut pending: Vec<(String, String)> = Vec::new();
    for file in files {
        let pages = read_pages(file).await?;
        if pages.is_empty() {
            warn!(file = %file.display(), "No text found, skipping file");
            continue;
        }
        info!(file = %file.display(), pages = pages.len(), "Chunked document");

        for page in pages {
            if seen.insert(page.clone()) {
                pending.push((file.display().to_string(), page));
            } else {
                report.skipped += 1;
            }
        }
    }

    if !pending.is_empty() {
        let texts: Vec<String> = pending.iter().map(|(_, text)| text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let chunks: Vec<Chunk> = pending
            .into_iter()
            .zip(embeddings)
            .map(|((source, text), embedding)| {
                let chunk = Chunk {
                    id: format!("doc_id_{next_id}"),
                    source,
                    text,
                    embedding,
                };
                next_id += 1;
                chunk
            })
            .collect();

        append_chunks(store_path, &chunks).await?;
        report.added = chunks.len();
    }

    report.total = existing.len() + report.added;
    info!(
        added = report.added,
        skipped = report.skipped,
        total = report.total,
        "Ingest complete"
    );

    Ok(report)
}
