//! retrieve_information tool - term-overlap retrieval over local documents
//!
//! Documents are `.txt` and `.md` files under a directory tree, split into
//! paragraph chunks. A chunk scores one point per distinct query term it
//! contains; stop words and single characters are ignored.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};

use super::Tool;
use crate::error::{Result, RoutrError};

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from", "how", "i", "in", "is", "it",
    "me", "my", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "where", "which", "who", "why",
    "will", "with", "you", "your",
];

const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// A paragraph of a source document
#[derive(Debug, Clone)]
struct Chunk {
    source: String,
    text: String,
    terms: HashSet<String>,
}

/// A chunk returned from a search, with its score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredChunk {
    pub source: String,
    pub text: String,
    pub score: usize,
}

/// In-memory chunk index over a document directory
#[derive(Debug, Default)]
pub struct DocumentStore {
    chunks: Vec<Chunk>,
}

impl DocumentStore {
    /// Load every document under `dir`, in path order
    ///
    /// Files that cannot be read are skipped; text that is not valid UTF-8
    /// is decoded lossily.
    pub async fn load(dir: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(dir)
            .await
            .map_err(|e| tool_io_error("Failed to access", dir, e))?;
        if !exists {
            return Err(RoutrError::Tool(format!("Document directory not found: {}", dir.display())));
        }

        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&current)
                .await
                .map_err(|e| tool_io_error("Failed to read directory", &current, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| tool_io_error("Failed to read directory", &current, e))?
            {
                let path = entry.path();
                match entry.file_type().await {
                    Ok(file_type) if file_type.is_dir() => pending.push(path),
                    Ok(_) if is_document(&path) => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("DocumentStore: skipping {}: {}", path.display(), e),
                }
            }
        }
        files.sort();

        let mut store = Self::default();
        for path in files {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("DocumentStore: skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);
            let source = path.strip_prefix(dir).unwrap_or(path.as_path()).display().to_string();
            store.add_document(&source, &content);
        }

        debug!("DocumentStore: loaded {} chunks from {}", store.len(), dir.display());
        Ok(store)
    }

    /// Split a document into paragraph chunks and index them
    pub fn add_document(&mut self, source: &str, content: &str) {
        for paragraph in content.split("\n\n") {
            let text = paragraph.trim();
            if text.is_empty() {
                continue;
            }
            self.chunks.push(Chunk {
                source: source.to_string(),
                text: text.to_string(),
                terms: terms(text),
            });
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top `k` chunks sharing at least one term with the query; ties keep document order
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let score = query_terms.intersection(&chunk.terms).count();
                (score > 0).then(|| ScoredChunk {
                    source: chunk.source.clone(),
                    text: chunk.text.clone(),
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(k);
        scored
    }
}

fn tool_io_error(action: &str, path: &Path, error: std::io::Error) -> RoutrError {
    RoutrError::Tool(format!("{} {}: {}", action, path.display(), error))
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Distinct lower-cased content words
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Retrieve passages from the local document collection
pub struct RetrievalTool {
    docs_dir: PathBuf,
    top_k: usize,
}

impl RetrievalTool {
    pub fn new(docs_dir: PathBuf, top_k: usize) -> Self {
        Self { docs_dir, top_k }
    }
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &'static str {
        "retrieve_information"
    }

    fn description(&self) -> &'static str {
        "Retrieve relevant passages from the local document collection (student loans, financial aid, tuition)"
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        let store = DocumentStore::load(&self.docs_dir).await?;
        let hits = store.search(query, self.top_k);
        if hits.is_empty() {
            return Ok("No relevant documents found".to_string());
        }

        Ok(hits
            .iter()
            .map(|hit| format!("[{}] {}", hit.source, hit.text))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
