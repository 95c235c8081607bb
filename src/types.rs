//! Core data model and error taxonomy shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A catalog entry produced by a book search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub id: u64,
    pub title: String,
    pub authors: Vec<String>,
}

/// Raw text for a single fetched book.
///
/// Owned transiently by a load operation and discarded once chunked.
#[derive(Debug, Clone)]
pub struct BookText {
    pub source_id: String,
    pub content: String,
}

/// A bounded, possibly overlapping window of a source text; the unit of
/// retrieval.
///
/// Consecutive chunks from the same source share exactly the configured
/// overlap: the trailing overlap characters of one equal the leading overlap
/// characters of the next, except at source boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_id: String,
    pub seq: usize,
}

/// Counts reported by a successful corpus load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub chunks: usize,
    pub books_loaded: usize,
}

/// Whether the service currently holds a searchable corpus.
///
/// `Empty` transitions to `Ready` on the first successful load and never
/// transitions back short of a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Empty,
    Ready,
}

/// Errors surfaced by the retrieval pipeline.
///
/// Every failure is detected at the point of occurrence and propagated
/// unchanged to the caller of the triggering operation; nothing here is
/// retried or silently swallowed.
#[derive(Debug, Error)]
pub enum RagError {
    /// Missing or invalid configuration; fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// A load was requested with no book ids.
    #[error("no book ids provided")]
    EmptyInput,

    /// A question was asked before any corpus was loaded.
    #[error("no books loaded yet; load a corpus first")]
    NotReady,

    /// The catalog offers no acceptable plain-text representation.
    #[error("no suitable plain-text format for book {0}")]
    NoPlainText(u64),

    /// Network or provider failure during fetch, embedding, or generation.
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        RagError::Upstream(err.to_string())
    }
}
