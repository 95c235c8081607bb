//! Retrieval-augmented question answering over public-domain books.
//!
//! ```text
//! Catalog search ──► catalog::CatalogClient ──► BookRef listing
//!
//! load(ids) ──► catalog::fetch_text ──► chunking::TextSplitter
//!                                              │
//!                                              ▼
//!               embedding::EmbeddingProvider (batched)
//!                                              │
//!                                              ▼
//!               index::CorpusIndex ── atomic Arc swap ──► published snapshot
//!
//! ask(question) ──► embed question ──► index.search (top-k, cosine)
//!                                              │
//!                                              ▼
//!               answer::synthesize ──► generation::CompletionProvider
//! ```
//!
//! The [`service::RagBooksService`] orchestrator owns all mutable state and is
//! shared across request handlers; [`server`] is the thin HTTP adapter around
//! it.

pub mod answer;
pub mod catalog;
pub mod chunking;
pub mod config;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod server;
pub mod service;
pub mod types;

pub use service::{RagBooksService, RagBooksServiceBuilder};
pub use types::{BookRef, Chunk, LoadSummary, RagError, ServiceState};
