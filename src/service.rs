//! Stateful orchestrator that sequences fetch → chunk → embed → answer.
//!
//! The service is the single owner of the corpus index; the catalog client,
//! splitter, and providers are stateless collaborators. The index is published
//! as an atomically swapped `Arc` snapshot: a reload builds the new index
//! entirely off to the side and replaces the reference in one step, so a
//! concurrent `ask` always observes either the fully-old or fully-new corpus,
//! never a mixture.

use std::sync::Arc;

use parking_lot::RwLock;
use rig::providers::openai;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::answer;
use crate::catalog::CatalogClient;
use crate::chunking::TextSplitter;
use crate::config::ServiceConfig;
use crate::embedding::{EmbeddingProvider, OpenAiEmbeddingProvider};
use crate::generation::{CompletionProvider, OpenAiCompletionProvider};
use crate::index::CorpusIndex;
use crate::types::{BookRef, Chunk, LoadSummary, RagError, ServiceState};

/// Long-lived service instance shared across request handlers.
pub struct RagBooksService {
    catalog: CatalogClient,
    splitter: TextSplitter,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn CompletionProvider>,
    top_k: usize,
    /// Published snapshot; writers replace the `Arc` whole, readers clone it.
    /// Write sections never await.
    index: RwLock<Option<Arc<CorpusIndex>>>,
    /// Serializes concurrent loads across the fetch-chunk-embed-swap sequence.
    load_lock: Mutex<()>,
}

impl RagBooksService {
    pub fn builder() -> RagBooksServiceBuilder {
        RagBooksServiceBuilder::default()
    }

    /// Wires up a production service: Gutendex catalog plus OpenAI-backed
    /// embedding and completion providers.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RagError> {
        let client = openai::Client::new(&config.api_key)
            .map_err(|err| RagError::Config(format!("openai client: {err}")))?;
        Self::builder()
            .with_catalog(CatalogClient::new(&config.catalog_base_url)?)
            .with_splitter(TextSplitter::new(config.chunk_size, config.chunk_overlap)?)
            .with_embedding_provider(Arc::new(OpenAiEmbeddingProvider::new(
                client.clone(),
                &config.embedding_model,
            )))
            .with_completion_provider(Arc::new(OpenAiCompletionProvider::new(
                client,
                &config.completion_model,
            )))
            .with_top_k(config.top_k)
            .build()
    }

    /// `Ready` once a load has published an index; never returns to `Empty`
    /// short of a process restart.
    pub fn state(&self) -> ServiceState {
        if self.index.read().is_some() {
            ServiceState::Ready
        } else {
            ServiceState::Empty
        }
    }

    /// Pure delegation to the catalog; valid in any state.
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<BookRef>, RagError> {
        self.catalog.search(query).await
    }

    /// Replaces the corpus with the given books, all-or-nothing.
    ///
    /// Every book is fetched before any state changes; a single fetch or
    /// embedding failure aborts the whole call and the previous index keeps
    /// serving reads. On success the freshly built index is swapped in and the
    /// chunk/book counts are returned.
    #[instrument(skip(self), fields(books = ids.len()))]
    pub async fn load(&self, ids: &[u64]) -> Result<LoadSummary, RagError> {
        if ids.is_empty() {
            return Err(RagError::EmptyInput);
        }
        let _guard = self.load_lock.lock().await;

        let mut texts = Vec::with_capacity(ids.len());
        for &id in ids {
            texts.push(self.catalog.fetch_text(id).await?);
        }

        let mut chunks = Vec::new();
        for text in &texts {
            chunks.extend(self.splitter.split(&text.content, &text.source_id));
        }
        let chunk_count = chunks.len();

        // Built off to the side; the old index serves reads until the swap.
        let next = Arc::new(CorpusIndex::build(self.embedder.as_ref(), chunks).await?);
        *self.index.write() = Some(next);

        info!(chunks = chunk_count, books = ids.len(), "corpus loaded");
        Ok(LoadSummary {
            chunks: chunk_count,
            books_loaded: ids.len(),
        })
    }

    /// Answers a question from the current corpus snapshot.
    ///
    /// Retrieves the top-k most similar chunks and hands them, in descending
    /// similarity order, to the answer synthesizer.
    #[instrument(skip(self, question))]
    pub async fn ask(&self, question: &str) -> Result<String, RagError> {
        let index = self.index.read().clone().ok_or(RagError::NotReady)?;

        let vectors = self.embedder.embed_batch(&[question.to_string()]).await?;
        let query_vec = vectors.into_iter().next().ok_or_else(|| {
            RagError::Upstream("embedding provider returned no vector for the question".into())
        })?;

        let context: Vec<Chunk> = index
            .search(&query_vec, self.top_k)
            .into_iter()
            .map(|entry| entry.chunk.clone())
            .collect();
        answer::synthesize(self.generator.as_ref(), question, &context).await
    }
}

/// Builder for [`RagBooksService`]; every collaborator is injectable, which is
/// what the tests lean on.
#[derive(Default)]
pub struct RagBooksServiceBuilder {
    catalog: Option<CatalogClient>,
    splitter: Option<TextSplitter>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn CompletionProvider>>,
    top_k: Option<usize>,
}

impl RagBooksServiceBuilder {
    #[must_use]
    pub fn with_catalog(mut self, catalog: CatalogClient) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = Some(splitter);
        self
    }

    #[must_use]
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    #[must_use]
    pub fn with_completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.generator = Some(provider);
        self
    }

    /// Number of chunks retrieved per question. Defaults to 4.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn build(self) -> Result<RagBooksService, RagError> {
        let catalog = self
            .catalog
            .ok_or_else(|| RagError::Config("service requires a catalog client".into()))?;
        let splitter = self
            .splitter
            .ok_or_else(|| RagError::Config("service requires a text splitter".into()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("service requires an embedding provider".into()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::Config("service requires a completion provider".into()))?;
        let top_k = self.top_k.unwrap_or(crate::config::DEFAULT_TOP_K);
        if top_k == 0 {
            return Err(RagError::Config("top_k must be positive".into()));
        }
        Ok(RagBooksService {
            catalog,
            splitter,
            embedder,
            generator,
            top_k,
            index: RwLock::new(None),
            load_lock: Mutex::new(()),
        })
    }
}
