//! Gutendex catalog client: book search and plain-text retrieval.
//!
//! The client depends only on the catalog's response shape: a paginated
//! search listing and, per book, a `formats` map from mime type to download
//! URL. Format selection is deterministic and prefers uncompressed UTF-8
//! plain text.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::types::{BookRef, BookText, RagError};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<CatalogBook>,
}

#[derive(Debug, Deserialize)]
struct CatalogBook {
    id: u64,
    title: String,
    #[serde(default)]
    authors: Vec<CatalogAuthor>,
}

#[derive(Debug, Deserialize)]
struct CatalogAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BookMetadata {
    // BTreeMap keeps format selection independent of the catalog's key order.
    #[serde(default)]
    formats: BTreeMap<String, String>,
}

/// HTTP client for a Gutendex-compatible book catalog.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a client rooted at `base_url` (e.g. `https://gutendex.com`).
    pub fn new(base_url: &str) -> Result<Self, RagError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| RagError::Config(format!("invalid catalog url: {err}")))?;
        let client = Client::builder()
            .user_agent(concat!("ragbooks/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Searches the catalog, restricted to English-language entries.
    ///
    /// An empty query lists the catalog's default page. No service state is
    /// touched; failures surface as [`RagError::Upstream`].
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<BookRef>, RagError> {
        let mut url = self.books_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("languages", "en");
            if !query.is_empty() {
                pairs.append_pair("search", query);
            }
        }

        let page: SearchPage = self
            .client
            .get(url)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(page
            .results
            .into_iter()
            .map(|book| BookRef {
                id: book.id,
                title: book.title,
                authors: book.authors.into_iter().map(|author| author.name).collect(),
            })
            .collect())
    }

    /// Resolves a catalog id to the book's raw text.
    ///
    /// Retrieves the book's metadata, selects a plain-text representation via
    /// [`pick_plain_text_url`], and downloads its body. A book without any
    /// acceptable representation fails with [`RagError::NoPlainText`].
    #[instrument(skip(self))]
    pub async fn fetch_text(&self, book_id: u64) -> Result<BookText, RagError> {
        let url = self
            .books_url()?
            .join(&format!("{book_id}/"))
            .map_err(|err| RagError::Config(format!("invalid book url: {err}")))?;

        let metadata: BookMetadata = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text_url =
            pick_plain_text_url(&metadata.formats).ok_or(RagError::NoPlainText(book_id))?;
        debug!(book_id, text_url, "downloading book text");

        let content = self
            .client
            .get(text_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(BookText {
            source_id: source_id(book_id),
            content,
        })
    }

    fn books_url(&self) -> Result<Url, RagError> {
        self.base_url
            .join("books/")
            .map_err(|err| RagError::Config(format!("invalid catalog url: {err}")))
    }
}

/// Stable source tag carried on every chunk derived from a book.
pub fn source_id(book_id: u64) -> String {
    format!("gutenberg_{book_id}")
}

/// Chooses a download URL from a catalog `formats` map.
///
/// Preference order: uncompressed UTF-8 plain text, then any uncompressed
/// plain text, then nothing. Compressed containers are never selected.
fn pick_plain_text_url(formats: &BTreeMap<String, String>) -> Option<&str> {
    formats
        .iter()
        .find(|(mime, _)| {
            mime.contains("text/plain") && mime.contains("utf-8") && !mime.contains("zip")
        })
        .or_else(|| {
            formats
                .iter()
                .find(|(mime, _)| mime.contains("text/plain") && !mime.contains("zip"))
        })
        .map(|(_, url)| url.as_str())
}
