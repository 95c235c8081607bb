//! Environment-driven service configuration.
//!
//! All knobs have defaults except the OpenAI credential, whose absence is a
//! fatal startup condition rather than a per-request error.

use std::env;

use crate::types::RagError;

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
pub const DEFAULT_TOP_K: usize = 4;

const DEFAULT_CATALOG_BASE_URL: &str = "https://gutendex.com";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Validated configuration for one service instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub catalog_base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub bind_addr: String,
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if `.env` support is wanted; this
    /// function only consults `std::env`.
    pub fn from_env() -> Result<Self, RagError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::Config("OPENAI_API_KEY not set in environment or .env".into())
        })?;

        let config = Self {
            api_key,
            catalog_base_url: env_or("RAGBOOKS_CATALOG_URL", DEFAULT_CATALOG_BASE_URL),
            embedding_model: env_or("RAGBOOKS_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            completion_model: env_or("RAGBOOKS_COMPLETION_MODEL", DEFAULT_COMPLETION_MODEL),
            chunk_size: env_parse("RAGBOOKS_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: env_parse("RAGBOOKS_CHUNK_OVERLAP", DEFAULT_CHUNK_OVERLAP)?,
            top_k: env_parse("RAGBOOKS_TOP_K", DEFAULT_TOP_K)?,
            bind_addr: env_or("RAGBOOKS_BIND_ADDR", DEFAULT_BIND_ADDR),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be positive".into()));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse(key: &str, default: usize) -> Result<usize, RagError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<usize>()
            .map_err(|_| RagError::Config(format!("{key} must be a non-negative integer"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServiceConfig {
        ServiceConfig {
            api_key: "sk-test".into(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            completion_model: DEFAULT_COMPLETION_MODEL.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            bind_addr: DEFAULT_BIND_ADDR.into(),
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let mut config = base_config();
        config.chunk_overlap = config.chunk_size;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));

        config.chunk_overlap = config.chunk_size + 1;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut config = base_config();
        config.chunk_size = 0;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn zero_top_k_rejected() {
        let mut config = base_config();
        config.top_k = 0;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }
}
