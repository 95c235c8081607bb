//! Completion providers for answer synthesis.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::openai;

use crate::types::RagError;

/// Turns a system + user instruction pair into a text completion.
///
/// One invocation per question; no multi-turn state, no retries.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, RagError>;
}

/// OpenAI-backed provider via rig's completion client.
#[derive(Clone)]
pub struct OpenAiCompletionProvider {
    client: openai::Client,
    model_name: String,
}

impl OpenAiCompletionProvider {
    pub fn new(client: openai::Client, model_name: &str) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, RagError> {
        let model = self.client.completion_model(&self.model_name);
        let request = model
            .completion_request(rig::completion::Message::user(user))
            .preamble(system.to_owned())
            .build();

        let response = model
            .completion(request)
            .await
            .map_err(|err| RagError::Upstream(format!("completion request failed: {err}")))?;

        let text = response
            .choice
            .into_iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");
        Ok(text)
    }
}

/// Canned completions for tests and offline runs.
///
/// With a fixed reply it returns that reply verbatim; without one it echoes
/// the user instruction, which lets tests inspect the exact prompt the
/// synthesizer produced.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionProvider {
    reply: Option<String>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, RagError> {
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| user.to_string()))
    }
}
