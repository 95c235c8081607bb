//! Prompt construction and answer synthesis from retrieved context.
//!
//! The stages are deliberately separate, typed functions — format context,
//! build the instruction, invoke the model — so each contract is testable on
//! its own.

use crate::generation::CompletionProvider;
use crate::types::{Chunk, RagError};

/// Fixed instruction that pins the model to the retrieved passages.
pub const SYSTEM_PROMPT: &str = "You answer only using the retrieved context.";

/// Joins chunk texts into one context block, retrieval order preserved, blank
/// line between passages.
pub fn format_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// User turn carrying the question and the context block.
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\n\nContext:\n{context}")
}

/// One completion call per question; the model's output is returned verbatim.
///
/// Whether the model actually obeyed the context-only instruction is not
/// verified here; that is a trust boundary, not an enforcement point.
pub async fn synthesize(
    provider: &dyn CompletionProvider,
    question: &str,
    context_chunks: &[Chunk],
) -> Result<String, RagError> {
    let context = format_context(context_chunks);
    provider
        .complete(SYSTEM_PROMPT, &build_user_prompt(question, &context))
        .await
}
