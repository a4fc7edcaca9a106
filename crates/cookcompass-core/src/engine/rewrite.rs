//! Standalone search query from a conversation

use super::prompt::rewrite_prompt;
use super::Refinement;
use crate::llm::{ChatMessage, GenerationMode, LLMClient};

/// Messages of history shown to the rewriter, the current one included
pub const HISTORY_WINDOW: usize = 5;

/// Rewrite the last message into a self-contained search query
///
/// Single-message conversations pass through without a model call. Any
/// failure falls back to the raw last message.
pub async fn rewrite_query(llm: &dyn LLMClient, conversation: &[ChatMessage]) -> Refinement<String> {
    let Some(last) = conversation.last() else {
        return Refinement::Skipped(String::new());
    };
    if conversation.len() < 2 {
        return Refinement::Skipped(last.content.clone());
    }

    let history = &conversation[conversation.len().saturating_sub(HISTORY_WINDOW)..];
    let prompt = rewrite_prompt(&last.content, history);

    match llm
        .chat_completion(vec![ChatMessage::user(prompt)], GenerationMode::Complete)
        .await
    {
        Ok(reply) => {
            let rewritten = reply.trim().lines().next().unwrap_or("").trim().to_string();
            if rewritten.is_empty() {
                tracing::warn!("Query rewrite returned nothing, using '{}'", last.content);
                return Refinement::Fallback {
                    value: last.content.clone(),
                    reason: "empty rewrite".to_string(),
                };
            }
            tracing::info!("Original query: '{}' -> rewritten: '{}'", last.content, rewritten);
            Refinement::Applied(rewritten)
        }
        Err(e) => {
            tracing::warn!("Query rewrite failed, using raw message: {}", e);
            Refinement::Fallback {
                value: last.content.clone(),
                reason: e.to_string(),
            }
        }
    }
}
