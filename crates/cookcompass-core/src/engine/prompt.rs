//! Prompt templates and chat message assembly

use crate::db::ScoredRecipe;
use crate::llm::{ChatMessage, Role};

const ANSWER_TEMPLATE: &str = r#"
TASK:
- If the user asks for a recipe, provide one based ONLY on the provided CONTEXT. Give the Name, Ingredients, and Instructions
- If the CONTEXT is empty, say that you couldn't find a matching recipe.
- If the CONTEXT is empty, NEVER come up with a recipe that is not in the CONTEXT
- If the user asks you to modify a recipe that you have provided previously, you can do so based on your general knowledge.

CONTEXT: {context_content}

USER REQUEST: "{user_message}"
"#;

const REWRITE_TEMPLATE: &str = r#"You are a helpful assistant improving search queries for a recipe database.
Usually the current user request is clear enough, if not refine it based on the chat history.

EXAMPLE 1:
    user asks for 'chicken soup' -> query is clear -> you output 'chicken soup'

EXAMPLE 2:
    user asks for 'make it vegan' -> query is unclear -> you look at the chat history -> it mentions soup -> you output 'vegan soup'

Based on the examples above, rewrite the user request into a specific, standalone search query that includes necessary context (like main ingredient)

CURRENT USER QUERY: '{last_user_msg}'

CONVERSATION HISTORY:
{conversation_text}
Output ONLY the rewritten search query."#;

const KEYWORDS_TEMPLATE: &str = r#"Identify which of the following keywords are relevant to the user query: '{query}'.
Available keywords: {available_keywords}
Return ONLY a comma-separated list of the relevant keywords from the available list. If none match, return nothing."#;

/// Render retrieved recipes as the CONTEXT block, in retrieval order
pub fn render_context(documents: &[ScoredRecipe]) -> String {
    documents
        .iter()
        .map(|scored| {
            let doc = &scored.document;
            format!(
                "--- Recipe Option ---\nName: {}\n{}\nInstructions: {}\n",
                doc.meta.name, doc.content, doc.meta.steps
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt followed by the prior turns, role for role
pub fn build_messages(
    request: &str,
    documents: &[ScoredRecipe],
    prior_turns: &[ChatMessage],
) -> Vec<ChatMessage> {
    let system = ANSWER_TEMPLATE
        .replace("{context_content}", &render_context(documents))
        .replace("{user_message}", request);

    let mut messages = Vec::with_capacity(prior_turns.len() + 1);
    messages.push(ChatMessage::system(system));
    messages.extend(prior_turns.iter().cloned());
    messages
}

/// `User:`/`Assistant:` transcript, one line per message
pub fn transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| {
            let speaker = match msg.role {
                Role::User => "User",
                Role::Assistant | Role::System => "Assistant",
            };
            format!("{}: {}\n", speaker, msg.content)
        })
        .collect()
}

pub fn rewrite_prompt(last_user_message: &str, history: &[ChatMessage]) -> String {
    REWRITE_TEMPLATE
        .replace("{conversation_text}", &transcript(history))
        .replace("{last_user_msg}", last_user_message)
}

pub fn keywords_prompt(query: &str, vocabulary: &[String]) -> String {
    KEYWORDS_TEMPLATE
        .replace("{available_keywords}", &vocabulary.join(", "))
        .replace("{query}", query)
}
