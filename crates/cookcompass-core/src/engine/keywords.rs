//! Controlled keyword vocabulary and model-driven extraction

use super::prompt::keywords_prompt;
use super::Refinement;
use crate::llm::{ChatMessage, GenerationMode, LLMClient};
use std::collections::HashSet;

/// Tags commonly found on recipe sites, used when no override is configured
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "15-minutes-or-less",
    "30-minutes-or-less",
    "60-minutes-or-less",
    "easy",
    "beginner-cook",
    "main-dish",
    "side-dishes",
    "appetizers",
    "breakfast",
    "lunch",
    "desserts",
    "snacks",
    "beverages",
    "soups-stews",
    "salads",
    "breads",
    "cakes",
    "cookies-and-brownies",
    "pasta",
    "chicken",
    "beef",
    "pork",
    "seafood",
    "eggs-dairy",
    "vegetables",
    "fruit",
    "vegetarian",
    "vegan",
    "gluten-free",
    "low-carb",
    "low-fat",
    "low-calorie",
    "low-sodium",
    "healthy",
    "kid-friendly",
    "spicy",
    "italian",
    "mexican",
    "asian",
    "indian",
    "greek",
    "french",
    "slow-cooker",
    "grilling",
    "oven",
    "no-cook",
    "holiday-event",
    "christmas",
    "thanksgiving",
];

/// Closed set of valid keywords, in presentation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    /// Build from terms; blanks and duplicates are dropped
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.into().trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    /// Configured override, or the built-in list
    pub fn from_override(terms: Option<&[String]>) -> Self {
        match terms {
            Some(terms) => Self::new(terms.iter().cloned()),
            None => Self::default(),
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

/// Keep only exact vocabulary members from a comma-separated reply
pub fn parse_keywords(reply: &str, vocabulary: &Vocabulary) -> Vec<String> {
    let mut seen = HashSet::new();
    reply
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .filter(|candidate| vocabulary.contains(candidate))
        .filter(|candidate| seen.insert(*candidate))
        .map(str::to_string)
        .collect()
}

/// Ask the model which vocabulary terms apply to `query`
pub async fn extract_keywords(
    llm: &dyn LLMClient,
    query: &str,
    vocabulary: &Vocabulary,
) -> Refinement<Vec<String>> {
    if vocabulary.is_empty() {
        return Refinement::Skipped(Vec::new());
    }

    let prompt = keywords_prompt(query, vocabulary.terms());
    match llm
        .chat_completion(vec![ChatMessage::user(prompt)], GenerationMode::Complete)
        .await
    {
        Ok(reply) => {
            let keywords = parse_keywords(&reply, vocabulary);
            tracing::info!("Extracted keywords for '{}': {:?}", query, keywords);
            Refinement::Applied(keywords)
        }
        Err(e) => {
            tracing::warn!("Keyword extraction failed, continuing without filter: {}", e);
            Refinement::Fallback {
                value: Vec::new(),
                reason: e.to_string(),
            }
        }
    }
}
