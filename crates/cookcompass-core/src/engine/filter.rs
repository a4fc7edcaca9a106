//! Keyword post-filter over retrieved recipes

use crate::db::{MetadataFilter, ScoredRecipe};

/// Which way the keyword filter went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No keywords, nothing to filter on
    NoKeywords,
    /// Narrowed to the documents carrying every keyword
    Applied { kept: usize, dropped: usize },
    /// No document carried every keyword; the unfiltered set was kept
    Discarded,
}

/// Keep documents whose tags include every keyword
///
/// Never turns a candidate set into an empty one: when nothing matches, the
/// input comes back unchanged.
pub fn filter_by_keywords(
    documents: Vec<ScoredRecipe>,
    keywords: &[String],
) -> (Vec<ScoredRecipe>, FilterOutcome) {
    if keywords.is_empty() {
        return (documents, FilterOutcome::NoKeywords);
    }

    let wanted = MetadataFilter::all_tags(keywords.iter().cloned());
    let total = documents.len();
    let matching: Vec<bool> = documents.iter().map(|d| wanted.matches(&d.document)).collect();
    let kept = matching.iter().filter(|m| **m).count();

    if kept == 0 {
        tracing::info!(
            "No recipe carries all of {:?}; keeping {} unfiltered results",
            keywords,
            total
        );
        return (documents, FilterOutcome::Discarded);
    }

    let filtered = documents
        .into_iter()
        .zip(matching)
        .filter_map(|(doc, keep)| keep.then_some(doc))
        .collect();

    tracing::info!("Keyword filter kept {} of {} recipes", kept, total);
    (
        filtered,
        FilterOutcome::Applied {
            kept,
            dropped: total - kept,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RecipeDocument, RecipeMetadata};
    use proptest::prelude::*;

    const TAGS: [&str; 4] = ["vegan", "quick", "desserts", "spicy"];

    fn doc(id: i64, tags: &[&str]) -> ScoredRecipe {
        ScoredRecipe {
            document: RecipeDocument::new(
                format!("Recipe: r{}\n", id),
                RecipeMetadata {
                    name: format!("r{}", id),
                    steps: String::new(),
                    minutes: 1,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                    original_id: id,
                },
            ),
            score: 1.0 / (id as f32 + 1.0),
        }
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_keywords_passes_through() {
        let docs = vec![doc(1, &[]), doc(2, &["vegan"])];
        let (out, outcome) = filter_by_keywords(docs.clone(), &[]);
        assert_eq!(out, docs);
        assert_eq!(outcome, FilterOutcome::NoKeywords);
    }

    #[test]
    fn test_narrows_to_superset_tags_in_order() {
        let docs = vec![
            doc(1, &["vegan"]),
            doc(2, &["vegan", "quick"]),
            doc(3, &["quick"]),
            doc(4, &["quick", "vegan", "spicy"]),
        ];
        let (out, outcome) = filter_by_keywords(docs, &keywords(&["vegan", "quick"]));
        let ids: Vec<i64> = out.iter().map(|d| d.document.meta.original_id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(outcome, FilterOutcome::Applied { kept: 2, dropped: 2 });
    }

    #[test]
    fn test_no_match_keeps_everything() {
        let docs = vec![doc(1, &[]), doc(2, &[]), doc(3, &["spicy"])];
        let (out, outcome) = filter_by_keywords(docs.clone(), &keywords(&["vegan"]));
        assert_eq!(out, docs);
        assert_eq!(outcome, FilterOutcome::Discarded);
    }

    fn arb_docs() -> impl Strategy<Value = Vec<ScoredRecipe>> {
        proptest::collection::vec(proptest::collection::vec(0usize..4, 0..4), 0..8).prop_map(
            |tag_sets| {
                tag_sets
                    .iter()
                    .enumerate()
                    .map(|(i, set)| {
                        let tags: Vec<&str> = set.iter().map(|&t| TAGS[t]).collect();
                        doc(i as i64, &tags)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_non_empty_input_never_empties(
            docs in arb_docs(),
            picks in proptest::collection::vec(0usize..4, 0..3),
        ) {
            let words: Vec<String> = picks.iter().map(|&i| TAGS[i].to_string()).collect();
            let input_len = docs.len();
            let (out, _) = filter_by_keywords(docs, &words);
            prop_assert_eq!(out.is_empty(), input_len == 0);
            prop_assert!(out.len() <= input_len);
        }

        #[test]
        fn prop_applied_results_carry_every_keyword(
            docs in arb_docs(),
            picks in proptest::collection::vec(0usize..4, 1..3),
        ) {
            let words: Vec<String> = picks.iter().map(|&i| TAGS[i].to_string()).collect();
            let (out, outcome) = filter_by_keywords(docs, &words);
            if let FilterOutcome::Applied { kept, .. } = outcome {
                prop_assert_eq!(kept, out.len());
                for d in &out {
                    for w in &words {
                        prop_assert!(d.document.meta.tags.contains(w));
                    }
                }
            }
        }
    }
}
