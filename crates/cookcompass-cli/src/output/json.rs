//! JSON output formatter

use cookcompass_core::engine::FilterOutcome;
use cookcompass_core::{ScoredRecipe, TurnPlan};

fn recipe_json(r: &ScoredRecipe) -> serde_json::Value {
    serde_json::json!({
        "id": r.document.id,
        "original_id": r.document.meta.original_id,
        "name": r.document.meta.name,
        "score": r.score,
        "minutes": r.document.meta.minutes,
        "tags": r.document.meta.tags,
    })
}

pub fn format_recipes(results: &[ScoredRecipe]) -> String {
    let output: Vec<serde_json::Value> = results.iter().map(recipe_json).collect();
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

pub fn format_turn(plan: &TurnPlan, answer: &str) -> String {
    let filter = match plan.filter {
        FilterOutcome::NoKeywords => serde_json::json!({ "outcome": "no_keywords" }),
        FilterOutcome::Applied { kept, dropped } => {
            serde_json::json!({ "outcome": "applied", "kept": kept, "dropped": dropped })
        }
        FilterOutcome::Discarded => serde_json::json!({ "outcome": "discarded" }),
    };

    let output = serde_json::json!({
        "search_query": plan.search_query.value(),
        "rewritten": plan.search_query.is_applied(),
        "keywords": plan.keywords.value(),
        "filter": filter,
        "recipes": plan.documents.iter().map(recipe_json).collect::<Vec<_>>(),
        "answer": answer,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookcompass_core::db::{RecipeDocument, RecipeMetadata};

    #[test]
    fn test_format_recipes_fields() {
        let doc = RecipeDocument::new(
            "Recipe: pho\nIngredients: noodles\n",
            RecipeMetadata {
                name: "pho".to_string(),
                steps: "simmer".to_string(),
                minutes: 240,
                tags: ["soups-stews".to_string()].into_iter().collect(),
                original_id: 9,
            },
        );
        let out = format_recipes(&[ScoredRecipe { document: doc, score: 0.5 }]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["name"], "pho");
        assert_eq!(value[0]["original_id"], 9);
        assert_eq!(value[0]["tags"][0], "soups-stews");
    }
}
