//! Terminal output formatter

use cookcompass_core::db::docid_from_hash;
use cookcompass_core::engine::{FilterOutcome, Refinement};
use cookcompass_core::{ScoredRecipe, TurnPlan};

pub fn format_recipes(results: &[ScoredRecipe], full: bool) -> String {
    let mut output = String::new();

    for result in results {
        let doc = &result.document;
        let score_pct = (result.score * 100.0).round() as i32;
        output.push_str(&format!(
            "{:>3}% {} ({} min) #{}\n",
            score_pct,
            doc.meta.name,
            doc.meta.minutes,
            docid_from_hash(&doc.id)
        ));

        if !doc.meta.tags.is_empty() {
            let tags: Vec<&str> = doc.meta.tags.iter().map(String::as_str).collect();
            output.push_str(&format!("     tags: {}\n", tags.join(", ")));
        }

        if full {
            for line in doc.content.lines() {
                output.push_str(&format!("     {}\n", line));
            }
            if !doc.meta.steps.is_empty() {
                output.push_str(&format!("     Instructions: {}\n", doc.meta.steps));
            }
        }
    }

    output
}

fn describe<T>(refinement: &Refinement<T>) -> String {
    match refinement {
        Refinement::Applied(_) => "applied".to_string(),
        Refinement::Skipped(_) => "skipped".to_string(),
        Refinement::Fallback { reason, .. } => format!("fallback: {}", reason),
    }
}

pub fn format_plan(plan: &TurnPlan) -> String {
    let filter = match plan.filter {
        FilterOutcome::NoKeywords => "none".to_string(),
        FilterOutcome::Applied { kept, dropped } => format!("kept {}, dropped {}", kept, dropped),
        FilterOutcome::Discarded => "no recipe matched every keyword; unfiltered".to_string(),
    };

    let mut output = String::new();
    output.push_str(&format!(
        "Search query:  {} ({})\n",
        plan.search_query.value(),
        describe(&plan.search_query)
    ));
    output.push_str(&format!(
        "Keywords:      [{}] ({})\n",
        plan.keywords.value().join(", "),
        describe(&plan.keywords)
    ));
    output.push_str(&format!("Filter:        {}\n", filter));
    output.push_str(&format!("Recipes:       {}\n", plan.documents.len()));
    output.push_str(&format_recipes(&plan.documents, false));
    output.push('\n');
    output
}
