use std::collections::{HashMap, HashSet};

use crate::catalog::Recipe;
use crate::meal_plan::{
    display_ingredients, display_tags, preview_instructions, rank_score, Meal, MealPlan,
};
use crate::meal_selector::GeminiPlan;

/// Validate a model selection against the authoritative catalog and repair
/// it into a complete plan.
///
/// Candidates whose `recipe_id` the catalog does not know are dropped, as is
/// every repeat of an id already accepted (first occurrence wins). Names and
/// display lists always come from the catalog, never from the model. If
/// fewer than `num_meals` candidates survive, the plan is topped up from
/// catalog order; meal numbers are reassigned 1..k over the final list.
pub fn reconcile_plan(
    gemini_plan: GeminiPlan,
    catalog: &[Recipe],
    goal: &str,
    num_meals: usize,
) -> MealPlan {
    let catalog_lookup: HashMap<i64, &Recipe> =
        catalog.iter().map(|recipe| (recipe.id, recipe)).collect();
    let mut used_ids: HashSet<i64> = HashSet::new();
    let mut meals: Vec<Meal> = Vec::new();

    for candidate in &gemini_plan.meals {
        if meals.len() >= num_meals {
            break;
        }
        let recipe = match catalog_lookup.get(&candidate.recipe_id) {
            Some(recipe) => *recipe,
            None => continue, // id the catalog does not know
        };
        if !used_ids.insert(recipe.id) {
            continue; // repeated reference, first occurrence already accepted
        }

        let position = meals.len();
        meals.push(Meal {
            recipe_id: recipe.id,
            meal_number: (position + 1) as u32,
            name: recipe.name.clone(),
            summary: candidate
                .summary
                .clone()
                .unwrap_or_else(|| default_summary(recipe, goal)),
            calories_kcal: candidate.calories_kcal,
            protein_g: candidate.protein_g,
            carbs_g: candidate.carbs_g,
            fats_g: candidate.fats_g,
            key_ingredients: display_ingredients(recipe),
            tags: display_tags(recipe),
            reason: candidate
                .reason
                .clone()
                .unwrap_or_else(|| "Supports the goal.".to_string()),
            instructions: candidate
                .instructions
                .clone()
                .unwrap_or_else(|| default_instructions(recipe)),
            similarity_score: rank_score(position),
        });
    }

    top_up_from_catalog(&mut meals, &mut used_ids, catalog, goal, num_meals);

    let goal_expanded = match &gemini_plan.goal_expanded {
        Some(text) => text.trim().to_string(),
        None => goal.trim().to_string(),
    };

    MealPlan {
        goal_expanded,
        meals,
    }
}

/// Deterministic backfill: walk the catalog in stored order, skipping
/// already-used recipes, until the plan reaches `num_meals` or the catalog
/// runs out.
fn top_up_from_catalog(
    meals: &mut Vec<Meal>,
    used_ids: &mut HashSet<i64>,
    catalog: &[Recipe],
    goal: &str,
    num_meals: usize,
) {
    for recipe in catalog {
        if meals.len() >= num_meals {
            break;
        }
        if !used_ids.insert(recipe.id) {
            continue;
        }

        let position = meals.len();
        meals.push(Meal {
            recipe_id: recipe.id,
            meal_number: (position + 1) as u32,
            name: recipe.name.clone(),
            summary: format!("{} supports '{}'.", recipe.name, goal),
            calories_kcal: 0,
            protein_g: 0,
            carbs_g: 0,
            fats_g: 0,
            key_ingredients: display_ingredients(recipe),
            tags: display_tags(recipe),
            reason: "Filled from existing recipes to hit requested count.".to_string(),
            instructions: preview_instructions(recipe),
            similarity_score: rank_score(position),
        });
    }
}

fn default_summary(recipe: &Recipe, goal: &str) -> String {
    if recipe.description.is_empty() {
        goal.to_string()
    } else {
        recipe.description.clone()
    }
}

// Accepted candidates get the full description; only templated top-up and
// fallback meals use the truncated preview.
fn default_instructions(recipe: &Recipe) -> String {
    if recipe.description.is_empty() {
        "See recipe card.".to_string()
    } else {
        recipe.description.clone()
    }
}
