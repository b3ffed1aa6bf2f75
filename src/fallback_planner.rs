use crate::catalog::Recipe;
use crate::meal_plan::{
    display_ingredients, display_tags, preview_instructions, rank_score, Meal, MealPlan,
};

/// Deterministic plan used whenever the model path produced nothing: the
/// first `num_meals` catalog recipes in stored order, fully templated.
/// Repeated calls against an unchanged catalog return identical plans.
pub fn fallback_plan(goal: &str, num_meals: usize, catalog: &[Recipe]) -> MealPlan {
    let chosen = if catalog.len() > num_meals {
        &catalog[..num_meals]
    } else {
        catalog
    };

    let meals = chosen
        .iter()
        .enumerate()
        .map(|(position, recipe)| Meal {
            recipe_id: recipe.id,
            meal_number: (position + 1) as u32,
            name: recipe.name.clone(),
            summary: format!("{} supports '{}' with balanced nutrients.", recipe.name, goal),
            calories_kcal: 0,
            protein_g: 0,
            carbs_g: 0,
            fats_g: 0,
            key_ingredients: display_ingredients(recipe),
            tags: display_tags(recipe),
            reason: "Selected from existing recipes to match the goal.".to_string(),
            instructions: preview_instructions(recipe),
            similarity_score: rank_score(position),
        })
        .collect();

    MealPlan {
        goal_expanded: format!("Practical eating pattern to achieve: {}.", goal),
        meals,
    }
}
