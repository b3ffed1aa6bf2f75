use serde::{Serialize, Deserialize};

use crate::catalog::Recipe;

/// Display caps on the ingredient and tag lists copied onto a meal.
pub const KEY_INGREDIENT_CAP: usize = 8;
pub const TAG_CAP: usize = 6;

/// How much of a recipe description survives as templated instructions.
pub const INSTRUCTIONS_PREVIEW_CHARS: usize = 180;

/// One recommended meal. Serializes to the shape the web client expects:
/// `recipe_id` goes out as `id` and `instructions` as `recipe`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Meal {
    #[serde(rename = "id")]
    pub recipe_id: i64,
    pub meal_number: u32,
    pub name: String,
    pub summary: String,
    pub calories_kcal: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fats_g: u32,
    pub key_ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub reason: String,
    #[serde(rename = "recipe")]
    pub instructions: String,
    pub similarity_score: f64,
}

/// A complete recommendation: the expanded goal plus the ranked meal list,
/// serialized under `recipes`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MealPlan {
    pub goal_expanded: String,
    #[serde(rename = "recipes")]
    pub meals: Vec<Meal>,
}

/// Rank value for the meal appended at `position` (0-based): 1.0, 0.95,
/// 0.90 and so on, rounded to three decimals.
pub fn rank_score(position: usize) -> f64 {
    let raw = 1.0 - 0.05 * position as f64;
    (raw * 1000.0).round() / 1000.0
}

/// Stable sort by descending similarity score; meals with equal scores keep
/// their construction order.
pub fn sort_meals_by_rank(meals: &mut [Meal]) {
    meals.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
}

/// First `KEY_INGREDIENT_CAP` ingredients of the recipe, copied for display.
pub fn display_ingredients(recipe: &Recipe) -> Vec<String> {
    recipe
        .ingredients
        .iter()
        .take(KEY_INGREDIENT_CAP)
        .cloned()
        .collect()
}

/// First `TAG_CAP` tags of the recipe, copied for display.
pub fn display_tags(recipe: &Recipe) -> Vec<String> {
    recipe.tags.iter().take(TAG_CAP).cloned().collect()
}

/// Templated instructions for catalog-only meals: a truncated slice of the
/// recipe description, or a pointer at the recipe card.
pub fn preview_instructions(recipe: &Recipe) -> String {
    if recipe.description.is_empty() {
        "See recipe card.".to_string()
    } else {
        let preview: String = recipe
            .description
            .chars()
            .take(INSTRUCTIONS_PREVIEW_CHARS)
            .collect();
        format!("{}...", preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_meal(recipe_id: i64, similarity_score: f64) -> Meal {
        Meal {
            recipe_id,
            meal_number: 1,
            name: format!("Meal {}", recipe_id),
            summary: "A summary.".to_string(),
            calories_kcal: 400,
            protein_g: 30,
            carbs_g: 40,
            fats_g: 12,
            key_ingredients: vec!["oats".to_string()],
            tags: vec!["breakfast".to_string()],
            reason: "Fits the goal.".to_string(),
            instructions: "Combine and serve.".to_string(),
            similarity_score,
        }
    }

    fn test_recipe(description: &str, ingredient_count: usize, tag_count: usize) -> Recipe {
        Recipe {
            id: 1,
            name: "Test Recipe".to_string(),
            description: description.to_string(),
            ingredients: (0..ingredient_count).map(|i| format!("ingredient {}", i)).collect(),
            tags: (0..tag_count).map(|i| format!("tag {}", i)).collect(),
        }
    }

    #[test]
    fn test_rank_score_sequence() {
        assert_eq!(rank_score(0), 1.0);
        assert_eq!(rank_score(1), 0.95);
        assert_eq!(rank_score(2), 0.9);
        assert_eq!(rank_score(7), 0.65);
        assert_eq!(rank_score(9), 0.55);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut meals = vec![
            test_meal(1, 0.9),
            test_meal(2, 1.0),
            test_meal(3, 0.9),
            test_meal(4, 0.95),
        ];
        sort_meals_by_rank(&mut meals);

        let ids: Vec<i64> = meals.iter().map(|m| m.recipe_id).collect();
        // Ties (1 and 3 at 0.9) keep their original relative order.
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_meal_serializes_with_client_field_names() {
        let value = serde_json::to_value(test_meal(3, 1.0)).unwrap();

        assert_eq!(value.get("id").and_then(|v| v.as_i64()), Some(3));
        assert!(value.get("recipe").is_some());
        assert!(value.get("recipe_id").is_none());
        assert!(value.get("instructions").is_none());
    }

    #[test]
    fn test_plan_serializes_meals_under_recipes() {
        let plan = MealPlan {
            goal_expanded: "Eat more protein.".to_string(),
            meals: vec![test_meal(1, 1.0)],
        };
        let value = serde_json::to_value(plan).unwrap();

        assert!(value.get("goal_expanded").is_some());
        assert_eq!(value.get("recipes").and_then(|v| v.as_array()).map(|a| a.len()), Some(1));
        assert!(value.get("meals").is_none());
    }

    #[test]
    fn test_display_lists_are_capped() {
        let recipe = test_recipe("", 12, 9);
        assert_eq!(display_ingredients(&recipe).len(), KEY_INGREDIENT_CAP);
        assert_eq!(display_tags(&recipe).len(), TAG_CAP);
        assert_eq!(display_ingredients(&recipe)[0], "ingredient 0");
    }

    #[test]
    fn test_preview_instructions() {
        assert_eq!(preview_instructions(&test_recipe("", 0, 0)), "See recipe card.");

        let short = preview_instructions(&test_recipe("Simmer gently.", 0, 0));
        assert_eq!(short, "Simmer gently....");

        let long_text = "x".repeat(400);
        let long = preview_instructions(&test_recipe(&long_text, 0, 0));
        assert_eq!(long.len(), INSTRUCTIONS_PREVIEW_CHARS + 3);
        assert!(long.ends_with("..."));
    }
}
