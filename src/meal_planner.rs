use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::{self, CatalogError};
use crate::fallback_planner::fallback_plan;
use crate::meal_plan::{sort_meals_by_rank, MealPlan};
use crate::meal_selector::request_gemini_plan;
use crate::plan_reconciler::reconcile_plan;

/// Build a ranked meal plan for the goal.
///
/// One catalog load (cached for the process), one best-effort Gemini call,
/// then either reconciliation of the model's answer or the deterministic
/// fallback. The result is always a complete plan; the only error surfaced
/// is an unavailable catalog.
pub async fn create_meal_plan(
    goal: &str,
    num_meals: usize,
    dataset_dir: &Path,
) -> Result<MealPlan, CatalogError> {
    let catalog = catalog::get_catalog(dataset_dir).await?;
    let mut rng = StdRng::from_entropy();

    let mut plan = match request_gemini_plan(goal, num_meals, catalog, &mut rng).await {
        Some(selection) => reconcile_plan(selection, catalog, goal, num_meals),
        None => {
            eprintln!("Gemini selection unavailable; using the deterministic fallback.");
            fallback_plan(goal, num_meals, catalog)
        }
    };

    sort_meals_by_rank(&mut plan.meals);
    Ok(plan)
}
