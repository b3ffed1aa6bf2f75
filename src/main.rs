use anyhow::{Result, Context};
use meal_recommender::cli::parse_args;
use meal_recommender::meal_planner::create_meal_plan;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys

    let cli_args = parse_args();
    let goal = cli_args.goal.trim().to_string();
    if goal.is_empty() {
        anyhow::bail!("Goal cannot be empty.");
    }

    println!(
        "Building a {}-meal plan for goal: {:?}",
        cli_args.num_meals, goal
    );

    let plan = create_meal_plan(&goal, cli_args.num_meals as usize, &cli_args.dataset_dir)
        .await
        .context("Failed to build a meal plan")?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
