pub mod api_connection;
pub mod catalog;
pub mod cli;
pub mod fallback_planner;
pub mod meal_plan;
pub mod meal_planner;
pub mod meal_selector;
pub mod plan_reconciler;
