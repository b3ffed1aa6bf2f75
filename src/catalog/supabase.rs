use anyhow::{Result, Context};
use dotenv::dotenv;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::env;
use std::time::Duration;

use super::{CatalogRows, IngredientMapRow, IngredientRow, RecipeRow, TagMapRow, TagRow};

// Environment variables checked, in order, for the Supabase project URL and
// anon key. The NEXT_PUBLIC_ variants are what the web deployment exports.
const SUPABASE_URL_ENV_VARS: &[&str] = &["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const SUPABASE_KEY_ENV_VARS: &[&str] = &["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];

// Per-table bound; a slow table falls through to the snapshot files.
const TABLE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn first_env(var_names: &[&str]) -> Option<String> {
    for var_name in var_names {
        if let Ok(value) = env::var(var_name) {
            if !value.trim().is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Fetch the five catalog relations over the Supabase REST API. Every
/// failure mode, missing credentials included, surfaces as an error the
/// caller treats as "try the snapshot instead".
pub async fn fetch_catalog_rows() -> Result<CatalogRows> {
    dotenv().ok();
    let base_url = first_env(SUPABASE_URL_ENV_VARS).with_context(|| {
        format!(
            "Supabase URL not set (checked {})",
            SUPABASE_URL_ENV_VARS.join(", ")
        )
    })?;
    let api_key = first_env(SUPABASE_KEY_ENV_VARS).with_context(|| {
        format!(
            "Supabase anon key not set (checked {})",
            SUPABASE_KEY_ENV_VARS.join(", ")
        )
    })?;

    let client = Client::builder()
        .timeout(TABLE_REQUEST_TIMEOUT)
        .build()
        .context("Failed to build Supabase HTTP client")?;

    let recipes = fetch_table::<RecipeRow>(&client, &base_url, &api_key, "Recipe", "*").await?;
    let ingredients =
        fetch_table::<IngredientRow>(&client, &base_url, &api_key, "Ingredient", "id,name").await?;
    let recipe_ingredient_map =
        fetch_table::<IngredientMapRow>(&client, &base_url, &api_key, "Recipe-Ingredient_Map", "*")
            .await?;
    let tags = fetch_table::<TagRow>(&client, &base_url, &api_key, "RecipeTag", "id,name").await?;
    let recipe_tag_map =
        fetch_table::<TagMapRow>(&client, &base_url, &api_key, "Recipe-Tag_Map", "*").await?;

    Ok(CatalogRows {
        recipes,
        ingredients,
        recipe_ingredient_map,
        tags,
        recipe_tag_map,
    })
}

async fn fetch_table<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    api_key: &str,
    table: &str,
    select: &str,
) -> Result<Vec<T>> {
    let url = format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table);

    let response = client
        .get(&url)
        .query(&[("select", select)])
        .header("apikey", api_key)
        .bearer_auth(api_key)
        .send()
        .await
        .with_context(|| format!("Request to Supabase table '{}' failed", table))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Supabase table '{}' returned {}", table, status);
    }

    response
        .json::<Vec<T>>()
        .await
        .with_context(|| format!("Malformed rows from Supabase table '{}'", table))
}
