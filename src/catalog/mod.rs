pub mod snapshot;
pub mod supabase;

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::path::Path;
use tokio::sync::OnceCell;

/// One fully joined catalog entry: recipe row plus its resolved ingredient
/// and tag names.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
}

// Row shapes shared by the Supabase and snapshot sources. Columns either
// source adds beyond these are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct RecipeRow {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngredientRow {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngredientMapRow {
    pub recipe_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TagRow {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TagMapRow {
    pub recipe_id: i64,
    pub tag_id: i64,
}

/// The five relations a source must produce before the join.
#[derive(Debug, Default)]
pub struct CatalogRows {
    pub recipes: Vec<RecipeRow>,
    pub ingredients: Vec<IngredientRow>,
    pub recipe_ingredient_map: Vec<IngredientMapRow>,
    pub tags: Vec<TagRow>,
    pub recipe_tag_map: Vec<TagMapRow>,
}

#[derive(Debug)]
pub enum CatalogError {
    /// Both the Supabase fetch and the snapshot read failed; without a
    /// catalog no plan can be built.
    Unavailable {
        supabase_error: String,
        snapshot_error: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Unavailable {
                supabase_error,
                snapshot_error,
            } => {
                write!(
                    f,
                    "Recipe catalog unavailable (Supabase: {}; snapshot: {})",
                    supabase_error, snapshot_error
                )
            }
        }
    }
}

impl Error for CatalogError {}

static CATALOG_CACHE: OnceCell<Vec<Recipe>> = OnceCell::const_new();

/// Load the recipe catalog, memoized for the lifetime of the process.
///
/// The first successful load wins; later calls return the cached catalog and
/// ignore `dataset_dir`. Concurrent first calls are serialized by the cell,
/// so no caller observes a partially built catalog, and a failed load leaves
/// the cell empty for the next call to retry.
pub async fn get_catalog(dataset_dir: &Path) -> Result<&'static [Recipe], CatalogError> {
    let catalog = CATALOG_CACHE
        .get_or_try_init(|| async { load_catalog(dataset_dir).await })
        .await?;
    Ok(catalog.as_slice())
}

/// One uncached load: Supabase first, snapshot CSV files on any Supabase
/// failure (missing credentials included).
pub async fn load_catalog(dataset_dir: &Path) -> Result<Vec<Recipe>, CatalogError> {
    let supabase_error = match supabase::fetch_catalog_rows().await {
        Ok(rows) => return Ok(join_catalog(rows)),
        Err(err) => {
            eprintln!(
                "Supabase catalog fetch failed ({:#}); trying snapshot files",
                err
            );
            format!("{:#}", err)
        }
    };

    match snapshot::load_catalog_rows(dataset_dir) {
        Ok(rows) => Ok(join_catalog(rows)),
        Err(err) => Err(CatalogError::Unavailable {
            supabase_error,
            snapshot_error: format!("{:#}", err),
        }),
    }
}

/// Join the five relations into `Recipe` entries, preserving the recipe row
/// order of the source.
///
/// A mapping row whose ingredient or tag id has no lookup entry resolves to
/// an empty string rather than being dropped, keeping the display lists
/// aligned with the mapping rows.
pub fn join_catalog(rows: CatalogRows) -> Vec<Recipe> {
    let ingredient_lookup: HashMap<i64, String> = rows
        .ingredients
        .into_iter()
        .map(|row| (row.id, row.name.unwrap_or_default()))
        .collect();
    let tag_lookup: HashMap<i64, String> = rows
        .tags
        .into_iter()
        .map(|row| (row.id, row.name.unwrap_or_default()))
        .collect();

    let mut ingredients_by_recipe: HashMap<i64, Vec<String>> = HashMap::new();
    for map_row in &rows.recipe_ingredient_map {
        let name = ingredient_lookup
            .get(&map_row.ingredient_id)
            .cloned()
            .unwrap_or_default();
        ingredients_by_recipe
            .entry(map_row.recipe_id)
            .or_default()
            .push(name);
    }

    let mut tags_by_recipe: HashMap<i64, Vec<String>> = HashMap::new();
    for map_row in &rows.recipe_tag_map {
        let name = tag_lookup
            .get(&map_row.tag_id)
            .cloned()
            .unwrap_or_default();
        tags_by_recipe.entry(map_row.recipe_id).or_default().push(name);
    }

    rows.recipes
        .into_iter()
        .map(|row| {
            let id = row.id;
            Recipe {
                id,
                name: row.name.unwrap_or_else(|| format!("Recipe {}", id)),
                description: row.description.unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&id).unwrap_or_default(),
                tags: tags_by_recipe.remove(&id).unwrap_or_default(),
            }
        })
        .collect()
}
