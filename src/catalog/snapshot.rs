use anyhow::{Result, Context};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::path::Path;

use super::CatalogRows;

// Snapshot file names mirror the Supabase tables they were exported from.
pub const RECIPES_FILE: &str = "recipes-supabase.csv";
pub const INGREDIENTS_FILE: &str = "ingredients-supabase.csv";
pub const INGREDIENT_MAP_FILE: &str = "recipe_ingredient_map-supabase.csv";
pub const TAGS_FILE: &str = "tags-supabase.csv";
pub const TAG_MAP_FILE: &str = "recipe_tag_map-supabase.csv";

/// Read the five catalog relations from snapshot CSV files in `dataset_dir`.
/// All five files must be present and well-formed.
pub fn load_catalog_rows(dataset_dir: &Path) -> Result<CatalogRows> {
    Ok(CatalogRows {
        recipes: read_rows(&dataset_dir.join(RECIPES_FILE))?,
        ingredients: read_rows(&dataset_dir.join(INGREDIENTS_FILE))?,
        recipe_ingredient_map: read_rows(&dataset_dir.join(INGREDIENT_MAP_FILE))?,
        tags: read_rows(&dataset_dir.join(TAGS_FILE))?,
        recipe_tag_map: read_rows(&dataset_dir.join(TAG_MAP_FILE))?,
    })
}

fn read_rows<T: DeserializeOwned>(csv_path: &Path) -> Result<Vec<T>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!(
            "Snapshot CSV file not found at: {:?}",
            csv_path
        ));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open snapshot CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut rows = Vec::new();
    for (row_index, result) in rdr.deserialize().enumerate() {
        let row: T = result.with_context(|| {
            format!(
                "Failed to read record at row index {} in {:?}",
                row_index, csv_path
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::join_catalog;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_snapshot_file(dir: &Path, file_name: &str, contents: &str) -> Result<()> {
        let mut file = std::fs::File::create(dir.join(file_name))?;
        write!(file, "{}", contents)?;
        file.flush()?;
        Ok(())
    }

    fn create_test_snapshot_dir() -> Result<TempDir> {
        let dir = tempfile::tempdir()?;
        write_snapshot_file(
            dir.path(),
            RECIPES_FILE,
            "id,name,description\n\
             1,Lentil Soup,Hearty red lentil soup with cumin.\n\
             2,Chicken Bowl,\n\
             3,,Only a description on this one.\n",
        )?;
        write_snapshot_file(
            dir.path(),
            INGREDIENTS_FILE,
            "id,name\n10,red lentils\n11,chicken breast\n12,brown rice\n",
        )?;
        write_snapshot_file(
            dir.path(),
            INGREDIENT_MAP_FILE,
            "recipe_id,ingredient_id\n1,10\n2,11\n2,12\n2,99\n",
        )?;
        write_snapshot_file(dir.path(), TAGS_FILE, "id,name\n20,vegan\n21,high-protein\n")?;
        write_snapshot_file(dir.path(), TAG_MAP_FILE, "recipe_id,tag_id\n1,20\n2,21\n")?;
        Ok(dir)
    }

    #[test]
    fn test_load_and_join_snapshot() -> Result<()> {
        let dir = create_test_snapshot_dir()?;
        let catalog = join_catalog(load_catalog_rows(dir.path())?);

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].id, 1);
        assert_eq!(catalog[0].name, "Lentil Soup");
        assert_eq!(catalog[0].ingredients, vec!["red lentils".to_string()]);
        assert_eq!(catalog[0].tags, vec!["vegan".to_string()]);

        // Recipe 2: empty description cell, plus one unmapped ingredient id.
        assert_eq!(catalog[1].description, "");
        assert_eq!(
            catalog[1].ingredients,
            vec![
                "chicken breast".to_string(),
                "brown rice".to_string(),
                String::new()
            ]
        );

        // Recipe 3: no name in the snapshot.
        assert_eq!(catalog[2].name, "Recipe 3");
        assert!(catalog[2].ingredients.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() -> Result<()> {
        let dir = create_test_snapshot_dir()?;
        std::fs::remove_file(dir.path().join(TAGS_FILE))?;

        let result = load_catalog_rows(dir.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Snapshot CSV file not found"));
        Ok(())
    }

    #[test]
    fn test_load_malformed_id_column() -> Result<()> {
        let dir = create_test_snapshot_dir()?;
        write_snapshot_file(
            dir.path(),
            RECIPES_FILE,
            "id,name,description\nnot-a-number,Broken Row,\n",
        )?;

        let result = load_catalog_rows(dir.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read record at row index 0"));
        Ok(())
    }
}
