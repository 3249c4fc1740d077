//! Seed the catalog from a YAML file.
//!
//! The file is a list of catalog items:
//!
//! ```yaml
//! - brand: Marlboro Gold
//!   price: 9.50
//!   type: filter
//!   category: premium
//! - brand: Camel
//!   price: 7.25
//! ```

use std::path::Path;

use smokeshop_core::{CatalogItem, Filter};
use smokeshop_storefront::db::{self, DocumentCollection, PgCollection};
use tracing::{error, info};

/// Check items before anything is written. Returns one message per problem.
fn validate(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.brand.as_deref().is_none_or(|b| b.trim().is_empty()))
        .map(|(index, _)| format!("item {index}: brand is required"))
        .collect()
}

/// Seed catalog items from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML file
/// * `clear_existing` - If true, delete the current catalog first
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or validated, or database operations fail.
pub async fn catalog(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let items: Vec<CatalogItem> = serde_yaml::from_str(&content)?;
    info!(items = items.len(), "Parsed catalog");

    let errors = validate(&items);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");
    let assortment = PgCollection::assortment(pool);

    if clear_existing {
        let deleted = assortment.delete_many(&Filter::All).await?;
        info!(deleted, "Cleared existing catalog");
    }

    for item in &items {
        assortment.insert_one(serde_json::to_value(item)?).await?;
    }

    info!(inserted = items.len(), "Seeding complete!");
    Ok(())
}
