//! Runs listing queries against a document collection.

use smokeshop_core::{CatalogItem, Filter, FindOptions, QuerySpec};
use tracing::{debug, instrument};

use crate::db::{Cursor, DocumentCollection, StoreError};

/// Run `spec` against `source` and decode the matching items in order.
///
/// The skip derived from the spec is forwarded as-is, so `page <= 0` reaches
/// the store as a negative skip and is rejected there.
///
/// # Errors
///
/// Returns `StoreError` if the store rejects the query or fails, or
/// `StoreError::Decode` for the first record that is not a valid `CatalogItem`.
#[instrument(skip(source))]
pub async fn execute<S>(spec: &QuerySpec, source: &S) -> Result<Vec<CatalogItem>, StoreError>
where
    S: DocumentCollection,
{
    let options = spec.find_options();
    debug!(skip = options.skip, limit = options.limit, "Executing query");

    let cursor = source.find(&spec.filter(), &options).await?;
    decode_items(cursor)
}

/// Fetch every document in `source`, in natural order.
///
/// # Errors
///
/// Same as [`execute`].
pub async fn list_all<S>(source: &S) -> Result<Vec<CatalogItem>, StoreError>
where
    S: DocumentCollection,
{
    let cursor = source.find(&Filter::All, &FindOptions::unbounded()).await?;
    decode_items(cursor)
}

/// Fetch the first item whose brand equals `brand` exactly.
///
/// # Errors
///
/// Returns `StoreError` if the lookup fails or the record cannot be decoded.
pub async fn find_by_brand<S>(source: &S, brand: &str) -> Result<Option<CatalogItem>, StoreError>
where
    S: DocumentCollection,
{
    source
        .find_one(&Filter::BrandEquals(brand.to_string()))
        .await?
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}

/// Decode every document of `cursor`, stopping at the first bad one.
///
/// # Errors
///
/// Returns `StoreError::Decode` for the first malformed record.
pub fn decode_items(cursor: Cursor) -> Result<Vec<CatalogItem>, StoreError> {
    cursor
        .map(|document| serde_json::from_value(document).map_err(StoreError::from))
        .collect()
}
