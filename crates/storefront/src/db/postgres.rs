//! `PostgreSQL` document collection.
//!
//! Each collection is a table `(id BIGSERIAL PRIMARY KEY, doc JSONB NOT NULL)`
//! in the `shop` schema. `id` gives the natural (insertion) order and breaks
//! ties when sorting.

use serde_json::Value;
use smokeshop_core::{Filter, FindOptions, SortDirection, Update};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    Cursor, Document, DocumentCollection, StoreError, UpdateOutcome, checked_skip, effective_limit,
};

/// A collection stored in a `PostgreSQL` table.
#[derive(Clone)]
pub struct PgCollection {
    pool: PgPool,
    table: &'static str,
}

impl PgCollection {
    /// The product catalog (`shop.assortment`).
    #[must_use]
    pub const fn assortment(pool: PgPool) -> Self {
        Self {
            pool,
            table: "shop.assortment",
        }
    }

    /// The shared cart (`shop.cart`).
    #[must_use]
    pub const fn cart(pool: PgPool) -> Self {
        Self {
            pool,
            table: "shop.cart",
        }
    }
}

impl DocumentCollection for PgCollection {
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor, StoreError> {
        let mut query = select_query(self.table, filter, options)?;
        let documents = query
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        Ok(Cursor::new(documents))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT doc FROM {}", self.table));
        push_filter(&mut query, filter);
        query.push(" ORDER BY id LIMIT 1");

        Ok(query
            .build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidQuery(
                "document must be a JSON object".to_string(),
            ));
        }

        sqlx::query(&format!("INSERT INTO {} (doc) VALUES ($1)", self.table))
            .bind(document)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table}",
            table = self.table
        ));
        push_filter(&mut query, filter);
        query.push(" ORDER BY id LIMIT 1)");

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!("DELETE FROM {}", self.table));
        push_filter(&mut query, filter);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome, StoreError> {
        let (path, value) = match update {
            Update::SetPrice(price) => ("{price}", serde_json::to_value(price)?),
        };

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "WITH target AS (SELECT id, doc FROM {}",
            self.table
        ));
        push_filter(&mut query, filter);
        query.push(format!(
            " ORDER BY id LIMIT 1 FOR UPDATE) \
             UPDATE {table} SET doc = jsonb_set({table}.doc, ",
            table = self.table
        ));
        query.push_bind(path);
        query.push("::text[], ");
        query.push_bind(value);
        query.push(format!(
            ", true) FROM target WHERE {table}.id = target.id \
             RETURNING target.doc IS DISTINCT FROM {table}.doc",
            table = self.table
        ));

        let modified = query
            .build_query_scalar::<bool>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(modified.map_or_else(UpdateOutcome::default, |modified| UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Append a `WHERE` clause for `filter` (nothing for [`Filter::All`]).
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {}
        Filter::BrandMatches(pattern) => {
            query.push(" WHERE doc ->> 'brand' ~* ");
            query.push_bind(pattern.clone());
        }
        Filter::BrandEquals(value) => {
            query.push(" WHERE doc ->> 'brand' = ");
            query.push_bind(value.clone());
        }
    }
}

/// Build the `SELECT` for a `find` call.
///
/// Sorting orders by a type rank first so that mixed-type fields sort the same
/// way as in the in-memory backend, then by the `JSONB` value itself.
fn select_query<'a>(
    table: &str,
    filter: &Filter,
    options: &FindOptions,
) -> Result<QueryBuilder<'a, Postgres>, StoreError> {
    let skip = checked_skip(options.skip)?;

    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT doc FROM {table}"));
    push_filter(&mut query, filter);

    query.push(" ORDER BY ");
    if let Some(sort) = &options.sort {
        let direction = match sort.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        query.push("CASE jsonb_typeof(doc -> ");
        query.push_bind(sort.field.clone());
        query.push(
            ") WHEN 'number' THEN 1 WHEN 'string' THEN 2 WHEN 'object' THEN 3 \
             WHEN 'array' THEN 4 WHEN 'boolean' THEN 5 ELSE 0 END ",
        );
        query.push(direction);
        query.push(", doc -> ");
        query.push_bind(sort.field.clone());
        query.push(format!(" {direction}, "));
    }
    query.push("id ASC");

    if let Some(limit) = effective_limit(options.limit) {
        query.push(" LIMIT ");
        query.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    query.push(" OFFSET ");
    query.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));

    Ok(query)
}

#[cfg(test)]
mod tests {
    use smokeshop_core::SortSpec;

    use super::*;

    #[test]
    fn test_select_without_sort_uses_natural_order() {
        let options = FindOptions {
            sort: None,
            skip: 20,
            limit: 10,
        };
        let query = select_query("shop.assortment", &Filter::All, &options).unwrap_or_else(|e| {
            panic!("unexpected error: {e}");
        });
        assert_eq!(
            query.sql(),
            "SELECT doc FROM shop.assortment ORDER BY id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_select_with_filter_and_sort() {
        let options = FindOptions {
            sort: Some(SortSpec {
                field: "price".to_string(),
                direction: SortDirection::Descending,
            }),
            skip: 0,
            limit: 0,
        };
        let filter = Filter::BrandMatches("marlboro".to_string());
        let query = select_query("shop.assortment", &filter, &options).unwrap_or_else(|e| {
            panic!("unexpected error: {e}");
        });
        let sql = query.sql();
        assert!(sql.starts_with("SELECT doc FROM shop.assortment WHERE doc ->> 'brand' ~* $1"));
        assert!(sql.contains("jsonb_typeof(doc -> $2)"));
        assert!(sql.contains("doc -> $3 DESC, id ASC"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.ends_with("OFFSET $4"));
    }

    #[test]
    fn test_select_rejects_negative_skip() {
        let options = FindOptions {
            sort: None,
            skip: -10,
            limit: 10,
        };
        assert!(matches!(
            select_query("shop.assortment", &Filter::All, &options),
            Err(StoreError::InvalidQuery(_))
        ));
    }
}
