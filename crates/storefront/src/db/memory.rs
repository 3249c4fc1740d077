//! In-process document collection.
//!
//! Holds documents in insertion order behind a lock. Used for local
//! development (`SHOP_STORE=memory`) and by the test suites.

use std::cmp::Ordering;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use smokeshop_core::{Filter, FindOptions, SortDirection, Update};

use super::{
    Cursor, Document, DocumentCollection, StoreError, UpdateOutcome, checked_skip, effective_limit,
};

/// A collection kept in process memory.
///
/// Clones share the same underlying documents.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl MemoryCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection pre-populated with `documents`, in order.
    #[must_use]
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Number of stored documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    /// Whether the collection holds no documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Document>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))
    }
}

impl DocumentCollection for MemoryCollection {
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor, StoreError> {
        let matcher = Matcher::compile(filter)?;
        let skip = usize::try_from(checked_skip(options.skip)?).unwrap_or(usize::MAX);

        let mut matched: Vec<Document> = self
            .read()?
            .iter()
            .filter(|doc| matcher.matches(doc))
            .cloned()
            .collect();

        if let Some(sort) = &options.sort {
            // `sort_by` is stable, so ties stay in insertion order.
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let page = matched.into_iter().skip(skip);
        let documents = match effective_limit(options.limit) {
            Some(limit) => page
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => page.collect(),
        };

        Ok(Cursor::new(documents))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let matcher = Matcher::compile(filter)?;
        Ok(self.read()?.iter().find(|doc| matcher.matches(doc)).cloned())
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidQuery(
                "document must be a JSON object".to_string(),
            ));
        }
        self.write()?.push(document);
        Ok(())
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        let matcher = Matcher::compile(filter)?;
        let mut documents = self.write()?;
        match documents.iter().position(|doc| matcher.matches(doc)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        let matcher = Matcher::compile(filter)?;
        let mut documents = self.write()?;
        let before = documents.len();
        documents.retain(|doc| !matcher.matches(doc));
        Ok(u64::try_from(before - documents.len()).unwrap_or(u64::MAX))
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome, StoreError> {
        let matcher = Matcher::compile(filter)?;
        let mut documents = self.write()?;
        let Some(object) = documents
            .iter_mut()
            .find(|doc| matcher.matches(doc))
            .and_then(Value::as_object_mut)
        else {
            return Ok(UpdateOutcome::default());
        };

        let (field, value) = match update {
            Update::SetPrice(price) => ("price", serde_json::to_value(price)?),
        };
        let modified = object.get(field) != Some(&value);
        object.insert(field.to_string(), value);

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}

/// A [`Filter`] prepared for repeated evaluation.
enum Matcher {
    All,
    Pattern(Regex),
    Exact(String),
}

impl Matcher {
    fn compile(filter: &Filter) -> Result<Self, StoreError> {
        Ok(match filter {
            Filter::All => Self::All,
            Filter::BrandMatches(pattern) => Self::Pattern(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StoreError::InvalidQuery(format!("invalid brand pattern: {e}")))?,
            ),
            Filter::BrandEquals(value) => Self::Exact(value.clone()),
        })
    }

    fn matches(&self, document: &Document) -> bool {
        let brand = document.get("brand").and_then(Value::as_str);
        match self {
            Self::All => true,
            Self::Pattern(regex) => brand.is_some_and(|b| regex.is_match(b)),
            Self::Exact(value) => brand == Some(value.as_str()),
        }
    }
}

/// Rank of a value's type in sort order.
const fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compare two field values: first by type rank, then by value.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    })
}
