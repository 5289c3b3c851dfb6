use super::error::StoreError;
use crate::application::repositories::{Document, DocumentStore};
use crate::domain::query::Query;
use crate::domain::{DomainError, DomainResult};
use serde_json::Value;
use std::cell::Cell;
use std::collections::HashMap;
use tracing::debug;

/// In-memory DocumentStore that evaluates criteria in Rust
///
/// Keeps documents in insertion order per collection and counts the
/// queries it serves, which lets tests assert that a call never reached
/// the store.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: HashMap<&'static str, Vec<(String, Value)>>,
    queries_issued: Cell<usize>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of find queries served so far
    pub fn queries_issued(&self) -> usize {
        self.queries_issued.get()
    }

    fn matching<D: Document>(&self, query: &Query) -> DomainResult<Vec<D>> {
        self.queries_issued.set(self.queries_issued.get() + 1);
        debug!(
            "Querying {} in memory with {} criteria",
            D::COLLECTION,
            query.criteria().len()
        );

        let Some(documents) = self.collections.get(D::COLLECTION) else {
            return Ok(Vec::new());
        };

        documents
            .iter()
            .filter(|(_, document)| query.matches(document))
            .map(|(_, document)| {
                serde_json::from_value(query.project(document.clone()))
                    .map_err(|e| DomainError::from(StoreError::from(e)))
            })
            .collect()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn find_one<D: Document>(&self, query: &Query) -> DomainResult<Option<D>> {
        Ok(self.matching::<D>(query)?.into_iter().next())
    }

    fn find_all<D: Document>(&self, query: &Query) -> DomainResult<Vec<D>> {
        self.matching(query)
    }

    fn upsert<D: Document>(&mut self, document: &D) -> DomainResult<()> {
        let value = serde_json::to_value(document).map_err(StoreError::from)?;
        let id = document.document_id().to_string();
        let documents = self.collections.entry(D::COLLECTION).or_default();

        match documents.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = value,
            None => documents.push((id, value)),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        aggregates::Page,
        base::Entity,
        entities::PageVariant,
        query::Criteria,
        value_objects::{ApplicationId, PageId},
    };

    fn page(id: &str, name: &str) -> Page {
        Page::new(
            PageId::new(id).unwrap(),
            ApplicationId::new("app-1").unwrap(),
            PageVariant::new(name),
        )
    }

    #[test]
    fn test_upsert_and_find() {
        let mut store = InMemoryDocumentStore::new();
        store.upsert(&page("p1", "Home")).unwrap();
        store.upsert(&page("p2", "About")).unwrap();

        let query = Query::new(vec![Criteria::eq("unpublishedPage.name", "About")]);
        let found: Option<Page> = store.find_one(&query).unwrap();

        assert_eq!(found.unwrap().id().as_str(), "p2");
        assert_eq!(store.queries_issued(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = InMemoryDocumentStore::new();
        store.upsert(&page("p1", "Home")).unwrap();
        store.upsert(&page("p2", "About")).unwrap();
        store.upsert(&page("p1", "Start")).unwrap();

        let pages: Vec<Page> = store.find_all(&Query::default()).unwrap();
        let names: Vec<&str> = pages.iter().filter_map(|p| p.name(false)).collect();
        assert_eq!(names, vec!["Start", "About"]);
    }

    #[test]
    fn test_empty_collection() {
        let store = InMemoryDocumentStore::new();
        let pages: Vec<Page> = store.find_all(&Query::default()).unwrap();
        assert!(pages.is_empty());
        assert_eq!(store.queries_issued(), 1);
    }
}
