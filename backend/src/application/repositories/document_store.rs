use crate::domain::{
    aggregates::Page, base::Entity, permissions::Policy, query::Query, DomainResult,
};
use serde::{de::DeserializeOwned, Serialize};

/// A record stored as a JSON document in a named collection
pub trait Document: Serialize + DeserializeOwned {
    /// Collection (table) the documents live in
    const COLLECTION: &'static str;

    fn document_id(&self) -> &str;

    fn policies(&self) -> &[Policy];

    /// Record the permissions the reading caller holds on this document
    fn set_user_permissions(&mut self, permissions: Vec<String>);
}

impl Document for Page {
    const COLLECTION: &'static str = "newPage";

    fn document_id(&self) -> &str {
        self.id().as_str()
    }

    fn policies(&self) -> &[Policy] {
        Page::policies(self)
    }

    fn set_user_permissions(&mut self, permissions: Vec<String>) {
        Page::set_user_permissions(self, permissions);
    }
}

/// Driver contract for a document database.
///
/// Implementations evaluate the query's criteria, apply its projection and
/// return documents in insertion order. They do no access filtering of their own.
pub trait DocumentStore {
    /// Returns the first document matching the query, if any.
    fn find_one<D: Document>(&self, query: &Query) -> DomainResult<Option<D>>;

    /// Returns every document matching the query.
    fn find_all<D: Document>(&self, query: &Query) -> DomainResult<Vec<D>>;

    /// Inserts the document, or replaces the stored one with the same ID.
    fn upsert<D: Document>(&mut self, document: &D) -> DomainResult<()>;
}
