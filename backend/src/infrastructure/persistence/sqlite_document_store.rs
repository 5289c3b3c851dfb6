use super::error::StoreResult;
use super::sql_filter;
use crate::application::repositories::{Document, DocumentStore};
use crate::domain::query::Query;
use crate::domain::DomainResult;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult};
use tracing::debug;

/// SQLite-based implementation of the DocumentStore trait
///
/// Each collection is a table of whole JSON documents; criteria are
/// evaluated by SQLite's JSON functions.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Create a new SQLite store with the given connection
    ///
    /// The caller is responsible for having initialized the schema.
    pub fn new(conn: Connection) -> Self {
        SqliteDocumentStore { conn }
    }

    /// Create a new in-memory SQLite store (useful for testing)
    pub fn new_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::initialize_database(&conn)?;
        Ok(SqliteDocumentStore { conn })
    }

    /// Create a new file-based SQLite store
    pub fn new_with_path(path: impl AsRef<std::path::Path>) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        super::schema::initialize_database(&conn)?;
        Ok(SqliteDocumentStore { conn })
    }

    /// Number of documents stored in the collection of `D`
    pub fn count<D: Document>(&self) -> DomainResult<usize> {
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM \"{}\"", D::COLLECTION),
                [],
                |row| row.get(0),
            )
            .map_err(super::StoreError::from)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn select_documents<D: Document>(
        &self,
        query: &Query,
        limit: Option<usize>,
    ) -> StoreResult<Vec<D>> {
        let filter = sql_filter::compile(query.criteria());
        let mut sql = format!(
            "SELECT document FROM \"{}\" WHERE {} ORDER BY rowid",
            D::COLLECTION,
            filter.clause
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        debug!(
            "Querying {} with {} criteria (projection: {})",
            D::COLLECTION,
            query.criteria().len(),
            query.projection().is_some()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let raw_documents: Vec<String> = stmt
            .query_map(params_from_iter(filter.params.iter()), |row| row.get(0))?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut documents = Vec::with_capacity(raw_documents.len());
        for raw in raw_documents {
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            documents.push(serde_json::from_value(query.project(value))?);
        }

        debug!("Found {} documents in {}", documents.len(), D::COLLECTION);
        Ok(documents)
    }

    fn upsert_document<D: Document>(&mut self, document: &D) -> StoreResult<()> {
        let json = serde_json::to_string(document)?;

        // ON CONFLICT keeps the existing rowid, so insertion order survives updates
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (id, document, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(id) DO UPDATE SET
                    document = excluded.document,
                    updated_at = excluded.updated_at",
                D::COLLECTION
            ),
            params![document.document_id(), json],
        )?;

        Ok(())
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn find_one<D: Document>(&self, query: &Query) -> DomainResult<Option<D>> {
        let mut documents = self.select_documents::<D>(query, Some(1))?;
        Ok(documents.pop())
    }

    fn find_all<D: Document>(&self, query: &Query) -> DomainResult<Vec<D>> {
        Ok(self.select_documents(query, None)?)
    }

    fn upsert<D: Document>(&mut self, document: &D) -> DomainResult<()> {
        Ok(self.upsert_document(document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        aggregates::Page,
        base::Entity,
        entities::{Layout, PageVariant},
        query::{Criteria, FieldPath},
        value_objects::{ApplicationId, LayoutId, PageId},
    };
    use chrono::Utc;

    fn create_test_page(id: &str, app: &str, name: &str) -> Page {
        Page::new(
            PageId::new(id).unwrap(),
            ApplicationId::new(app).unwrap(),
            PageVariant::new(name).with_layout(Layout::new(
                LayoutId::new(format!("{id}-layout")).unwrap(),
                serde_json::json!({"widgetName": "MainContainer"}),
            )),
        )
    }

    #[test]
    fn test_upsert_and_find_by_id() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        let page = create_test_page("p1", "app-1", "Home");

        store.upsert(&page).unwrap();

        let query = Query::new(vec![Criteria::eq("id", "p1")]);
        let loaded: Page = store.find_one(&query).unwrap().unwrap();
        assert_eq!(loaded, page);
    }

    #[test]
    fn test_upsert_replaces_and_keeps_order() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        store.upsert(&create_test_page("p1", "app-1", "First")).unwrap();
        store.upsert(&create_test_page("p2", "app-1", "Second")).unwrap();
        store.upsert(&create_test_page("p1", "app-1", "First Renamed")).unwrap();

        let pages: Vec<Page> = store.find_all(&Query::default()).unwrap();
        let names: Vec<&str> = pages.iter().filter_map(|p| p.name(false)).collect();
        assert_eq!(names, vec!["First Renamed", "Second"]);
        assert_eq!(store.count::<Page>().unwrap(), 2);
    }

    #[test]
    fn test_find_with_nested_null_criteria() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        let active = create_test_page("p1", "app-1", "Active");
        let mut deleted = create_test_page("p2", "app-1", "Deleted");
        deleted.archive_unpublished(Utc::now()).unwrap();
        store.upsert(&active).unwrap();
        store.upsert(&deleted).unwrap();

        let query = Query::new(vec![
            Criteria::eq("applicationId", "app-1"),
            Criteria::is_null("unpublishedPage.deletedAt"),
        ]);
        let pages: Vec<Page> = store.find_all(&query).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id().as_str(), "p1");
    }

    #[test]
    fn test_find_by_layout_element() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        store.upsert(&create_test_page("p1", "app-1", "One")).unwrap();
        store.upsert(&create_test_page("p2", "app-1", "Two")).unwrap();

        let query = Query::new(vec![Criteria::elem_match(
            "unpublishedPage.layouts",
            vec![Criteria::eq("id", "p2-layout")],
        )]);
        let page: Option<Page> = store.find_one(&query).unwrap();

        assert_eq!(page.unwrap().id().as_str(), "p2");
    }

    #[test]
    fn test_projection() {
        let mut store = SqliteDocumentStore::new_in_memory().unwrap();
        store.upsert(&create_test_page("p1", "app-1", "Home")).unwrap();

        let query = Query::new(vec![]).include([
            FieldPath::from("unpublishedPage.slug"),
            FieldPath::from("applicationId"),
        ]);
        let page: Page = store.find_one(&query).unwrap().unwrap();

        let draft = page.unpublished_page().unwrap();
        assert_eq!(draft.slug(), Some("home"));
        assert_eq!(draft.name(), "");
        assert!(draft.layouts().is_empty());
        assert_eq!(page.application_id().as_str(), "app-1");
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.db");

        {
            let mut store = SqliteDocumentStore::new_with_path(&path).unwrap();
            store.upsert(&create_test_page("p1", "app-1", "Home")).unwrap();
        }

        let store = SqliteDocumentStore::new_with_path(&path).unwrap();
        assert_eq!(store.count::<Page>().unwrap(), 1);
    }
}
