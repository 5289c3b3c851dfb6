mod base_repository;
mod error;
mod in_memory_document_store;
mod page_repository_impl;
mod schema;
mod sql_filter;
mod sqlite_document_store;

pub use base_repository::BaseRepository;
pub use error::{StoreError, StoreResult};
pub use in_memory_document_store::InMemoryDocumentStore;
pub use page_repository_impl::DocumentPageRepository;
pub use schema::{ensure_collection, initialize_database};
pub use sql_filter::{compile as compile_filter, SqlFilter};
pub use sqlite_document_store::SqliteDocumentStore;
