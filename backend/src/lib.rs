//! Permission-aware page queries over a document store.
//!
//! Pages pair an editable draft with a published copy. The repository turns
//! typed query intents into document criteria, layering in soft-delete
//! filtering, draft/published branching and access-control filtering.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use application::{DocumentStore, PageRepository};
pub use config::StoreConfig;
pub use infrastructure::persistence::{
    DocumentPageRepository, InMemoryDocumentStore, SqliteDocumentStore,
};
