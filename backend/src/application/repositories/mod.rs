pub mod document_store;
pub mod page_repository;
pub mod security;

pub use document_store::{Document, DocumentStore};
pub use page_repository::PageRepository;
pub use security::{PermissionGroupSource, SecurityContext};
