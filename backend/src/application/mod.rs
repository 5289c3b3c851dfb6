pub mod repositories;

// Re-export key types to avoid naming conflicts
pub use repositories::{
    Document, DocumentStore, PageRepository, PermissionGroupSource, SecurityContext,
};
