// Domain layer module
pub mod base;
pub mod value_objects;
pub mod entities;
pub mod aggregates;
pub mod permissions;
pub mod query;

pub use base::*;
pub use value_objects::*;
pub use entities::*;
pub use aggregates::*;
pub use permissions::*;
pub use query::{fields, Criteria, FieldPath, Query};
