use crate::domain::{entities::User, value_objects::PermissionGroupId, DomainResult};
use std::collections::BTreeSet;

/// Accessor for the principal the current request runs as
pub trait SecurityContext {
    /// The authenticated user, or `None` for anonymous access.
    fn current_user(&self) -> DomainResult<Option<User>>;
}

/// Resolves which permission groups a principal belongs to
pub trait PermissionGroupSource {
    /// Groups the user is a direct member of.
    fn permission_groups_of_user(&self, user: &User) -> DomainResult<BTreeSet<PermissionGroupId>>;

    /// Groups every principal belongs to, including anonymous ones.
    fn public_permission_groups(&self) -> DomainResult<BTreeSet<PermissionGroupId>>;
}
