/// Security adapters: fixed principals and in-memory group memberships
use crate::application::repositories::{PermissionGroupSource, SecurityContext};
use crate::domain::{
    base::Entity,
    entities::User,
    value_objects::{PermissionGroupId, UserId},
    DomainResult,
};
use std::collections::{BTreeSet, HashMap};

/// Security context that always reports the same principal
#[derive(Debug, Clone, Default)]
pub struct StaticSecurityContext {
    user: Option<User>,
}

impl StaticSecurityContext {
    pub fn authenticated(user: User) -> Self {
        StaticSecurityContext { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        StaticSecurityContext { user: None }
    }
}

impl SecurityContext for StaticSecurityContext {
    fn current_user(&self) -> DomainResult<Option<User>> {
        Ok(self.user.clone())
    }
}

/// Permission group memberships held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissionGroups {
    members: HashMap<UserId, BTreeSet<PermissionGroupId>>,
    public: BTreeSet<PermissionGroupId>,
}

impl InMemoryPermissionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, user_id: UserId, group: PermissionGroupId) {
        self.members.entry(user_id).or_default().insert(group);
    }

    /// Make a group apply to every principal, anonymous ones included
    pub fn add_public(&mut self, group: PermissionGroupId) {
        self.public.insert(group);
    }
}

impl PermissionGroupSource for InMemoryPermissionGroups {
    fn permission_groups_of_user(&self, user: &User) -> DomainResult<BTreeSet<PermissionGroupId>> {
        Ok(self.members.get(user.id()).cloned().unwrap_or_default())
    }

    fn public_permission_groups(&self) -> DomainResult<BTreeSet<PermissionGroupId>> {
        Ok(self.public.clone())
    }
}
