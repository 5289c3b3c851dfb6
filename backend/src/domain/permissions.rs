/// Access-control vocabulary shared by policies and repository queries
use super::value_objects::PermissionGroupId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Permissions that can be granted on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclPermission {
    ReadPages,
    ManagePages,
    DeletePages,
    CreatePageActions,
}

impl AclPermission {
    /// The string stored in `policies[].permission`
    pub fn value(self) -> &'static str {
        match self {
            AclPermission::ReadPages => "read:pages",
            AclPermission::ManagePages => "manage:pages",
            AclPermission::DeletePages => "delete:pages",
            AclPermission::CreatePageActions => "create:pageActions",
        }
    }
}

impl fmt::Display for AclPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Grants one permission to a set of permission groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub permission: String,
    #[serde(default)]
    pub permission_groups: BTreeSet<PermissionGroupId>,
}

impl Policy {
    pub fn new(
        permission: AclPermission,
        groups: impl IntoIterator<Item = PermissionGroupId>,
    ) -> Self {
        Policy {
            permission: permission.value().to_string(),
            permission_groups: groups.into_iter().collect(),
        }
    }

    /// Whether any of the given groups is covered by this policy
    pub fn grants_any<'a>(&self, groups: impl IntoIterator<Item = &'a PermissionGroupId>) -> bool {
        groups
            .into_iter()
            .any(|group| self.permission_groups.contains(group))
    }
}
