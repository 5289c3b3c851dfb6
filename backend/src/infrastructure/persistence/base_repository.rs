/// Permission-aware query executor shared by document repositories
use crate::application::repositories::{
    Document, DocumentStore, PermissionGroupSource, SecurityContext,
};
use crate::domain::{
    permissions::AclPermission,
    query::{fields, Criteria, FieldPath, Query},
    value_objects::PermissionGroupId,
    DomainResult,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Wraps a document store with soft-delete filtering, ACL filtering and
/// per-caller permission stamping.
///
/// The caller's permission groups are resolved from the security context on
/// every query: the current user's own groups plus the public groups.
pub struct BaseRepository<S, C, G> {
    store: S,
    security: C,
    groups: G,
}

impl<S, C, G> BaseRepository<S, C, G>
where
    S: DocumentStore,
    C: SecurityContext,
    G: PermissionGroupSource,
{
    pub fn new(store: S, security: C, groups: G) -> Self {
        BaseRepository {
            store,
            security,
            groups,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Match a document by its ID
    pub fn id_criteria(id: &str) -> Criteria {
        Criteria::eq(fields::ID, id)
    }

    /// Exclude archived records: `deleted` unset or false, and no `deletedAt`
    pub fn not_deleted() -> Criteria {
        Criteria::And(vec![
            Criteria::Or(vec![
                Criteria::is_null(fields::DELETED),
                Criteria::eq(fields::DELETED, false),
            ]),
            Criteria::is_null(fields::DELETED_AT),
        ])
    }

    /// Require a policy granting `permission` to at least one of `groups`
    ///
    /// With no groups nothing matches.
    pub fn user_acl(groups: &BTreeSet<PermissionGroupId>, permission: AclPermission) -> Criteria {
        Criteria::elem_match(
            fields::POLICIES,
            vec![
                Criteria::eq(fields::PERMISSION, permission.value()),
                Criteria::contains_any(
                    fields::PERMISSION_GROUPS,
                    groups.iter().map(|group| group.as_str()),
                ),
            ],
        )
    }

    /// The current principal's groups plus the public groups
    pub fn all_permission_groups_for_current_user(
        &self,
    ) -> DomainResult<BTreeSet<PermissionGroupId>> {
        let mut groups = self.groups.public_permission_groups()?;
        if let Some(user) = self.security.current_user()? {
            groups.extend(self.groups.permission_groups_of_user(&user)?);
        }
        Ok(groups)
    }

    /// Stamp the permissions `groups` hold on the document through its policies
    pub fn set_user_permissions<D: Document>(document: &mut D, groups: &BTreeSet<PermissionGroupId>) {
        let permissions: BTreeSet<String> = document
            .policies()
            .iter()
            .filter(|policy| policy.grants_any(groups))
            .map(|policy| policy.permission.clone())
            .collect();
        document.set_user_permissions(permissions.into_iter().collect());
    }

    /// Run a query for at most one document
    pub fn query_one<D: Document>(
        &self,
        criteria: Vec<Criteria>,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<D>> {
        let groups = self.all_permission_groups_for_current_user()?;
        let query = Self::secured_query(criteria, permission, &groups);

        let mut document = self.store.find_one::<D>(&query)?;
        if let Some(document) = document.as_mut() {
            Self::set_user_permissions(document, &groups);
        }
        Ok(document)
    }

    /// Run a query for every matching document
    pub fn query_all<D: Document>(
        &self,
        criteria: Vec<Criteria>,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<D>> {
        self.query_all_projected(criteria, Vec::new(), permission)
    }

    /// Run a query for every matching document, keeping only the projected fields
    ///
    /// An empty projection returns whole documents.
    pub fn query_all_projected<D: Document>(
        &self,
        criteria: Vec<Criteria>,
        projection: Vec<FieldPath>,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<D>> {
        let groups = self.all_permission_groups_for_current_user()?;
        let mut query = Self::secured_query(criteria, permission, &groups);
        if !projection.is_empty() {
            query = query.include(projection);
        }

        let mut documents = self.store.find_all::<D>(&query)?;
        for document in &mut documents {
            Self::set_user_permissions(document, &groups);
        }
        Ok(documents)
    }

    /// Add the archive filter and, when a permission is asked for, the ACL filter
    pub fn secured_query(
        criteria: Vec<Criteria>,
        permission: Option<AclPermission>,
        groups: &BTreeSet<PermissionGroupId>,
    ) -> Query {
        let mut query = Query::new(criteria).add_criteria(Self::not_deleted());
        if let Some(permission) = permission {
            debug!(
                "Filtering by {} for {} permission groups",
                permission,
                groups.len()
            );
            query = query.add_criteria(Self::user_acl(groups, permission));
        }
        query
    }
}
