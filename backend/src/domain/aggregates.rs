/// Domain aggregates
use super::base::{DomainError, DomainResult, Entity};
use super::entities::{DefaultResources, PageVariant};
use super::permissions::{AclPermission, Policy};
use super::value_objects::{ApplicationId, PageId, PermissionGroupId, ViewMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Page is the aggregate root stored in the `newPage` collection
///
/// It pairs the editable draft with the deployed copy of the same page.
/// At most one of the two variants is absent: a page starts with a draft,
/// and publishing copies the draft over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    id: PageId,
    application_id: ApplicationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unpublished_page: Option<PageVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_page: Option<PageVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_resources: Option<DefaultResources>,
    #[serde(default)]
    policies: Vec<Policy>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    deleted_at: Option<DateTime<Utc>>,
    /// Computed per caller on read; never persisted as a filter input
    #[serde(default, skip_serializing)]
    user_permissions: Vec<String>,
}

impl Page {
    /// Create a new page holding only a draft
    pub fn new(id: PageId, application_id: ApplicationId, draft: PageVariant) -> Self {
        Page {
            id,
            application_id,
            unpublished_page: Some(draft),
            published_page: None,
            default_resources: None,
            policies: Vec::new(),
            deleted: false,
            deleted_at: None,
            user_permissions: Vec::new(),
        }
    }

    /// Create a new page with a generated ID whose default resources point at itself
    pub fn create(application_id: ApplicationId, draft: PageVariant) -> Self {
        let id = PageId::generate();
        let default_resources = DefaultResources::new(id.clone(), application_id.clone());
        Page::new(id, application_id, draft).with_default_resources(default_resources)
    }

    pub fn with_default_resources(mut self, default_resources: DefaultResources) -> Self {
        self.default_resources = Some(default_resources);
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Grant a permission on this page to the given groups
    pub fn grant(
        self,
        permission: AclPermission,
        groups: impl IntoIterator<Item = PermissionGroupId>,
    ) -> Self {
        self.with_policy(Policy::new(permission, groups))
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn unpublished_page(&self) -> Option<&PageVariant> {
        self.unpublished_page.as_ref()
    }

    pub fn unpublished_page_mut(&mut self) -> Option<&mut PageVariant> {
        self.unpublished_page.as_mut()
    }

    pub fn published_page(&self) -> Option<&PageVariant> {
        self.published_page.as_ref()
    }

    /// The variant read in the given view mode
    pub fn variant(&self, view_mode: ViewMode) -> Option<&PageVariant> {
        match view_mode {
            ViewMode::Draft => self.unpublished_page(),
            ViewMode::Published => self.published_page(),
        }
    }

    pub fn default_resources(&self) -> Option<&DefaultResources> {
        self.default_resources.as_ref()
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Permissions the reading caller holds on this page
    pub fn user_permissions(&self) -> &[String] {
        &self.user_permissions
    }

    pub fn set_user_permissions(&mut self, permissions: Vec<String>) {
        self.user_permissions = permissions;
    }

    /// Display name of the page in the requested variant
    ///
    /// Falls back to the draft name when the published variant is asked for
    /// but the page has never been published.
    pub fn name(&self, published: bool) -> Option<&str> {
        let variant = if published {
            self.published_page.as_ref()
        } else {
            self.unpublished_page.as_ref()
        };

        variant
            .or(self.unpublished_page.as_ref())
            .map(|variant| variant.name())
    }

    /// Whether the draft is active (not soft-deleted) in edit mode
    pub fn is_active_in_edit_mode(&self) -> bool {
        self.unpublished_page
            .as_ref()
            .map_or(true, |draft| !draft.is_deleted())
    }

    pub fn is_archived(&self) -> bool {
        self.deleted || self.deleted_at.is_some()
    }

    /// Copy the draft over the published variant
    pub fn publish(&mut self) -> DomainResult<()> {
        let draft = self.unpublished_page.as_ref().ok_or_else(|| {
            DomainError::InvalidValue(format!("Page {} has no draft to publish", self.id))
        })?;

        // Deleting a draft and publishing removes the deployed copy too
        if let Some(deleted_at) = draft.deleted_at() {
            self.published_page = None;
            self.archive(deleted_at);
            return Ok(());
        }

        self.published_page = Some(draft.clone());
        Ok(())
    }

    /// Soft-delete the draft, keeping any published copy live
    pub fn archive_unpublished(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        let draft = self.unpublished_page.as_mut().ok_or_else(|| {
            DomainError::InvalidValue(format!("Page {} has no draft to delete", self.id))
        })?;
        draft.mark_deleted(at);
        Ok(())
    }

    /// Undo a draft soft-delete
    pub fn restore_unpublished(&mut self) {
        if let Some(draft) = self.unpublished_page.as_mut() {
            draft.clear_deleted();
        }
    }

    /// Soft-delete the whole record
    pub fn archive(&mut self, at: DateTime<Utc>) {
        self.deleted = true;
        self.deleted_at = Some(at);
    }
}

impl Entity for Page {
    type Id = PageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
