use crate::domain::{
    aggregates::Page,
    permissions::AclPermission,
    value_objects::{ApplicationId, BranchName, LayoutId, PageId, ViewMode},
    DomainResult,
};

/// Repository trait for querying Page aggregates.
///
/// Every read is filtered by the caller's access: when a permission is
/// given, only pages whose policies grant it to one of the caller's
/// permission groups are returned, and each returned page carries the
/// permissions the caller holds on it. Archived records are never returned.
///
/// Draft-mode reads additionally skip pages whose draft was soft-deleted;
/// published-mode reads do not, because a page with a deleted draft can
/// still have a live published copy.
pub trait PageRepository {
    /// Inserts the page, or replaces the stored copy with the same ID.
    fn save(&mut self, page: Page) -> DomainResult<()>;

    /// Finds a page by its unique identifier.
    fn find_by_id(&self, id: &PageId, permission: Option<AclPermission>)
        -> DomainResult<Option<Page>>;

    /// Returns all pages of an application.
    fn find_by_application_id(
        &self,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>>;

    /// Returns the pages of an application whose draft is not soft-deleted.
    fn find_by_application_id_and_non_deleted_edit_mode(
        &self,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>>;

    /// Finds a page that holds the given layout in the variant selected by `view_mode`.
    fn find_by_id_and_layouts_id_and_view_mode(
        &self,
        id: &PageId,
        layout_id: &LayoutId,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>>;

    /// Finds a page by the name of the variant selected by `view_mode`.
    fn find_by_name_and_view_mode(
        &self,
        name: &str,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>>;

    /// Like [`PageRepository::find_by_name_and_view_mode`], restricted to one application.
    fn find_by_name_and_application_id_and_view_mode(
        &self,
        name: &str,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>>;

    /// Returns the pages whose ID is in `ids`.
    fn find_all_by_ids(
        &self,
        ids: &[PageId],
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>>;

    /// Finds the copy of a page living on `branch_name`.
    fn find_page_by_branch_name_and_default_page_id(
        &self,
        branch_name: &BranchName,
        default_page_id: &PageId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<Page>>;

    /// Returns the pages of the given applications, carrying only their slugs and application ID.
    fn find_slugs_by_application_ids(
        &self,
        application_ids: &[ApplicationId],
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>>;

    /// Resolves the application that owns a page, carrying only the application
    /// ID and default resources.
    ///
    /// A missing `id` fails with `DomainError::InvalidParameter` before any query runs.
    fn find_root_application_id_by_id(
        &self,
        id: Option<&PageId>,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<Page>>;

    /// Returns the display name of a page.
    ///
    /// Reads the published name when `published` is set and the page has been
    /// published, otherwise the draft name. No access filtering applies.
    fn get_name_by_page_id(&self, id: &PageId, published: bool) -> DomainResult<Option<String>>;
}
