use super::base_repository::BaseRepository;
use crate::application::repositories::{
    DocumentStore, PageRepository, PermissionGroupSource, SecurityContext,
};
use crate::domain::{
    aggregates::Page,
    base::{DomainError, Entity},
    permissions::AclPermission,
    query::{fields, Criteria, FieldPath, Query},
    value_objects::{ApplicationId, BranchName, LayoutId, PageId, ViewMode},
    DomainResult,
};
use tracing::warn;

/// PageRepository over any DocumentStore, filtered by the caller's permissions
pub struct DocumentPageRepository<S, C, G> {
    base: BaseRepository<S, C, G>,
}

impl<S, C, G> DocumentPageRepository<S, C, G>
where
    S: DocumentStore,
    C: SecurityContext,
    G: PermissionGroupSource,
{
    pub fn new(store: S, security: C, groups: G) -> Self {
        DocumentPageRepository {
            base: BaseRepository::new(store, security, groups),
        }
    }

    pub fn store(&self) -> &S {
        self.base.store()
    }

    fn variant_field(view_mode: ViewMode) -> FieldPath {
        match view_mode {
            ViewMode::Draft => FieldPath::new(fields::UNPUBLISHED_PAGE),
            ViewMode::Published => FieldPath::new(fields::PUBLISHED_PAGE),
        }
    }

    /// A page deleted in edit mode can still exist in deployed mode, so draft
    /// reads must skip drafts carrying a delete timestamp.
    fn active_draft_criteria() -> Criteria {
        Criteria::is_null(FieldPath::new(fields::UNPUBLISHED_PAGE).child(fields::DELETED_AT))
    }

    fn name_criteria(name: &str, view_mode: ViewMode) -> Criteria {
        Criteria::eq(Self::variant_field(view_mode).child(fields::NAME), name)
    }

    fn application_id_criteria(application_id: &ApplicationId) -> Criteria {
        Criteria::eq(fields::APPLICATION_ID, application_id.as_str())
    }

    fn with_draft_filter(mut criteria: Vec<Criteria>, view_mode: ViewMode) -> Vec<Criteria> {
        if view_mode == ViewMode::Draft {
            criteria.push(Self::active_draft_criteria());
        }
        criteria
    }
}

impl<S, C, G> PageRepository for DocumentPageRepository<S, C, G>
where
    S: DocumentStore,
    C: SecurityContext,
    G: PermissionGroupSource,
{
    fn save(&mut self, page: Page) -> DomainResult<()> {
        self.base.store_mut().upsert(&page)
    }

    fn find_by_id(
        &self,
        id: &PageId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<Page>> {
        self.base.query_one(
            vec![BaseRepository::<S, C, G>::id_criteria(id.as_str())],
            permission,
        )
    }

    fn find_by_application_id(
        &self,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>> {
        self.base
            .query_all(vec![Self::application_id_criteria(application_id)], permission)
    }

    fn find_by_application_id_and_non_deleted_edit_mode(
        &self,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>> {
        self.base.query_all(
            vec![
                Self::application_id_criteria(application_id),
                Self::active_draft_criteria(),
            ],
            permission,
        )
    }

    fn find_by_id_and_layouts_id_and_view_mode(
        &self,
        id: &PageId,
        layout_id: &LayoutId,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>> {
        let layouts = Self::variant_field(view_mode).child(fields::LAYOUTS);
        let criteria = Self::with_draft_filter(
            vec![
                BaseRepository::<S, C, G>::id_criteria(id.as_str()),
                Criteria::elem_match(layouts, vec![Criteria::eq(fields::ID, layout_id.as_str())]),
            ],
            view_mode,
        );

        self.base.query_one(criteria, permission)
    }

    fn find_by_name_and_view_mode(
        &self,
        name: &str,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>> {
        let criteria = Self::with_draft_filter(vec![Self::name_criteria(name, view_mode)], view_mode);
        self.base.query_one(criteria, permission)
    }

    fn find_by_name_and_application_id_and_view_mode(
        &self,
        name: &str,
        application_id: &ApplicationId,
        permission: Option<AclPermission>,
        view_mode: ViewMode,
    ) -> DomainResult<Option<Page>> {
        let criteria = Self::with_draft_filter(
            vec![
                Self::name_criteria(name, view_mode),
                Self::application_id_criteria(application_id),
            ],
            view_mode,
        );
        self.base.query_one(criteria, permission)
    }

    fn find_all_by_ids(
        &self,
        ids: &[PageId],
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>> {
        self.base.query_all(
            vec![Criteria::is_in(fields::ID, ids.iter().map(PageId::as_str))],
            permission,
        )
    }

    fn find_page_by_branch_name_and_default_page_id(
        &self,
        branch_name: &BranchName,
        default_page_id: &PageId,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<Page>> {
        let default_resources = FieldPath::new(fields::DEFAULT_RESOURCES);
        self.base.query_one(
            vec![
                Criteria::eq(
                    default_resources.clone().child(fields::PAGE_ID),
                    default_page_id.as_str(),
                ),
                Criteria::eq(
                    default_resources.child(fields::BRANCH_NAME),
                    branch_name.as_str(),
                ),
            ],
            permission,
        )
    }

    fn find_slugs_by_application_ids(
        &self,
        application_ids: &[ApplicationId],
        permission: Option<AclPermission>,
    ) -> DomainResult<Vec<Page>> {
        let unpublished = FieldPath::new(fields::UNPUBLISHED_PAGE);
        let published = FieldPath::new(fields::PUBLISHED_PAGE);
        let projection = vec![
            unpublished.clone().child(fields::SLUG),
            unpublished.child(fields::CUSTOM_SLUG),
            published.clone().child(fields::SLUG),
            published.child(fields::CUSTOM_SLUG),
            FieldPath::new(fields::APPLICATION_ID),
        ];

        self.base.query_all_projected(
            vec![Criteria::is_in(
                fields::APPLICATION_ID,
                application_ids.iter().map(ApplicationId::as_str),
            )],
            projection,
            permission,
        )
    }

    fn find_root_application_id_by_id(
        &self,
        id: Option<&PageId>,
        permission: Option<AclPermission>,
    ) -> DomainResult<Option<Page>> {
        let Some(id) = id else {
            warn!("Rejected root application lookup without a page id");
            return Err(DomainError::InvalidParameter(fields::ID.to_string()));
        };

        let groups = self.base.all_permission_groups_for_current_user()?;
        let query = BaseRepository::<S, C, G>::secured_query(
            vec![BaseRepository::<S, C, G>::id_criteria(id.as_str())],
            permission,
            &groups,
        )
        .include([
            FieldPath::new(fields::APPLICATION_ID),
            FieldPath::new(fields::DEFAULT_RESOURCES),
        ]);

        let mut page = self.base.store().find_one::<Page>(&query)?;
        if let Some(page) = page.as_mut() {
            BaseRepository::<S, C, G>::set_user_permissions(page, &groups);
        }
        Ok(page)
    }

    fn get_name_by_page_id(&self, id: &PageId, published: bool) -> DomainResult<Option<String>> {
        let query = Query::new(vec![BaseRepository::<S, C, G>::id_criteria(id.as_str())]);
        let page = self.base.store().find_one::<Page>(&query)?;

        Ok(page.and_then(|page| {
            let name = page.name(published).map(str::to_string);
            if name.is_none() {
                warn!("Page {} has neither a draft nor a published variant", page.id());
            }
            name
        }))
    }
}
