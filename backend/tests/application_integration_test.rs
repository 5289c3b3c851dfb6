use pagestore::application::{DocumentStore, PageRepository};
use pagestore::domain::*;
use pagestore::infrastructure::persistence::{
    DocumentPageRepository, InMemoryDocumentStore, SqliteDocumentStore,
};
use pagestore::infrastructure::security::{InMemoryPermissionGroups, StaticSecurityContext};

type Repository<S> = DocumentPageRepository<S, StaticSecurityContext, InMemoryPermissionGroups>;

fn group(name: &str) -> PermissionGroupId {
    PermissionGroupId::new(name).unwrap()
}

fn app(id: &str) -> ApplicationId {
    ApplicationId::new(id).unwrap()
}

fn page_id(id: &str) -> PageId {
    PageId::new(id).unwrap()
}

fn security_for(user: Option<&str>) -> (StaticSecurityContext, InMemoryPermissionGroups) {
    let mut groups = InMemoryPermissionGroups::new();
    groups.add_member(UserId::new("dev").unwrap(), group("developers"));
    groups.add_public(group("anyone"));

    let security = match user {
        Some(user) => StaticSecurityContext::authenticated(User::new(
            UserId::new(user).unwrap(),
            format!("{user}@example.com"),
        )),
        None => StaticSecurityContext::anonymous(),
    };
    (security, groups)
}

/// A small application: one public page, one developer page, one page that
/// was never published, and one whose draft was deleted after publishing.
fn sample_pages() -> Vec<Page> {
    let mut public = Page::new(page_id("p-public"), app("shop"), PageVariant::new("Storefront"))
        .grant(AclPermission::ReadPages, [group("anyone")]);
    public.publish().unwrap();

    let mut internal = Page::new(page_id("p-internal"), app("shop"), PageVariant::new("Admin"))
        .grant(AclPermission::ReadPages, [group("developers")])
        .grant(AclPermission::ManagePages, [group("developers")]);
    internal.publish().unwrap();

    let draft_only = Page::new(page_id("p-draft"), app("shop"), PageVariant::new("Checkout"))
        .grant(AclPermission::ReadPages, [group("developers")]);

    let mut retired = Page::new(page_id("p-retired"), app("shop"), PageVariant::new("Legacy"))
        .grant(AclPermission::ReadPages, [group("developers")]);
    retired.publish().unwrap();
    retired.archive_unpublished(chrono::Utc::now()).unwrap();

    vec![public, internal, draft_only, retired]
}

fn seeded<S: DocumentStore>(store: S, user: Option<&str>) -> Repository<S> {
    let (security, groups) = security_for(user);
    let mut repo = DocumentPageRepository::new(store, security, groups);
    for page in sample_pages() {
        repo.save(page).unwrap();
    }
    repo
}

fn sorted_ids(pages: &[Page]) -> Vec<String> {
    let mut ids: Vec<String> = pages.iter().map(|p| p.id().as_str().to_string()).collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_caller_sees_only_public_pages() {
        let repo = seeded(InMemoryDocumentStore::new(), None);
        let pages = repo
            .find_by_application_id(&app("shop"), Some(AclPermission::ReadPages))
            .unwrap();

        assert_eq!(sorted_ids(&pages), vec!["p-public"]);
        assert_eq!(pages[0].user_permissions(), ["read:pages".to_string()]);
    }

    #[test]
    fn test_developer_sees_group_and_public_pages() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let pages = repo
            .find_all_by_ids(
                &[page_id("p-public"), page_id("p-internal"), page_id("p-draft")],
                Some(AclPermission::ReadPages),
            )
            .unwrap();

        assert_eq!(sorted_ids(&pages), vec!["p-draft", "p-internal", "p-public"]);
    }

    #[test]
    fn test_manage_permission_narrows_results() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let pages = repo
            .find_by_application_id(&app("shop"), Some(AclPermission::ManagePages))
            .unwrap();

        assert_eq!(sorted_ids(&pages), vec!["p-internal"]);
    }

    #[test]
    fn test_published_lookup_finds_page_with_deleted_draft() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));

        let draft = repo
            .find_by_name_and_view_mode("Legacy", Some(AclPermission::ReadPages), ViewMode::Draft)
            .unwrap();
        assert!(draft.is_none());

        let published = repo
            .find_by_name_and_view_mode(
                "Legacy",
                Some(AclPermission::ReadPages),
                ViewMode::from_view_flag(true),
            )
            .unwrap()
            .unwrap();
        assert_eq!(published.id().as_str(), "p-retired");
        assert!(!published.is_active_in_edit_mode());
    }

    #[test]
    fn test_unpublished_page_is_absent_in_published_mode() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let found = repo
            .find_by_name_and_application_id_and_view_mode(
                "Checkout",
                &app("shop"),
                Some(AclPermission::ReadPages),
                ViewMode::Published,
            )
            .unwrap();
        assert!(found.is_none());

        assert_eq!(
            repo.get_name_by_page_id(&page_id("p-draft"), true).unwrap(),
            Some("Checkout".to_string())
        );
    }

    #[test]
    fn test_missing_id_fails_before_querying() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let before = repo.store().queries_issued();

        let result = repo.find_root_application_id_by_id(None, Some(AclPermission::ReadPages));

        assert_eq!(result, Err(DomainError::InvalidParameter("id".to_string())));
        assert_eq!(repo.store().queries_issued(), before);
    }

    #[test]
    fn test_root_lookup_projects_application_id() {
        let repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let page = repo
            .find_root_application_id_by_id(
                Some(&page_id("p-internal")),
                Some(AclPermission::ReadPages),
            )
            .unwrap()
            .unwrap();

        assert_eq!(page.id().as_str(), "p-internal");
        assert_eq!(page.application_id(), &app("shop"));
        assert!(page.unpublished_page().is_none());
        assert!(page.published_page().is_none());
    }

    #[test]
    fn test_saving_again_replaces_the_document() {
        let mut repo = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let mut page = repo
            .find_by_id(&page_id("p-draft"), Some(AclPermission::ReadPages))
            .unwrap()
            .unwrap();
        page.unpublished_page_mut().unwrap().rename("Checkout v2");
        repo.save(page).unwrap();

        let renamed = repo
            .find_by_name_and_view_mode("Checkout v2", None, ViewMode::Draft)
            .unwrap();
        assert!(renamed.is_some());
        assert!(repo
            .find_by_name_and_view_mode("Checkout", None, ViewMode::Draft)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_drivers_agree() {
        let memory = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let sqlite = seeded(SqliteDocumentStore::new_in_memory().unwrap(), Some("dev"));

        let read = Some(AclPermission::ReadPages);
        assert_eq!(
            sorted_ids(&memory.find_by_application_id(&app("shop"), read).unwrap()),
            sorted_ids(&sqlite.find_by_application_id(&app("shop"), read).unwrap())
        );
        assert_eq!(
            sorted_ids(
                &memory
                    .find_by_application_id_and_non_deleted_edit_mode(&app("shop"), read)
                    .unwrap()
            ),
            sorted_ids(
                &sqlite
                    .find_by_application_id_and_non_deleted_edit_mode(&app("shop"), read)
                    .unwrap()
            )
        );
        assert_eq!(
            memory
                .find_slugs_by_application_ids(&[app("shop")], read)
                .unwrap(),
            sqlite
                .find_slugs_by_application_ids(&[app("shop")], read)
                .unwrap()
        );
    }

    #[test]
    fn test_drivers_agree_on_large_id_batches() {
        let memory = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let sqlite = seeded(SqliteDocumentStore::new_in_memory().unwrap(), Some("dev"));

        let mut ids: Vec<PageId> = (0..40_000)
            .map(|n| page_id(&format!("unknown-{n}")))
            .collect();
        ids.push(page_id("p-public"));
        ids.push(page_id("p-draft"));

        let read = Some(AclPermission::ReadPages);
        let from_memory = memory.find_all_by_ids(&ids, read).unwrap();
        let from_sqlite = sqlite.find_all_by_ids(&ids, read).unwrap();

        assert_eq!(sorted_ids(&from_sqlite), vec!["p-draft", "p-public"]);
        assert_eq!(sorted_ids(&from_memory), sorted_ids(&from_sqlite));

        let applications: Vec<ApplicationId> = (0..40_000)
            .map(|n| app(&format!("app-{n}")))
            .chain([app("shop")])
            .collect();
        assert_eq!(
            sqlite.find_slugs_by_application_ids(&applications, read).unwrap().len(),
            4
        );
    }

    #[test]
    fn test_empty_application_list_has_no_slugs() {
        let memory = seeded(InMemoryDocumentStore::new(), Some("dev"));
        let sqlite = seeded(SqliteDocumentStore::new_in_memory().unwrap(), Some("dev"));

        assert!(memory.find_slugs_by_application_ids(&[], None).unwrap().is_empty());
        assert!(sqlite.find_slugs_by_application_ids(&[], None).unwrap().is_empty());
    }
}
