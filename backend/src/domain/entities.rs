/// Domain entities
use super::base::Entity;
use super::value_objects::{ApplicationId, BranchName, LayoutId, PageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Layout is one widget tree (DSL) of a page variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    id: LayoutId,
    #[serde(default)]
    dsl: serde_json::Value,
}

impl Layout {
    pub fn new(id: LayoutId, dsl: serde_json::Value) -> Self {
        Layout { id, dsl }
    }

    /// Create an empty layout with a generated ID
    pub fn empty() -> Self {
        Layout::new(LayoutId::generate(), serde_json::Value::Null)
    }

    pub fn dsl(&self) -> &serde_json::Value {
        &self.dsl
    }
}

impl Entity for Layout {
    type Id = LayoutId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// One variant of a page: the draft (`unpublishedPage`) or the deployed copy (`publishedPage`)
///
/// Every field defaults so that projected reads, which only carry a few
/// fields, still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageVariant {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_slug: Option<String>,
    layouts: Vec<Layout>,
    is_hidden: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl PageVariant {
    /// Create a variant with the given name; the slug is derived from it
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        PageVariant {
            name,
            slug: Some(slug),
            ..PageVariant::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layouts.push(layout);
        self
    }

    pub fn with_custom_slug(mut self, custom_slug: impl Into<String>) -> Self {
        self.custom_slug = Some(custom_slug.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn custom_slug(&self) -> Option<&str> {
        self.custom_slug.as_deref()
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Find a layout of this variant by its ID
    pub fn layout(&self, id: &LayoutId) -> Option<&Layout> {
        self.layouts.iter().find(|layout| layout.id() == id)
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// A variant is active while it carries no delete timestamp
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Rename the variant, refreshing the derived slug
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = Some(slugify(&self.name));
    }

    pub(crate) fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    pub(crate) fn clear_deleted(&mut self) {
        self.deleted_at = None;
    }
}

/// Branch-agnostic identity of a page, used to correlate its copies across branches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultResources {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_id: Option<PageId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub application_id: Option<ApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch_name: Option<BranchName>,
}

impl DefaultResources {
    pub fn new(page_id: PageId, application_id: ApplicationId) -> Self {
        DefaultResources {
            page_id: Some(page_id),
            application_id: Some(application_id),
            branch_name: None,
        }
    }

    pub fn on_branch(mut self, branch_name: BranchName) -> Self {
        self.branch_name = Some(branch_name);
        self
    }
}

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: String,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        User {
            id,
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Lower-case, dash-separated form of a page name used in URLs
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
