/// Value objects for the domain layer
use super::base::{DomainError, DomainResult, ValueObject};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidValue("PageId cannot be empty".to_string()));
        }
        Ok(PageId(id))
    }

    /// Generate a fresh random page identifier
    pub fn generate() -> Self {
        PageId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for PageId {}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PageId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        PageId::new(value)
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.0
    }
}

/// Identifier of the application that owns a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidValue(
                "ApplicationId cannot be empty".to_string(),
            ));
        }
        Ok(ApplicationId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ApplicationId {}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        ApplicationId::new(value)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

/// Unique identifier for a Layout inside a page variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayoutId(String);

impl LayoutId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidValue("LayoutId cannot be empty".to_string()));
        }
        Ok(LayoutId(id))
    }

    /// Generate a fresh random layout identifier
    pub fn generate() -> Self {
        LayoutId(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for LayoutId {}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LayoutId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        LayoutId::new(value)
    }
}

impl From<LayoutId> for String {
    fn from(id: LayoutId) -> Self {
        id.0
    }
}

/// Identifier of a permission group (a set of users sharing grants)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionGroupId(String);

impl PermissionGroupId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidValue(
                "PermissionGroupId cannot be empty".to_string(),
            ));
        }
        Ok(PermissionGroupId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for PermissionGroupId {}

impl fmt::Display for PermissionGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PermissionGroupId {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        PermissionGroupId::new(value)
    }
}

impl From<PermissionGroupId> for String {
    fn from(id: PermissionGroupId) -> Self {
        id.0
    }
}

/// Identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidValue("UserId cannot be empty".to_string()));
        }
        Ok(UserId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for UserId {}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a version-control branch a page copy belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidValue(
                "Branch name cannot be empty".to_string(),
            ));
        }
        Ok(BranchName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for BranchName {}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        BranchName::new(value)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

/// Which variant of a page a query reads: the editable draft or the deployed copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Edit mode, reads `unpublishedPage`
    Draft,
    /// View mode, reads `publishedPage`
    Published,
}

impl ViewMode {
    /// Map the boolean "view mode" flag used by callers (true = published)
    pub fn from_view_flag(view_mode: bool) -> Self {
        if view_mode {
            ViewMode::Published
        } else {
            ViewMode::Draft
        }
    }

    pub fn is_published(self) -> bool {
        matches!(self, ViewMode::Published)
    }
}

impl ValueObject for ViewMode {}
