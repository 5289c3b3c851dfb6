//! Store-agnostic query model: field paths, filter criteria and projections.
//!
//! Criteria follow document-database semantics: a path that is missing from
//! a document behaves like `null`, and array fields are only searched through
//! [`Criteria::ElemMatch`] and [`Criteria::ContainsAny`].

use serde_json::{Map, Value};
use std::fmt;

/// Field names of the `newPage` collection and its nested documents
pub mod fields {
    pub const ID: &str = "id";
    pub const APPLICATION_ID: &str = "applicationId";
    pub const UNPUBLISHED_PAGE: &str = "unpublishedPage";
    pub const PUBLISHED_PAGE: &str = "publishedPage";
    pub const NAME: &str = "name";
    pub const SLUG: &str = "slug";
    pub const CUSTOM_SLUG: &str = "customSlug";
    pub const LAYOUTS: &str = "layouts";
    pub const DELETED: &str = "deleted";
    pub const DELETED_AT: &str = "deletedAt";
    pub const DEFAULT_RESOURCES: &str = "defaultResources";
    pub const PAGE_ID: &str = "pageId";
    pub const BRANCH_NAME: &str = "branchName";
    pub const POLICIES: &str = "policies";
    pub const PERMISSION: &str = "permission";
    pub const PERMISSION_GROUPS: &str = "permissionGroups";
}

/// Dotted path to a field inside a document, e.g. `unpublishedPage.deletedAt`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new(field: impl Into<String>) -> Self {
        FieldPath {
            segments: vec![field.into()],
        }
    }

    /// Extend the path by one nested field
    pub fn child(mut self, field: impl Into<String>) -> Self {
        self.segments.push(field.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// SQLite JSON path form, e.g. `$.unpublishedPage.deletedAt`
    pub fn json_path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.segments {
            path.push('.');
            path.push_str(segment);
        }
        path
    }

    /// Resolve the path inside a JSON document
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| current.get(segment.as_str()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        FieldPath {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }
}

/// A filter predicate over documents
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Field equals the value; a `null` value behaves like [`Criteria::IsNull`]
    Eq(FieldPath, Value),
    /// Field equals one of the values; an empty list or a `null` never matches
    In(FieldPath, Vec<Value>),
    /// Field is missing or `null`
    IsNull(FieldPath),
    /// Array field contains at least one of the values, `null` elements excluded
    ContainsAny(FieldPath, Vec<Value>),
    /// Array field has an element matching every element-relative criterion
    ElemMatch(FieldPath, Vec<Criteria>),
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
}

impl Criteria {
    pub fn eq(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Criteria::Eq(path.into(), value.into())
    }

    pub fn is_in<V: Into<Value>>(
        path: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Criteria::In(path.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(path: impl Into<FieldPath>) -> Self {
        Criteria::IsNull(path.into())
    }

    pub fn contains_any<V: Into<Value>>(
        path: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Criteria::ContainsAny(path.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn elem_match(path: impl Into<FieldPath>, element: Vec<Criteria>) -> Self {
        Criteria::ElemMatch(path.into(), element)
    }

    /// Evaluate the predicate against a JSON document
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Criteria::Eq(path, Value::Null) => is_null_at(path, document),
            Criteria::Eq(path, expected) => path.lookup(document) == Some(expected),
            Criteria::In(path, values) => path
                .lookup(document)
                .is_some_and(|actual| !actual.is_null() && values.contains(actual)),
            Criteria::IsNull(path) => is_null_at(path, document),
            Criteria::ContainsAny(path, values) => match path.lookup(document) {
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| !item.is_null() && values.contains(item)),
                _ => false,
            },
            Criteria::ElemMatch(path, element) => match path.lookup(document) {
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| element.iter().all(|criteria| criteria.matches(item))),
                _ => false,
            },
            Criteria::And(all) => all.iter().all(|criteria| criteria.matches(document)),
            Criteria::Or(any) => any.iter().any(|criteria| criteria.matches(document)),
        }
    }
}

fn is_null_at(path: &FieldPath, document: &Value) -> bool {
    matches!(path.lookup(document), None | Some(Value::Null))
}

/// Criteria (implicitly AND-ed) plus an optional field projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    criteria: Vec<Criteria>,
    projection: Option<Vec<FieldPath>>,
}

impl Query {
    pub fn new(criteria: Vec<Criteria>) -> Self {
        Query {
            criteria,
            projection: None,
        }
    }

    pub fn add_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria.push(criteria);
        self
    }

    /// Restrict returned documents to `id` plus the listed fields
    pub fn include(mut self, fields: impl IntoIterator<Item = FieldPath>) -> Self {
        self.projection
            .get_or_insert_with(Vec::new)
            .extend(fields);
        self
    }

    pub fn criteria(&self) -> &[Criteria] {
        &self.criteria
    }

    pub fn projection(&self) -> Option<&[FieldPath]> {
        self.projection.as_deref()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.criteria.iter().all(|criteria| criteria.matches(document))
    }

    /// Apply the projection; documents pass through unchanged without one
    pub fn project(&self, document: Value) -> Value {
        let Some(fields) = self.projection.as_ref() else {
            return document;
        };

        let mut projected = Value::Object(Map::new());
        copy_path(&document, &mut projected, &FieldPath::new(fields::ID));
        for path in fields {
            copy_path(&document, &mut projected, path);
        }
        projected
    }
}

fn copy_path(source: &Value, target: &mut Value, path: &FieldPath) {
    let Some(value) = path.lookup(source) else {
        return;
    };

    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut cursor = target;
    for segment in parents {
        cursor = match cursor {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if let Value::Object(map) = cursor {
        map.insert(last.clone(), value.clone());
    }
}
