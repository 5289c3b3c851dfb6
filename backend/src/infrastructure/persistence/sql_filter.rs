/// Compiles store-agnostic criteria into a parameterised SQLite `WHERE` clause
/// over JSON documents, using `json_extract` for scalar paths and `json_each`
/// for array element matches.
///
/// Value comparisons test `(value, json type)` pairs against a JSON array
/// bound as a single parameter, so `true` never equals `1` and a list of any
/// length costs one SQL variable.
use crate::domain::query::{Criteria, FieldPath};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

/// A compiled `WHERE` clause and its positional parameters, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<SqlValue>,
}

/// Compile the criteria (implicitly AND-ed) against the `document` column
pub fn compile(criteria: &[Criteria]) -> SqlFilter {
    let mut compiler = Compiler::default();
    let clause = compiler.all(criteria, "document");
    SqlFilter {
        clause,
        params: compiler.params,
    }
}

#[derive(Default)]
struct Compiler {
    params: Vec<SqlValue>,
    aliases: usize,
}

impl Compiler {
    fn all(&mut self, criteria: &[Criteria], base: &str) -> String {
        if criteria.is_empty() {
            return "1".to_string();
        }
        let parts: Vec<String> = criteria.iter().map(|c| self.one(c, base)).collect();
        format!("({})", parts.join(" AND "))
    }

    fn any(&mut self, criteria: &[Criteria], base: &str) -> String {
        if criteria.is_empty() {
            return "0".to_string();
        }
        let parts: Vec<String> = criteria.iter().map(|c| self.one(c, base)).collect();
        format!("({})", parts.join(" OR "))
    }

    fn one(&mut self, criteria: &Criteria, base: &str) -> String {
        match criteria {
            Criteria::Eq(path, Value::Null) | Criteria::IsNull(path) => {
                self.bind_path(path);
                format!("json_extract({base}, ?) IS NULL")
            }
            Criteria::Eq(path, value) => self.member_of(base, path, std::slice::from_ref(value)),
            Criteria::In(path, values) => {
                if values.is_empty() {
                    return "0".to_string();
                }
                self.member_of(base, path, values)
            }
            Criteria::ContainsAny(path, values) => {
                if values.is_empty() {
                    return "0".to_string();
                }
                let alias = self.next_alias();
                self.bind_path(path);
                let set = self.bind_set(values);
                format!(
                    "EXISTS (SELECT 1 FROM json_each({base}, ?) AS {alias} WHERE ({alias}.value, {alias}.type) IN {set})"
                )
            }
            Criteria::ElemMatch(path, element) => {
                let alias = self.next_alias();
                self.bind_path(path);
                let element_base = format!("{alias}.value");
                let inner = self.all(element, &element_base);
                format!("EXISTS (SELECT 1 FROM json_each({base}, ?) AS {alias} WHERE {inner})")
            }
            Criteria::And(all) => self.all(all, base),
            Criteria::Or(any) => self.any(any, base),
        }
    }

    /// The field's value and JSON type must pair up with one of `values`
    fn member_of(&mut self, base: &str, path: &FieldPath, values: &[Value]) -> String {
        self.bind_path(path);
        self.bind_path(path);
        let set = self.bind_set(values);
        format!("(json_extract({base}, ?), json_type({base}, ?)) IN {set}")
    }

    fn bind_path(&mut self, path: &FieldPath) {
        self.params.push(SqlValue::Text(path.json_path()));
    }

    fn bind_set(&mut self, values: &[Value]) -> String {
        self.params
            .push(SqlValue::Text(Value::Array(values.to_vec()).to_string()));
        "(SELECT value, type FROM json_each(?))".to_string()
    }

    fn next_alias(&mut self) -> String {
        self.aliases += 1;
        format!("je{}", self.aliases)
    }
}
