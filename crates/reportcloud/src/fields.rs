//! Field collection of a data set definition

use indexmap::IndexMap;
use reportcloud_diagnostics::{RC0001, RC0002, ReportLog};
use reportcloud_expr::FieldId;
use reportcloud_types::ResultKind;
use serde_json::Value as JsonValue;

/// A declared data set field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: ResultKind,
    /// Column the field's values occupy in each row
    pub column: FieldId,
}

/// Fields of a data set, looked up by name ignoring case.
///
/// Every `Field` entry takes the next column number in declaration order,
/// duplicates included, so row positions line up with the definition. Only
/// the first field of a given name is reachable by name.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    items: IndexMap<String, Field>,
    columns: Vec<String>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON field list.
    ///
    /// Entries are objects with a `name` and an optional `type`. Anything
    /// else is logged and skipped without taking a column.
    pub fn load(entries: &[JsonValue], log: &mut ReportLog) -> Self {
        let mut fields = Self::new();
        for entry in entries {
            let Some(name) = entry.get("name").and_then(JsonValue::as_str) else {
                log.log_error(
                    4,
                    RC0001,
                    format!("Unknown element '{}' in fields list.", entry),
                );
                continue;
            };
            let kind = match entry.get("type").and_then(JsonValue::as_str) {
                None => ResultKind::Object,
                Some(type_name) => ResultKind::parse(type_name).unwrap_or_else(|| {
                    log.log_error(
                        4,
                        RC0001,
                        format!("Unknown type '{}' for field {}.  Object assumed.", type_name, name),
                    );
                    ResultKind::Object
                }),
            };
            fields.add(name, kind, log);
        }
        fields
    }

    /// Declare a field. Returns `None` when the name is already taken; the
    /// column is consumed either way.
    pub fn add(&mut self, name: &str, kind: ResultKind, log: &mut ReportLog) -> Option<FieldId> {
        let column = FieldId(self.columns.len() as u32);
        self.columns.push(name.to_string());

        let key = name.to_lowercase();
        if self.items.contains_key(&key) {
            log.log_error(4, RC0002, format!("Field {} has duplicates.", name));
            return None;
        }
        self.items.insert(
            key,
            Field {
                name: name.to_string(),
                kind,
                column,
            },
        );
        Some(column)
    }

    /// Look up a field by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.items.get(&name.to_lowercase())
    }

    /// Reachable fields, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.items.values()
    }

    /// Number of reachable fields
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Name of every column, in column order
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Kind of the field occupying `column`; duplicate columns read as Object
    pub fn column_kind(&self, column: usize) -> ResultKind {
        self.items
            .values()
            .find(|f| f.column.index() == column)
            .map_or(ResultKind::Object, |f| f.kind)
    }
}
