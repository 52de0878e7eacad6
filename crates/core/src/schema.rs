use serde::{Deserialize, Serialize};

use crate::field_value::FieldValue;
use crate::ids::RecordId;
use crate::record::{ID_FIELD, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Tag,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Tag => "tag",
        }
    }

    /// Value a freshly added record gets for a field of this kind.
    pub fn default_value(&self) -> FieldValue {
        match self {
            Self::String => FieldValue::Text(String::new()),
            Self::Number => FieldValue::Number(0.0),
            Self::Boolean | Self::Tag => FieldValue::Unset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: FieldKind,
    pub hidden: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Ordered column definitions for the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Columns of the pantry categories table.
    pub fn pantry_categories() -> Self {
        Self::new(vec![
            ColumnSpec::new(ID_FIELD, FieldKind::String).hidden(),
            ColumnSpec::new("name", FieldKind::String),
            ColumnSpec::new("description", FieldKind::String),
            ColumnSpec::new("tags", FieldKind::Tag),
            ColumnSpec::new("shelf life, weeks", FieldKind::Number),
            ColumnSpec::new("perishable", FieldKind::Boolean),
            ColumnSpec::new("staple", FieldKind::Boolean),
        ])
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn visible_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Schema with the visibility of `name` set to `hidden`. Unknown names
    /// leave the schema unchanged.
    pub fn with_hidden(&self, name: &str, hidden: bool) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                if c.name == name {
                    ColumnSpec {
                        hidden,
                        ..c.clone()
                    }
                } else {
                    c.clone()
                }
            })
            .collect();
        Self { columns }
    }

    /// Record whose fields hold each column's kind default.
    pub fn new_record(&self, id: RecordId) -> Record {
        self.columns
            .iter()
            .filter(|c| c.name != ID_FIELD)
            .fold(Record::new(id), |record, c| {
                record.with(&c.name, c.kind.default_value())
            })
    }

    /// Interpret raw cell text according to the column's kind. Input that
    /// does not parse is kept as text.
    pub fn coerce_input(&self, name: &str, raw: &str) -> FieldValue {
        let Some(column) = self.column(name) else {
            return FieldValue::Text(raw.to_string());
        };
        let trimmed = raw.trim();
        match column.kind {
            FieldKind::String => FieldValue::Text(raw.to_string()),
            FieldKind::Number => trimmed
                .parse::<f64>()
                .map(FieldValue::Number)
                .unwrap_or_else(|_| FieldValue::Text(raw.to_string())),
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => FieldValue::Boolean(true),
                "false" | "no" | "n" | "0" => FieldValue::Boolean(false),
                "" => FieldValue::Unset,
                _ => FieldValue::Text(raw.to_string()),
            },
            FieldKind::Tag => FieldValue::List(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(FieldValue::from)
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_columns_skip_hidden() {
        let schema = Schema::pantry_categories();
        assert_eq!(
            schema.visible_columns(),
            vec![
                "name",
                "description",
                "tags",
                "shelf life, weeks",
                "perishable",
                "staple"
            ]
        );
        let schema = schema.with_hidden("description", true);
        assert!(!schema.visible_columns().contains(&"description"));
    }

    #[test]
    fn new_record_uses_kind_defaults() {
        let record = Schema::pantry_categories().new_record("r1".into());
        assert_eq!(record.id().as_str(), "r1");
        assert_eq!(record.get("name"), Some(&FieldValue::Text(String::new())));
        assert_eq!(
            record.get("shelf life, weeks"),
            Some(&FieldValue::Number(0.0))
        );
        assert_eq!(record.get("tags"), Some(&FieldValue::Unset));
        assert_eq!(record.get("staple"), Some(&FieldValue::Unset));
        assert_eq!(record.get(ID_FIELD), None);
    }

    #[test]
    fn coerce_input_by_kind() {
        let schema = Schema::pantry_categories();
        assert_eq!(
            schema.coerce_input("shelf life, weeks", " 12 "),
            FieldValue::Number(12.0)
        );
        assert_eq!(
            schema.coerce_input("shelf life, weeks", "soon"),
            FieldValue::Text("soon".into())
        );
        assert_eq!(
            schema.coerce_input("perishable", "Yes"),
            FieldValue::Boolean(true)
        );
        assert_eq!(
            schema.coerce_input("tags", "baking, , dry"),
            FieldValue::List(vec!["baking".into(), "dry".into()])
        );
        assert_eq!(
            schema.coerce_input("unknown", "x"),
            FieldValue::Text("x".into())
        );
    }
}
