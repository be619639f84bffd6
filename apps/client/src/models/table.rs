use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_COLUMN_TYPE: &str = "text";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Named(String),
    Typed {
        name: String,
        #[serde(rename = "type", default)]
        column_type: Option<String>,
    },
}

// The backend reports columns either as bare names or as `{name, type}`.
impl<'de> Deserialize<'de> for ColumnDef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawColumn::deserialize(deserializer)? {
            RawColumn::Named(name) => ColumnDef {
                name,
                column_type: DEFAULT_COLUMN_TYPE.to_string(),
            },
            RawColumn::Typed { name, column_type } => ColumnDef {
                name,
                column_type: column_type.unwrap_or_else(|| DEFAULT_COLUMN_TYPE.to_string()),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectTable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub row_count: u64,
}

impl ProjectTable {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// A row in a project table. The field map is open-ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<i64>,
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_accept_bare_names_and_typed_defs() {
        let table: ProjectTable = serde_json::from_value(json!({
            "id": "t1",
            "name": "characters",
            "columns": ["name", {"name": "age", "type": "integer"}, {"name": "notes"}],
            "row_count": 3
        }))
        .unwrap();

        assert_eq!(
            table.columns,
            vec![
                ColumnDef { name: "name".into(), column_type: "text".into() },
                ColumnDef { name: "age".into(), column_type: "integer".into() },
                ColumnDef { name: "notes".into(), column_type: "text".into() },
            ]
        );
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["name", "age", "notes"]);
    }

    #[test]
    fn test_row_without_id_omits_field() {
        let row = TableRow {
            row_id: None,
            data: json!({"name": "Ava"}).as_object().cloned().unwrap(),
        };
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"data": {"name": "Ava"}}));
    }
}
