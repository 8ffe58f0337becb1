use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything the table and the CSV export can render.
pub trait TableRow {
    fn cell_text(&self, field: &str) -> String;

    fn row_id(&self) -> Option<String>;
}

/// A listing row as the API sent it: a JSON object keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(value: Map<String, Value>) -> Self {
        Record(value)
    }
}

impl TableRow for Record {
    fn cell_text(&self, field: &str) -> String {
        match self.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(Value::Bool(flag)) => flag.to_string(),
            Some(Value::Number(number)) => number.to_string(),
            Some(other) => other.to_string(),
        }
    }

    fn row_id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}
