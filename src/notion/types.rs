use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Response of `GET /v1/databases/{id}`. Only the property schema is read.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSchema {
    #[serde(default)]
    pub properties: HashMap<String, PropertySchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub select: Option<SelectSchema>,
}

impl PropertySchema {
    /// Names of the options of a select property, empty for other types.
    pub fn option_names(&self) -> Vec<&str> {
        self.select
            .as_ref()
            .map(|s| s.options.iter().map(|o| o.name.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectSchema {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// One page of `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A database record.
///
/// `last_edited_time` stays the exact string Notion sent so it can be
/// written back without reformatting.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    pub last_edited_time: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Current option name of a select property on this record, if set.
    pub fn select_name(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)?
            .get("select")?
            .get("name")?
            .as_str()
    }
}
