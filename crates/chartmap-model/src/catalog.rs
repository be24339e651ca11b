use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{DataType, PlaceholderGroup};
use crate::ids::ChartId;
use crate::path::JsonPath;

/// Generated list of placeholders a template and spec version pair exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderCatalog {
    pub chart_id: ChartId,
    pub template_version: String,
    pub spec_version: String,
    pub generated_at: DateTime<Utc>,
    /// Hex sha256 over the ordered item tuples.
    pub checksum: String,
    pub items: Vec<CatalogItem>,
}

impl PlaceholderCatalog {
    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn required_placeholders(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.required)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Token form, `${variable}`.
    pub name: String,
    pub variable: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub required: bool,
    pub group: PlaceholderGroup,
    pub target_path: JsonPath,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}
