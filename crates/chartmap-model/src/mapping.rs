//! Versioned mapping between data columns and template placeholders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{Aggregation, DataType, FilterOp, MappingStatus, NullHandling, SortDirection};
use crate::ids::ChartId;
use crate::placeholder;
use crate::Result;

/// A user-authored mapping for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub chart_id: ChartId,
    /// Assigned by the registry on save (`v1`, `v2`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_version: Option<String>,
    pub template_version: String,
    pub spec_version: String,
    #[serde(default)]
    pub status: MappingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<MappingItem>,
}

impl Mapping {
    pub fn new(
        chart_id: ChartId,
        template_version: impl Into<String>,
        spec_version: impl Into<String>,
    ) -> Self {
        Self {
            chart_id,
            mapping_version: None,
            template_version: template_version.into(),
            spec_version: spec_version.into(),
            status: MappingStatus::Draft,
            updated_by: None,
            updated_at: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: MappingItem) -> Self {
        self.items.push(item);
        self
    }

    /// Parses mapping JSON. Unknown enum values (aggregation, operator, null
    /// handling, status, data type) and malformed placeholders are rejected
    /// here rather than when the mapping runs.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut mapping: Mapping = serde_json::from_str(text)?;
        for item in &mut mapping.items {
            item.placeholder = placeholder::normalize(&item.placeholder)?;
        }
        Ok(mapping)
    }

    pub fn item(&self, placeholder: &str) -> Option<&MappingItem> {
        self.items.iter().find(|item| item.placeholder == placeholder)
    }

    pub fn version_label(&self) -> &str {
        self.mapping_version.as_deref().unwrap_or("unsaved")
    }
}

/// Binds one placeholder to a source column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingItem {
    /// Placeholder token, e.g. `${series_1_data}`.
    pub placeholder: String,
    pub data_type: DataType,
    pub source: Source,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Pivot::is_empty")]
    pub pivot: Pivot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MappingItem {
    pub fn new(name: &str, data_type: DataType, table: &str, column: &str) -> Self {
        Self {
            placeholder: placeholder::token(placeholder::variable_of(name).unwrap_or(name)),
            data_type,
            source: Source {
                table: table.to_string(),
                column: column.to_string(),
            },
            transform: Transform::default(),
            pivot: Pivot::default(),
            notes: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }

    /// Variable name of the placeholder (`series_1_data`).
    pub fn variable(&self) -> &str {
        placeholder::variable_of(&self.placeholder).unwrap_or(&self.placeholder)
    }

    /// Columns the data source must return for this item.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns = vec![self.source.column.clone()];
        let mut push = |name: &str| {
            if !name.is_empty() && !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        };
        for field in &self.transform.group_by {
            push(field);
        }
        for filter in &self.transform.filters {
            push(&filter.field);
        }
        for key in [&self.pivot.category_key, &self.pivot.series_key]
            .into_iter()
            .flatten()
        {
            push(key);
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub table: String,
    pub column: String,
}

/// Declarative transform: filter, group, aggregate, order, limit, null-fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub order_by: Vec<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub null_handling: NullHandling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: &str, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.to_string(),
            op,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    #[serde(default)]
    pub dir: SortDirection,
}

impl Order {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            dir: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            dir: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pivot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_key: Option<String>,
}

impl Pivot {
    pub fn new(category_key: &str, series_key: Option<&str>) -> Self {
        Self {
            category_key: Some(category_key.to_string()),
            series_key: series_key.map(str::to_string),
        }
    }

    /// A pivot needs at least a category key.
    pub fn is_set(&self) -> bool {
        self.category_key.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.category_key.is_none() && self.series_key.is_none()
    }
}
