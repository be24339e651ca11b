//! Closed enumerations for mapping and catalog metadata.
//!
//! Every value that arrives as a string in mapping JSON (aggregation, filter
//! operator, null handling, status, data type) is parsed into one of these
//! enums. Unknown strings are rejected when the mapping is loaded instead of
//! silently falling back to a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Value type expected by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Array,
    Object,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Array => "array",
            DataType::Object => "object",
        }
    }

    /// Returns the data type a JSON value carries, if it is one of the four kinds.
    pub fn of_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(_) => Some(DataType::String),
            serde_json::Value::Number(_) => Some(DataType::Number),
            serde_json::Value::Array(_) => Some(DataType::Array),
            serde_json::Value::Object(_) => Some(DataType::Object),
            serde_json::Value::Bool(_) | serde_json::Value::Null => None,
        }
    }

    /// True for the single-value kinds (`string`, `number`).
    pub fn is_scalar(&self) -> bool {
        matches!(self, DataType::String | DataType::Number)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(DataType::String),
            "number" => Ok(DataType::Number),
            "array" => Ok(DataType::Array),
            "object" => Ok(DataType::Object),
            _ => Err(unknown("data type", s)),
        }
    }
}

/// Reduction applied to each group's target column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    /// Pass the single row's value through; groups with more than one row fail.
    #[default]
    None,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Count => "count",
            Aggregation::None => "none",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" => Ok(Aggregation::Avg),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "count" => Ok(Aggregation::Count),
            "none" => Ok(Aggregation::None),
            _ => Err(unknown("aggregation", s)),
        }
    }
}

/// Row filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "neq")]
    Neq,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "gte")]
    Gte,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notIn")]
    NotIn,
    /// Case-sensitive substring match.
    #[serde(rename = "like")]
    Like,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
            FilterOp::NotIn => "notIn",
            FilterOp::Like => "like",
        }
    }

    /// True for operators whose value is a set of candidates.
    pub fn takes_set(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eq" => Ok(FilterOp::Eq),
            "neq" => Ok(FilterOp::Neq),
            "gt" => Ok(FilterOp::Gt),
            "gte" => Ok(FilterOp::Gte),
            "lt" => Ok(FilterOp::Lt),
            "lte" => Ok(FilterOp::Lte),
            "in" => Ok(FilterOp::In),
            "notIn" => Ok(FilterOp::NotIn),
            "like" => Ok(FilterOp::Like),
            _ => Err(unknown("filter operator", s)),
        }
    }
}

/// Policy for pivot cells absent from the grouped results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullHandling {
    /// Omit the cell; the series array gets shorter.
    #[default]
    Skip,
    /// Insert numeric zero.
    Zero,
    /// Insert the transform's `fillValue`.
    Fill,
}

impl NullHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            NullHandling::Skip => "skip",
            NullHandling::Zero => "zero",
            NullHandling::Fill => "fill",
        }
    }
}

impl fmt::Display for NullHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullHandling {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(NullHandling::Skip),
            "zero" => Ok(NullHandling::Zero),
            "fill" => Ok(NullHandling::Fill),
            _ => Err(unknown("null handling", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(unknown("sort direction", s)),
        }
    }
}

/// Lifecycle state of a mapping version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    #[default]
    Draft,
    Active,
    Deprecated,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Draft => "draft",
            MappingStatus::Active => "active",
            MappingStatus::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(MappingStatus::Draft),
            "active" => Ok(MappingStatus::Active),
            "deprecated" => Ok(MappingStatus::Deprecated),
            _ => Err(unknown("mapping status", s)),
        }
    }
}

/// Template category, based on coordinate system and data shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateCategory {
    /// Line, bar and area charts: `xAxis`/`yAxis` with array data.
    #[serde(alias = "cartesian")]
    Cartesian,
    /// Pie, doughnut and rose charts: `{name, value}` data.
    #[serde(alias = "pie")]
    Pie,
    /// Radar charts: indicators plus multi-dimensional values.
    #[serde(alias = "radar")]
    Radar,
    /// Gauges: a single value between bounds.
    #[serde(alias = "gauge")]
    Gauge,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 4] = [
        TemplateCategory::Cartesian,
        TemplateCategory::Pie,
        TemplateCategory::Radar,
        TemplateCategory::Gauge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Cartesian => "CARTESIAN",
            TemplateCategory::Pie => "PIE",
            TemplateCategory::Radar => "RADAR",
            TemplateCategory::Gauge => "GAUGE",
        }
    }

    /// Chart types published for this category.
    pub fn supported_chart_types(&self) -> &'static [&'static str] {
        match self {
            TemplateCategory::Cartesian => &[
                "basic_line_chart",
                "smooth_line_chart",
                "stacked_line_chart",
                "basic_bar_chart",
                "stacked_bar_chart",
                "basic_area_chart",
            ],
            TemplateCategory::Pie => &["basic_pie_chart", "doughnut_chart", "rose_chart"],
            TemplateCategory::Radar => &["basic_radar_chart", "filled_radar_chart"],
            TemplateCategory::Gauge => &[
                "basic_gauge_chart",
                "progress_gauge_chart",
                "grade_gauge_chart",
            ],
        }
    }

    /// Infer the category from a chart type name.
    ///
    /// Unknown chart types are an error rather than a silent CARTESIAN
    /// fallback.
    pub fn infer(chart_type: &str) -> Result<Self, ModelError> {
        let normalized = chart_type.trim().to_lowercase();
        if let Some(category) = Self::ALL
            .into_iter()
            .find(|c| c.supported_chart_types().contains(&normalized.as_str()))
        {
            return Ok(category);
        }
        let contains_any = |needles: &[&str]| needles.iter().any(|n| normalized.contains(n));
        if contains_any(&["line", "bar", "area", "column", "stack"]) {
            Ok(TemplateCategory::Cartesian)
        } else if contains_any(&["pie", "doughnut", "ring", "rose"]) {
            Ok(TemplateCategory::Pie)
        } else if contains_any(&["radar", "polar"]) {
            Ok(TemplateCategory::Radar)
        } else if contains_any(&["gauge", "meter", "speedometer"]) {
            Ok(TemplateCategory::Gauge)
        } else {
            Err(ModelError::UnknownChartType(chart_type.to_string()))
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CARTESIAN" => Ok(TemplateCategory::Cartesian),
            "PIE" => Ok(TemplateCategory::Pie),
            "RADAR" => Ok(TemplateCategory::Radar),
            "GAUGE" => Ok(TemplateCategory::Gauge),
            _ => Err(unknown("template category", s)),
        }
    }
}

/// Catalog grouping of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderGroup {
    Title,
    Meta,
    Axis,
    Series,
    Legend,
    Grid,
    Tooltip,
    Toolbox,
    General,
}

impl PlaceholderGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderGroup::Title => "title",
            PlaceholderGroup::Meta => "meta",
            PlaceholderGroup::Axis => "axis",
            PlaceholderGroup::Series => "series",
            PlaceholderGroup::Legend => "legend",
            PlaceholderGroup::Grid => "grid",
            PlaceholderGroup::Tooltip => "tooltip",
            PlaceholderGroup::Toolbox => "toolbox",
            PlaceholderGroup::General => "general",
        }
    }
}

impl fmt::Display for PlaceholderGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown(kind: &'static str, value: &str) -> ModelError {
    ModelError::UnknownValue {
        kind,
        value: value.to_string(),
    }
}
