//! Declarative tabular transform engine.
//!
//! A [`Query`] names the target column, its [`Transform`] and an optional
//! [`Pivot`]. Execution runs, in order: filter, group, aggregate, order,
//! limit and, for pivots, reshaping into a category by series matrix with the
//! null policy applied to missing cells.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chartmap_model::{
    Aggregation, CellValue, Filter, FilterOp, NullHandling, Pivot, Row, SortDirection, Transform,
    number_value,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TransformError};

/// Name used for the aggregate in `orderBy` keys.
pub const VALUE_KEY: &str = "value";

#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    /// Label used in errors and logs, usually the placeholder.
    pub item: &'a str,
    pub column: &'a str,
    pub transform: &'a Transform,
    pub pivot: &'a Pivot,
}

/// One group after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    /// Group field values, in grouping-field order.
    pub key: Vec<CellValue>,
    pub value: Value,
}

impl GroupValue {
    /// Human label of the group; `fallback` names an ungrouped result.
    pub fn label(&self, fallback: &str) -> String {
        if self.key.is_empty() {
            return fallback.to_string();
        }
        self.key
            .iter()
            .map(CellValue::label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotSeries {
    pub name: String,
    /// Raw cells aligned to the matrix categories; `None` where no group landed.
    pub cells: Vec<Option<Value>>,
    /// Cells after the null policy.
    pub data: Vec<Value>,
    /// Category of each entry in `data`.
    pub labels: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotMatrix {
    pub categories: Vec<CellValue>,
    pub series: Vec<PivotSeries>,
}

impl PivotMatrix {
    pub fn series(&self, name: &str) -> Option<&PivotSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Raw cell at `(category, series)`.
    pub fn cell(&self, category: &CellValue, series: &str) -> Option<&Value> {
        let index = self
            .categories
            .iter()
            .position(|c| c.group_key() == category.group_key())?;
        self.series(series)?.cells.get(index)?.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransformOutput {
    Values { groups: Vec<GroupValue> },
    Matrix(PivotMatrix),
}

impl TransformOutput {
    pub fn group_count(&self) -> usize {
        match self {
            TransformOutput::Values { groups } => groups.len(),
            TransformOutput::Matrix(matrix) => matrix.series.iter().map(|s| s.data.len()).sum(),
        }
    }
}

/// Stateless executor; safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularTransformEngine;

impl TabularTransformEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, rows: &[Row], query: &Query<'_>) -> Result<TransformOutput> {
        let transform = query.transform;
        let fields = grouping_fields(query)?;
        check_transform(query)?;

        let filtered: Vec<&Row> = rows
            .iter()
            .filter(|row| transform.filters.iter().all(|f| filter_matches(row, f)))
            .collect();

        let mut groups = group_rows(&filtered, &fields)
            .into_iter()
            .map(|(key, members)| -> Result<GroupValue> {
                let value = aggregate(query, &members)?;
                Ok(GroupValue { key, value })
            })
            .collect::<Result<Vec<_>>>()?;

        sort_groups(query, &fields, &mut groups)?;
        if let Some(limit) = transform.limit {
            groups.truncate(limit);
        }

        tracing::debug!(
            item = query.item,
            rows = rows.len(),
            filtered = filtered.len(),
            groups = groups.len(),
            "executed transform"
        );

        match &query.pivot.category_key {
            Some(category_key) => pivot(query, &fields, category_key, groups).map(TransformOutput::Matrix),
            None => Ok(TransformOutput::Values { groups }),
        }
    }
}

/// Grouping fields; an empty `groupBy` with a pivot groups by the pivot keys.
fn grouping_fields(query: &Query<'_>) -> Result<Vec<String>> {
    let pivot = query.pivot;
    if pivot.series_key.is_some() && pivot.category_key.is_none() {
        return Err(TransformError::config(query.item, "pivot seriesKey requires a categoryKey"));
    }
    let fields: Vec<String> = if query.transform.group_by.is_empty() {
        [&pivot.category_key, &pivot.series_key]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    } else {
        query.transform.group_by.clone()
    };
    for key in [&pivot.category_key, &pivot.series_key].into_iter().flatten() {
        if !fields.contains(key) {
            return Err(TransformError::config(
                query.item,
                format!("pivot key {key:?} is not a grouping field"),
            ));
        }
    }
    Ok(fields)
}

fn check_transform(query: &Query<'_>) -> Result<()> {
    let transform = query.transform;
    for filter in &transform.filters {
        if filter.op.takes_set() && !filter.value.is_array() {
            return Err(TransformError::config(
                query.item,
                format!("filter {} {} expects an array value", filter.field, filter.op),
            ));
        }
        if !filter.op.takes_set() && CellValue::from_json(&filter.value).is_none() {
            return Err(TransformError::config(
                query.item,
                format!("filter {} {} expects a scalar value", filter.field, filter.op),
            ));
        }
    }
    if transform.null_handling == NullHandling::Fill && transform.fill_value.is_none() {
        return Err(TransformError::config(
            query.item,
            "nullHandling fill requires a fillValue",
        ));
    }
    Ok(())
}

/// Whether `row` passes `filter`. Malformed filter values never match.
pub fn filter_matches(row: &Row, filter: &Filter) -> bool {
    let cell = row.get(&filter.field);
    match filter.op {
        FilterOp::In | FilterOp::NotIn => {
            let found = filter.value.as_array().is_some_and(|candidates| {
                candidates
                    .iter()
                    .filter_map(CellValue::from_json)
                    .any(|candidate| cell.matches(&candidate))
            });
            found == (filter.op == FilterOp::In)
        }
        op => {
            let Some(expected) = CellValue::from_json(&filter.value) else {
                return false;
            };
            match op {
                FilterOp::Eq => cell.matches(&expected),
                FilterOp::Neq => !cell.matches(&expected),
                FilterOp::Like => match (cell, &expected) {
                    (CellValue::Text(text), CellValue::Text(needle)) => text.contains(needle.as_str()),
                    _ => false,
                },
                FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                    if cell.is_null() || expected.is_null() {
                        return false;
                    }
                    let Some(ordering) = cell.compare(&expected) else {
                        return false;
                    };
                    match op {
                        FilterOp::Gt => ordering == Ordering::Greater,
                        FilterOp::Gte => ordering != Ordering::Less,
                        FilterOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    }
                }
                FilterOp::In | FilterOp::NotIn => false,
            }
        }
    }
}

/// Partitions rows by the tuple of `fields`, keeping first-appearance order.
fn group_rows<'r>(rows: &[&'r Row], fields: &[String]) -> Vec<(Vec<CellValue>, Vec<&'r Row>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(Vec<CellValue>, Vec<&'r Row>)> = Vec::new();
    for row in rows {
        let key: Vec<CellValue> = fields.iter().map(|f| row.get(f).clone()).collect();
        let signature = key
            .iter()
            .map(CellValue::group_key)
            .collect::<Vec<_>>()
            .join("\u{1f}");
        match index.get(&signature) {
            Some(&position) => groups[position].1.push(*row),
            None => {
                index.insert(signature, groups.len());
                groups.push((key, vec![*row]));
            }
        }
    }
    groups
}

fn aggregate(query: &Query<'_>, rows: &[&Row]) -> Result<Value> {
    let aggregation = query.transform.aggregation;
    let failure = |message: String| TransformError::Aggregation {
        item: query.item.to_string(),
        aggregation,
        message,
    };
    match aggregation {
        Aggregation::Count => Ok(Value::from(rows.len())),
        Aggregation::None => match rows {
            [row] => Ok(row.get(query.column).to_json()),
            _ => Err(failure(format!(
                "expected exactly one row per group, found {}",
                rows.len()
            ))),
        },
        Aggregation::Sum | Aggregation::Avg | Aggregation::Min | Aggregation::Max => {
            let mut numbers = Vec::with_capacity(rows.len());
            for row in rows {
                let cell = row.get(query.column);
                if cell.is_null() {
                    continue;
                }
                let number = cell.numeric().ok_or_else(|| {
                    failure(format!("non-numeric value {:?} in column {}", cell.label(), query.column))
                })?;
                numbers.push(number);
            }
            if numbers.is_empty() {
                return Ok(Value::Null);
            }
            let result = match aggregation {
                Aggregation::Sum => numbers.iter().sum::<f64>(),
                Aggregation::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
                Aggregation::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
                _ => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            };
            Ok(number_value(result))
        }
    }
}

enum SortKey {
    Field(usize),
    Value,
}

fn sort_groups(query: &Query<'_>, fields: &[String], groups: &mut [GroupValue]) -> Result<()> {
    let keys = query
        .transform
        .order_by
        .iter()
        .map(|order| {
            let key = if let Some(position) = fields.iter().position(|f| *f == order.field) {
                SortKey::Field(position)
            } else if order.field == VALUE_KEY || order.field == query.column {
                SortKey::Value
            } else {
                return Err(TransformError::config(
                    query.item,
                    format!("orderBy field {:?} is neither a grouping field nor the value", order.field),
                ));
            };
            Ok((key, order.dir))
        })
        .collect::<Result<Vec<_>>>()?;
    if keys.is_empty() {
        return Ok(());
    }

    groups.sort_by(|a, b| {
        for (key, dir) in &keys {
            let ordering = match key {
                SortKey::Field(i) => compare_cells(&a.key[*i], &b.key[*i]),
                SortKey::Value => compare_json(&a.value, &b.value),
            };
            let ordering = match dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    a.compare(b).unwrap_or_else(|| a.label().cmp(&b.label()))
}

fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (CellValue::from_json(a), CellValue::from_json(b)) {
        (Some(a), Some(b)) => compare_cells(&a, &b),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn pivot(
    query: &Query<'_>,
    fields: &[String],
    category_key: &str,
    groups: Vec<GroupValue>,
) -> Result<PivotMatrix> {
    let position = |key: &str| fields.iter().position(|f| f == key);
    let category_index = position(category_key)
        .ok_or_else(|| TransformError::config(query.item, "category key is not grouped"))?;
    let series_index = match &query.pivot.series_key {
        Some(key) => Some(
            position(key)
                .ok_or_else(|| TransformError::config(query.item, "series key is not grouped"))?,
        ),
        None => None,
    };

    let mut categories: Vec<CellValue> = Vec::new();
    let mut category_lookup: HashMap<String, usize> = HashMap::new();
    let mut series_names: Vec<String> = Vec::new();
    let mut cells: HashMap<(usize, usize), Value> = HashMap::new();
    let mut occupied: HashSet<(usize, usize)> = HashSet::new();

    for group in groups {
        let category = &group.key[category_index];
        let category_position = *category_lookup
            .entry(category.group_key())
            .or_insert_with(|| {
                categories.push(category.clone());
                categories.len() - 1
            });
        let series_name = match series_index {
            Some(i) => group.key[i].label(),
            None => query.column.to_string(),
        };
        let series_position = match series_names.iter().position(|s| *s == series_name) {
            Some(p) => p,
            None => {
                series_names.push(series_name);
                series_names.len() - 1
            }
        };
        if !occupied.insert((category_position, series_position)) {
            return Err(TransformError::config(
                query.item,
                format!(
                    "more than one group lands on cell ({}, {})",
                    category.label(),
                    series_names[series_position]
                ),
            ));
        }
        // A null aggregate counts as a missing cell.
        if !group.value.is_null() {
            cells.insert((category_position, series_position), group.value);
        }
    }

    let category_json: Vec<Value> = categories.iter().map(CellValue::to_json).collect();
    let series = series_names
        .into_iter()
        .enumerate()
        .map(|(s, name)| {
            let raw: Vec<Option<Value>> = (0..categories.len())
                .map(|c| cells.remove(&(c, s)))
                .collect();
            build_series(query.item, name, raw, &category_json, query.transform)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PivotMatrix { categories, series })
}

/// Applies the null policy to cells aligned with `categories`.
pub fn build_series(
    item: &str,
    name: String,
    cells: Vec<Option<Value>>,
    categories: &[Value],
    transform: &Transform,
) -> Result<PivotSeries> {
    let mut data = Vec::with_capacity(cells.len());
    let mut labels = Vec::with_capacity(cells.len());
    for (cell, category) in cells.iter().zip(categories) {
        let value = match (cell, transform.null_handling) {
            (Some(value), _) => value.clone(),
            (None, NullHandling::Skip) => continue,
            (None, NullHandling::Zero) => Value::from(0),
            (None, NullHandling::Fill) => transform
                .fill_value
                .clone()
                .ok_or_else(|| TransformError::config(item, "nullHandling fill requires a fillValue"))?,
        };
        data.push(value);
        labels.push(category.clone());
    }
    Ok(PivotSeries {
        name,
        cells,
        data,
        labels,
    })
}
