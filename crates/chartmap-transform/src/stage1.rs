//! Stage 1: tabular rows to the universal representation.
//!
//! Pivot items share one category axis. Their series are re-projected onto
//! that axis with each item's null policy. Pivots on `${series_N_data}` are
//! assigned to template series slots starting at N; any other pivot item
//! only resolves its own value. Every other item resolves to a single named
//! value.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chartmap_model::placeholder::{SeriesPart, series_slot_of};
use chartmap_model::{CellValue, DataType, Mapping, MappingItem, Row, TableRows};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::engine::{GroupValue, PivotMatrix, Query, TabularTransformEngine, TransformOutput, build_series};
use crate::error::{Result, TransformError};

/// Variable whose pivot item only contributes the category axis.
pub const CATEGORIES_VARIABLE: &str = "categories";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UniversalData {
    pub categories: Vec<Value>,
    pub series: Vec<UniversalSeries>,
    /// Resolved value per mapping placeholder.
    pub values: BTreeMap<String, Value>,
}

impl UniversalData {
    pub fn series_in_slot(&self, slot: usize) -> Option<&UniversalSeries> {
        self.series.iter().find(|s| s.slot == slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniversalSeries {
    pub name: String,
    /// 1-based template series slot.
    pub slot: usize,
    /// Placeholder of the mapping item that produced the series.
    pub source: String,
    pub data: Vec<Value>,
    /// Category of each data point.
    pub labels: Vec<Value>,
}

/// Runs every mapping item against `tables` and assembles the universal data.
pub fn to_universal(tables: &TableRows, mapping: &Mapping) -> Result<UniversalData> {
    let engine = TabularTransformEngine::new();
    let empty: Vec<Row> = Vec::new();
    let mut universal = UniversalData::default();
    let mut pivots: Vec<(&MappingItem, PivotMatrix)> = Vec::new();
    let mut category_key: Option<&str> = None;

    for item in &mapping.items {
        let rows = tables.get(&item.source.table).unwrap_or(&empty);
        let query = Query {
            item: &item.placeholder,
            column: &item.source.column,
            transform: &item.transform,
            pivot: &item.pivot,
        };
        match engine.execute(rows, &query)? {
            TransformOutput::Matrix(matrix) => {
                let key = item.pivot.category_key.as_deref().unwrap_or_default();
                match category_key {
                    Some(existing) if existing != key => {
                        return Err(TransformError::config(
                            &item.placeholder,
                            format!("categoryKey {key:?} conflicts with {existing:?} used by an earlier item"),
                        ));
                    }
                    _ => category_key = Some(key),
                }
                pivots.push((item, matrix));
            }
            TransformOutput::Values { groups } => {
                let value = resolve_value(item, &groups)?;
                universal.values.insert(item.placeholder.clone(), value);
            }
        }
    }

    let axis = category_axis(&pivots);
    universal.categories = axis.iter().map(CellValue::to_json).collect();

    let mut used_slots: BTreeSet<usize> = BTreeSet::new();
    for (item, matrix) in &pivots {
        if item.variable() == CATEGORIES_VARIABLE {
            universal
                .values
                .insert(item.placeholder.clone(), Value::Array(universal.categories.clone()));
            continue;
        }

        let aligned = matrix
            .series
            .iter()
            .map(|series| {
                build_series(
                    &item.placeholder,
                    series.name.clone(),
                    realign(matrix, &series.cells, &axis),
                    &universal.categories,
                    &item.transform,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let value = match aligned.as_slice() {
            [single] => Value::Array(single.data.clone()),
            many => Value::Object(
                many.iter()
                    .map(|s| (s.name.clone(), Value::Array(s.data.clone())))
                    .collect::<Map<_, _>>(),
            ),
        };
        universal.values.insert(item.placeholder.clone(), value);

        // Only series data placeholders occupy template series slots.
        let Some((mut start, SeriesPart::Data)) = series_slot_of(item.variable()) else {
            continue;
        };
        for series in aligned {
            let slot = next_free(&used_slots, start);
            used_slots.insert(slot);
            start = slot + 1;
            universal.series.push(UniversalSeries {
                name: series.name,
                slot,
                source: item.placeholder.clone(),
                data: series.data,
                labels: series.labels,
            });
        }
    }

    tracing::debug!(
        chart_id = %mapping.chart_id,
        categories = universal.categories.len(),
        series = universal.series.len(),
        values = universal.values.len(),
        "stage 1 complete"
    );
    Ok(universal)
}

/// Union of all pivot categories in first-seen order.
fn category_axis(pivots: &[(&MappingItem, PivotMatrix)]) -> Vec<CellValue> {
    let mut seen = BTreeSet::new();
    let mut axis = Vec::new();
    for (_, matrix) in pivots {
        for category in &matrix.categories {
            if seen.insert(category.group_key()) {
                axis.push(category.clone());
            }
        }
    }
    axis
}

/// Moves raw cells from the matrix's own categories onto `axis`.
fn realign(matrix: &PivotMatrix, cells: &[Option<Value>], axis: &[CellValue]) -> Vec<Option<Value>> {
    let by_key: HashMap<String, &Option<Value>> = matrix
        .categories
        .iter()
        .map(CellValue::group_key)
        .zip(cells)
        .collect();
    axis.iter()
        .map(|category| by_key.get(&category.group_key()).and_then(|cell| (*cell).clone()))
        .collect()
}

fn next_free(used: &BTreeSet<usize>, from: usize) -> usize {
    (from.max(1)..).find(|slot| !used.contains(slot)).unwrap_or(from)
}

/// Resolves a non-pivot item according to its declared data type.
fn resolve_value(item: &MappingItem, groups: &[GroupValue]) -> Result<Value> {
    match item.data_type {
        DataType::Array => Ok(Value::Array(groups.iter().map(|g| g.value.clone()).collect())),
        DataType::Object => Ok(Value::Object(
            groups
                .iter()
                .map(|g| (g.label(&item.source.column), g.value.clone()))
                .collect(),
        )),
        DataType::String | DataType::Number => match groups {
            [] => Ok(Value::Null),
            [group] => Ok(coerce_scalar(item.data_type, &group.value)),
            _ => Err(TransformError::Shape {
                item: item.placeholder.clone(),
                groups: groups.len(),
            }),
        },
    }
}

fn coerce_scalar(data_type: DataType, value: &Value) -> Value {
    match (data_type, CellValue::from_json(value)) {
        (_, None) | (_, Some(CellValue::Null)) => value.clone(),
        (DataType::String, Some(cell)) => Value::String(cell.label()),
        (DataType::Number, Some(cell)) => cell
            .numeric()
            .map_or_else(|| value.clone(), chartmap_model::number_value),
        (_, Some(_)) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartmap_model::{Aggregation, ChartId, NullHandling, Pivot, Transform};
    use serde_json::json;

    fn tables() -> TableRows {
        let mut tables = TableRows::new();
        tables.insert(
            "sales".into(),
            vec![
                Row::new().with("day", "Mon").with("region", "North").with("amount", 10),
                Row::new().with("day", "Tue").with("region", "North").with("amount", 20),
                Row::new().with("day", "Wed").with("region", "South").with("amount", 5),
            ],
        );
        tables.insert("meta".into(), vec![Row::new().with("title", "Sales")]);
        tables
    }

    fn sum_by_region(placeholder: &str, null_handling: NullHandling) -> MappingItem {
        MappingItem::new(placeholder, DataType::Array, "sales", "amount")
            .with_transform(Transform {
                aggregation: Aggregation::Sum,
                null_handling,
                ..Transform::default()
            })
            .with_pivot(Pivot::new("day", Some("region")))
    }

    fn mapping(items: Vec<MappingItem>) -> Mapping {
        let mut mapping = Mapping::new(ChartId::new("basic_line_chart").unwrap(), "v1", "v1");
        mapping.items = items;
        mapping
    }

    #[test]
    fn series_fill_consecutive_slots_from_placeholder() {
        let universal = to_universal(
            &tables(),
            &mapping(vec![sum_by_region("${series_2_data}", NullHandling::Zero)]),
        )
        .unwrap();
        assert_eq!(universal.categories, vec![json!("Mon"), json!("Tue"), json!("Wed")]);
        let north = universal.series_in_slot(2).unwrap();
        assert_eq!(north.name, "North");
        assert_eq!(north.data, vec![json!(10), json!(20), json!(0)]);
        let south = universal.series_in_slot(3).unwrap();
        assert_eq!(south.data, vec![json!(0), json!(0), json!(5)]);
        assert!(universal.values["${series_2_data}"].is_object());
    }

    #[test]
    fn skip_policy_keeps_labels_aligned() {
        let universal = to_universal(
            &tables(),
            &mapping(vec![sum_by_region("${series_1_data}", NullHandling::Skip)]),
        )
        .unwrap();
        let south = universal.series_in_slot(2).unwrap();
        assert_eq!(south.data, vec![json!(5)]);
        assert_eq!(south.labels, vec![json!("Wed")]);
    }

    #[test]
    fn non_series_pivot_items_take_no_slot() {
        let indicators = MappingItem::new("${radar_indicators}", DataType::Array, "sales", "amount")
            .with_transform(Transform {
                aggregation: Aggregation::Max,
                ..Transform::default()
            })
            .with_pivot(Pivot::new("day", None));
        let universal = to_universal(
            &tables(),
            &mapping(vec![
                indicators,
                sum_by_region("${series_1_data}", NullHandling::Zero),
            ]),
        )
        .unwrap();

        assert_eq!(universal.series.len(), 2);
        assert_eq!(universal.series_in_slot(1).unwrap().name, "North");
        assert_eq!(universal.series_in_slot(2).unwrap().name, "South");
        assert!(universal.series.iter().all(|s| s.source == "${series_1_data}"));
        assert_eq!(
            universal.values["${radar_indicators}"],
            json!([10, 20, 5])
        );
    }

    #[test]
    fn conflicting_category_keys_fail() {
        let other = MappingItem::new("${series_3_data}", DataType::Array, "sales", "amount")
            .with_transform(Transform {
                aggregation: Aggregation::Sum,
                ..Transform::default()
            })
            .with_pivot(Pivot::new("region", None));
        let result = to_universal(
            &tables(),
            &mapping(vec![sum_by_region("${series_1_data}", NullHandling::Zero), other]),
        );
        assert!(matches!(result, Err(TransformError::Config { .. })));
    }

    #[test]
    fn scalar_items_resolve_single_group() {
        let title = MappingItem::new("${chart_title}", DataType::String, "meta", "title");
        let universal = to_universal(&tables(), &mapping(vec![title])).unwrap();
        assert_eq!(universal.values["${chart_title}"], json!("Sales"));

        let missing = MappingItem::new("${chart_title}", DataType::String, "absent", "title");
        let universal = to_universal(&tables(), &mapping(vec![missing])).unwrap();
        assert_eq!(universal.values["${chart_title}"], Value::Null);
    }

    #[test]
    fn scalar_item_with_many_groups_is_shape_error() {
        let item = MappingItem::new("${y_axis_name}", DataType::String, "sales", "amount")
            .with_transform(Transform {
                aggregation: Aggregation::Sum,
                group_by: vec!["region".into()],
                ..Transform::default()
            });
        assert!(matches!(
            to_universal(&tables(), &mapping(vec![item])),
            Err(TransformError::Shape { groups: 2, .. })
        ));
    }

    #[test]
    fn object_items_key_by_group_label() {
        let item = MappingItem::new("${legend_config}", DataType::Object, "sales", "amount")
            .with_transform(Transform {
                aggregation: Aggregation::Sum,
                group_by: vec!["region".into()],
                ..Transform::default()
            });
        let universal = to_universal(&tables(), &mapping(vec![item])).unwrap();
        assert_eq!(
            universal.values["${legend_config}"],
            json!({"North": 30, "South": 5})
        );
    }
}
