//! Stage 2: universal data plus template to a finished chart option.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chartmap_catalog::{render_skeleton, series_kind};
use chartmap_model::placeholder::{
    self, SeriesPart, series_data_variable, series_name_variable, series_slot_of,
};
use chartmap_model::{CellValue, PlaceholderCatalog, SlotKind, TemplateCategory, UniversalTemplate};
use serde_json::{Value, json};

use crate::error::Result;
use crate::stage1::UniversalData;

/// Placeholder token to bound value.
pub type Bindings = BTreeMap<String, Value>;

/// Fills the template skeleton with `universal`.
///
/// Derived bindings (categories, series by slot, category-specific shapes)
/// take precedence over raw item values. Series entries whose data
/// placeholder stays unbound are removed; any other unbound placeholder is
/// left in place as a token.
pub fn apply_spec(
    universal: &UniversalData,
    template: &UniversalTemplate,
    catalog: &PlaceholderCatalog,
) -> Result<Value> {
    let bindings = bindings(universal, template);
    let mut option = render_skeleton(template);

    for item in &catalog.items {
        if let Some(value) = bindings.get(&item.name) {
            if item.target_path.get(&option).is_some() {
                item.target_path.set(&mut option, value.clone())?;
            } else {
                tracing::warn!(placeholder = %item.name, path = %item.target_path, "catalog path missing from skeleton");
            }
        }
    }
    substitute(&mut option, &bindings);
    prune_unbound_series(&mut option);

    tracing::debug!(
        chart_type = %template.chart_type,
        bound = bindings.len(),
        "stage 2 complete"
    );
    Ok(option)
}

/// Derived bindings first, then item values for anything still unbound.
pub fn bindings(universal: &UniversalData, template: &UniversalTemplate) -> Bindings {
    let mut bound = Bindings::new();
    let token_for = |kind: SlotKind| {
        template
            .declared_slots()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.token())
    };

    let radar_token = token_for(SlotKind::RadarIndicators);
    if let Some(token) = token_for(SlotKind::ChartType) {
        bound.insert(token, Value::String(series_kind(template).to_string()));
    }
    if !universal.categories.is_empty() {
        if let Some(token) = token_for(SlotKind::Categories) {
            bound.insert(token, Value::Array(universal.categories.clone()));
        }
        if let Some(token) = radar_token.clone() {
            let indicators = radar_indicators(universal, universal.values.get(&token));
            bound.insert(token, indicators);
        }
    }

    for series in &universal.series {
        if series.slot > template.max_series_count {
            tracing::warn!(
                series = %series.name,
                slot = series.slot,
                max = template.max_series_count,
                "series has no template slot"
            );
            continue;
        }
        let data = match template.category {
            TemplateCategory::Cartesian | TemplateCategory::Radar => {
                Value::Array(series.data.clone())
            }
            TemplateCategory::Pie => Value::Array(
                series
                    .labels
                    .iter()
                    .zip(&series.data)
                    .map(|(name, value)| json!({ "name": label_of(name), "value": value }))
                    .collect(),
            ),
            TemplateCategory::Gauge => series.data.first().cloned().unwrap_or(Value::Null),
        };
        bound.insert(
            placeholder::token(&series_name_variable(series.slot)),
            Value::String(series.name.clone()),
        );
        bound.insert(placeholder::token(&series_data_variable(series.slot)), data);
    }

    for (name, value) in &universal.values {
        match bound.entry(name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
            }
            Entry::Occupied(derived)
                if derived.get() != value && radar_token.as_ref() != Some(name) =>
            {
                tracing::debug!(
                    placeholder = %name,
                    mapped = %value,
                    derived = %derived.get(),
                    "mapped value shadowed by derived binding"
                );
            }
            Entry::Occupied(_) => {}
        }
    }
    bound
}

/// One indicator per category.
///
/// A mapped value wins when it already holds indicator objects or one
/// number per category (used as `max`). Otherwise `max` is the largest
/// series value of the category.
fn radar_indicators(universal: &UniversalData, mapped: Option<&Value>) -> Value {
    if let Some(Value::Array(items)) = mapped {
        if items.iter().all(Value::is_object) && !items.is_empty() {
            return Value::Array(items.clone());
        }
        if items.len() == universal.categories.len() && items.iter().all(Value::is_number) {
            return universal
                .categories
                .iter()
                .zip(items)
                .map(|(category, max)| json!({ "name": label_of(category), "max": max }))
                .collect();
        }
    }
    universal
        .categories
        .iter()
        .map(|category| {
            let max = universal
                .series
                .iter()
                .flat_map(|s| s.labels.iter().zip(&s.data))
                .filter(|(label, _)| *label == category)
                .filter_map(|(_, value)| value.as_f64())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
            match max {
                Some(max) => json!({ "name": label_of(category), "max": chartmap_model::number_value(max) }),
                None => json!({ "name": label_of(category) }),
            }
        })
        .collect()
}

fn label_of(value: &Value) -> String {
    CellValue::from_json(value).map_or_else(|| value.to_string(), |cell| cell.label())
}

/// Replaces every remaining whole-string token that has a binding.
pub fn substitute(value: &mut Value, bindings: &Bindings) {
    match value {
        Value::String(text) => {
            if let Some(bound) = bindings.get(text.as_str()) {
                *value = bound.clone();
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, bindings);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                substitute(item, bindings);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Drops array entries that still hold an unbound series data token.
fn prune_unbound_series(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.retain(|item| !holds_series_data_token(item));
            for item in items {
                prune_unbound_series(item);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                prune_unbound_series(item);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn holds_series_data_token(item: &Value) -> bool {
    item.as_object().is_some_and(|entry| {
        entry.values().any(|field| {
            field
                .as_str()
                .and_then(placeholder::variable_of)
                .and_then(series_slot_of)
                .is_some_and(|(_, part)| part == SeriesPart::Data)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage1::UniversalSeries;
    use chartmap_catalog::{BuiltinTemplateStore, PlaceholderCatalogGenerator, TemplateStore};
    use chartmap_model::ChartId;
    use std::sync::{Arc, Mutex};

    fn setup(chart_type: &str) -> (Arc<UniversalTemplate>, PlaceholderCatalog) {
        let store = BuiltinTemplateStore::default();
        let template = store.get_template(chart_type).unwrap();
        let catalog = PlaceholderCatalogGenerator::new(&store)
            .generate(&ChartId::new(chart_type).unwrap(), "v1", "v1")
            .unwrap();
        (template, catalog)
    }

    fn series(name: &str, slot: usize, data: Vec<Value>, labels: Vec<Value>) -> UniversalSeries {
        UniversalSeries {
            name: name.to_string(),
            slot,
            source: "${series_1_data}".to_string(),
            data,
            labels,
        }
    }

    #[test]
    fn pie_binds_name_value_pairs() {
        let (template, catalog) = setup("basic_pie_chart");
        let universal = UniversalData {
            categories: vec![json!("A"), json!("B")],
            series: vec![series("Share", 1, vec![json!(1), json!(2)], vec![json!("A"), json!("B")])],
            values: BTreeMap::new(),
        };
        let option = apply_spec(&universal, &template, &catalog).unwrap();
        assert_eq!(
            option["series"][0]["data"],
            json!([{"name": "A", "value": 1}, {"name": "B", "value": 2}])
        );
        assert_eq!(option["series"][0]["type"], "pie");
        assert_eq!(option["title"]["text"], "${chart_title}");
    }

    #[test]
    fn radar_indicators_take_series_max() {
        let (template, catalog) = setup("basic_radar_chart");
        let labels = vec![json!("Speed"), json!("Power")];
        let universal = UniversalData {
            categories: labels.clone(),
            series: vec![
                series("A", 1, vec![json!(3), json!(9)], labels.clone()),
                series("B", 2, vec![json!(7), json!(2)], labels),
            ],
            values: BTreeMap::new(),
        };
        let option = apply_spec(&universal, &template, &catalog).unwrap();
        assert_eq!(
            option["radar"]["indicator"],
            json!([{"name": "Speed", "max": 7}, {"name": "Power", "max": 9}])
        );
        let data = option["series"][0]["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1]["value"], json!([7, 2]));
    }

    #[test]
    fn mapped_indicator_maxima_are_kept() {
        let (template, catalog) = setup("basic_radar_chart");
        let labels = vec![json!("Speed"), json!("Power")];
        let mut values = BTreeMap::new();
        values.insert("${radar_indicators}".to_string(), json!([10, 20]));
        let universal = UniversalData {
            categories: labels.clone(),
            series: vec![series("A", 1, vec![json!(3), json!(9)], labels)],
            values,
        };
        let option = apply_spec(&universal, &template, &catalog).unwrap();
        assert_eq!(
            option["radar"]["indicator"],
            json!([{"name": "Speed", "max": 10}, {"name": "Power", "max": 20}])
        );
        assert_eq!(option["series"][0]["data"][0]["name"], "A");
    }

    #[test]
    fn shadowed_item_value_is_logged() {
        let (template, _) = setup("basic_bar_chart");
        let mut values = BTreeMap::new();
        values.insert("${series_1_name}".to_string(), json!("Mapped"));
        let universal = UniversalData {
            categories: vec![json!("Q1")],
            series: vec![series("Revenue", 1, vec![json!(5)], vec![json!("Q1")])],
            values,
        };

        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logs);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || LogBuffer(Arc::clone(&sink)))
            .finish();
        let bound = tracing::subscriber::with_default(subscriber, || bindings(&universal, &template));

        assert_eq!(bound["${series_1_name}"], json!("Revenue"));
        let text = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
        assert!(text.contains("mapped value shadowed by derived binding"));
        assert!(text.contains("${series_1_name}"));
    }

    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn gauge_takes_first_value_and_item_bounds() {
        let (template, catalog) = setup("basic_gauge_chart");
        let mut values = BTreeMap::new();
        values.insert("${max_value}".to_string(), json!(200));
        let universal = UniversalData {
            categories: vec![json!("now")],
            series: vec![series("Load", 1, vec![json!(42)], vec![json!("now")])],
            values,
        };
        let option = apply_spec(&universal, &template, &catalog).unwrap();
        assert_eq!(option["series"][0]["data"][0], json!({"name": "Load", "value": 42}));
        assert_eq!(option["series"][0]["max"], json!(200));
        assert_eq!(option["series"][0]["min"], "${min_value}");
    }

    #[test]
    fn unbound_series_are_pruned() {
        let (template, catalog) = setup("basic_bar_chart");
        let universal = UniversalData {
            categories: vec![json!("Q1")],
            series: vec![series("Revenue", 1, vec![json!(5)], vec![json!("Q1")])],
            values: BTreeMap::new(),
        };
        let option = apply_spec(&universal, &template, &catalog).unwrap();
        let rendered = option["series"].as_array().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0]["type"], "bar");
        assert_eq!(rendered[0]["name"], "Revenue");
        assert_eq!(option["xAxis"]["data"], json!(["Q1"]));
    }
}
