//! Renders a template into an ECharts-shaped option skeleton whose leaves are
//! placeholder tokens.

use chartmap_model::{SlotKind, TemplateCategory, TemplateSlot, UniversalTemplate};
use serde_json::{Map, Value, json};

/// ECharts series type for a chart type.
pub fn series_kind(template: &UniversalTemplate) -> &'static str {
    match template.category {
        TemplateCategory::Cartesian if template.chart_type.contains("bar") => "bar",
        TemplateCategory::Cartesian => "line",
        TemplateCategory::Pie => "pie",
        TemplateCategory::Radar => "radar",
        TemplateCategory::Gauge => "gauge",
    }
}

pub fn render_skeleton(template: &UniversalTemplate) -> Value {
    let mut option = Map::new();
    for slot in &template.chart {
        match slot.kind {
            SlotKind::Title => {
                option.insert("title".into(), json!({ "text": slot.token() }));
            }
            SlotKind::Theme => {
                option.insert("theme".into(), Value::String(slot.token()));
            }
            _ => {}
        }
    }
    for slot in template.layout.iter().chain(&template.interaction) {
        if let SlotKind::Block(group) = slot.kind {
            option.insert(group.as_str().into(), Value::String(slot.token()));
        }
    }

    let type_token = token_of(&template.chart, SlotKind::ChartType);
    let style = series_style(&template.chart_type);
    let pairs = series_pairs(template);

    match template.category {
        TemplateCategory::Cartesian => {
            let mut x_axis = json!({ "type": "category" });
            let mut y_axis = json!({ "type": "value" });
            let mut axis_names = template
                .coordinates
                .iter()
                .filter(|slot| slot.kind == SlotKind::AxisName);
            if let Some(slot) = axis_names.next() {
                x_axis["name"] = Value::String(slot.token());
            }
            if let Some(slot) = axis_names.next() {
                y_axis["name"] = Value::String(slot.token());
            }
            if let Some(categories) = token_of(&template.coordinates, SlotKind::Categories) {
                x_axis["data"] = categories;
            }
            option.insert("xAxis".into(), x_axis);
            option.insert("yAxis".into(), y_axis);
            option.insert("series".into(), flat_series(pairs, type_token, &style));
        }
        TemplateCategory::Pie => {
            option.insert("series".into(), flat_series(pairs, type_token, &style));
        }
        TemplateCategory::Radar => {
            let indicator =
                token_of(&template.coordinates, SlotKind::RadarIndicators).unwrap_or(Value::Null);
            option.insert("radar".into(), json!({ "indicator": indicator }));
            let data: Vec<Value> = pairs
                .into_iter()
                .map(|(name, value)| json!({ "name": name, "value": value }))
                .collect();
            let mut entry = Map::new();
            entry.insert("type".into(), type_token.unwrap_or(Value::Null));
            entry.insert("data".into(), Value::Array(data));
            entry.extend(style);
            option.insert("series".into(), json!([entry]));
        }
        TemplateCategory::Gauge => {
            let mut entry = Map::new();
            entry.insert("type".into(), type_token.unwrap_or(Value::Null));
            let mut bounds = template
                .coordinates
                .iter()
                .filter(|slot| slot.kind == SlotKind::Bound);
            if let Some(slot) = bounds.next() {
                entry.insert("min".into(), Value::String(slot.token()));
            }
            if let Some(slot) = bounds.next() {
                entry.insert("max".into(), Value::String(slot.token()));
            }
            let data: Vec<Value> = pairs
                .into_iter()
                .map(|(name, value)| json!({ "name": name, "value": value }))
                .collect();
            entry.insert("data".into(), Value::Array(data));
            entry.extend(style);
            option.insert("series".into(), json!([entry]));
        }
    }

    Value::Object(option)
}

/// One series entry per slot, as cartesian and pie charts expect.
fn flat_series(
    pairs: Vec<(Value, Value)>,
    type_token: Option<Value>,
    style: &Map<String, Value>,
) -> Value {
    pairs
        .into_iter()
        .map(|(name, data)| {
            let mut entry = Map::new();
            entry.insert("name".into(), name);
            entry.insert("type".into(), type_token.clone().unwrap_or(Value::Null));
            entry.insert("data".into(), data);
            entry.extend(style.clone());
            Value::Object(entry)
        })
        .collect()
}

fn token_of(slots: &[TemplateSlot], kind: SlotKind) -> Option<Value> {
    slots
        .iter()
        .find(|slot| slot.kind == kind)
        .map(|slot| Value::String(slot.token()))
}

/// `(name token, data token)` per series slot, in slot order.
fn series_pairs(template: &UniversalTemplate) -> Vec<(Value, Value)> {
    (1..=template.max_series_count)
        .filter_map(|n| {
            let name = token_of(&template.series, SlotKind::SeriesName(n))?;
            let data = token_of(&template.series, SlotKind::SeriesData(n))?;
            Some((name, data))
        })
        .collect()
}

/// Fixed styling implied by the chart type name.
fn series_style(chart_type: &str) -> Map<String, Value> {
    let mut style = Map::new();
    if chart_type.contains("smooth") {
        style.insert("smooth".into(), Value::Bool(true));
    }
    if chart_type.contains("stacked") {
        style.insert("stack".into(), Value::String("total".into()));
    }
    if chart_type.contains("area") || chart_type.starts_with("filled_") {
        style.insert("areaStyle".into(), json!({}));
    }
    if chart_type.starts_with("doughnut") {
        style.insert("radius".into(), json!(["40%", "70%"]));
    }
    if chart_type.starts_with("rose") {
        style.insert("roseType".into(), Value::String("radius".into()));
    }
    if chart_type.starts_with("progress") {
        style.insert("progress".into(), json!({ "show": true }));
    }
    if chart_type.starts_with("grade") {
        style.insert("splitNumber".into(), json!(5));
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::templates::build_template;

    #[test]
    fn stacked_line_skeleton_places_tokens() {
        let template = build_template(
            "stacked_line_chart",
            TemplateCategory::Cartesian,
            &ChartConfig::default(),
            "v1",
        );
        let skeleton = render_skeleton(&template);
        assert_eq!(skeleton["title"]["text"], "${chart_title}");
        assert_eq!(skeleton["xAxis"]["data"], "${categories}");
        assert_eq!(skeleton["yAxis"]["name"], "${y_axis_name}");
        assert_eq!(skeleton["series"].as_array().map(Vec::len), Some(10));
        assert_eq!(skeleton["series"][0]["stack"], "total");
        assert_eq!(skeleton["series"][9]["data"], "${series_10_data}");
        assert_eq!(series_kind(&template), "line");
    }

    #[test]
    fn radar_skeleton_nests_series_in_one_entry() {
        let template = build_template(
            "filled_radar_chart",
            TemplateCategory::Radar,
            &ChartConfig::default(),
            "v1",
        );
        let skeleton = render_skeleton(&template);
        assert_eq!(skeleton["radar"]["indicator"], "${radar_indicators}");
        assert_eq!(skeleton["series"][0]["data"][2]["value"], "${series_3_data}");
        assert!(skeleton["series"][0].get("areaStyle").is_some());
    }
}
