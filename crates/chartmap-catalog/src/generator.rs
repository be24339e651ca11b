//! Placeholder catalog generation.

use chartmap_model::{
    CatalogItem, ChartId, DataType, JsonPath, PlaceholderCatalog, PlaceholderGroup, SlotKind,
    TemplateSlot, UniversalTemplate,
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::error::{CatalogError, Result};
use crate::hash::sha256_hex;
use crate::skeleton::render_skeleton;
use crate::templates::TemplateStore;

/// Produces the ordered placeholder catalog for a chart.
#[derive(Debug, Clone)]
pub struct PlaceholderCatalogGenerator<S> {
    store: S,
}

impl<S: TemplateStore> PlaceholderCatalogGenerator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates the catalog for `chart_id` (which doubles as the chart type).
    ///
    /// Same inputs give the same items and checksum; only `generated_at` varies.
    pub fn generate(
        &self,
        chart_id: &ChartId,
        template_version: &str,
        spec_version: &str,
    ) -> Result<PlaceholderCatalog> {
        let template = self.store.get_template(chart_id.as_str())?;
        if template.version != template_version {
            return Err(CatalogError::VersionMismatch {
                chart_type: chart_id.to_string(),
                requested: template_version.to_string(),
                available: template.version.clone(),
            });
        }

        let items = catalog_items(&template)?;
        let checksum = checksum(&items);
        tracing::debug!(
            chart_id = %chart_id,
            items = items.len(),
            checksum = %checksum,
            "generated placeholder catalog"
        );
        Ok(PlaceholderCatalog {
            chart_id: chart_id.clone(),
            template_version: template_version.to_string(),
            spec_version: spec_version.to_string(),
            generated_at: Utc::now(),
            checksum,
            items,
        })
    }
}

/// One catalog item per declared slot, located in the rendered skeleton.
pub fn catalog_items(template: &UniversalTemplate) -> Result<Vec<CatalogItem>> {
    let skeleton = render_skeleton(template);
    template
        .declared_slots()
        .map(|slot| -> Result<CatalogItem> {
            let name = slot.token();
            let target_path =
                JsonPath::locate(&skeleton, &name).ok_or_else(|| CatalogError::UnplacedSlot {
                    variable: slot.variable.clone(),
                })?;
            Ok(CatalogItem {
                variable: slot.variable.clone(),
                data_type: infer_type(slot.kind),
                required: is_required(template, slot),
                group: group_of(slot.kind),
                target_path,
                description: describe(slot),
                example: example(slot),
                name,
            })
        })
        .collect()
}

/// Hex sha256 over the ordered `(variable, type, required, group, targetPath)` tuples.
pub fn checksum(items: &[CatalogItem]) -> String {
    let mut buffer = String::new();
    for item in items {
        buffer.push_str(&format!(
            "{}|{}|{}|{}|{}\n",
            item.variable, item.data_type, item.required, item.group, item.target_path
        ));
    }
    sha256_hex(buffer.as_bytes())
}

fn infer_type(kind: SlotKind) -> DataType {
    match kind {
        SlotKind::Title
        | SlotKind::ChartType
        | SlotKind::Theme
        | SlotKind::AxisName
        | SlotKind::SeriesName(_) => DataType::String,
        SlotKind::Categories | SlotKind::RadarIndicators | SlotKind::SeriesData(_) => {
            DataType::Array
        }
        SlotKind::Bound => DataType::Number,
        SlotKind::Block(_) => DataType::Object,
    }
}

/// Extra series slots are optional, and so is the chart type, which is filled
/// from the template itself.
fn is_required(template: &UniversalTemplate, slot: &TemplateSlot) -> bool {
    slot.kind != SlotKind::ChartType && !template.is_optional_series_slot(slot.kind)
}

fn group_of(kind: SlotKind) -> PlaceholderGroup {
    match kind {
        SlotKind::Title => PlaceholderGroup::Title,
        SlotKind::ChartType | SlotKind::Theme => PlaceholderGroup::Meta,
        SlotKind::Categories | SlotKind::AxisName | SlotKind::RadarIndicators | SlotKind::Bound => {
            PlaceholderGroup::Axis
        }
        SlotKind::SeriesName(_) | SlotKind::SeriesData(_) => PlaceholderGroup::Series,
        SlotKind::Block(group) => group,
    }
}

fn describe(slot: &TemplateSlot) -> String {
    match slot.kind {
        SlotKind::Title => "Chart title".to_string(),
        SlotKind::ChartType => "Series render type, filled from the chart type".to_string(),
        SlotKind::Theme => "Chart theme name".to_string(),
        SlotKind::Categories => "Category axis values".to_string(),
        SlotKind::AxisName => format!("Axis name ({})", slot.variable),
        SlotKind::RadarIndicators => "Radar indicators, one per category".to_string(),
        SlotKind::Bound if slot.variable.starts_with("min") => "Gauge minimum".to_string(),
        SlotKind::Bound => "Gauge maximum".to_string(),
        SlotKind::SeriesName(n) => format!("Name of series {n}"),
        SlotKind::SeriesData(n) => format!("Values of series {n}"),
        SlotKind::Block(group) => format!("{group} configuration block"),
    }
}

fn example(slot: &TemplateSlot) -> Option<Value> {
    let value = match slot.kind {
        SlotKind::Title => json!("Weekly conversions"),
        SlotKind::Theme => json!("light"),
        SlotKind::Categories => json!(["Mon", "Tue", "Wed"]),
        SlotKind::AxisName => json!("Day"),
        SlotKind::SeriesName(_) => json!("Email"),
        SlotKind::SeriesData(_) => json!([120, 132, 101]),
        SlotKind::Bound if slot.variable.starts_with("min") => json!(0),
        SlotKind::Bound => json!(100),
        SlotKind::Block(PlaceholderGroup::Legend) => json!({ "show": true }),
        SlotKind::Block(PlaceholderGroup::Tooltip) => json!({ "trigger": "axis" }),
        SlotKind::ChartType | SlotKind::RadarIndicators | SlotKind::Block(_) => return None,
    };
    Some(value)
}
