//! Template store and the built-in category templates.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chartmap_model::placeholder::{series_data_variable, series_name_variable};
use chartmap_model::{PlaceholderGroup, SlotKind, TemplateCategory, TemplateSlot, UniversalTemplate};

use crate::config::ChartConfig;
use crate::error::{CatalogError, Result};

pub const DEFAULT_TEMPLATE_VERSION: &str = "v1";

/// Supplies the universal template for a chart type.
pub trait TemplateStore: Send + Sync {
    fn get_template(&self, chart_type: &str) -> Result<Arc<UniversalTemplate>>;

    /// Chart types this store can serve without inference.
    fn chart_types(&self) -> Vec<String>;
}

impl<T: TemplateStore + ?Sized> TemplateStore for Arc<T> {
    fn get_template(&self, chart_type: &str) -> Result<Arc<UniversalTemplate>> {
        (**self).get_template(chart_type)
    }

    fn chart_types(&self) -> Vec<String> {
        (**self).chart_types()
    }
}

impl<T: TemplateStore + ?Sized> TemplateStore for &T {
    fn get_template(&self, chart_type: &str) -> Result<Arc<UniversalTemplate>> {
        (**self).get_template(chart_type)
    }

    fn chart_types(&self) -> Vec<String> {
        (**self).chart_types()
    }
}

/// Builds templates from the category factories and caches them per chart type.
#[derive(Debug)]
pub struct BuiltinTemplateStore {
    config: ChartConfig,
    version: String,
    cache: RwLock<HashMap<String, Arc<UniversalTemplate>>>,
}

impl Default for BuiltinTemplateStore {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

impl BuiltinTemplateStore {
    pub fn new(config: ChartConfig) -> Self {
        Self::with_version(config, DEFAULT_TEMPLATE_VERSION)
    }

    /// A store whose templates carry `version`. Regenerating templates with
    /// different limits is expected to bump it.
    pub fn with_version(config: ChartConfig, version: impl Into<String>) -> Self {
        Self {
            config,
            version: version.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
}

impl TemplateStore for BuiltinTemplateStore {
    fn get_template(&self, chart_type: &str) -> Result<Arc<UniversalTemplate>> {
        let key = chart_type.trim().to_lowercase();
        if let Some(template) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(template));
        }

        let category =
            TemplateCategory::infer(&key).map_err(|_| CatalogError::TemplateNotFound {
                chart_type: chart_type.to_string(),
            })?;
        let template = Arc::new(build_template(&key, category, &self.config, &self.version));
        tracing::debug!(chart_type = %key, category = %category, "built template");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(template)))
    }

    fn chart_types(&self) -> Vec<String> {
        TemplateCategory::ALL
            .iter()
            .flat_map(|category| category.supported_chart_types())
            .map(|chart_type| (*chart_type).to_string())
            .collect()
    }
}

/// Assembles the template for `chart_type` from its category factory.
pub fn build_template(
    chart_type: &str,
    category: TemplateCategory,
    config: &ChartConfig,
    version: &str,
) -> UniversalTemplate {
    let limits = config.limits(category);
    let chart = vec![
        TemplateSlot::new("chart_title", SlotKind::Title),
        TemplateSlot::new("chart_type", SlotKind::ChartType),
        TemplateSlot::new("chart_theme", SlotKind::Theme),
    ];
    let series = (1..=limits.max_series_count)
        .flat_map(|n| {
            [
                TemplateSlot::new(series_name_variable(n), SlotKind::SeriesName(n)),
                TemplateSlot::new(series_data_variable(n), SlotKind::SeriesData(n)),
            ]
        })
        .collect();
    let block = |name: &str, group: PlaceholderGroup| TemplateSlot::new(name, SlotKind::Block(group));

    let (coordinates, layout, interaction) = match category {
        TemplateCategory::Cartesian => (
            vec![
                TemplateSlot::new("categories", SlotKind::Categories),
                TemplateSlot::new("x_axis_name", SlotKind::AxisName),
                TemplateSlot::new("y_axis_name", SlotKind::AxisName),
            ],
            vec![
                block("legend_config", PlaceholderGroup::Legend),
                block("grid_config", PlaceholderGroup::Grid),
            ],
            vec![
                block("tooltip_config", PlaceholderGroup::Tooltip),
                block("toolbox_config", PlaceholderGroup::Toolbox),
            ],
        ),
        TemplateCategory::Pie => (
            Vec::new(),
            vec![block("legend_config", PlaceholderGroup::Legend)],
            vec![block("tooltip_config", PlaceholderGroup::Tooltip)],
        ),
        TemplateCategory::Radar => (
            vec![TemplateSlot::new("radar_indicators", SlotKind::RadarIndicators)],
            vec![block("legend_config", PlaceholderGroup::Legend)],
            vec![block("tooltip_config", PlaceholderGroup::Tooltip)],
        ),
        TemplateCategory::Gauge => (
            vec![
                TemplateSlot::new("min_value", SlotKind::Bound),
                TemplateSlot::new("max_value", SlotKind::Bound),
            ],
            Vec::new(),
            vec![block("tooltip_config", PlaceholderGroup::Tooltip)],
        ),
    };

    UniversalTemplate {
        chart_type: chart_type.to_string(),
        category,
        version: version.to_string(),
        default_series_count: limits.default_series_count,
        max_series_count: limits.max_series_count,
        chart,
        coordinates,
        series,
        layout,
        interaction,
    }
}
