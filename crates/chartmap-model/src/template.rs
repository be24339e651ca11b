//! Universal chart templates.
//!
//! A template lists the placeholder slots a chart type exposes, grouped the
//! way a chart is assembled: chart metadata, coordinates, series slots,
//! layout blocks and interaction blocks. The rendered JSON skeleton lives in
//! the catalog crate; this type only carries the slot declarations.

use serde::{Deserialize, Serialize};

use crate::enums::{PlaceholderGroup, TemplateCategory};
use crate::placeholder;

/// What a placeholder slot holds in the rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "slot", rename_all = "camelCase")]
pub enum SlotKind {
    Title,
    /// Filled from the template's own chart type.
    ChartType,
    Theme,
    /// Category axis values.
    Categories,
    AxisName,
    RadarIndicators,
    /// Gauge lower or upper bound.
    Bound,
    SeriesName(usize),
    SeriesData(usize),
    /// An opaque configuration block (legend, grid, tooltip, toolbox).
    Block(PlaceholderGroup),
}

impl SlotKind {
    pub fn series_slot(&self) -> Option<usize> {
        match self {
            SlotKind::SeriesName(n) | SlotKind::SeriesData(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub variable: String,
    pub kind: SlotKind,
}

impl TemplateSlot {
    pub fn new(variable: impl Into<String>, kind: SlotKind) -> Self {
        Self {
            variable: variable.into(),
            kind,
        }
    }

    pub fn token(&self) -> String {
        placeholder::token(&self.variable)
    }
}

/// Template for one chart type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalTemplate {
    pub chart_type: String,
    pub category: TemplateCategory,
    pub version: String,
    pub default_series_count: usize,
    pub max_series_count: usize,
    pub chart: Vec<TemplateSlot>,
    pub coordinates: Vec<TemplateSlot>,
    pub series: Vec<TemplateSlot>,
    pub layout: Vec<TemplateSlot>,
    pub interaction: Vec<TemplateSlot>,
}

impl UniversalTemplate {
    /// Every declared slot in catalog order.
    pub fn declared_slots(&self) -> impl Iterator<Item = &TemplateSlot> {
        self.chart
            .iter()
            .chain(&self.coordinates)
            .chain(&self.series)
            .chain(&self.layout)
            .chain(&self.interaction)
    }

    pub fn slot(&self, variable: &str) -> Option<&TemplateSlot> {
        self.declared_slots().find(|slot| slot.variable == variable)
    }

    /// Series slots beyond the default count are optional.
    pub fn is_optional_series_slot(&self, kind: SlotKind) -> bool {
        kind.series_slot()
            .is_some_and(|n| n > self.default_series_count)
    }
}
