//! Command implementations, independent of argument parsing and printing.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chartmap_catalog::{BuiltinTemplateStore, ChartConfig, PlaceholderCatalogGenerator, TemplateStore};
use chartmap_core::{ApiResponse, CsvDataSource, DryRunOrchestrator, DryRunReport};
use chartmap_map::MappingRegistry;
use chartmap_model::{ChartId, Mapping, PlaceholderCatalog, TemplateCategory};
use chartmap_validate::{MappingValidator, ValidationReport};
use tracing::info_span;

/// One row of the `chart-types` listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTypeInfo {
    pub chart_type: String,
    pub category: TemplateCategory,
    pub default_series_count: usize,
    pub max_series_count: usize,
}

/// Built-in limits, overridden by the TOML file when one is given.
pub fn load_config(path: Option<&Path>) -> Result<ChartConfig> {
    match path {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("load chart config {}", path.display())),
        None => Ok(ChartConfig::default()),
    }
}

pub fn load_mapping(path: &Path) -> Result<Mapping> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read mapping {}", path.display()))?;
    Mapping::from_json(&text).with_context(|| format!("parse mapping {}", path.display()))
}

pub fn chart_types(config: &ChartConfig) -> Result<Vec<ChartTypeInfo>> {
    let store = BuiltinTemplateStore::new(config.clone());
    store
        .chart_types()
        .into_iter()
        .map(|chart_type| -> Result<ChartTypeInfo> {
            let template = store
                .get_template(&chart_type)
                .with_context(|| format!("build template {chart_type}"))?;
            Ok(ChartTypeInfo {
                chart_type,
                category: template.category,
                default_series_count: template.default_series_count,
                max_series_count: template.max_series_count,
            })
        })
        .collect()
}

pub fn catalog(
    config: &ChartConfig,
    chart_id: &str,
    template_version: &str,
    spec_version: &str,
) -> Result<PlaceholderCatalog> {
    let chart_id = ChartId::new(chart_id).context("chart id")?;
    PlaceholderCatalogGenerator::new(BuiltinTemplateStore::new(config.clone()))
        .generate(&chart_id, template_version, spec_version)
        .with_context(|| format!("generate catalog for {chart_id}"))
}

/// Validates `mapping` against the catalog of its own chart and versions.
pub fn validate(config: &ChartConfig, mapping: &Mapping) -> Result<ValidationReport> {
    let span = info_span!("validate", chart_id = %mapping.chart_id);
    let _guard = span.enter();
    let catalog = catalog(
        config,
        mapping.chart_id.as_str(),
        &mapping.template_version,
        &mapping.spec_version,
    )?;
    Ok(MappingValidator::new().validate(&mapping.chart_id, mapping, &catalog))
}

/// Dry run against CSV tables in `data_dir`, wrapped in the response
/// envelope. Failures become error envelopes rather than `Err`.
pub fn dry_run(
    config: &ChartConfig,
    mapping: &Mapping,
    data_dir: &Path,
) -> ApiResponse<DryRunReport> {
    let orchestrator = DryRunOrchestrator::new(
        BuiltinTemplateStore::new(config.clone()),
        CsvDataSource::new(data_dir),
        Arc::new(MappingRegistry::default()),
    );
    let response = ApiResponse::from_result(orchestrator.dry_run(&mapping.chart_id, mapping));
    if !response.is_ok() {
        tracing::error!(code = %response.code, trace_id = %response.trace_id, "{}", response.message);
    }
    response
}
