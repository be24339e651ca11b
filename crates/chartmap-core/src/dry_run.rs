//! Dry runs: validate a mapping, pull its rows and render the chart option
//! without persisting anything.

use std::collections::BTreeMap;
use std::sync::Arc;

use chartmap_catalog::{PlaceholderCatalogGenerator, TemplateStore};
use chartmap_map::{ChartRecord, InMemoryRepository, MappingRegistry, Repository};
use chartmap_model::placeholder::extract_tokens;
use chartmap_model::{ChartId, Mapping, TableRows, TemplateCategory, UniversalTemplate};
use chartmap_transform::{UniversalData, apply_spec, to_universal};
use chartmap_validate::{MappingValidator, ValidationReport};
use serde::Serialize;
use serde_json::Value;

use crate::datasource::DataSource;
use crate::error::{DryRunError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    #[serde(rename = "finalEChartsConfig")]
    pub final_echarts_config: Value,
    /// Resolved value per mapping placeholder.
    pub query_preview: BTreeMap<String, Value>,
    /// Tokens still present in the final option.
    pub remaining_placeholders: Vec<String>,
    pub validation: ValidationReport,
    pub warnings: Vec<String>,
}

pub struct DryRunOrchestrator<S, D, R = InMemoryRepository<ChartRecord>> {
    generator: PlaceholderCatalogGenerator<S>,
    source: D,
    registry: Arc<MappingRegistry<R>>,
    validator: MappingValidator,
}

impl<S, D, R> DryRunOrchestrator<S, D, R>
where
    S: TemplateStore,
    D: DataSource,
    R: Repository<ChartRecord>,
{
    pub fn new(store: S, source: D, registry: Arc<MappingRegistry<R>>) -> Self {
        Self {
            generator: PlaceholderCatalogGenerator::new(store),
            source,
            registry,
            validator: MappingValidator::new(),
        }
    }

    pub fn registry(&self) -> &MappingRegistry<R> {
        &self.registry
    }

    /// Runs `mapping` for `chart_id` end to end.
    ///
    /// Validation findings are reported, not raised; transform failures
    /// abort the run.
    pub fn dry_run(&self, chart_id: &ChartId, mapping: &Mapping) -> Result<DryRunReport> {
        let span = tracing::info_span!(
            "dry_run",
            chart_id = %chart_id,
            mapping_version = mapping.version_label()
        );
        let _enter = span.enter();

        let catalog =
            self.generator
                .generate(chart_id, &mapping.template_version, &mapping.spec_version)?;
        let template = self.generator.store().get_template(chart_id.as_str())?;
        let validation = self.validator.validate(chart_id, mapping, &catalog);

        let tables = self.fetch_tables(mapping)?;
        let universal = to_universal(&tables, mapping)?;
        let option = apply_spec(&universal, &template, &catalog)?;
        let remaining_placeholders = extract_tokens(&option);

        let mut warnings = Vec::new();
        if mapping.chart_id != *chart_id {
            warnings.push(format!(
                "mapping belongs to chart {} but was run for {chart_id}",
                mapping.chart_id
            ));
        }
        if !validation.passed {
            warnings.push(format!(
                "validation failed: {} missing, {} type errors",
                validation.missing.len(),
                validation.type_errors.len()
            ));
        }
        warnings.extend(shape_warnings(&universal, &template));
        warnings.extend(self.version_warnings(chart_id, mapping)?);

        tracing::info!(
            remaining = remaining_placeholders.len(),
            warnings = warnings.len(),
            passed = validation.passed,
            "dry run complete"
        );
        Ok(DryRunReport {
            final_echarts_config: option,
            query_preview: universal.values,
            remaining_placeholders,
            validation,
            warnings,
        })
    }

    /// Dry run of the chart's active mapping.
    pub fn dry_run_active(&self, chart_id: &ChartId) -> Result<DryRunReport> {
        let mapping = self
            .registry
            .get_active(chart_id)?
            .ok_or_else(|| DryRunError::NoActiveMapping {
                chart_id: chart_id.clone(),
            })?;
        self.dry_run(chart_id, &mapping)
    }

    /// One query per source table, selecting every column any item needs.
    fn fetch_tables(&self, mapping: &Mapping) -> Result<TableRows> {
        let mut columns: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for item in &mapping.items {
            let wanted = columns.entry(item.source.table.as_str()).or_default();
            for column in item.required_columns() {
                if !wanted.contains(&column) {
                    wanted.push(column);
                }
            }
        }

        let mut tables = TableRows::new();
        for (table, columns) in columns {
            let rows = self.source.query(table, &columns, &[])?;
            tracing::debug!(table, rows = rows.len(), "fetched rows");
            tables.insert(table.to_string(), rows);
        }
        Ok(tables)
    }

    fn version_warnings(&self, chart_id: &ChartId, mapping: &Mapping) -> Result<Vec<String>> {
        let Some(entry) = self.registry.charts().get(chart_id)? else {
            return Ok(Vec::new());
        };
        let mut warnings = Vec::new();
        if entry.active_template_version != mapping.template_version {
            warnings.push(format!(
                "template version {} differs from active {}",
                mapping.template_version, entry.active_template_version
            ));
        }
        if entry.active_spec_version != mapping.spec_version {
            warnings.push(format!(
                "spec version {} differs from active {}",
                mapping.spec_version, entry.active_spec_version
            ));
        }
        Ok(warnings)
    }
}

/// Series that do not line up with the category axis or have no slot.
fn shape_warnings(universal: &UniversalData, template: &UniversalTemplate) -> Vec<String> {
    let aligned = matches!(
        template.category,
        TemplateCategory::Cartesian | TemplateCategory::Radar
    );
    let axis = universal.categories.len();
    let mut warnings = Vec::new();
    for series in &universal.series {
        if series.slot > template.max_series_count {
            warnings.push(format!(
                "series {:?} from {} needs slot {} but the template has {}",
                series.name, series.source, series.slot, template.max_series_count
            ));
        } else if aligned && series.data.len() != axis {
            warnings.push(format!(
                "series {:?} has {} values for {axis} categories",
                series.name,
                series.data.len()
            ));
        }
    }
    warnings
}
