//! Mapping validation against a placeholder catalog.
//!
//! - **missing**: a required catalog placeholder has no mapping item → fails
//! - **typeErrors**: an item's `dataType` differs from the catalog type → fails
//! - **unknown**: an item names a placeholder the catalog does not have →
//!   reported with the closest catalog name, never fails
//!
//! Validation is pure: it reads the mapping and the catalog only.

use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use chartmap_model::{ChartId, DataType, Mapping, PlaceholderCatalog};

/// Minimum Jaro-Winkler similarity for a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMismatch {
    pub placeholder: String,
    pub expected: DataType,
    pub actual: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownPlaceholder {
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub passed: bool,
    pub missing: Vec<String>,
    pub type_errors: Vec<TypeMismatch>,
    pub unknown: Vec<UnknownPlaceholder>,
}

impl ValidationReport {
    pub fn issue_count(&self) -> usize {
        self.missing.len() + self.type_errors.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MappingValidator;

impl MappingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        chart_id: &ChartId,
        mapping: &Mapping,
        catalog: &PlaceholderCatalog,
    ) -> ValidationReport {
        if mapping.chart_id != *chart_id {
            tracing::warn!(
                chart_id = %chart_id,
                mapping_chart_id = %mapping.chart_id,
                "mapping belongs to a different chart"
            );
        }

        let missing: Vec<String> = catalog
            .required_placeholders()
            .filter(|item| mapping.item(&item.name).is_none())
            .map(|item| item.name.clone())
            .collect();

        let mut type_errors = Vec::new();
        let mut unknown = Vec::new();
        for item in &mapping.items {
            match catalog.get(&item.placeholder) {
                Some(entry) if entry.data_type != item.data_type => type_errors.push(TypeMismatch {
                    placeholder: item.placeholder.clone(),
                    expected: entry.data_type,
                    actual: item.data_type,
                }),
                Some(_) => {}
                None => unknown.push(UnknownPlaceholder {
                    placeholder: item.placeholder.clone(),
                    suggestion: closest(&item.placeholder, catalog),
                }),
            }
        }

        let report = ValidationReport {
            passed: missing.is_empty() && type_errors.is_empty(),
            missing,
            type_errors,
            unknown,
        };
        if !report.passed || !report.unknown.is_empty() {
            tracing::warn!(
                chart_id = %chart_id,
                mapping_version = mapping.version_label(),
                missing = report.missing.len(),
                type_errors = report.type_errors.len(),
                unknown = report.unknown.len(),
                "mapping validation findings"
            );
        }
        report
    }
}

/// Closest catalog name above the similarity threshold.
fn closest(placeholder: &str, catalog: &PlaceholderCatalog) -> Option<String> {
    let needle = placeholder.to_lowercase();
    catalog
        .names()
        .map(|name| {
            let score = jaro_winkler::similarity(needle.chars(), name.to_lowercase().chars());
            (name, score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name.to_string())
}
