//! Series limits per template category.
//!
//! ```toml
//! [series.CARTESIAN]
//! default_series_count = 4
//! max_series_count = 8
//! ```
//!
//! Categories left out of the file keep their built-in limits.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chartmap_model::TemplateCategory;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesLimits {
    #[serde(alias = "defaultSeriesCount")]
    pub default_series_count: usize,
    #[serde(alias = "maxSeriesCount")]
    pub max_series_count: usize,
}

impl SeriesLimits {
    pub const fn new(default_series_count: usize, max_series_count: usize) -> Self {
        Self {
            default_series_count,
            max_series_count,
        }
    }

    pub const fn builtin(category: TemplateCategory) -> Self {
        match category {
            TemplateCategory::Cartesian => Self::new(5, 10),
            TemplateCategory::Pie => Self::new(1, 1),
            TemplateCategory::Radar => Self::new(3, 5),
            TemplateCategory::Gauge => Self::new(1, 1),
        }
    }
}

/// Chart generation settings, populated once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    series: BTreeMap<TemplateCategory, SeriesLimits>,
}

impl ChartConfig {
    pub fn limits(&self, category: TemplateCategory) -> SeriesLimits {
        self.series
            .get(&category)
            .copied()
            .unwrap_or_else(|| SeriesLimits::builtin(category))
    }

    pub fn with_limits(mut self, category: TemplateCategory, limits: SeriesLimits) -> Result<Self> {
        check(category, limits)?;
        self.series.insert(category, limits);
        Ok(self)
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let config = Self::from_toml_str(&text).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded chart config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (category, limits) in &self.series {
            check(*category, *limits)?;
        }
        Ok(())
    }
}

fn check(category: TemplateCategory, limits: SeriesLimits) -> Result<()> {
    if limits.default_series_count == 0 || limits.default_series_count > limits.max_series_count {
        return Err(CatalogError::InvalidConfig {
            message: format!(
                "{category}: expected 1 <= default_series_count ({}) <= max_series_count ({})",
                limits.default_series_count, limits.max_series_count
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_category() {
        let config = ChartConfig::default();
        assert_eq!(
            config.limits(TemplateCategory::Cartesian),
            SeriesLimits::new(5, 10)
        );
        assert_eq!(config.limits(TemplateCategory::Radar), SeriesLimits::new(3, 5));
        assert_eq!(config.limits(TemplateCategory::Gauge), SeriesLimits::new(1, 1));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = ChartConfig::from_toml_str(
            "[series.PIE]\ndefault_series_count = 1\nmax_series_count = 2\n",
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.limits(TemplateCategory::Pie), SeriesLimits::new(1, 2));
        assert_eq!(
            config.limits(TemplateCategory::Cartesian),
            SeriesLimits::new(5, 10)
        );
    }

    #[test]
    fn rejects_default_above_max() {
        let config = ChartConfig::from_toml_str(
            "[series.RADAR]\ndefaultSeriesCount = 6\nmaxSeriesCount = 5\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(CatalogError::InvalidConfig { .. })
        ));
        assert!(
            ChartConfig::default()
                .with_limits(TemplateCategory::Gauge, SeriesLimits::new(0, 1))
                .is_err()
        );
    }
}
