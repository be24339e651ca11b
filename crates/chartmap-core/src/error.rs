use std::path::PathBuf;

use chartmap_catalog::CatalogError;
use chartmap_map::{RegistryError, RepositoryError};
use chartmap_model::{ChartId, ModelError};
use chartmap_transform::TransformError;
use thiserror::Error;

use crate::response::ApiCode;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("query against table {table} failed: {message}")]
    Query { table: String, message: String },
}

impl DataSourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Everything that can abort a dry run.
#[derive(Debug, Error)]
pub enum DryRunError {
    #[error("chart {chart_id} has no active mapping")]
    NoActiveMapping { chart_id: ChartId },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl DryRunError {
    /// Envelope code reported for this error.
    pub fn code(&self) -> ApiCode {
        match self {
            Self::NoActiveMapping { .. } => ApiCode::NotFound,
            Self::Catalog(err) => match err {
                CatalogError::TemplateNotFound { .. }
                | CatalogError::Model(ModelError::UnknownChartType(_)) => ApiCode::NotFound,
                CatalogError::VersionMismatch { .. } => ApiCode::VersionMismatch,
                _ => ApiCode::InternalError,
            },
            Self::Transform(_) | Self::Model(_) => ApiCode::ValidationError,
            Self::Registry(err) => match err {
                RegistryError::ChartNotFound { .. } | RegistryError::VersionNotFound { .. } => {
                    ApiCode::NotFound
                }
                RegistryError::Repository(RepositoryError::Storage { .. }) => {
                    ApiCode::InternalError
                }
            },
            Self::DataSource(_) => ApiCode::InternalError,
        }
    }
}

pub type Result<T> = std::result::Result<T, DryRunError>;
