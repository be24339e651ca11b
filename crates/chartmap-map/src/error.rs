use chartmap_model::ChartId;
use thiserror::Error;

/// Storage backend failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage failure for {entity}: {message}")]
    Storage { entity: String, message: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("chart not found: {chart_id}")]
    ChartNotFound { chart_id: ChartId },
    #[error("mapping version {version} not found for chart {chart_id}")]
    VersionNotFound { chart_id: ChartId, version: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
