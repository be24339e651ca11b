#![deny(unsafe_code)]

use std::path::PathBuf;

use chartmap_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid chart config: {message}")]
    InvalidConfig { message: String },

    #[error("no template for chart type {chart_type:?}")]
    TemplateNotFound { chart_type: String },

    #[error("template version mismatch for {chart_type}: requested {requested}, available {available}")]
    VersionMismatch {
        chart_type: String,
        requested: String,
        available: String,
    },

    #[error("placeholder {variable} is declared by the template but absent from its skeleton")]
    UnplacedSlot { variable: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
