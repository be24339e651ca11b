use chartmap_model::{Aggregation, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// The transform or pivot declaration cannot be executed as written.
    #[error("invalid transform for {item}: {message}")]
    Config { item: String, message: String },

    #[error("{aggregation} aggregation failed for {item}: {message}")]
    Aggregation {
        item: String,
        aggregation: Aggregation,
        message: String,
    },

    /// A scalar placeholder resolved to more than one group.
    #[error("{item} expects a single value but the transform produced {groups} groups")]
    Shape { item: String, groups: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl TransformError {
    pub(crate) fn config(item: &str, message: impl Into<String>) -> Self {
        Self::Config {
            item: item.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
