use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid chart id: {0:?}")]
    InvalidChartId(String),
    #[error("invalid placeholder token: {0:?}")]
    InvalidPlaceholder(String),
    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },
    #[error("unsupported chart type: {0}")]
    UnknownChartType(String),
    #[error("invalid json path {path:?}: {message}")]
    InvalidPath { path: String, message: String },
    #[error("malformed mapping: {0}")]
    MalformedMapping(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
