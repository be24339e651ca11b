#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod hash;
pub mod skeleton;
pub mod templates;

pub use crate::config::{ChartConfig, SeriesLimits};
pub use crate::error::{CatalogError, Result};
pub use crate::generator::PlaceholderCatalogGenerator;
pub use crate::skeleton::{render_skeleton, series_kind};
pub use crate::templates::{BuiltinTemplateStore, DEFAULT_TEMPLATE_VERSION, TemplateStore, build_template};
