#![deny(unsafe_code)]

//! Mapping storage, versioning and activation.
//!
//! - [`repository`]: generic keyed storage with per-key copy-on-write
//! - [`registry`]: draft versioning and atomic activation per chart

pub mod error;
mod locks;
pub mod registry;
pub mod repository;

pub use error::{RegistryError, RepositoryError, Result};
pub use registry::{ChartRecord, ChartRegistry, MappingRegistry};
pub use repository::{Entity, InMemoryRepository, Repository};
