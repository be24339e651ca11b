#![deny(unsafe_code)]

//! Chart mapping services: data sources, dry runs and the response envelope.

pub mod datasource;
pub mod dry_run;
pub mod error;
pub mod response;

pub use datasource::{CsvDataSource, DataSource, InMemoryDataSource, read_csv_rows};
pub use dry_run::{DryRunOrchestrator, DryRunReport};
pub use error::{DataSourceError, DryRunError, Result};
pub use response::{ApiCode, ApiResponse};
