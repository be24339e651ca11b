#![deny(unsafe_code)]

//! Data model shared by the chartmap crates: ids, enums, rows, mappings,
//! catalogs, registry entries and universal templates.

pub mod catalog;
pub mod enums;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod path;
pub mod placeholder;
pub mod registry;
pub mod table;
pub mod template;

pub use catalog::{CatalogItem, PlaceholderCatalog};
pub use enums::{
    Aggregation, DataType, FilterOp, MappingStatus, NullHandling, PlaceholderGroup,
    SortDirection, TemplateCategory,
};
pub use error::{ModelError, Result};
pub use ids::ChartId;
pub use mapping::{Filter, Mapping, MappingItem, Order, Pivot, Source, Transform};
pub use path::JsonPath;
pub use registry::ChartRegistryEntry;
pub use table::{CellValue, Row, TableRows, number_value};
pub use template::{SlotKind, TemplateSlot, UniversalTemplate};
