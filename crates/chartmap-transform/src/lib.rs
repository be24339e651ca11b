//! Tabular transform engine and the two-stage chart transformation.
//!
//! Stage 1 ([`to_universal`]) turns rows into categories, slotted series and
//! per-placeholder values. Stage 2 ([`apply_spec`]) writes those into the
//! rendered template skeleton.

pub mod engine;
pub mod error;
pub mod stage1;
pub mod stage2;

pub use engine::{
    GroupValue, PivotMatrix, PivotSeries, Query, TabularTransformEngine, TransformOutput,
    filter_matches,
};
pub use error::{Result, TransformError};
pub use stage1::{UniversalData, UniversalSeries, to_universal};
pub use stage2::{Bindings, apply_spec};
