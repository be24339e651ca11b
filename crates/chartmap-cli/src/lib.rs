//! CLI library components for chartmap.

pub mod commands;
pub mod logging;
