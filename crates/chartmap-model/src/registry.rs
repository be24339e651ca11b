use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ChartId;

/// Live version tuple for one chart. Only activation writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRegistryEntry {
    pub chart_id: ChartId,
    pub active_template_version: String,
    pub active_spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_catalog_version: Option<String>,
    pub active_mapping_version: String,
    pub activated_at: DateTime<Utc>,
}
