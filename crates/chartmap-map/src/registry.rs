//! Mapping versions and the live chart registry.
//!
//! Each chart id owns one immutable [`ChartRecord`]: every saved mapping
//! version with its status, plus the chart-registry entry. Writers build a
//! new record and swap it in whole, so readers never observe a record where
//! the registry and the `active` statuses disagree.
//!
//! Writes are serialized per chart id. Different charts never wait on each
//! other.

use std::sync::Arc;

use chartmap_model::{ChartId, ChartRegistryEntry, Mapping, MappingStatus};
use chrono::Utc;

use crate::error::{RegistryError, Result};
use crate::locks::KeyedLocks;
use crate::repository::{Entity, InMemoryRepository, Repository};

/// All mapping versions of one chart and its live entry.
#[derive(Debug, Clone)]
pub struct ChartRecord {
    pub chart_id: ChartId,
    /// Number the next draft receives.
    pub next_version: u64,
    /// Versions in creation order.
    pub versions: Vec<Arc<Mapping>>,
    pub registry: Option<ChartRegistryEntry>,
}

impl ChartRecord {
    fn empty(chart_id: ChartId) -> Self {
        Self {
            chart_id,
            next_version: 1,
            versions: Vec::new(),
            registry: None,
        }
    }

    pub fn version(&self, version: &str) -> Option<&Arc<Mapping>> {
        self.versions
            .iter()
            .find(|m| m.mapping_version.as_deref() == Some(version))
    }

    pub fn active(&self) -> Option<&Arc<Mapping>> {
        self.versions
            .iter()
            .find(|m| m.status == MappingStatus::Active)
    }
}

impl Entity for ChartRecord {
    type Id = ChartId;

    fn id(&self) -> ChartId {
        self.chart_id.clone()
    }
}

/// Stores mapping drafts and activates versions.
pub struct MappingRegistry<R = InMemoryRepository<ChartRecord>> {
    records: R,
    writers: KeyedLocks<ChartId>,
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new(InMemoryRepository::new())
    }
}

impl<R: Repository<ChartRecord>> MappingRegistry<R> {
    pub fn new(records: R) -> Self {
        Self {
            records,
            writers: KeyedLocks::new(),
        }
    }

    /// Saves `mapping` as the next draft version of its chart.
    ///
    /// Returns the stored mapping with `mappingVersion`, `status`,
    /// `updatedBy` and `updatedAt` assigned. The chart registry is not
    /// touched.
    pub fn save_draft(&self, author: &str, mut mapping: Mapping) -> Result<Arc<Mapping>> {
        let chart_id = mapping.chart_id.clone();
        self.writers.with_lock(&chart_id, || -> Result<Arc<Mapping>> {
            let mut record = self
                .records
                .find_by_id(&chart_id)?
                .map_or_else(|| ChartRecord::empty(chart_id.clone()), |r| (*r).clone());

            let version = format!("v{}", record.next_version);
            mapping.mapping_version = Some(version.clone());
            mapping.status = MappingStatus::Draft;
            mapping.updated_by = Some(author.to_string());
            mapping.updated_at = Some(Utc::now());

            let stored = Arc::new(mapping);
            record.next_version += 1;
            record.versions.push(Arc::clone(&stored));
            self.records.save(record)?;

            tracing::info!(chart_id = %chart_id, version = %version, author, "saved mapping draft");
            Ok(stored)
        })
    }

    /// Makes `version` the live mapping of `chart_id`.
    ///
    /// The previously active version becomes deprecated and the chart
    /// registry entry is replaced, all in one record swap. On error nothing
    /// changes.
    pub fn activate(&self, chart_id: &ChartId, version: &str) -> Result<ChartRegistryEntry> {
        let span = tracing::info_span!("activate", chart_id = %chart_id, version);
        let _enter = span.enter();

        self.writers.with_lock(chart_id, || -> Result<ChartRegistryEntry> {
            let current = self
                .records
                .find_by_id(chart_id)?
                .ok_or_else(|| RegistryError::ChartNotFound {
                    chart_id: chart_id.clone(),
                })?;
            let target = current
                .version(version)
                .ok_or_else(|| RegistryError::VersionNotFound {
                    chart_id: chart_id.clone(),
                    version: version.to_string(),
                })?;

            let now = Utc::now();
            let entry = ChartRegistryEntry {
                chart_id: chart_id.clone(),
                active_template_version: target.template_version.clone(),
                active_spec_version: target.spec_version.clone(),
                active_catalog_version: None,
                active_mapping_version: version.to_string(),
                activated_at: now,
            };

            let previous = current
                .active()
                .and_then(|m| m.mapping_version.clone())
                .filter(|v| v != version);
            let versions = current
                .versions
                .iter()
                .map(|mapping| {
                    let is_target = mapping.mapping_version.as_deref() == Some(version);
                    match (is_target, mapping.status) {
                        (true, _) => with_status(mapping, MappingStatus::Active),
                        (false, MappingStatus::Active) => {
                            with_status(mapping, MappingStatus::Deprecated)
                        }
                        (false, _) => Arc::clone(mapping),
                    }
                })
                .collect();

            self.records.save(ChartRecord {
                chart_id: chart_id.clone(),
                next_version: current.next_version,
                versions,
                registry: Some(entry.clone()),
            })?;

            tracing::info!(deprecated = previous.as_deref(), "activated mapping");
            Ok(entry)
        })
    }

    /// Removes every version and the registry entry of `chart_id`.
    ///
    /// Returns `false` when the chart had no record. The chart's writer
    /// mutex is released once no other writer is waiting on it.
    pub fn delete(&self, chart_id: &ChartId) -> Result<bool> {
        let removed = self
            .writers
            .with_lock(chart_id, || self.records.delete_by_id(chart_id))?;
        self.writers.prune(chart_id);
        if removed {
            tracing::info!(chart_id = %chart_id, "deleted chart mappings");
        }
        Ok(removed)
    }

    /// Versions in creation order; empty for an unknown chart.
    pub fn list_versions(&self, chart_id: &ChartId) -> Result<Vec<Arc<Mapping>>> {
        Ok(self
            .records
            .find_by_id(chart_id)?
            .map(|record| record.versions.clone())
            .unwrap_or_default())
    }

    pub fn get_by_version(&self, chart_id: &ChartId, version: &str) -> Result<Arc<Mapping>> {
        self.records
            .find_by_id(chart_id)?
            .and_then(|record| record.version(version).cloned())
            .ok_or_else(|| RegistryError::VersionNotFound {
                chart_id: chart_id.clone(),
                version: version.to_string(),
            })
    }

    pub fn get_active(&self, chart_id: &ChartId) -> Result<Option<Arc<Mapping>>> {
        Ok(self
            .records
            .find_by_id(chart_id)?
            .and_then(|record| record.active().cloned()))
    }

    /// The whole record of one chart as a single consistent snapshot.
    pub fn snapshot(&self, chart_id: &ChartId) -> Result<Option<Arc<ChartRecord>>> {
        Ok(self.records.find_by_id(chart_id)?)
    }

    /// Read view over the live entries.
    pub fn charts(&self) -> ChartRegistry<'_, R> {
        ChartRegistry { records: &self.records }
    }
}

fn with_status(mapping: &Mapping, status: MappingStatus) -> Arc<Mapping> {
    let mut updated = mapping.clone();
    updated.status = status;
    Arc::new(updated)
}

/// Active `(template, spec, mapping)` versions per chart.
pub struct ChartRegistry<'a, R> {
    records: &'a R,
}

impl<R: Repository<ChartRecord>> ChartRegistry<'_, R> {
    pub fn get(&self, chart_id: &ChartId) -> Result<Option<ChartRegistryEntry>> {
        Ok(self
            .records
            .find_by_id(chart_id)?
            .and_then(|record| record.registry.clone()))
    }

    /// Entries of every activated chart, ordered by chart id.
    pub fn list(&self) -> Result<Vec<ChartRegistryEntry>> {
        Ok(self
            .records
            .find_all()?
            .iter()
            .filter_map(|record| record.registry.clone())
            .collect())
    }
}
