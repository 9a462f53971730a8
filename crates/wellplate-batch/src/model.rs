use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wellplate_core::{Occupant, PlateKind, Sample, WellId};

/// Batch kind as persisted. Electrophoresis batches are produced further
/// down the workflow and are only read here, as rerun sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    Pcr,
    Rerun,
    Electrophoresis,
}

impl From<PlateKind> for BatchKind {
    fn from(value: PlateKind) -> Self {
        match value {
            PlateKind::Pcr => BatchKind::Pcr,
            PlateKind::Rerun => BatchKind::Rerun,
        }
    }
}

/// One finalized well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellEntry {
    pub occupant: Occupant,
    pub label: String,
    /// "<batch number> <well type>", e.g. "LDS_7 Negative Control".
    pub comment: String,
}

/// A finalized, persisted plate layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Store-assigned id; empty until persisted.
    #[serde(default)]
    pub id: String,
    pub batch_number: String,
    pub kind: BatchKind,
    pub operator: String,
    pub date: NaiveDate,
    pub wells: IndexMap<WellId, WellEntry>,
    pub sample_count: usize,
    /// Batch the samples were loaded from, for reruns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_batch: Option<String>,
}

impl Batch {
    /// Occupants in row-major well order.
    pub fn occupants(&self) -> impl Iterator<Item = (WellId, &Occupant)> {
        let mut ids: Vec<WellId> = self.wells.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .filter_map(move |id| self.wells.get(&id).map(|e| (id, &e.occupant)))
    }

    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.occupants().filter_map(|(_, occ)| occ.as_sample())
    }

    #[must_use]
    pub fn well_count(&self) -> usize {
        self.wells.len()
    }
}

/// What the store hands back after persisting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBatch {
    pub batch_id: String,
    pub batch_number: String,
}

/// A completed upstream batch an operator may pick as a rerun source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBatch {
    pub id: String,
    pub batch_number: String,
    pub date: NaiveDate,
    pub sample_count: usize,
}

impl From<&Batch> for SourceBatch {
    fn from(value: &Batch) -> Self {
        Self {
            id: value.id.clone(),
            batch_number: value.batch_number.clone(),
            date: value.date,
            sample_count: value.sample_count,
        }
    }
}
