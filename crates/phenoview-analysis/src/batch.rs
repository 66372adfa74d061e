//! Measurement batches as delivered by the fetch layer
//!
//! The fetch layer returns one batch of measurements per
//! (genotype, strain, centre, parameter) request. The batch also carries the
//! quality-control state of the data context and the distinct metadata groups
//! referenced by its measurements.
//!
//! # Data Structure
//!
//! ```text
//! MeasurementBatch
//! ├─ key (genotype_id, strain_id, centre_id, parameter_key)
//! ├─ qc_status
//! ├─ metadata_groups: Vec<MetadataGroup>
//! └─ measurements: Vec<MeasurementRecord>
//! ```
//!
//! # Serialization
//!
//! ```json
//! {
//!   "key": {
//!     "genotype_id": 88,
//!     "strain_id": 2,
//!     "centre_id": 4,
//!     "parameter_key": "IMPC_BWT_001_001"
//!   },
//!   "qc_status": 0,
//!   "metadata_groups": [{ "id": 3, "values": "Equipment = scale A" }],
//!   "measurements": [...]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::{MeasurementRecord, MetadataGroupId};

/// Identifies one data context: a genotype measured for a parameter at a centre.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub genotype_id: u32,
    pub strain_id: u32,
    pub centre_id: u32,
    pub parameter_key: String,
}

impl DatasetKey {
    /// Whether the visualised genotype is the wildtype (baseline) line itself.
    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.genotype_id == 0
    }
}

/// Quality-control state of a data context.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(from = "u8", into = "u8")]
pub enum QcStatus {
    #[default]
    Done,
    Pending,
    Issues,
}

impl From<u8> for QcStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Done,
            2 => Self::Issues,
            _ => Self::Pending,
        }
    }
}

impl From<QcStatus> for u8 {
    fn from(status: QcStatus) -> Self {
        match status {
            QcStatus::Done => 0,
            QcStatus::Pending => 1,
            QcStatus::Issues => 2,
        }
    }
}

/// Experimental conditions shared by a group of measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataGroup {
    pub id: MetadataGroupId,
    /// Human readable description of the shared conditions.
    pub values: String,
}

/// One batch of measurements for a data context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementBatch {
    pub key: DatasetKey,
    #[serde(default)]
    pub qc_status: QcStatus,
    #[serde(default)]
    pub metadata_groups: Vec<MetadataGroup>,
    pub measurements: Vec<MeasurementRecord>,
}

impl MeasurementBatch {
    /// Appends baseline measurements to a mutant batch.
    ///
    /// Only wildtype records are taken from `baseline`. When the batch itself
    /// visualises the wildtype line its measurements already are the
    /// baseline, so nothing is appended.
    ///
    /// # Returns
    ///
    /// The number of records appended.
    pub fn merge_baseline<I>(&mut self, baseline: I) -> usize
    where
        I: IntoIterator<Item = MeasurementRecord>,
    {
        if self.key.is_baseline() {
            return 0;
        }
        let before = self.measurements.len();
        self.measurements
            .extend(baseline.into_iter().filter(MeasurementRecord::is_wildtype));
        self.measurements.len() - before
    }

    /// Distinct metadata groups referenced by the measurements.
    #[must_use]
    pub fn referenced_metadata_groups(&self) -> BTreeSet<MetadataGroupId> {
        self.measurements
            .iter()
            .map(|record| record.metadata_group)
            .collect()
    }

    /// Looks up the description of a metadata group.
    #[must_use]
    pub fn metadata_group(&self, id: MetadataGroupId) -> Option<&MetadataGroup> {
        self.metadata_groups.iter().find(|group| group.id == id)
    }
}
