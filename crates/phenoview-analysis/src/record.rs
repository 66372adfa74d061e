//! Measurement records as delivered by the fetch layer
//!
//! A [`MeasurementRecord`] is one observation of one specimen at one
//! experimental increment. Records are immutable once deserialised and are
//! identified by their measurement id.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "measurement_id": 1001,
//!   "specimen_id": 17,
//!   "metadata_group": 3,
//!   "increment": 12,
//!   "value": 23.4,
//!   "sex": 0,
//!   "zygosity": 1,
//!   "genotype_id": 88,
//!   "strain_id": 2
//! }
//! ```
//!
//! `increment` is either a number or an RFC 3339 timestamp; `value` is either
//! a number or a category label. `sex` and `zygosity` may be absent.
//!
//! Numeric analysis works on [`DataPoint`], the projection of a record onto
//! the plotted axes. The projection fails for categorical values.

use std::{borrow::Cow, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MeasurementId = u64;
pub type SpecimenId = u64;
pub type MetadataGroupId = i64;

/// Sex of a specimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Sex {
    Female,
    Male,
    /// Intersex, or a sex code this system does not know.
    Intersex,
}

impl From<u8> for Sex {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Female,
            1 => Self::Male,
            _ => Self::Intersex,
        }
    }
}

impl From<Sex> for u8 {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Female => 0,
            Sex::Male => 1,
            Sex::Intersex => 2,
        }
    }
}

/// Allele state of a mutant specimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Zygosity {
    Heterozygous,
    Homozygous,
    Hemizygous,
}

/// Returned when a zygosity code is outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown zygosity code {_0}")]
pub struct UnknownZygosityError(#[error(not(source))] pub u8);

impl TryFrom<u8> for Zygosity {
    type Error = UnknownZygosityError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Heterozygous),
            1 => Ok(Self::Homozygous),
            2 => Ok(Self::Hemizygous),
            _ => Err(UnknownZygosityError(code)),
        }
    }
}

impl From<Zygosity> for u8 {
    fn from(zygosity: Zygosity) -> Self {
        match zygosity {
            Zygosity::Heterozygous => 0,
            Zygosity::Homozygous => 1,
            Zygosity::Hemizygous => 2,
        }
    }
}

/// The independent (x-axis) value of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Increment {
    Number(f64),
    DateTime(DateTime<Utc>),
}

impl Increment {
    /// Numeric position on the x-axis; datetimes map to epoch milliseconds.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::DateTime(time) => time.timestamp_millis() as f64,
        }
    }
}

/// The dependent (y-axis) value of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(untagged)]
pub enum MeasuredValue {
    Number(f64),
    Category(String),
}

impl MeasuredValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Category(_) => None,
        }
    }

    /// Label of the value when it is treated as a category option.
    #[must_use]
    pub fn as_category(&self) -> Cow<'_, str> {
        match self {
            Self::Number(value) => Cow::Owned(value.to_string()),
            Self::Category(label) => Cow::Borrowed(label),
        }
    }
}

impl fmt::Display for MeasuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_category())
    }
}

/// One specimen-increment observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub measurement_id: MeasurementId,
    pub specimen_id: SpecimenId,
    pub metadata_group: MetadataGroupId,
    pub increment: Increment,
    pub value: MeasuredValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zygosity: Option<Zygosity>,
    pub genotype_id: u32,
    pub strain_id: u32,
}

impl MeasurementRecord {
    /// Whether the specimen belongs to the wildtype (baseline) population.
    #[must_use]
    pub fn is_wildtype(&self) -> bool {
        self.genotype_id == 0
    }
}

/// Returned when a record cannot take part in numeric analysis.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RecordError {
    #[display("measurement {measurement_id} has a categorical value")]
    NonNumericValue { measurement_id: MeasurementId },
}

/// The numeric projection of a [`MeasurementRecord`] onto the plot axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub measurement_id: MeasurementId,
    pub specimen_id: SpecimenId,
    pub metadata_group: MetadataGroupId,
    pub x: f64,
    pub y: f64,
}

impl TryFrom<&MeasurementRecord> for DataPoint {
    type Error = RecordError;

    fn try_from(record: &MeasurementRecord) -> Result<Self, Self::Error> {
        let y = record
            .value
            .as_number()
            .ok_or(RecordError::NonNumericValue {
                measurement_id: record.measurement_id,
            })?;
        Ok(Self {
            measurement_id: record.measurement_id,
            specimen_id: record.specimen_id,
            metadata_group: record.metadata_group,
            x: record.increment.as_f64(),
            y,
        })
    }
}

/// Projects every record onto the plot axes, failing on the first categorical value.
pub fn to_data_points<'a, I>(records: I) -> Result<Vec<DataPoint>, RecordError>
where
    I: IntoIterator<Item = &'a MeasurementRecord>,
{
    records.into_iter().map(DataPoint::try_from).collect()
}
