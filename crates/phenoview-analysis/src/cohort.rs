//! Cohort splitting by genotype, zygosity and sex
//!
//! Numeric charts compare the wildtype (baseline) population with the mutant
//! line under a zygosity filter, separately for each sex. This module builds
//! those populations and runs [`prepare_dataset`] on each of them.
//!
//! # Views
//!
//! Every data context yields four zygosity views:
//!
//! | view  | wildtype records | mutant records         |
//! |-------|------------------|------------------------|
//! | `all` | all              | all                    |
//! | `het` | all              | heterozygous only      |
//! | `hom` | all              | homozygous only        |
//! | `hem` | all              | hemizygous only        |
//!
//! Wildtype specimens carry no allele of the line, so they are compatible with
//! every zygosity filter; their statistics are computed once and shared by all
//! four views.
//!
//! When the visualised genotype is the wildtype line itself there is no
//! distinct mutant population: the mutant side of every view is the wildtype
//! statistics.
//!
//! Each population is then split into combined, male-only and female-only
//! datasets.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    batch::DatasetKey,
    grouping::{PlotDataset, prepare_dataset},
    record::{MeasurementRecord, RecordError, Sex, Zygosity, to_data_points},
};

/// Zygosity filter selecting the mutant population of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ZygosityFilter {
    All,
    Heterozygous,
    Homozygous,
    Hemizygous,
}

impl ZygosityFilter {
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::Heterozygous,
        Self::Homozygous,
        Self::Hemizygous,
    ];

    /// Whether a mutant of the given zygosity belongs to this view.
    #[must_use]
    pub fn admits(self, zygosity: Option<Zygosity>) -> bool {
        match self {
            Self::All => true,
            Self::Heterozygous => zygosity == Some(Zygosity::Heterozygous),
            Self::Homozygous => zygosity == Some(Zygosity::Homozygous),
            Self::Hemizygous => zygosity == Some(Zygosity::Hemizygous),
        }
    }

    /// Whether `record` belongs to this view. Wildtype records always do.
    #[must_use]
    pub fn admits_record(self, record: &MeasurementRecord) -> bool {
        record.is_wildtype() || self.admits(record.zygosity)
    }
}

/// Selects one sex-specific dataset from a [`SexSplit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexFilter {
    Combined,
    Male,
    Female,
}

/// Datasets of one population split by sex.
///
/// A side is `None` when the population has no records of that sex.
#[derive(Debug, Clone, Serialize)]
pub struct SexSplit<T> {
    pub combined: Option<T>,
    pub male: Option<T>,
    pub female: Option<T>,
}

impl<T> SexSplit<T> {
    #[must_use]
    pub fn get(&self, filter: SexFilter) -> Option<&T> {
        match filter {
            SexFilter::Combined => self.combined.as_ref(),
            SexFilter::Male => self.male.as_ref(),
            SexFilter::Female => self.female.as_ref(),
        }
    }
}

impl SexSplit<PlotDataset> {
    /// Prepares the combined, male and female datasets of a population.
    pub fn from_records(records: &[&MeasurementRecord]) -> Result<Self, RecordError> {
        let with_sex = |sex: Sex| {
            records
                .iter()
                .copied()
                .filter(move |record| record.sex == Some(sex))
        };
        Ok(Self {
            combined: prepare(records.iter().copied())?,
            male: prepare(with_sex(Sex::Male))?,
            female: prepare(with_sex(Sex::Female))?,
        })
    }
}

fn prepare<'a, I>(records: I) -> Result<Option<PlotDataset>, RecordError>
where
    I: IntoIterator<Item = &'a MeasurementRecord>,
{
    Ok(prepare_dataset(to_data_points(records)?))
}

/// Wildtype and mutant records of a data context.
#[derive(Debug, Clone)]
pub struct CohortSplit<'a> {
    pub wildtype: Arc<[&'a MeasurementRecord]>,
    pub mutant: Arc<[&'a MeasurementRecord]>,
}

impl<'a> CohortSplit<'a> {
    /// Splits `records` by genotype flag.
    ///
    /// If `key` visualises the wildtype line, `mutant` aliases `wildtype`.
    #[must_use]
    pub fn new(key: &DatasetKey, records: &'a [MeasurementRecord]) -> Self {
        let (wildtype, mutant): (Vec<_>, Vec<_>) =
            records.iter().partition(|record| record.is_wildtype());
        let wildtype: Arc<[_]> = wildtype.into();
        let mutant = if key.is_baseline() {
            Arc::clone(&wildtype)
        } else {
            mutant.into()
        };
        Self { wildtype, mutant }
    }

    /// Whether there is no distinct mutant population.
    #[must_use]
    pub fn is_baseline_only(&self) -> bool {
        Arc::ptr_eq(&self.wildtype, &self.mutant)
    }

    /// Mutant records admitted by `filter`.
    #[must_use]
    pub fn mutant_view(&self, filter: ZygosityFilter) -> Vec<&'a MeasurementRecord> {
        self.mutant
            .iter()
            .copied()
            .filter(|record| filter.admits_record(record))
            .collect()
    }
}

/// Wildtype and mutant statistics of one zygosity view.
///
/// Both sides are shared handles: views of the same data context share the
/// wildtype side, and in a baseline-only context the mutant side is the
/// wildtype side.
#[derive(Debug, Clone, Serialize)]
pub struct CohortStatistics {
    pub zygosity: ZygosityFilter,
    pub wildtype: Arc<SexSplit<PlotDataset>>,
    pub mutant: Arc<SexSplit<PlotDataset>>,
}

impl CohortStatistics {
    /// Whether the mutant side is the wildtype side.
    #[must_use]
    pub fn is_baseline_only(&self) -> bool {
        Arc::ptr_eq(&self.wildtype, &self.mutant)
    }
}

/// Computes the statistics of all four zygosity views of a data context.
///
/// # Errors
///
/// Returns [`RecordError::NonNumericValue`] if any record has a categorical
/// value.
pub fn compute_views(
    key: &DatasetKey,
    records: &[MeasurementRecord],
) -> Result<Vec<CohortStatistics>, RecordError> {
    let split = CohortSplit::new(key, records);
    let wildtype = Arc::new(SexSplit::from_records(&split.wildtype)?);

    ZygosityFilter::ALL
        .into_iter()
        .map(|zygosity| -> Result<CohortStatistics, RecordError> {
            let mutant = if split.is_baseline_only() {
                Arc::clone(&wildtype)
            } else {
                Arc::new(SexSplit::from_records(&split.mutant_view(zygosity))?)
            };
            Ok(CohortStatistics {
                zygosity,
                wildtype: Arc::clone(&wildtype),
                mutant,
            })
        })
        .collect()
}
