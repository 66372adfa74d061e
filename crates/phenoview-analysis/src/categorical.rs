//! Frequency analysis of categorical parameters
//!
//! Categorical parameters (for example "Normal" / "Abnormal" observations)
//! are summarised as option frequencies in a grid of sex rows and zygosity
//! columns, separately for the wildtype and mutant populations:
//!
//! ```text
//!                 het    hom    hem    all
//! female          .      .      .      .
//! male            .      .      .      .
//! intersex        .      .      .      .
//! no sex data     .      .      .      .
//! all             .      .      .      .
//! ```
//!
//! Every record is counted in its own (sex, zygosity) cell and in the three
//! marginal cells of the "all" row and column. Wildtype records without a
//! zygosity are compatible with every zygosity, so they are counted in each
//! of the het, hom and hem columns and once in the "all" column.
//!
//! # Examples
//!
//! ```
//! use phenoview_analysis::{
//!     categorical::{SexRow, ZygosityColumn, analyze_categorical},
//!     color::CategoryColorRegistry,
//! };
//! # use phenoview_analysis::record::MeasurementRecord;
//! # let records: Vec<MeasurementRecord> = vec![];
//!
//! let registry = CategoryColorRegistry::new();
//! let analysis = analyze_categorical(&records, &registry);
//! let cell = analysis.grid.cell(SexRow::All, ZygosityColumn::All);
//! assert_eq!(cell.mutant.total, 0);
//! assert_eq!(analysis.options[0].label, "Highlighted specimen");
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
    color::CategoryColorRegistry,
    record::{MeasurementRecord, Sex, Zygosity},
};

/// Label of the synthetic option used to colour a highlighted specimen.
pub const HIGHLIGHTED_SPECIMEN: &str = "Highlighted specimen";

/// Sex row of the frequency grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SexRow {
    Female,
    Male,
    Intersex,
    NoData,
    All,
}

impl SexRow {
    pub const ALL: [Self; 5] = [
        Self::Female,
        Self::Male,
        Self::Intersex,
        Self::NoData,
        Self::All,
    ];

    #[must_use]
    pub fn of(sex: Option<Sex>) -> Self {
        match sex {
            Some(Sex::Female) => Self::Female,
            Some(Sex::Male) => Self::Male,
            Some(Sex::Intersex) => Self::Intersex,
            None => Self::NoData,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Intersex => "Intersex",
            Self::NoData => "No data",
            Self::All => "All",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Zygosity column of the frequency grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ZygosityColumn {
    Heterozygous,
    Homozygous,
    Hemizygous,
    All,
}

impl ZygosityColumn {
    pub const ALL: [Self; 4] = [
        Self::Heterozygous,
        Self::Homozygous,
        Self::Hemizygous,
        Self::All,
    ];

    const SPECIFIC: [Self; 3] = [Self::Heterozygous, Self::Homozygous, Self::Hemizygous];

    #[must_use]
    pub fn of(zygosity: Zygosity) -> Self {
        match zygosity {
            Zygosity::Heterozygous => Self::Heterozygous,
            Zygosity::Homozygous => Self::Homozygous,
            Zygosity::Hemizygous => Self::Hemizygous,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Heterozygous => "Het",
            Self::Homozygous => "Hom",
            Self::Hemizygous => "Hem",
            Self::All => "All",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Option counts of one population in one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryFrequencies {
    /// Number of records per option.
    pub counts: BTreeMap<String, u32>,
    /// Number of records in the cell.
    pub total: u32,
    /// `100 * count / total` per option; empty when `total` is zero.
    pub percentages: BTreeMap<String, f64>,
}

impl CategoryFrequencies {
    fn add(&mut self, option: &str) {
        *self.counts.entry(option.to_owned()).or_default() += 1;
        self.total += 1;
    }

    fn compute_percentages(&mut self) {
        let total = f64::from(self.total);
        self.percentages = if self.total == 0 {
            BTreeMap::new()
        } else {
            self.counts
                .iter()
                .map(|(option, &count)| (option.clone(), 100.0 * f64::from(count) / total))
                .collect()
        };
    }
}

/// Wildtype and mutant frequencies of one grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyCell {
    pub wildtype: CategoryFrequencies,
    pub mutant: CategoryFrequencies,
}

/// The 5×4 grid of frequency cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyGrid {
    cells: [[FrequencyCell; 4]; 5],
}

impl FrequencyGrid {
    #[must_use]
    pub fn cell(&self, row: SexRow, column: ZygosityColumn) -> &FrequencyCell {
        &self.cells[row.index()][column.index()]
    }

    fn cell_mut(&mut self, row: SexRow, column: ZygosityColumn) -> &mut FrequencyCell {
        &mut self.cells[row.index()][column.index()]
    }

    /// Every cell with its row and column.
    pub fn iter(&self) -> impl Iterator<Item = (SexRow, ZygosityColumn, &FrequencyCell)> + '_ {
        SexRow::ALL.into_iter().flat_map(move |row| {
            ZygosityColumn::ALL
                .into_iter()
                .map(move |column| (row, column, self.cell(row, column)))
        })
    }

    fn count(&mut self, record: &MeasurementRecord) {
        let row = SexRow::of(record.sex);
        let option = record.value.as_category();
        let column = record.zygosity.map(ZygosityColumn::of);
        let specific: &[ZygosityColumn] = match (&column, record.is_wildtype()) {
            (Some(column), _) => std::slice::from_ref(column),
            (None, true) => &ZygosityColumn::SPECIFIC,
            (None, false) => &[],
        };

        let mut bump = |row: SexRow, column: ZygosityColumn| {
            let cell = self.cell_mut(row, column);
            let bucket = if record.is_wildtype() {
                &mut cell.wildtype
            } else {
                &mut cell.mutant
            };
            bucket.add(&option);
        };
        for &column in specific {
            bump(row, column);
            bump(SexRow::All, column);
        }
        bump(row, ZygosityColumn::All);
        bump(SexRow::All, ZygosityColumn::All);
    }

    fn compute_percentages(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.wildtype.compute_percentages();
            cell.mutant.compute_percentages();
        }
    }
}

/// A category option with its colour index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub label: String,
    pub color_index: usize,
}

/// Result of [`analyze_categorical`].
#[derive(Debug, Clone, Serialize)]
pub struct CategoricalAnalysis {
    pub grid: FrequencyGrid,
    /// [`HIGHLIGHTED_SPECIMEN`] followed by every option seen, in byte order.
    pub options: Vec<CategoryOption>,
}

/// Builds the frequency grid and option list of a categorical dataset.
///
/// Options are registered in `registry` in list order, so an option keeps the
/// colour index it was first given by any earlier analysis.
#[must_use]
pub fn analyze_categorical(
    records: &[MeasurementRecord],
    registry: &CategoryColorRegistry,
) -> CategoricalAnalysis {
    let mut grid = FrequencyGrid::default();
    for record in records {
        grid.count(record);
    }
    grid.compute_percentages();

    let distinct = records
        .iter()
        .map(|record| record.value.as_category().into_owned())
        .collect::<BTreeSet<_>>();
    let options = std::iter::once(HIGHLIGHTED_SPECIMEN.to_owned())
        .chain(distinct)
        .map(|label| CategoryOption {
            color_index: registry.index_of(&label),
            label,
        })
        .collect();

    CategoricalAnalysis { grid, options }
}
