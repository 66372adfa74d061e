//! Phenotype measurement analysis
//!
//! This crate turns raw measurement batches into the statistics behind the
//! phenotype charts:
//!
//! - [`record`]: measurement records and their numeric projection
//! - [`batch`]: batches of one data context with QC status and metadata groups
//! - [`grouping`]: group-by-key aggregation and plot dataset preparation
//! - [`cohort`]: wildtype / mutant split by zygosity and sex
//! - [`cache`]: per data context cache of cohort statistics
//! - [`categorical`]: option frequencies of categorical parameters
//! - [`color`]: stable colour indices for category options
//!
//! # Pipeline
//!
//! ```text
//! MeasurementBatch
//!   └─ CohortSplit (wildtype / mutant)
//!        └─ ZygosityFilter (all, het, hom, hem)
//!             └─ SexSplit (combined, male, female)
//!                  └─ PlotDataset (overall, columns, rows)
//! ```
//!
//! Summary statistics themselves live in the `phenoview-stats` crate.

pub mod batch;
pub mod cache;
pub mod categorical;
pub mod cohort;
pub mod color;
pub mod grouping;
pub mod record;
