//! Descriptive statistics for phenotype measurements.
//!
//! This crate provides the single-column statistics that every chart in
//! phenoview is built from:
//!
//! - **Descriptive statistics**: sum, extremes, mean, median, sample standard
//!   deviation and standard error
//! - **Quartiles**: first and third quartiles by linear interpolation
//!
//! # Modules
//!
//! - [`descriptive`]: [`ColumnStatistics`](descriptive::ColumnStatistics) over values or records
//! - [`quartile`]: Interpolated quartiles
//!
//! # Examples
//!
//! ## Summarising plain values
//!
//! ```
//! use phenoview_stats::descriptive::ColumnStatistics;
//!
//! let stats = ColumnStatistics::new([1.0, 2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert!(stats.std_dev.is_some());
//! ```
//!
//! ## Summarising one column of a record collection
//!
//! ```
//! use phenoview_stats::descriptive::ColumnStatistics;
//!
//! struct Row {
//!     weight: f64,
//! }
//!
//! let mut rows = vec![Row { weight: 21.5 }, Row { weight: 19.0 }];
//! let stats = ColumnStatistics::from_records(&mut rows, |row| row.weight).unwrap();
//! assert_eq!(stats.min, 19.0);
//! assert_eq!(rows[0].weight, 19.0); // sorted in place
//! ```

pub mod descriptive;
pub mod quartile;
