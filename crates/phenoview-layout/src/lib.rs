//! Point layout for phenotype charts
//!
//! - [`beeswarm`]: non-overlapping horizontal placement of equal-radius points
//! - [`scale`]: linear value to pixel mapping
//!
//! Both are pure functions of their inputs; nothing here is cached.

pub mod beeswarm;
pub mod scale;
