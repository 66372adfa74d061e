use serde::{Deserialize, Serialize};

use crate::quartile::Quartiles;

/// Descriptive statistics for one numeric column of a dataset.
///
/// Location and range measures are defined for any non-empty dataset. The
/// dispersion measures use the sample (`n - 1`) denominator and, like the
/// quartiles, are only defined once there are at least two values; for a single
/// value they are `None` rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// The number of values summarised.
    pub count: usize,
    /// The sum of all values.
    pub sum: f64,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The sample standard deviation (`None` when `count < 2`).
    pub std_dev: Option<f64>,
    /// The standard error of the mean, `std_dev / sqrt(count)`.
    pub std_err: Option<f64>,
    /// First and third quartiles (`None` when `count < 2`).
    pub quartile: Option<Quartiles>,
}

impl ColumnStatistics {
    /// Computes statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(ColumnStatistics)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use phenoview_stats::descriptive::ColumnStatistics;
    /// let stats = ColumnStatistics::new([4.0, 1.0, 3.0, 2.0]).unwrap();
    /// assert_eq!(stats.mean, 2.5);
    /// assert_eq!(stats.median, 2.5);
    /// assert_eq!(stats.quartile.unwrap().q1, 1.75);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes statistics over one column of a record collection.
    ///
    /// The records are sorted in place, ascending by `column`, before the
    /// statistics are computed. Callers that need their original order must
    /// pass a copy. Use [`from_sorted_records`](Self::from_sorted_records)
    /// when the records are already in column order.
    ///
    /// # Arguments
    ///
    /// * `records` - The records to summarise; reordered by this call
    /// * `column` - Selects the numeric value of a record
    ///
    /// # Examples
    ///
    /// ```
    /// # use phenoview_stats::descriptive::ColumnStatistics;
    /// let mut rows = vec![("c", 3.0), ("a", 1.0), ("b", 2.0)];
    /// let stats = ColumnStatistics::from_records(&mut rows, |row| row.1).unwrap();
    /// assert_eq!(stats.median, 2.0);
    /// assert_eq!(rows[0].0, "a");
    /// ```
    pub fn from_records<T, F>(records: &mut [T], column: F) -> Option<Self>
    where
        F: Fn(&T) -> f64,
    {
        records.sort_by(|a, b| column(a).total_cmp(&column(b)));
        Self::from_sorted_records(records, column)
    }

    /// Computes statistics over one column of records already sorted by it.
    ///
    /// # Panics
    ///
    /// Panics if the records are not sorted in ascending `column` order.
    #[must_use]
    pub fn from_sorted_records<T, F>(records: &[T], column: F) -> Option<Self>
    where
        F: Fn(&T) -> f64,
    {
        let values = records.iter().map(column).collect::<Vec<_>>();
        Self::from_sorted(&values)
    }

    /// Computes statistics from pre-sorted values.
    ///
    /// This is an optimized version that skips the sorting step.
    ///
    /// # Returns
    ///
    /// * `Some(ColumnStatistics)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use phenoview_stats::descriptive::ColumnStatistics;
    /// let stats = ColumnStatistics::from_sorted(&[42.0]).unwrap();
    /// assert_eq!(stats.sum, 42.0);
    /// assert_eq!(stats.std_dev, None);
    /// assert_eq!(stats.quartile, None);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let first = *sorted_values.first()?;
        let (sum, min, max) = sorted_values
            .iter()
            .fold((0.0, first, first), |(sum, min, max), &v| {
                (sum + v, f64::min(min, v), f64::max(max, v))
            });
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sum / n;

        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
        } else {
            sorted_values[mid]
        };

        let (std_dev, std_err) = if count < 2 {
            (None, None)
        } else {
            let squares = sorted_values
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>();
            let std_dev = (squares / (n - 1.0)).sqrt();
            (Some(std_dev), Some(std_dev / n.sqrt()))
        };

        Some(Self {
            count,
            sum,
            min,
            max,
            mean,
            median,
            std_dev,
            std_err,
            quartile: Quartiles::from_sorted(sorted_values),
        })
    }
}
