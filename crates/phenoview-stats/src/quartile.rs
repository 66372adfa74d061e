use serde::{Deserialize, Serialize};

/// First and third quartiles of a dataset.
///
/// Quartiles are computed by linear interpolation between the two ranks that
/// bracket the quartile position (the Excel / NIST method). The second
/// quartile is not stored here because it is the median, which
/// [`ColumnStatistics`](crate::descriptive::ColumnStatistics) already carries.
///
/// # Examples
///
/// ```
/// use phenoview_stats::quartile::Quartiles;
///
/// let quartiles = Quartiles::from_sorted(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(quartiles.q1, 1.75);
/// assert_eq!(quartiles.q3, 3.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// The first quartile (25th percentile).
    pub q1: f64,
    /// The third quartile (75th percentile).
    pub q3: f64,
}

impl Quartiles {
    /// Computes quartiles from pre-sorted values.
    ///
    /// # Returns
    ///
    /// * `Some(Quartiles)` - if the dataset contains at least two values
    /// * `None` - otherwise
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        Some(Self {
            q1: interpolated_quartile(sorted_values, 1)?,
            q3: interpolated_quartile(sorted_values, 3)?,
        })
    }

    /// Returns the interquartile range (`q3 - q1`).
    #[must_use]
    pub fn interquartile_range(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Computes the `quartile`-th quartile of sorted data by linear interpolation.
///
/// For `n` values the quartile position is `k = quartile * 0.25 * (n - 1) + 1`
/// (1-based). With `t = floor(k)` and `f = k - t`, the result is
/// `a[t-1] + f * (a[t] - a[t-1])` using 0-based indexing.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order
/// * `quartile` - The quartile to compute (0 to 4)
///
/// # Returns
///
/// The interpolated value, or `None` if fewer than two values are given.
///
/// # Examples
///
/// ```
/// use phenoview_stats::quartile::interpolated_quartile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(interpolated_quartile(&values, 1), Some(2.0));
/// assert_eq!(interpolated_quartile(&values, 3), Some(4.0));
/// assert_eq!(interpolated_quartile(&[1.0], 1), None);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn interpolated_quartile(sorted_values: &[f64], quartile: u8) -> Option<f64> {
    let n = sorted_values.len();
    if n < 2 {
        return None;
    }
    let k = f64::from(quartile) * 0.25 * (n - 1) as f64 + 1.0;
    let t = k.floor();
    let fraction = k - t;
    // `t` lies in 1..=n; at the upper end there is no element above it.
    let t = (t as usize).clamp(1, n);
    let low = sorted_values[t - 1];
    let high = sorted_values.get(t).copied().unwrap_or(low);
    Some(low + fraction * (high - low))
}
