//! Grouped statistics over record collections
//!
//! This module partitions a record collection by a key selector and computes
//! [`ColumnStatistics`] for every group. It is the basis of every numeric
//! chart:
//!
//! - **Column statistics** group points by their x value. Each group is one
//!   position on the x-axis and feeds the mean/median/quartile series.
//! - **Row statistics** group points by specimen. Each group is the series of
//!   one animal and is used to highlight a specimen across increments.
//!
//! # Typical Workflow
//!
//! ```text
//! MeasurementRecords
//!     ↓ to_data_points
//! DataPoints
//!     ↓ prepare_dataset
//! PlotDataset { overall, columns, rows }
//! ```
//!
//! # Examples
//!
//! ```
//! use phenoview_analysis::grouping::group_and_aggregate;
//!
//! // (group, x, y)
//! let mut rows = vec![("b", 1.0, 4.0), ("a", 2.0, 1.0), ("b", 0.0, 2.0)];
//! let grouped = group_and_aggregate(&mut rows, |r| r.0, |r| r.1, |r| r.2).unwrap();
//!
//! assert_eq!(grouped.len(), 2);
//! let b = grouped.get(&"b").unwrap();
//! assert_eq!(b.count, 2);
//! assert_eq!(b.members[0].1, 0.0); // members sorted by x
//! assert_eq!(b.statistics.mean, 3.0);
//! ```

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    hash::{Hash, Hasher},
};

use phenoview_stats::descriptive::ColumnStatistics;
use serde::{Deserialize, Serialize};

use crate::record::{DataPoint, MetadataGroupId, SpecimenId};

/// A totally ordered `f64` usable as a group key.
///
/// Ordering follows [`f64::total_cmp`] after folding `-0.0` into `0.0`, so
/// both zeros form one key. Other keys are equal exactly when their bit
/// patterns are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueKey(pub f64);

impl ValueKey {
    /// Key of `value`, with `-0.0` stored as `0.0`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value + 0.0)
    }

    fn normalized(self) -> f64 {
        self.0 + 0.0
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ValueKey {}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().total_cmp(&other.normalized())
    }
}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().to_bits().hash(state);
    }
}

/// Statistics for one group of records sharing a key.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsGroup<K, T> {
    /// The shared key of the group members.
    pub key: K,
    /// Number of members in the group.
    pub count: usize,
    /// Group members, sorted ascending by x.
    pub members: Vec<T>,
    /// Statistics of the members' y values.
    pub statistics: ColumnStatistics,
}

impl<K> StatisticsGroup<K, DataPoint> {
    /// Distinct metadata groups of the members.
    ///
    /// More than one entry means the group mixes experimental conditions.
    #[must_use]
    pub fn metadata_groups(&self) -> BTreeSet<MetadataGroupId> {
        self.members
            .iter()
            .map(|point| point.metadata_group)
            .collect()
    }
}

/// Groups in ascending key order, with a key → position index.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedStatistics<K, T> {
    groups: Vec<StatisticsGroup<K, T>>,
    #[serde(skip)]
    index: HashMap<K, usize>,
}

impl<K, T> GroupedStatistics<K, T>
where
    K: Eq + Hash,
{
    /// All groups in ascending key order.
    #[must_use]
    pub fn groups(&self) -> &[StatisticsGroup<K, T>] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatisticsGroup<K, T>> + '_ {
        self.groups.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Position of the group with `key`, in constant time.
    #[must_use]
    pub fn position(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// The group with `key`, in constant time.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&StatisticsGroup<K, T>> {
        self.position(key).map(|idx| &self.groups[idx])
    }

    #[must_use]
    pub fn first(&self) -> Option<&StatisticsGroup<K, T>> {
        self.groups.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&StatisticsGroup<K, T>> {
        self.groups.last()
    }

    /// Sum of member counts over all groups.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Partitions `records` by `group_key` and computes statistics for each group.
///
/// The records are sorted in place by the group key, then every run of
/// records with an equal key becomes one group. Members of a group are sorted
/// ascending by `x`, and the statistics are computed over `y`.
///
/// # Arguments
///
/// * `records` - The records to group; reordered by this call
/// * `group_key` - Selects the grouping key
/// * `x` - Selects the value members are ordered by
/// * `y` - Selects the value statistics are computed over
///
/// # Returns
///
/// * `Some(GroupedStatistics)` - groups in ascending key order
/// * `None` - if `records` is empty
pub fn group_and_aggregate<T, K, KF, XF, YF>(
    records: &mut [T],
    group_key: KF,
    x: XF,
    y: YF,
) -> Option<GroupedStatistics<K, T>>
where
    T: Clone,
    K: Ord + Hash + Clone,
    KF: Fn(&T) -> K,
    XF: Fn(&T) -> f64,
    YF: Fn(&T) -> f64,
{
    if records.is_empty() {
        return None;
    }
    records.sort_by_key(&group_key);

    let mut groups = vec![];
    let mut index = HashMap::new();
    for run in records.chunk_by(|a, b| group_key(a) == group_key(b)) {
        let key = group_key(&run[0]);
        let mut members = run.to_vec();
        members.sort_by(|a, b| x(a).total_cmp(&x(b)));
        let Some(statistics) = ColumnStatistics::new(members.iter().map(&y)) else {
            continue;
        };
        index.insert(key.clone(), groups.len());
        groups.push(StatisticsGroup {
            key,
            count: members.len(),
            members,
            statistics,
        });
    }

    Some(GroupedStatistics { groups, index })
}

/// Range of values on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

/// Statistics of the whole, ungrouped population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStatistics {
    pub x: Extent,
    pub y: ColumnStatistics,
}

/// Everything a numeric chart needs for one population of points.
#[derive(Debug, Clone, Serialize)]
pub struct PlotDataset {
    pub overall: OverallStatistics,
    /// Points grouped by x value.
    pub columns: GroupedStatistics<ValueKey, DataPoint>,
    /// Points grouped by specimen.
    pub rows: GroupedStatistics<SpecimenId, DataPoint>,
}

impl PlotDataset {
    /// The series of one specimen.
    #[must_use]
    pub fn specimen_series(
        &self,
        specimen_id: SpecimenId,
    ) -> Option<&StatisticsGroup<SpecimenId, DataPoint>> {
        self.rows.get(&specimen_id)
    }

    /// Number of points in the dataset.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.overall.y.count
    }
}

/// Computes overall, column and row statistics for a set of points.
///
/// The x extent is read from the first and last column groups, which are in
/// ascending x order by construction.
///
/// # Returns
///
/// `None` if `points` is empty.
///
/// # Examples
///
/// ```
/// use phenoview_analysis::{grouping::prepare_dataset, record::DataPoint};
///
/// let point = |measurement_id: u64, specimen_id: u64, x: f64, y: f64| DataPoint {
///     measurement_id,
///     specimen_id,
///     metadata_group: 1,
///     x,
///     y,
/// };
/// let points = vec![
///     point(1, 1, 1.0, 10.0),
///     point(2, 1, 2.0, 12.0),
///     point(3, 2, 1.0, 14.0),
/// ];
/// let dataset = prepare_dataset(points).unwrap();
///
/// assert_eq!(dataset.overall.x.min, 1.0);
/// assert_eq!(dataset.overall.x.max, 2.0);
/// assert_eq!(dataset.columns.len(), 2);
/// assert_eq!(dataset.specimen_series(1).unwrap().count, 2);
/// ```
#[must_use]
pub fn prepare_dataset(mut points: Vec<DataPoint>) -> Option<PlotDataset> {
    let y = ColumnStatistics::from_records(&mut points, |p| p.y)?;
    let columns = group_and_aggregate(&mut points, |p| ValueKey::new(p.x), |p| p.x, |p| p.y)?;
    let rows = group_and_aggregate(&mut points, |p| p.specimen_id, |p| p.x, |p| p.y)?;
    let x = Extent {
        min: columns.first()?.key.0,
        max: columns.last()?.key.0,
    };

    Some(PlotDataset {
        overall: OverallStatistics { x, y },
        columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(measurement_id: u64, specimen_id: u64, x: f64, y: f64) -> DataPoint {
        DataPoint {
            measurement_id,
            specimen_id,
            metadata_group: 1,
            x,
            y,
        }
    }

    fn sample_points() -> Vec<DataPoint> {
        vec![
            point(1, 100, 3.0, 20.0),
            point(2, 101, 1.0, 10.0),
            point(3, 100, 1.0, 12.0),
            point(4, 102, 2.0, 15.0),
            point(5, 101, 3.0, 22.0),
            point(6, 100, 2.0, 16.0),
            point(7, 102, 1.0, 11.0),
        ]
    }

    #[test]
    fn test_empty_input() {
        let mut points: Vec<DataPoint> = vec![];
        assert!(group_and_aggregate(&mut points, |p| p.specimen_id, |p| p.x, |p| p.y).is_none());
        assert!(prepare_dataset(vec![]).is_none());
    }

    #[test]
    fn test_partitions_are_complete_and_disjoint() {
        let mut points = sample_points();
        let input_len = points.len();
        let grouped =
            group_and_aggregate(&mut points, |p| ValueKey(p.x), |p| p.x, |p| p.y).unwrap();

        assert_eq!(grouped.total_count(), input_len);
        let mut ids = grouped
            .iter()
            .flat_map(|g| g.members.iter().map(|p| p.measurement_id))
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), input_len);
    }

    #[test]
    fn test_groups_are_in_ascending_key_order() {
        let mut points = sample_points();
        let grouped = group_and_aggregate(&mut points, |p| p.specimen_id, |p| p.x, |p| p.y).unwrap();
        let keys = grouped.iter().map(|g| g.key).collect::<Vec<_>>();
        assert_eq!(keys, [100, 101, 102]);
    }

    #[test]
    fn test_members_sorted_by_x_and_stats_over_y() {
        let mut points = sample_points();
        let grouped = group_and_aggregate(&mut points, |p| p.specimen_id, |p| p.x, |p| p.y).unwrap();
        let series = grouped.get(&100).unwrap();
        let xs = series.members.iter().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, [1.0, 2.0, 3.0]);
        assert_eq!(series.count, 3);
        assert!((series.statistics.mean - 16.0).abs() < 1e-9);
        assert_eq!(series.statistics.median, 16.0);
    }

    #[test]
    fn test_index_lookup() {
        let mut points = sample_points();
        let grouped = group_and_aggregate(&mut points, |p| p.specimen_id, |p| p.x, |p| p.y).unwrap();
        assert_eq!(grouped.position(&101), Some(1));
        assert_eq!(grouped.get(&102).unwrap().key, 102);
        assert!(grouped.get(&999).is_none());
    }

    #[test]
    fn test_prepare_dataset() {
        let dataset = prepare_dataset(sample_points()).unwrap();
        assert_eq!(dataset.point_count(), 7);
        assert_eq!(dataset.overall.x, Extent { min: 1.0, max: 3.0 });
        assert_eq!(dataset.overall.y.min, 10.0);
        assert_eq!(dataset.overall.y.max, 22.0);

        let column = dataset.columns.get(&ValueKey(1.0)).unwrap();
        assert_eq!(column.count, 3);
        assert!((column.statistics.mean - 11.0).abs() < 1e-9);

        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(dataset.specimen_series(101).unwrap().count, 2);
    }

    #[test]
    fn test_single_point_group_has_no_dispersion() {
        let dataset = prepare_dataset(vec![point(1, 1, 5.0, 9.0)]).unwrap();
        let column = dataset.columns.first().unwrap();
        assert_eq!(column.statistics.std_dev, None);
        assert_eq!(column.statistics.quartile, None);
        assert_eq!(dataset.overall.x, Extent { min: 5.0, max: 5.0 });
    }

    #[test]
    fn test_metadata_groups_per_group() {
        let mut points = sample_points();
        points[0].metadata_group = 7;
        let dataset = prepare_dataset(points).unwrap();
        let column = dataset.columns.get(&ValueKey(3.0)).unwrap();
        assert_eq!(column.metadata_groups().into_iter().collect::<Vec<_>>(), [1, 7]);
        let column = dataset.columns.get(&ValueKey(2.0)).unwrap();
        assert_eq!(column.metadata_groups().len(), 1);
    }

    #[test]
    fn test_value_key_equality_and_order() {
        assert_eq!(ValueKey(1.5), ValueKey(1.5));
        assert!(ValueKey(-1.0) < ValueKey(0.0));
        assert!(ValueKey(f64::NAN) > ValueKey(f64::INFINITY));
    }

    #[test]
    fn test_negative_zero_joins_zero_column() {
        assert_eq!(ValueKey(0.0), ValueKey(-0.0));
        assert_eq!(ValueKey::new(-0.0).0.to_bits(), 0.0_f64.to_bits());

        let dataset = prepare_dataset(vec![point(1, 1, 0.0, 4.0), point(2, 2, -0.0, 6.0)]).unwrap();
        assert_eq!(dataset.columns.len(), 1);
        let column = dataset.columns.get(&ValueKey(-0.0)).unwrap();
        assert_eq!(column.count, 2);
        assert!(column.key.0.is_sign_positive());
        assert_eq!(dataset.overall.x.min.to_bits(), dataset.overall.x.max.to_bits());
    }
}
