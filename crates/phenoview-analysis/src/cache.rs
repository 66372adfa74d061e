//! Per data context cache of cohort statistics
//!
//! Statistics are computed once per (data context, zygosity filter) and kept
//! until a fresh batch for the same data context arrives. A fresh batch
//! replaces every zygosity entry of its data context at once; there is no
//! partial invalidation.
//!
//! Entries are computed outside the lock and inserted in a single critical
//! section, so readers see either all old or all new views of a context.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::{
    batch::{DatasetKey, MeasurementBatch},
    cohort::{CohortStatistics, ZygosityFilter, compute_views},
    record::RecordError,
};

/// Key of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset: DatasetKey,
    pub zygosity: ZygosityFilter,
}

/// Cache of cohort statistics keyed by data context and zygosity filter.
#[derive(Debug, Default)]
pub struct StatisticsCache {
    entries: Mutex<HashMap<CacheKey, CohortStatistics>>,
}

impl StatisticsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CohortStatistics>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached statistics for a data context under a zygosity filter.
    #[must_use]
    pub fn get(&self, dataset: &DatasetKey, zygosity: ZygosityFilter) -> Option<CohortStatistics> {
        let key = CacheKey {
            dataset: dataset.clone(),
            zygosity,
        };
        self.lock().get(&key).cloned()
    }

    /// Stores statistics, overwriting any previous entry for the same key.
    pub fn insert(&self, dataset: DatasetKey, statistics: CohortStatistics) {
        let key = CacheKey {
            dataset,
            zygosity: statistics.zygosity,
        };
        self.lock().insert(key, statistics);
    }

    /// Drops every entry of a data context.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    pub fn invalidate(&self, dataset: &DatasetKey) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| &key.dataset != dataset);
        let removed = before - entries.len();
        debug!(?dataset, removed, "invalidated cached statistics");
        removed
    }

    /// Computes all zygosity views of a batch and replaces its cached entries.
    ///
    /// # Returns
    ///
    /// The freshly computed views, in [`ZygosityFilter::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the batch has a categorical value; the cache
    /// is left untouched in that case.
    pub fn populate(&self, batch: &MeasurementBatch) -> Result<Vec<CohortStatistics>, RecordError> {
        let views = compute_views(&batch.key, &batch.measurements)?;

        let mut entries = self.lock();
        entries.retain(|key, _| key.dataset != batch.key);
        for statistics in &views {
            let key = CacheKey {
                dataset: batch.key.clone(),
                zygosity: statistics.zygosity,
            };
            entries.insert(key, statistics.clone());
        }
        drop(entries);

        debug!(
            dataset = ?batch.key,
            measurements = batch.measurements.len(),
            "cached cohort statistics"
        );
        Ok(views)
    }

    /// Cached statistics of a view, populating the cache from `batch` on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the batch has to be computed and has a
    /// categorical value.
    pub fn get_or_populate(
        &self,
        batch: &MeasurementBatch,
        zygosity: ZygosityFilter,
    ) -> Result<Option<CohortStatistics>, RecordError> {
        if let Some(statistics) = self.get(&batch.key, zygosity) {
            return Ok(Some(statistics));
        }
        let views = self.populate(batch)?;
        Ok(views.into_iter().find(|view| view.zygosity == zygosity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        batch::QcStatus,
        record::{Increment, MeasuredValue, MeasurementRecord, Sex, Zygosity},
    };

    fn batch(genotype_id: u32, values: &[f64]) -> MeasurementBatch {
        let measurements = values
            .iter()
            .zip(1..)
            .map(|(&value, id)| MeasurementRecord {
                measurement_id: id,
                specimen_id: id,
                metadata_group: 1,
                increment: Increment::Number(1.0),
                value: MeasuredValue::Number(value),
                sex: Some(Sex::Female),
                zygosity: (id % 2 == 0).then_some(Zygosity::Homozygous),
                genotype_id: if id % 2 == 0 { genotype_id } else { 0 },
                strain_id: 1,
            })
            .collect();
        MeasurementBatch {
            key: DatasetKey {
                genotype_id,
                strain_id: 1,
                centre_id: 1,
                parameter_key: "IMPC_BWT_001_001".to_owned(),
            },
            qc_status: QcStatus::Done,
            metadata_groups: vec![],
            measurements,
        }
    }

    #[test]
    fn test_populate_caches_every_view() {
        let cache = StatisticsCache::new();
        let batch = batch(3, &[1.0, 2.0, 3.0, 4.0]);
        let views = cache.populate(&batch).unwrap();
        assert_eq!(views.len(), 4);
        assert_eq!(cache.len(), 4);
        for zygosity in ZygosityFilter::ALL {
            assert!(cache.get(&batch.key, zygosity).is_some());
        }
    }

    #[test]
    fn test_fresh_batch_replaces_entries() {
        let cache = StatisticsCache::new();
        let first = batch(3, &[1.0, 2.0, 3.0, 4.0]);
        cache.populate(&first).unwrap();
        let old = cache.get(&first.key, ZygosityFilter::All).unwrap();

        let second = batch(3, &[10.0, 20.0, 30.0, 40.0]);
        cache.populate(&second).unwrap();
        let new = cache.get(&second.key, ZygosityFilter::All).unwrap();

        assert_eq!(cache.len(), 4);
        assert!(!Arc::ptr_eq(&old.mutant, &new.mutant));
        let mean = new.mutant.combined.as_ref().unwrap().overall.y.mean;
        assert!((mean - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalidate_only_touches_one_context() {
        let cache = StatisticsCache::new();
        let a = batch(3, &[1.0, 2.0]);
        let b = batch(4, &[1.0, 2.0]);
        cache.populate(&a).unwrap();
        cache.populate(&b).unwrap();
        assert_eq!(cache.len(), 8);

        assert_eq!(cache.invalidate(&a.key), 4);
        assert_eq!(cache.len(), 4);
        assert!(cache.get(&a.key, ZygosityFilter::All).is_none());
        assert!(cache.get(&b.key, ZygosityFilter::All).is_some());
    }

    #[test]
    fn test_failed_population_keeps_previous_entries() {
        let cache = StatisticsCache::new();
        let good = batch(3, &[1.0, 2.0]);
        cache.populate(&good).unwrap();

        let mut bad = good.clone();
        bad.measurements[0].value = MeasuredValue::Category("x".to_owned());
        assert!(cache.populate(&bad).is_err());
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_get_or_populate() {
        let cache = StatisticsCache::new();
        let batch = batch(3, &[1.0, 2.0, 3.0]);
        assert!(cache.is_empty());
        let hom = cache
            .get_or_populate(&batch, ZygosityFilter::Homozygous)
            .unwrap()
            .unwrap();
        assert_eq!(hom.zygosity, ZygosityFilter::Homozygous);
        assert_eq!(cache.len(), 4);

        let again = cache
            .get_or_populate(&batch, ZygosityFilter::Homozygous)
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&hom.mutant, &again.mutant));
    }
}
