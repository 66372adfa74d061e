//! Stable colour indices for category options
//!
//! Categorical charts colour each option consistently across every chart of
//! a session. The registry hands out the next unused index the first time an
//! option is seen and returns the same index for it from then on. Indices are
//! never reused or reset.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Session-wide mapping from category option to colour index.
///
/// # Examples
///
/// ```
/// use phenoview_analysis::color::CategoryColorRegistry;
///
/// let registry = CategoryColorRegistry::new();
/// assert_eq!(registry.index_of("Normal"), 0);
/// assert_eq!(registry.index_of("Abnormal"), 1);
/// assert_eq!(registry.index_of("Normal"), 0);
/// ```
#[derive(Debug, Default)]
pub struct CategoryColorRegistry {
    indices: Mutex<HashMap<String, usize>>,
}

impl CategoryColorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.indices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Colour index of `option`, assigning the next unused one on first sight.
    pub fn index_of(&self, option: &str) -> usize {
        let mut indices = self.lock();
        if let Some(&index) = indices.get(option) {
            return index;
        }
        let index = indices.len();
        indices.insert(option.to_owned(), index);
        index
    }

    /// Colour index of `option` if it has been seen.
    #[must_use]
    pub fn get(&self, option: &str) -> Option<usize> {
        self.lock().get(option).copied()
    }

    /// Number of options seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
