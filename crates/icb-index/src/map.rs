//! Shared, reloadable owner of the current [`CodeIndex`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use icb_model::Catalog;

use crate::index::CodeIndex;
use crate::options::IndexOptions;

/// Holds the current index snapshot and republishes it on reload.
///
/// A reload builds the complete new snapshot first and then swaps a single
/// pointer, so readers see either the old index or the new one, never a
/// partial build. Readers take no lock; a snapshot obtained from
/// [`CodeMap::snapshot`] stays valid for as long as it is held.
#[derive(Debug)]
pub struct CodeMap {
    current: ArcSwap<CodeIndex>,
    options: IndexOptions,
}

impl CodeMap {
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self::with_options(catalog, IndexOptions::default())
    }

    pub fn with_options(catalog: impl Into<Arc<Catalog>>, options: IndexOptions) -> Self {
        let index = CodeIndex::build(catalog.into(), options.clone());
        Self {
            current: ArcSwap::from_pointee(index),
            options,
        }
    }

    /// Rebuild from `catalog` and publish the result atomically.
    pub fn remap(&self, catalog: impl Into<Arc<Catalog>>) {
        let index = CodeIndex::build(catalog.into(), self.options.clone());
        self.current.store(Arc::new(index));
        tracing::info!("Code map republished");
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CodeIndex> {
        self.current.load_full()
    }

    /// The catalog behind the current snapshot.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(self.current.load().catalog())
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }
}

impl Default for CodeMap {
    /// A map over an empty catalog: every lookup misses until the first remap.
    fn default() -> Self {
        Self::new(Catalog::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icb_model::{Category, CategoryType, Entry};

    fn release(values: &[&str]) -> Catalog {
        let category = values
            .iter()
            .fold(Category::new(CategoryType::VaccinationCvxCode, "CVX"), |c, v| {
                c.with_entry(Entry::new(*v, *v))
            });
        Catalog::new().with_category(category)
    }

    #[test]
    fn default_map_is_empty() {
        let map = CodeMap::default();
        let snapshot = map.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.entries(CategoryType::VaccinationCvxCode).is_none());
    }

    #[test]
    fn held_snapshot_survives_remap() {
        let map = CodeMap::new(release(&["08"]));
        let before = map.snapshot();
        map.remap(release(&["45"]));

        assert!(before.lookup(CategoryType::VaccinationCvxCode, "08").is_some());
        assert!(map.snapshot().lookup(CategoryType::VaccinationCvxCode, "08").is_none());
        assert_eq!(map.catalog().entry_count(), 1);
        assert_eq!(map.options(), &IndexOptions::default());
    }
}
