//! Category tables: value -> entry maps per codeset type.
//!
//! Tables hold [`EntryId`] handles into the snapshot's catalog rather than
//! cloned entries. Duplicate values inside a category are not an error; the
//! later entry replaces the earlier one.

use std::collections::{BTreeMap, HashMap};

use icb_model::{Category, CategoryType};

/// Position of an entry inside the indexed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryId {
    pub(crate) category: usize,
    pub(crate) entry: usize,
}

/// Value -> entry handle for one category.
pub(crate) type ValueTable = BTreeMap<String, EntryId>;

#[derive(Debug, Default)]
pub(crate) struct CategoryTables {
    tables: HashMap<CategoryType, ValueTable>,
}

impl CategoryTables {
    /// Flatten one category and register it under `category_type`.
    ///
    /// A second category with the same type replaces the earlier table.
    /// Packaging levels are additionally copied into the merged NDC table,
    /// and a catalog's own merged NDC category is folded into that table
    /// so earlier overlay entries survive.
    pub(crate) fn insert_category(
        &mut self,
        category_type: CategoryType,
        category_idx: usize,
        category: &Category,
    ) {
        let table = build_table(category_idx, category);

        tracing::info!(
            codeset = %category_type,
            entries = table.len(),
            "Mapping codeset"
        );

        if category_type.feeds_packaging_union() {
            self.overlay_packaging(&table);
        }

        if category_type == CategoryType::VaccinationNdcCode {
            self.overlay_packaging(&table);
            return;
        }

        if self.tables.insert(category_type, table).is_some() {
            tracing::warn!(
                codeset = %category_type,
                "Codeset table replaced by a later codeset of the same type"
            );
        }
    }

    /// Add packaging-level entries to the merged NDC table, creating it on first use.
    fn overlay_packaging(&mut self, table: &ValueTable) {
        let merged = self
            .tables
            .entry(CategoryType::VaccinationNdcCode)
            .or_default();
        merged.extend(table.iter().map(|(value, id)| (value.clone(), *id)));
    }

    pub(crate) fn get(&self, category: CategoryType) -> Option<&ValueTable> {
        self.tables.get(&category)
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn populated(&self) -> impl Iterator<Item = CategoryType> + '_ {
        self.tables.keys().copied()
    }
}

fn build_table(category_idx: usize, category: &Category) -> ValueTable {
    let mut table = ValueTable::new();
    for (entry_idx, entry) in category.entries.iter().enumerate() {
        tracing::trace!(
            codeset = %category.codeset,
            value = %entry.value,
            label = %entry.label,
            "Indexed code"
        );
        table.insert(
            entry.value.clone(),
            EntryId {
                category: category_idx,
                entry: entry_idx,
            },
        );
    }
    table
}
