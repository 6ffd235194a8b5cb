//! The resolution layer: one immutable snapshot of an indexed catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use icb_model::{Catalog, Category, CategoryType, Entry};

use crate::options::{IndexOptions, Mapping, ScannerVariantMode};
use crate::product::{self, ProductIndex};
use crate::table::{CategoryTables, EntryId};

/// Related entries of one entry, grouped by target category.
///
/// Each list keeps one slot per link, in link order; a link whose target
/// does not resolve contributes `None`.
pub type RelatedEntries<'a> = BTreeMap<CategoryType, Vec<Option<&'a Entry>>>;

/// An immutable index over one catalog release.
///
/// Every query is total: a miss (unknown category, unknown value, dangling
/// link, ambiguous product) is `None` or an empty collection.
#[derive(Debug)]
pub struct CodeIndex {
    catalog: Arc<Catalog>,
    options: IndexOptions,
    tables: CategoryTables,
    products: ProductIndex,
}

impl CodeIndex {
    /// Flatten `catalog` into lookup tables, the merged NDC table and the product index.
    pub fn build(catalog: Arc<Catalog>, options: IndexOptions) -> Self {
        tracing::debug!(
            categories = catalog.categories.len(),
            entries = catalog.entry_count(),
            "Building code index"
        );

        let mut tables = CategoryTables::default();
        let mut products = ProductIndex::default();

        for (category_idx, category) in catalog.categories.iter().enumerate() {
            let category_type = category.category();
            if !category_type.is_known() {
                tracing::warn!(codeset = %category.codeset, "Skipping unknown codeset");
                continue;
            }

            tables.insert_category(category_type, category_idx, category);

            if category_type == CategoryType::VaccineProduct {
                products.index_category(category_idx, category);
            }
        }

        tracing::debug!(
            tables = tables.len(),
            product_keys = products.len(),
            "Code index built"
        );

        Self {
            catalog,
            options,
            tables,
            products,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Source categories in document order.
    pub fn categories(&self) -> &[Category] {
        &self.catalog.categories
    }

    /// Categories that have a table, including the merged NDC table.
    pub fn populated_categories(&self) -> Vec<CategoryType> {
        let mut populated: Vec<CategoryType> = self.tables.populated().collect();
        populated.sort();
        populated
    }

    /// Number of populated category tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.len() == 0
    }

    fn entry(&self, id: EntryId) -> &Entry {
        &self.catalog.categories[id.category].entries[id.entry]
    }

    /// Exact lookup of `value` in `category`. Blank values never match.
    pub fn lookup(&self, category: CategoryType, value: &str) -> Option<&Entry> {
        if value.trim().is_empty() {
            return None;
        }
        let id = self.tables.get(category)?.get(value)?;
        Some(self.entry(*id))
    }

    /// Exact lookup, retrying known barcode scanning artifacts on a miss.
    ///
    /// Scanners sometimes prepend a spurious character to 11 and 13
    /// character NDC codes. For packaging categories a 12 or 14 character
    /// miss is retried without its first character.
    pub fn find(&self, category: CategoryType, value: &str) -> Option<&Entry> {
        if let Some(found) = self.lookup(category, value) {
            return Some(found);
        }
        if self.options.scanner_variants == ScannerVariantMode::Off {
            return None;
        }
        let variant = scanner_variant(category, value)?;
        let found = self.lookup(category, variant);
        if found.is_some() {
            tracing::debug!(
                codeset = %category,
                value,
                variant,
                "Resolved code through scanner variant"
            );
        }
        found
    }

    /// Lookup with the configured default [`Mapping`].
    pub fn get(&self, category: CategoryType, value: &str) -> Option<&Entry> {
        self.get_with(category, value, self.options.mapping)
    }

    /// Lookup that optionally follows a deprecation redirect.
    ///
    /// In [`Mapping::Mapped`] mode a deprecated entry carrying a replacement
    /// value is swapped for the exact lookup of that value in the same
    /// category. The redirect is a single hop: a deprecated replacement is
    /// returned as-is, and a missing replacement yields `None`.
    pub fn get_with(&self, category: CategoryType, value: &str, mapping: Mapping) -> Option<&Entry> {
        let found = self.find(category, value)?;
        if mapping == Mapping::Raw {
            return Some(found);
        }
        match found.status.redirect() {
            Some(new_value) => {
                tracing::debug!(
                    codeset = %category,
                    from = %found.value,
                    to = new_value,
                    "Following deprecation redirect"
                );
                self.lookup(category, new_value)
            }
            None => Some(found),
        }
    }

    /// All entries of a category sorted by value, or `None` if the category was never populated.
    pub fn entries(&self, category: CategoryType) -> Option<Vec<&Entry>> {
        let table = self.tables.get(category)?;
        Some(table.values().map(|id| self.entry(*id)).collect())
    }

    /// Products sharing a (CVX, MVX) pair, most recently started first.
    pub fn products_for(&self, cvx: &str, mvx: &str) -> Vec<&Entry> {
        self.products
            .candidates(cvx, mvx)
            .iter()
            .map(|slot| self.entry(slot.id))
            .collect()
    }

    /// The product for a (CVX, MVX) pair, disambiguated by administration date (`YYYYMMDD`).
    ///
    /// A single candidate is returned regardless of the date. With several
    /// candidates and no date the answer is ambiguous and `None`.
    pub fn product_for(&self, cvx: &str, mvx: &str, admin_date: Option<&str>) -> Option<&Entry> {
        let candidates = self.products.candidates(cvx, mvx);
        product::select(candidates, admin_date).map(|id| self.entry(id))
    }

    /// Value of the first link from `entry` into `category`.
    pub fn related_value<'e>(&self, entry: &'e Entry, category: CategoryType) -> Option<&'e str> {
        if !category.is_known() {
            return None;
        }
        entry
            .links
            .iter()
            .find(|link| link.category() == category)
            .map(|link| link.value.as_str())
    }

    /// First entry linked from `entry` into `category`, resolved with redirects.
    pub fn related_entry(&self, entry: &Entry, category: CategoryType) -> Option<&Entry> {
        let value = self.related_value(entry, category)?;
        self.get_with(category, value, Mapping::Mapped)
    }

    /// Every link target of `entry`, resolved with redirects and grouped by category.
    pub fn related_entries(&self, entry: &Entry) -> RelatedEntries<'_> {
        let mut related = RelatedEntries::new();
        for link in &entry.links {
            let category = link.category();
            let target = if category.is_known() {
                self.get_with(category, &link.value, Mapping::Mapped)
            } else {
                None
            };
            related.entry(category).or_default().push(target);
        }
        related
    }

    /// Look up `value` in `category` and group its link targets.
    pub fn related_entries_for(&self, category: CategoryType, value: &str) -> RelatedEntries<'_> {
        match self.get(category, value) {
            Some(entry) => self.related_entries(entry),
            None => RelatedEntries::new(),
        }
    }

    /// Link targets of (`category`, `value`) that live in `desired`.
    pub fn related_entries_in(
        &self,
        category: CategoryType,
        value: &str,
        desired: CategoryType,
    ) -> Option<Vec<Option<&Entry>>> {
        self.related_entries_for(category, value).remove(&desired)
    }

    /// First link target of (`category`, `value`) in `desired`, if it resolves.
    pub fn first_related_entry_in(
        &self,
        category: CategoryType,
        value: &str,
        desired: CategoryType,
    ) -> Option<&Entry> {
        self.related_entries_in(category, value, desired)?
            .into_iter()
            .next()
            .flatten()
    }
}

/// The value with its first character removed, if it is a plausible mis-scan.
fn scanner_variant(category: CategoryType, value: &str) -> Option<&str> {
    if !category.is_packaging() {
        return None;
    }
    let len = value.chars().count();
    if len != 12 && len != 14 {
        return None;
    }
    let mut chars = value.chars();
    chars.next();
    Some(chars.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use icb_model::CodeStatus;

    fn index(catalog: Catalog) -> CodeIndex {
        CodeIndex::build(Arc::new(catalog), IndexOptions::default())
    }

    fn cvx_catalog() -> Catalog {
        Catalog::new().with_category(
            Category::new(CategoryType::VaccinationCvxCode, "CVX")
                .with_entry(Entry::new("08", "Hep B, ped/adol").with_concept_type("Vaccine"))
                .with_entry(Entry::new("43", "Hep B, adult").deprecated_to("08"))
                .with_entry(Entry::new("42", "Hep B, adol/high risk").deprecated_to("43"))
                .with_entry(Entry::new("31", "Hep A, ped/adol").deprecated_to("999"))
                .with_entry(Entry::new("14", "IG").with_status(CodeStatus::Deprecated {
                    new_code_value: None,
                })),
        )
    }

    #[test]
    fn scanner_variant_only_for_packaging_lengths() {
        let ndc = CategoryType::VaccinationNdcCodeUnitOfUse;
        assert_eq!(scanner_variant(ndc, "058160082052"), Some("58160082052"));
        assert_eq!(scanner_variant(ndc, "058160-0820-52"), Some("58160-0820-52"));
        assert_eq!(scanner_variant(ndc, "58160082052"), None);
        assert_eq!(scanner_variant(ndc, "0058160-0820-52"), None);
        assert_eq!(
            scanner_variant(CategoryType::VaccinationCvxCode, "058160082052"),
            None
        );
    }

    #[test]
    fn blank_values_are_absent() {
        let index = index(cvx_catalog());
        assert!(index.lookup(CategoryType::VaccinationCvxCode, "").is_none());
        assert!(index.get(CategoryType::VaccinationCvxCode, "  ").is_none());
    }

    #[test]
    fn redirect_is_a_single_hop() {
        let index = index(cvx_catalog());
        let cvx = CategoryType::VaccinationCvxCode;

        assert_eq!(index.get(cvx, "43").map(|e| e.value.as_str()), Some("08"));
        // 42 -> 43 stops at 43 even though 43 is itself deprecated.
        assert_eq!(index.get(cvx, "42").map(|e| e.value.as_str()), Some("43"));
        // Replacement missing from the table.
        assert!(index.get(cvx, "31").is_none());
        // Deprecated without a replacement stays put.
        assert_eq!(index.get(cvx, "14").map(|e| e.value.as_str()), Some("14"));
        // Raw mode never redirects.
        assert_eq!(
            index
                .get_with(cvx, "43", Mapping::Raw)
                .map(|e| e.value.as_str()),
            Some("43")
        );
    }

    #[test]
    fn default_mapping_comes_from_options() {
        let index = CodeIndex::build(
            Arc::new(cvx_catalog()),
            IndexOptions::new().with_mapping(Mapping::Raw),
        );
        assert_eq!(
            index
                .get(CategoryType::VaccinationCvxCode, "43")
                .map(|e| e.value.as_str()),
            Some("43")
        );
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let catalog = cvx_catalog().with_category(Category {
            codeset: "SOMETHING_ELSE".to_string(),
            label: String::new(),
            entries: vec![Entry::new("X", "x")],
        });
        let index = index(catalog);
        assert_eq!(index.populated_categories(), vec![CategoryType::VaccinationCvxCode]);
        assert!(index.entries(CategoryType::Unknown).is_none());
        assert!(index.lookup(CategoryType::Unknown, "X").is_none());
        assert_eq!(index.categories().len(), 2);
    }

    #[test]
    fn listing_distinguishes_empty_from_unpopulated() {
        let catalog = Catalog::new()
            .with_category(Category::new(CategoryType::BodySite, "Body site"));
        let index = index(catalog);
        assert_eq!(index.entries(CategoryType::BodySite).map(|entries| Vec::len(&entries)), Some(0));
        assert!(index.entries(CategoryType::BodyRoute).is_none());
        assert!(!index.is_empty());
    }

    #[test]
    fn later_category_of_same_type_replaces_table() {
        let catalog = Catalog::new()
            .with_category(
                Category::new(CategoryType::BodyRoute, "old").with_entry(Entry::new("IM", "old")),
            )
            .with_category(
                Category::new(CategoryType::BodyRoute, "new").with_entry(Entry::new("SC", "new")),
            );
        let index = index(catalog);
        assert!(index.lookup(CategoryType::BodyRoute, "IM").is_none());
        assert!(index.lookup(CategoryType::BodyRoute, "SC").is_some());
    }
}
