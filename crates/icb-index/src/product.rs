//! Product disambiguation index.
//!
//! Several trade-name products can share one (CVX, MVX) pair, e.g. a
//! reformulated vaccine from the same manufacturer. Products are grouped by
//! that pair and ordered "most recently started first" so an administration
//! date can pick the one that was current at the time.
//!
//! ## Ordering
//!
//! A product's effective start is its `notBefore`, falling back to
//! `notAfter`. Products with an effective start are sorted descending.
//! Products without one keep the slot they were encountered in; the dated
//! products are sorted among the remaining slots. The sort is stable, so
//! equal starts keep encounter order.
//!
//! ## Selection
//!
//! Only `notBefore` takes part in selection. The first candidate whose start
//! is not after the administration date wins; if the date precedes every
//! start, the last candidate (the oldest) is returned. Gaps and overlaps
//! between neighbouring products are deliberately ignored.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use icb_model::{Category, CategoryType, Entry, parse_code_date};

use crate::table::EntryId;

/// Composite (vaccine CVX, manufacturer MVX) key.
type ProductKey = (String, String);

/// A product candidate with its dates resolved once at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProductSlot {
    pub(crate) id: EntryId,
    start: Option<NaiveDate>,
    not_before: Option<NaiveDate>,
}

impl ProductSlot {
    fn new(id: EntryId, entry: &Entry) -> Self {
        Self {
            id,
            start: entry.effective_start(),
            not_before: entry.not_before_date(),
        }
    }
}

/// Order two effective start dates, later first.
///
/// Returns `None` when either date is unknown: such pairs have no defined
/// order and are left where they were encountered.
pub fn start_order(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Option<Ordering> {
    match (left, right) {
        (Some(left), Some(right)) => Some(right.cmp(&left)),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub(crate) struct ProductIndex {
    by_key: HashMap<ProductKey, Vec<ProductSlot>>,
}

impl ProductIndex {
    /// Index every product of a product category that links to both a CVX and an MVX.
    pub(crate) fn index_category(&mut self, category_idx: usize, category: &Category) {
        let mut touched = Vec::new();
        for (entry_idx, product) in category.entries.iter().enumerate() {
            let Some(key) = product_key(product) else {
                tracing::trace!(
                    value = %product.value,
                    "Product lacks a CVX or MVX link; not indexed"
                );
                continue;
            };
            let id = EntryId {
                category: category_idx,
                entry: entry_idx,
            };
            let slots = self.by_key.entry(key.clone()).or_default();
            slots.push(ProductSlot::new(id, product));
            if slots.len() > 1 {
                touched.push(key);
            }
        }

        touched.sort();
        touched.dedup();
        for key in touched {
            if let Some(slots) = self.by_key.get_mut(&key) {
                tracing::trace!(cvx = %key.0, mvx = %key.1, count = slots.len(), "Sorting products");
                order_by_start(slots);
            }
        }
    }

    pub(crate) fn candidates(&self, cvx: &str, mvx: &str) -> &[ProductSlot] {
        if cvx.trim().is_empty() || mvx.trim().is_empty() {
            return &[];
        }
        self.by_key
            .get(&(cvx.to_string(), mvx.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }
}

/// Extract the (CVX, MVX) key from a product's links. The last link of each kind wins.
fn product_key(product: &Entry) -> Option<ProductKey> {
    let mut cvx = None;
    let mut mvx = None;
    for link in &product.links {
        match link.category() {
            CategoryType::VaccinationCvxCode => cvx = Some(link.value.clone()),
            CategoryType::VaccinationManufacturerCode => mvx = Some(link.value.clone()),
            _ => {}
        }
    }
    Some((cvx?, mvx?))
}

/// Sort dated slots descending by start while undated slots stay in place.
pub(crate) fn order_by_start(slots: &mut [ProductSlot]) {
    let positions: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.start.is_some())
        .map(|(idx, _)| idx)
        .collect();
    let mut dated: Vec<ProductSlot> = positions.iter().map(|&idx| slots[idx]).collect();
    dated.sort_by(|left, right| start_order(left.start, right.start).unwrap_or(Ordering::Equal));
    for (idx, slot) in positions.into_iter().zip(dated) {
        slots[idx] = slot;
    }
}

/// Pick one candidate for an administration date.
pub(crate) fn select(slots: &[ProductSlot], admin_date: Option<&str>) -> Option<EntryId> {
    match slots {
        [] => None,
        [only] => Some(only.id),
        _ => {
            let raw = admin_date.filter(|d| !d.trim().is_empty())?;
            let admin = parse_code_date(raw);
            let chosen = slots
                .iter()
                .find(|slot| has_started(slot.not_before, admin))
                .or_else(|| slots.last());
            tracing::trace!(
                admin_date = raw,
                candidates = slots.len(),
                chosen = ?chosen.map(|slot| slot.id),
                "Disambiguated product by date"
            );
            chosen.map(|slot| slot.id)
        }
    }
}

/// A start that is unknown, or an administration date that is unknown, never excludes.
fn has_started(not_before: Option<NaiveDate>, admin: Option<NaiveDate>) -> bool {
    match (admin, not_before) {
        (Some(admin), Some(start)) => admin >= start,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> Option<NaiveDate> {
        parse_code_date(raw)
    }

    fn slot(entry: usize, start: Option<&str>) -> ProductSlot {
        ProductSlot {
            id: EntryId { category: 0, entry },
            start: start.and_then(parse_code_date),
            not_before: start.and_then(parse_code_date),
        }
    }

    fn order(slots: &[ProductSlot]) -> Vec<usize> {
        slots.iter().map(|s| s.id.entry).collect()
    }

    #[test]
    fn start_order_is_descending_and_partial() {
        assert_eq!(
            start_order(date("20150101"), date("20100101")),
            Some(Ordering::Less)
        );
        assert_eq!(
            start_order(date("20100101"), date("20150101")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            start_order(date("20100101"), date("20100101")),
            Some(Ordering::Equal)
        );
        assert_eq!(start_order(None, date("20100101")), None);
        assert_eq!(start_order(None, None), None);
    }

    #[test]
    fn dated_slots_sort_descending() {
        let mut slots = vec![
            slot(0, Some("20100101")),
            slot(1, Some("20150101")),
            slot(2, Some("20120101")),
        ];
        order_by_start(&mut slots);
        assert_eq!(order(&slots), vec![1, 2, 0]);
    }

    #[test]
    fn undated_slots_keep_their_position() {
        let mut slots = vec![
            slot(0, Some("20100101")),
            slot(1, None),
            slot(2, Some("20150101")),
            slot(3, None),
            slot(4, Some("20120101")),
        ];
        order_by_start(&mut slots);
        assert_eq!(order(&slots), vec![2, 1, 4, 3, 0]);
    }

    #[test]
    fn equal_starts_keep_encounter_order() {
        let mut slots = vec![
            slot(0, Some("20100101")),
            slot(1, Some("20100101")),
            slot(2, Some("20200101")),
        ];
        order_by_start(&mut slots);
        assert_eq!(order(&slots), vec![2, 0, 1]);
    }

    #[test]
    fn single_candidate_ignores_date() {
        let slots = vec![slot(7, Some("20200101"))];
        assert_eq!(select(&slots, None).map(|id| id.entry), Some(7));
        assert_eq!(select(&slots, Some("19000101")).map(|id| id.entry), Some(7));
    }

    #[test]
    fn ambiguous_without_date_is_absent() {
        let slots = vec![slot(1, Some("20150101")), slot(0, Some("20100101"))];
        assert_eq!(select(&slots, None), None);
        assert_eq!(select(&slots, Some("   ")), None);
        assert_eq!(select(&[], Some("20150101")), None);
    }

    #[test]
    fn picks_most_recent_started_product() {
        let slots = vec![slot(1, Some("20150101")), slot(0, Some("20100101"))];
        let pick = |d| select(&slots, Some(d)).map(|id| id.entry);
        assert_eq!(pick("20120101"), Some(0));
        assert_eq!(pick("20200101"), Some(1));
        assert_eq!(pick("20150101"), Some(1)); // start day itself counts
        assert_eq!(pick("20050101"), Some(0)); // before everything: oldest
    }

    #[test]
    fn unparseable_admin_date_takes_first_candidate() {
        let slots = vec![slot(1, Some("20150101")), slot(0, Some("20100101"))];
        assert_eq!(
            select(&slots, Some("last tuesday")).map(|id| id.entry),
            Some(1)
        );
    }

    #[test]
    fn undated_candidate_counts_as_started() {
        let slots = vec![slot(1, Some("20150101")), slot(0, None)];
        assert_eq!(select(&slots, Some("20050101")).map(|id| id.entry), Some(0));
    }

    #[test]
    fn product_key_needs_both_links() {
        let full = Entry::new("P", "P")
            .with_link(CategoryType::VaccinationCvxCode, "08")
            .with_link(CategoryType::VaccinationManufacturerCode, "MSD")
            .with_link(CategoryType::VaccinationCvxCode, "45");
        assert_eq!(
            product_key(&full),
            Some(("45".to_string(), "MSD".to_string()))
        );

        let cvx_only = Entry::new("P", "P").with_link(CategoryType::VaccinationCvxCode, "08");
        assert_eq!(product_key(&cvx_only), None);
    }

    #[test]
    fn blank_key_parts_have_no_candidates() {
        let mut index = ProductIndex::default();
        let category = Category::new(CategoryType::VaccineProduct, "").with_entry(
            Entry::new("P", "P")
                .with_link(CategoryType::VaccinationCvxCode, "08")
                .with_link(CategoryType::VaccinationManufacturerCode, "MSD"),
        );
        index.index_category(0, &category);
        assert_eq!(index.len(), 1);
        assert_eq!(index.candidates("08", "MSD").len(), 1);
        assert!(index.candidates("", "MSD").is_empty());
        assert!(index.candidates("08", " ").is_empty());
        assert!(index.candidates("08", "PFR").is_empty());
    }
}
