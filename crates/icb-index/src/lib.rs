//! In-memory resolution index over an immunization codebase catalog.
//!
//! A [`CodeIndex`] is built once from a pre-parsed [`Catalog`] and answers:
//!
//! - exact and barcode-tolerant code lookups per category
//! - deprecation-aware lookups (one redirect hop)
//! - date-disambiguated product lookups by (CVX, MVX)
//! - traversal of the typed links between categories
//!
//! [`CodeMap`] owns the current index and swaps in a fully built
//! replacement on every reload.
//!
//! # Example
//!
//! ```
//! use icb_index::CodeMap;
//! use icb_model::{Catalog, Category, CategoryType, Entry};
//!
//! let catalog = Catalog::new().with_category(
//!     Category::new(CategoryType::VaccinationCvxCode, "CVX")
//!         .with_entry(Entry::new("08", "Hep B, adolescent or pediatric"))
//!         .with_entry(Entry::new("43", "Hep B, adult").deprecated_to("08")),
//! );
//! let map = CodeMap::new(catalog);
//! let index = map.snapshot();
//!
//! let hep_b = index.get(CategoryType::VaccinationCvxCode, "43").unwrap();
//! assert_eq!(hep_b.value, "08");
//! ```

pub mod index;
pub mod map;
pub mod options;
mod product;
mod table;

pub use icb_model::{Catalog, Category, CategoryType, CodeStatus, Entry, Link, UseDate};
pub use index::{CodeIndex, RelatedEntries};
pub use map::CodeMap;
pub use options::{IndexOptions, Mapping, ScannerVariantMode};
pub use product::start_order;
