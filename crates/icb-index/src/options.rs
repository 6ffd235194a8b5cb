//! Configuration options for index lookups.

use serde::{Deserialize, Serialize};

/// Whether a lookup follows deprecation redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mapping {
    /// Return the stored entry as-is, deprecated or not.
    Raw,
    /// Replace a deprecated entry by its replacement (one hop).
    #[default]
    Mapped,
}

/// Handling of mis-scanned NDC barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScannerVariantMode {
    /// Never retry a missed lookup.
    Off,
    /// Retry 12/14 character packaging codes without their first character.
    #[default]
    Strip,
}

/// Options controlling how a [`CodeIndex`](crate::CodeIndex) answers queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Mode used by [`CodeIndex::get`](crate::CodeIndex::get).
    pub mapping: Mapping,

    /// Barcode variant retry for packaging categories.
    pub scanner_variants: ScannerVariantMode,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact lookups only: no redirects, no barcode variants.
    pub fn raw() -> Self {
        Self {
            mapping: Mapping::Raw,
            scanner_variants: ScannerVariantMode::Off,
        }
    }

    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_scanner_variants(mut self, mode: ScannerVariantMode) -> Self {
        self.scanner_variants = mode;
        self
    }
}
