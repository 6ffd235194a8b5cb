//! The pre-parsed catalog object graph handed to the index.

use serde::{Deserialize, Serialize};

use crate::category::CategoryType;
use crate::entry::Entry;

/// A named group of entries sharing one codeset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// External type code (e.g. "VACCINATION_CVX_CODE").
    #[serde(rename = "type")]
    pub codeset: String,

    /// Display label (e.g. "Vaccine CVX codes").
    #[serde(default)]
    pub label: String,

    #[serde(default, rename = "code")]
    pub entries: Vec<Entry>,
}

impl Category {
    pub fn new(category: CategoryType, label: impl Into<String>) -> Self {
        Self {
            codeset: category.as_str().to_string(),
            label: label.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn category(&self) -> CategoryType {
        CategoryType::from_type_code(&self.codeset)
    }
}

/// Root of a codebase release: categories in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default, rename = "codeset")]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    /// First category of the given type, in document order.
    pub fn category(&self, category: CategoryType) -> Option<&Category> {
        self.categories.iter().find(|c| c.category() == category)
    }

    /// Total number of entries across all categories.
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }
}
