//! Coded records (entries) and their outbound links.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::CategoryType;
use crate::date::parse_code_date;
use crate::error::{ModelError, Result};

/// Lifecycle status of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all_fields = "camelCase")]
pub enum CodeStatus {
    #[default]
    Valid,
    Invalid,
    Ignored,
    /// Retired code. `new_code_value` names its replacement in the same category.
    Deprecated {
        #[serde(default)]
        new_code_value: Option<String>,
    },
}

impl CodeStatus {
    /// Build a status from the textual form used by catalog documents.
    pub fn from_status_text(status: &str, new_code_value: Option<String>) -> Result<Self> {
        match status.trim().to_uppercase().as_str() {
            "VALID" => Ok(CodeStatus::Valid),
            "INVALID" => Ok(CodeStatus::Invalid),
            "IGNORED" => Ok(CodeStatus::Ignored),
            "DEPRECATED" => Ok(CodeStatus::Deprecated {
                new_code_value: new_code_value.filter(|v| !v.trim().is_empty()),
            }),
            _ => Err(ModelError::UnknownStatus {
                status: status.to_string(),
            }),
        }
    }

    /// Replacement value, when this status is a deprecation with a redirect.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            CodeStatus::Deprecated {
                new_code_value: Some(value),
            } => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Validity interval of an entry, as raw `YYYYMMDD` strings.
///
/// Either bound may be absent. Bounds are kept verbatim so a malformed
/// date in the source catalog is visible to callers; the parsed accessors
/// treat it as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_after: Option<String>,
}

impl UseDate {
    pub fn new(not_before: Option<&str>, not_after: Option<&str>) -> Self {
        Self {
            not_before: not_before.map(String::from),
            not_after: not_after.map(String::from),
        }
    }

    pub fn not_before_date(&self) -> Option<NaiveDate> {
        self.not_before.as_deref().and_then(parse_code_date)
    }

    /// Date used to order products: `not_before`, falling back to `not_after`.
    ///
    /// The first non-blank bound is chosen before parsing. A malformed
    /// `not_before` therefore yields `None` rather than falling through.
    pub fn effective_start(&self) -> Option<NaiveDate> {
        [self.not_before.as_deref(), self.not_after.as_deref()]
            .into_iter()
            .flatten()
            .find(|raw| !raw.trim().is_empty())
            .and_then(parse_code_date)
    }
}

/// A typed reference from an entry to an entry in another category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// External type code of the target category.
    pub codeset: String,
    /// Value of the target entry.
    pub value: String,
}

impl Link {
    pub fn new(category: CategoryType, value: impl Into<String>) -> Self {
        Self {
            codeset: category.as_str().to_string(),
            value: value.into(),
        }
    }

    /// Target category; unrecognised codesets resolve to [`CategoryType::Unknown`].
    pub fn category(&self) -> CategoryType {
        CategoryType::from_type_code(&self.codeset)
    }
}

/// One coded record of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Code value, unique within the owning category.
    pub value: String,

    /// Human-readable label (e.g. "Hep B, adolescent or pediatric").
    #[serde(default)]
    pub label: String,

    /// Concept type tag (e.g. "Vaccine", "Package").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<String>,

    #[serde(default, rename = "codeStatus")]
    pub status: CodeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_date: Option<UseDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl Entry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            concept_type: None,
            status: CodeStatus::Valid,
            use_date: None,
            links: Vec::new(),
        }
    }

    pub fn with_concept_type(mut self, concept_type: impl Into<String>) -> Self {
        self.concept_type = Some(concept_type.into());
        self
    }

    pub fn with_status(mut self, status: CodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as deprecated in favour of `new_value`.
    pub fn deprecated_to(self, new_value: impl Into<String>) -> Self {
        self.with_status(CodeStatus::Deprecated {
            new_code_value: Some(new_value.into()),
        })
    }

    pub fn with_use_date(mut self, not_before: Option<&str>, not_after: Option<&str>) -> Self {
        self.use_date = Some(UseDate::new(not_before, not_after));
        self
    }

    pub fn with_link(mut self, category: CategoryType, value: impl Into<String>) -> Self {
        self.links.push(Link::new(category, value));
        self
    }

    /// Identity comparison across catalog rebuilds.
    ///
    /// Only `concept_type` and `value` take part; label, status, links and
    /// validity are ignored.
    pub fn same_identity(&self, other: &Entry) -> bool {
        self.concept_type == other.concept_type && self.value == other.value
    }

    pub fn effective_start(&self) -> Option<NaiveDate> {
        self.use_date.as_ref().and_then(UseDate::effective_start)
    }

    pub fn not_before_date(&self) -> Option<NaiveDate> {
        self.use_date.as_ref().and_then(UseDate::not_before_date)
    }
}
