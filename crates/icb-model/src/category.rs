//! Codeset categories of the immunization codebase.
//!
//! Catalog documents tag every codeset (and every outbound link) with a
//! string type code such as `VACCINATION_CVX_CODE`. [`CategoryType`] is the
//! closed set of codes the index understands.
//!
//! Two resolvers are provided:
//!
//! - [`CategoryType::from_type_code`] is total: codes it does not recognise
//!   map to [`CategoryType::Unknown`], so a catalog carrying newer codesets
//!   still loads and links into them simply stay unresolved.
//! - [`FromStr`] is strict and reports unknown codes as an error.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Codeset type of a catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    /// CDC vaccine administered code (CVX).
    VaccinationCvxCode,
    /// CDC manufacturer code (MVX).
    VaccinationManufacturerCode,
    /// National Drug Code of the unit of sale (outer package).
    VaccinationNdcCodeUnitOfSale,
    /// National Drug Code of the unit of use (single dose).
    VaccinationNdcCodeUnitOfUse,
    /// Union of both NDC packaging levels.
    VaccinationNdcCode,
    /// Trade-name product, linked to its CVX and MVX.
    VaccineProduct,
    VaccineGroup,
    VaccinationCptCode,
    BodyRoute,
    BodySite,
    VaccinationInformationSource,
    VaccinationRefusal,
    VaccinationCompletion,
    VaccinationActionCode,
    VaccinationFundingSource,
    FinancialStatusCode,
    ObservationIdentifier,
    AdministrationUnit,
    EvidenceOfImmunity,
    VaccinationContraindication,
    /// A type code this index does not know about.
    Unknown,
}

impl CategoryType {
    /// Every known category, in declaration order. `Unknown` is excluded.
    pub const KNOWN: [CategoryType; 20] = [
        CategoryType::VaccinationCvxCode,
        CategoryType::VaccinationManufacturerCode,
        CategoryType::VaccinationNdcCodeUnitOfSale,
        CategoryType::VaccinationNdcCodeUnitOfUse,
        CategoryType::VaccinationNdcCode,
        CategoryType::VaccineProduct,
        CategoryType::VaccineGroup,
        CategoryType::VaccinationCptCode,
        CategoryType::BodyRoute,
        CategoryType::BodySite,
        CategoryType::VaccinationInformationSource,
        CategoryType::VaccinationRefusal,
        CategoryType::VaccinationCompletion,
        CategoryType::VaccinationActionCode,
        CategoryType::VaccinationFundingSource,
        CategoryType::FinancialStatusCode,
        CategoryType::ObservationIdentifier,
        CategoryType::AdministrationUnit,
        CategoryType::EvidenceOfImmunity,
        CategoryType::VaccinationContraindication,
    ];

    /// Returns the external type code as it appears in catalog documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::VaccinationCvxCode => "VACCINATION_CVX_CODE",
            CategoryType::VaccinationManufacturerCode => "VACCINATION_MANUFACTURER_CODE",
            CategoryType::VaccinationNdcCodeUnitOfSale => "VACCINATION_NDC_CODE_UNIT_OF_SALE",
            CategoryType::VaccinationNdcCodeUnitOfUse => "VACCINATION_NDC_CODE_UNIT_OF_USE",
            CategoryType::VaccinationNdcCode => "VACCINATION_NDC_CODE",
            CategoryType::VaccineProduct => "VACCINE_PRODUCT",
            CategoryType::VaccineGroup => "VACCINE_GROUP",
            CategoryType::VaccinationCptCode => "VACCINATION_CPT_CODE",
            CategoryType::BodyRoute => "BODY_ROUTE",
            CategoryType::BodySite => "BODY_SITE",
            CategoryType::VaccinationInformationSource => "VACCINATION_INFORMATION_SOURCE",
            CategoryType::VaccinationRefusal => "VACCINATION_REFUSAL",
            CategoryType::VaccinationCompletion => "VACCINATION_COMPLETION",
            CategoryType::VaccinationActionCode => "VACCINATION_ACTION_CODE",
            CategoryType::VaccinationFundingSource => "VACCINATION_FUNDING_SOURCE",
            CategoryType::FinancialStatusCode => "FINANCIAL_STATUS_CODE",
            CategoryType::ObservationIdentifier => "OBSERVATION_IDENTIFIER",
            CategoryType::AdministrationUnit => "ADMINISTRATION_UNIT",
            CategoryType::EvidenceOfImmunity => "EVIDENCE_OF_IMMUNITY",
            CategoryType::VaccinationContraindication => "VACCINATION_CONTRAINDICATION",
            CategoryType::Unknown => "UNKNOWN",
        }
    }

    /// Total resolver: unrecognised codes become [`CategoryType::Unknown`].
    pub fn from_type_code(code: &str) -> Self {
        code.parse().unwrap_or(CategoryType::Unknown)
    }

    /// Returns true for the NDC packaging categories, including the merged one.
    pub fn is_packaging(&self) -> bool {
        matches!(
            self,
            CategoryType::VaccinationNdcCodeUnitOfSale
                | CategoryType::VaccinationNdcCodeUnitOfUse
                | CategoryType::VaccinationNdcCode
        )
    }

    /// Returns true for the two packaging levels that feed the merged NDC table.
    pub fn feeds_packaging_union(&self) -> bool {
        matches!(
            self,
            CategoryType::VaccinationNdcCodeUnitOfSale | CategoryType::VaccinationNdcCodeUnitOfUse
        )
    }

    pub fn is_known(&self) -> bool {
        *self != CategoryType::Unknown
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deserializes through [`CategoryType::from_type_code`], so newer codesets load as `Unknown`.
impl<'de> Deserialize<'de> for CategoryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(CategoryType::from_type_code(&code))
    }
}

impl FromStr for CategoryType {
    type Err = ModelError;

    /// Strict parse of a type code (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        CategoryType::KNOWN
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownCategory {
                code: s.to_string(),
            })
    }
}
