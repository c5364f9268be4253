//! Upload context value objects.
//!
//! A [`FilingContext`] travels with every upload batch and is captured
//! verbatim inside the stored document's filing metadata, so a filing
//! decision can be reconstructed after the fact.

use serde::{Deserialize, Serialize};

/// Where in the application the upload originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadLocation {
    PlanCard,
    ConsultantCard,
    ContractorCard,
    DocumentCard,
    #[default]
    General,
}

impl UploadLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlanCard => "plan_card",
            Self::ConsultantCard => "consultant_card",
            Self::ContractorCard => "contractor_card",
            Self::DocumentCard => "document_card",
            Self::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plan_card" => Some(Self::PlanCard),
            "consultant_card" => Some(Self::ConsultantCard),
            "contractor_card" => Some(Self::ContractorCard),
            "document_card" => Some(Self::DocumentCard),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// Which kind of card an upload is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardType {
    Consultant,
    Contractor,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consultant => "CONSULTANT",
            Self::Contractor => "CONTRACTOR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONSULTANT" => Some(Self::Consultant),
            "CONTRACTOR" => Some(Self::Contractor),
            _ => None,
        }
    }
}

/// Context accompanying an upload batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingContext {
    /// Where the upload originated.
    #[serde(default)]
    pub upload_location: UploadLocation,
    /// Card type, when uploading from a consultant or contractor card.
    pub card_type: Option<CardType>,
    /// Discipline (consultants) or trade (contractors) label.
    pub discipline_or_trade: Option<String>,
    /// Section name hint used when the filename matches no category.
    pub section_name: Option<String>,
    /// Firm the document relates to, if any.
    pub firm_name: Option<String>,
    /// Whether the document should also appear in the general document listing.
    #[serde(default)]
    pub show_in_documents: bool,
}

/// Caller-supplied filing that bypasses automatic classification.
///
/// Path and display name are used verbatim and the document is recorded as
/// manually filed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFiling {
    pub folder_path: String,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_location_round_trip() {
        for loc in [
            UploadLocation::PlanCard,
            UploadLocation::ConsultantCard,
            UploadLocation::ContractorCard,
            UploadLocation::DocumentCard,
            UploadLocation::General,
        ] {
            assert_eq!(UploadLocation::parse(loc.as_str()), Some(loc));
        }
        assert_eq!(UploadLocation::parse("unknown"), None);
    }

    #[test]
    fn test_card_type_serde_uses_uppercase() {
        let json = serde_json::to_string(&CardType::Contractor).unwrap();
        assert_eq!(json, "\"CONTRACTOR\"");
    }

    #[test]
    fn test_default_context() {
        let ctx = FilingContext::default();
        assert_eq!(ctx.upload_location, UploadLocation::General);
        assert!(ctx.firm_name.is_none());
        assert!(!ctx.show_in_documents);
    }
}
