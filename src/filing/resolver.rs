//! Folder path and display name resolution.
//!
//! Given a classified category and the upload context, produce the target
//! folder path and a generated display name. Sequence numbers are derived
//! from live counts of matching active documents; there is no counter table,
//! so the next number is purely a function of store contents. Firm
//! resolution happens before sequence counting so the firm's canonical name
//! is the one counted and embedded in the generated name.

use std::sync::Arc;

use crate::models::{CardType, FilingContext, UploadLocation};
use crate::repository::{DocumentStore, Result as StoreResult};
use crate::services::FirmRegistry;
use crate::utils::display_extension;

use super::classifier::{classify, Category};

/// Fixed folder for invoices.
pub const INVOICES_FOLDER: &str = "Invoices";
/// Catch-all folder for planning, cost, and unrecognized uploads.
pub const MISC_FOLDER: &str = "Miscellaneous";
/// Default discipline/trade label when the context supplies none.
pub const DEFAULT_SECTION_LABEL: &str = "General";
/// Firm label used when filing implies a firm but none is named.
pub const UNKNOWN_FIRM: &str = "Unknown";

/// Outcome of resolving a filing.
#[derive(Debug, Clone)]
pub struct ResolvedFiling {
    pub category: Category,
    pub folder_path: String,
    pub display_name: String,
    /// Firm created or reused during resolution, if the filing implied one.
    pub firm_id: Option<String>,
}

/// Advisory pre-upload preview of a filing. Never to be trusted as the final
/// filed result: no firm lookup and no live sequence count backs it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PreviewFiling {
    pub folder_path: String,
    pub display_name: String,
}

/// Resolves filings against live store contents.
#[derive(Clone)]
pub struct FilingPathResolver {
    documents: Arc<dyn DocumentStore>,
    firms: FirmRegistry,
}

impl FilingPathResolver {
    pub fn new(documents: Arc<dyn DocumentStore>, firms: FirmRegistry) -> Self {
        Self { documents, firms }
    }

    /// Resolve the folder path and display name for a classified file.
    ///
    /// Categories whose generated name embeds a firm (invoice, submission,
    /// TRR) resolve the firm through the registry first, creating it on
    /// first sight and adopting its canonical name.
    pub async fn resolve(
        &self,
        category: Category,
        context: &FilingContext,
        file_name: &str,
        project_id: &str,
        actor: &str,
    ) -> StoreResult<ResolvedFiling> {
        let (firm_name, firm_id) = if category_names_firm(category) {
            match &context.firm_name {
                Some(name) => {
                    let firm = self.firms.resolve(project_id, name, actor).await?;
                    (firm.entity.clone(), Some(firm.id))
                }
                None => (UNKNOWN_FIRM.to_string(), None),
            }
        } else {
            (UNKNOWN_FIRM.to_string(), None)
        };

        let folder_path = folder_for(category, context, file_name);
        let seq = match sequence_fragment(category, &firm_name) {
            Some(fragment) => {
                self.documents
                    .count_active_matching(project_id, &folder_path, &fragment)
                    .await?
                    + 1
            }
            None => 1,
        };

        let display_name = display_name_for(category, context, file_name, &firm_name, seq);

        Ok(ResolvedFiling {
            category,
            folder_path,
            display_name,
            firm_id,
        })
    }

    /// Preview the filing for a file without touching the store.
    ///
    /// Identical computation to [`resolve`](Self::resolve) except the firm
    /// name is taken from the context as-is and sequence numbers are a
    /// best-effort `1`.
    pub fn preview(file_name: &str, context: &FilingContext) -> PreviewFiling {
        let category = classify(file_name, context);
        let firm_name = context
            .firm_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_FIRM.to_string());
        PreviewFiling {
            folder_path: folder_for(category, context, file_name),
            display_name: display_name_for(category, context, file_name, &firm_name, 1),
        }
    }
}

/// Whether a category's generated display name embeds a firm name.
fn category_names_firm(category: Category) -> bool {
    matches!(
        category,
        Category::Invoice | Category::Submission | Category::Trr
    )
}

/// The active-document name fragment counted for sequence numbering.
fn sequence_fragment(category: Category, firm_name: &str) -> Option<String> {
    match category {
        Category::Invoice => Some(firm_name.to_string()),
        Category::Submission => Some("Submission".to_string()),
        Category::Addendum => Some("Addendum".to_string()),
        Category::Trr | Category::Rft | Category::General => None,
    }
}

/// Discipline-or-trade section path: `Consultants/{label}` or
/// `Contractors/{label}` depending on card type.
fn section_path(context: &FilingContext) -> String {
    let base = match context.card_type {
        Some(CardType::Contractor) => "Contractors",
        // Default base when the card type is absent.
        Some(CardType::Consultant) | None => "Consultants",
    };
    let label = context
        .discipline_or_trade
        .as_deref()
        .unwrap_or(DEFAULT_SECTION_LABEL);
    format!("{}/{}", base, label)
}

/// Target folder for a category.
fn folder_for(category: Category, context: &FilingContext, file_name: &str) -> String {
    match category {
        Category::Invoice => INVOICES_FOLDER.to_string(),
        Category::Submission | Category::Trr | Category::Rft | Category::Addendum => {
            section_path(context)
        }
        Category::General => general_folder(context, file_name),
    }
}

/// Refinement of the general category by filename and upload location.
fn general_folder(context: &FilingContext, file_name: &str) -> String {
    let name = file_name.to_lowercase();
    if name.contains("planning") || name.contains("plan") || name.contains("cost") {
        return MISC_FOLDER.to_string();
    }
    match context.upload_location {
        UploadLocation::PlanCard => MISC_FOLDER.to_string(),
        UploadLocation::ConsultantCard => match &context.discipline_or_trade {
            Some(discipline) => format!("Consultants/{}", discipline),
            None => MISC_FOLDER.to_string(),
        },
        UploadLocation::ContractorCard => match &context.discipline_or_trade {
            Some(trade) => format!("Contractors/{}", trade),
            None => MISC_FOLDER.to_string(),
        },
        // Default for unrecognized uploads.
        UploadLocation::DocumentCard | UploadLocation::General => MISC_FOLDER.to_string(),
    }
}

/// Generated display name for a category.
fn display_name_for(
    category: Category,
    context: &FilingContext,
    file_name: &str,
    firm_name: &str,
    seq: u64,
) -> String {
    let ext = display_extension(file_name);
    let label = context
        .discipline_or_trade
        .as_deref()
        .unwrap_or(DEFAULT_SECTION_LABEL);
    match category {
        Category::Invoice => format!("{}_Invoice_{:03}.{}", firm_name, seq, ext),
        Category::Submission => format!("{}_Submission_{:02}.{}", firm_name, seq, ext),
        // One TRR expected per firm per discipline; no sequence.
        Category::Trr => format!("{}_TRR.{}", firm_name, ext),
        Category::Rft => format!("RFT_{}.{}", label, ext),
        Category::Addendum => format!("Addendum_{:02}.{}", seq, ext),
        // Unclassified uploads keep their original name.
        Category::General => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilingContext;

    fn ctx() -> FilingContext {
        FilingContext::default()
    }

    #[test]
    fn test_preview_invoice_defaults() {
        let mut context = ctx();
        context.firm_name = Some("ABC Construction".to_string());
        let preview = FilingPathResolver::preview("invoice-march.pdf", &context);
        assert_eq!(preview.folder_path, "Invoices");
        assert_eq!(preview.display_name, "ABC Construction_Invoice_001.PDF");
    }

    #[test]
    fn test_preview_invoice_without_firm_or_extension() {
        let preview = FilingPathResolver::preview("invoice", &ctx());
        assert_eq!(preview.folder_path, "Invoices");
        assert_eq!(preview.display_name, "Unknown_Invoice_001.PDF");
    }

    #[test]
    fn test_preview_submission_contractor_path() {
        let mut context = ctx();
        context.card_type = Some(CardType::Contractor);
        context.discipline_or_trade = Some("Electrical".to_string());
        context.firm_name = Some("Sparks Ltd".to_string());
        let preview = FilingPathResolver::preview("tender response.docx", &context);
        assert_eq!(preview.folder_path, "Contractors/Electrical");
        assert_eq!(preview.display_name, "Sparks Ltd_Submission_01.DOCX");
    }

    #[test]
    fn test_preview_submission_defaults_to_consultants_general() {
        let preview = FilingPathResolver::preview("submission.pdf", &ctx());
        assert_eq!(preview.folder_path, "Consultants/General");
        assert_eq!(preview.display_name, "Unknown_Submission_01.PDF");
    }

    #[test]
    fn test_preview_trr_has_no_sequence() {
        let mut context = ctx();
        context.card_type = Some(CardType::Consultant);
        context.discipline_or_trade = Some("Structural".to_string());
        context.firm_name = Some("BuildCo".to_string());
        let preview = FilingPathResolver::preview("TRR final.pdf", &context);
        assert_eq!(preview.folder_path, "Consultants/Structural");
        assert_eq!(preview.display_name, "BuildCo_TRR.PDF");
    }

    #[test]
    fn test_preview_rft_uses_label_not_firm() {
        let mut context = ctx();
        context.discipline_or_trade = Some("Hydraulics".to_string());
        context.firm_name = Some("Ignored Pty".to_string());
        let preview = FilingPathResolver::preview("RFT hydraulics.pdf", &context);
        assert_eq!(preview.folder_path, "Consultants/Hydraulics");
        assert_eq!(preview.display_name, "RFT_Hydraulics.PDF");
    }

    #[test]
    fn test_preview_addendum() {
        let preview = FilingPathResolver::preview("Addendum.pdf", &ctx());
        assert_eq!(preview.folder_path, "Consultants/General");
        assert_eq!(preview.display_name, "Addendum_01.PDF");
    }

    #[test]
    fn test_general_plan_keyword_goes_to_misc() {
        let preview = FilingPathResolver::preview("site plan.jpg", &ctx());
        assert_eq!(preview.folder_path, MISC_FOLDER);
        // Name unchanged for general uploads.
        assert_eq!(preview.display_name, "site plan.jpg");
    }

    #[test]
    fn test_general_cost_keyword_goes_to_misc() {
        let preview = FilingPathResolver::preview("cost summary.xlsx", &ctx());
        assert_eq!(preview.folder_path, MISC_FOLDER);
        assert_eq!(preview.display_name, "cost summary.xlsx");
    }

    #[test]
    fn test_general_consultant_card_with_discipline() {
        let mut context = ctx();
        context.upload_location = UploadLocation::ConsultantCard;
        context.discipline_or_trade = Some("Acoustics".to_string());
        let preview = FilingPathResolver::preview("scan01.pdf", &context);
        assert_eq!(preview.folder_path, "Consultants/Acoustics");
        assert_eq!(preview.display_name, "scan01.pdf");
    }

    #[test]
    fn test_general_contractor_card_without_trade_falls_to_misc() {
        let mut context = ctx();
        context.upload_location = UploadLocation::ContractorCard;
        let preview = FilingPathResolver::preview("scan01.pdf", &context);
        assert_eq!(preview.folder_path, MISC_FOLDER);
    }

    #[test]
    fn test_general_plan_card_goes_to_misc() {
        let mut context = ctx();
        context.upload_location = UploadLocation::PlanCard;
        let preview = FilingPathResolver::preview("elevation-a.pdf", &context);
        assert_eq!(preview.folder_path, MISC_FOLDER);
    }
}
