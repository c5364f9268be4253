//! Document category classification.
//!
//! Pure keyword matching over the filename, falling back to the context's
//! section-name hint. Categories are not mutually exclusive by naming alone,
//! so matching runs in a strict priority order and the first match wins.
//! Filename patterns always take priority over context hints.

use serde::{Deserialize, Serialize};

use crate::models::FilingContext;

/// The purpose classification of a document, driving its filing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A firm's invoice.
    Invoice,
    /// A tender submission / tender response from a firm.
    Submission,
    /// Tender review recommendation.
    Trr,
    /// Request for tender.
    Rft,
    /// Addendum or amendment to tender documents.
    Addendum,
    /// Anything else; refined further by upload location.
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Submission => "submission",
            Self::Trr => "trr",
            Self::Rft => "rft",
            Self::Addendum => "addendum",
            Self::General => "general",
        }
    }
}

fn is_invoice(s: &str) -> bool {
    s.contains("invoice") || s.contains("inv")
}

fn is_submission(s: &str) -> bool {
    s.contains("submission") || s.contains("tender response")
}

fn is_trr(s: &str) -> bool {
    s.contains("trr") || s.contains("recommendation")
}

fn is_rft(s: &str) -> bool {
    s.contains("rft") || s.contains("request for tender")
}

fn is_addendum(s: &str) -> bool {
    s.contains("addendum") || s.contains("amendment")
}

/// Classify a file by name and upload context.
///
/// Case-insensitive substring matching in priority order: invoice,
/// submission, TRR, RFT, addendum against the filename; then addendum,
/// submission, TRR, RFT against the section-name hint; then general.
pub fn classify(file_name: &str, context: &FilingContext) -> Category {
    let name = file_name.to_lowercase();

    if is_invoice(&name) {
        return Category::Invoice;
    }
    if is_submission(&name) {
        return Category::Submission;
    }
    if is_trr(&name) {
        return Category::Trr;
    }
    if is_rft(&name) {
        return Category::Rft;
    }
    if is_addendum(&name) {
        return Category::Addendum;
    }

    // Section hints are weaker evidence than the filename, and use a
    // different priority order.
    if let Some(section) = &context.section_name {
        let section = section.to_lowercase();
        if is_addendum(&section) {
            return Category::Addendum;
        }
        if is_submission(&section) {
            return Category::Submission;
        }
        if is_trr(&section) {
            return Category::Trr;
        }
        if is_rft(&section) {
            return Category::Rft;
        }
    }

    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FilingContext {
        FilingContext::default()
    }

    #[test]
    fn test_filename_keywords() {
        assert_eq!(classify("march-invoice.pdf", &ctx()), Category::Invoice);
        assert_eq!(classify("INV-0042.pdf", &ctx()), Category::Invoice);
        assert_eq!(classify("tender response v2.docx", &ctx()), Category::Submission);
        assert_eq!(classify("TRR_electrical.pdf", &ctx()), Category::Trr);
        assert_eq!(classify("final recommendation.pdf", &ctx()), Category::Trr);
        assert_eq!(classify("RFT Structural.pdf", &ctx()), Category::Rft);
        assert_eq!(classify("request for tender.pdf", &ctx()), Category::Rft);
        assert_eq!(classify("Addendum 3.pdf", &ctx()), Category::Addendum);
        assert_eq!(classify("amendment-b.pdf", &ctx()), Category::Addendum);
        assert_eq!(classify("site photos.zip", &ctx()), Category::General);
    }

    #[test]
    fn test_priority_invoice_beats_submission() {
        // Both keywords present: order is deterministic and total.
        assert_eq!(
            classify("invoice for submission.pdf", &ctx()),
            Category::Invoice
        );
    }

    #[test]
    fn test_priority_submission_beats_trr() {
        assert_eq!(
            classify("submission recommendation.pdf", &ctx()),
            Category::Submission
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify("INVOICE.PDF", &ctx()), Category::Invoice);
        assert_eq!(classify("AdDeNdUm.pdf", &ctx()), Category::Addendum);
    }

    #[test]
    fn test_section_hint_fallback() {
        let mut context = ctx();
        context.section_name = Some("Tender Submissions".to_string());
        assert_eq!(classify("scan0001.pdf", &context), Category::Submission);

        context.section_name = Some("Addenda and amendments".to_string());
        assert_eq!(classify("scan0001.pdf", &context), Category::Addendum);

        context.section_name = Some("RFT documents".to_string());
        assert_eq!(classify("scan0001.pdf", &context), Category::Rft);
    }

    #[test]
    fn test_filename_beats_section_hint() {
        let mut context = ctx();
        context.section_name = Some("Submissions".to_string());
        // Documented behavior, not incidental: filename wins.
        assert_eq!(classify("invoice-jan.pdf", &context), Category::Invoice);
    }

    #[test]
    fn test_no_match_is_general() {
        let mut context = ctx();
        context.section_name = Some("Site establishment".to_string());
        assert_eq!(classify("photo.jpg", &context), Category::General);
    }
}
