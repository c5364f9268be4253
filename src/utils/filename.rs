//! Filename sanitization and extension helpers.

/// Sanitize a string for use as a filename or path segment.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Trim and limit length. All-dot names would act as path traversal
    // when joined into a storage key, so they fall back too.
    let trimmed = sanitized.trim().trim_matches('_');
    if trimmed.chars().count() > 100 {
        trimmed.chars().take(100).collect()
    } else if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Extract the extension from a filename, if it has a plausible one.
///
/// Extensions longer than 5 characters or containing non-alphanumerics are
/// not treated as extensions (e.g. "v1.2-final" has none).
pub fn file_extension(name: &str) -> Option<&str> {
    let dot = name.rfind('.')?;
    let (basename, ext) = (&name[..dot], &name[dot + 1..]);
    if basename.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Uppercased extension used in generated display names. Defaults to `PDF`
/// when the filename carries no usable extension.
pub fn display_extension(name: &str) -> String {
    file_extension(name)
        .map(|ext| ext.to_uppercase())
        .unwrap_or_else(|| "PDF".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename("///"), "document");
        assert_eq!(sanitize_filename("  "), "document");
        assert_eq!(sanitize_filename(".."), "document");
    }

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(
            sanitize_filename("ABC Construction_Invoice_001.PDF"),
            "ABC Construction_Invoice_001.PDF"
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("invoice.pdf"), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension("invoice"), None);
        assert_eq!(file_extension(".gitignore"), None);
        assert_eq!(file_extension("notes.v1-final"), None);
    }

    #[test]
    fn test_display_extension_defaults_to_pdf() {
        assert_eq!(display_extension("invoice"), "PDF");
        assert_eq!(display_extension("invoice.docx"), "DOCX");
        assert_eq!(display_extension("scan.JPG"), "JPG");
    }
}
