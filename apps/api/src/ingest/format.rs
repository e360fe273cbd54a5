/// Decoding strategy chosen for a downloaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    /// No signal matched; only the printable-ASCII fallback applies.
    Unknown,
}

impl DocumentFormat {
    /// Content-type substrings are checked first; the URL suffix is consulted only
    /// when the content type matches nothing.
    pub fn detect(content_type: &str, url: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("pdf") {
            return DocumentFormat::Pdf;
        }
        if content_type.contains("wordprocessingml") {
            return DocumentFormat::Docx;
        }
        if content_type.contains("text") {
            return DocumentFormat::PlainText;
        }

        let path = url_path(url).to_ascii_lowercase();
        if path.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if path.ends_with(".docx") {
            DocumentFormat::Docx
        } else if path.ends_with(".txt") {
            DocumentFormat::PlainText
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Strips query string and fragment so signed storage URLs still match on suffix.
fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
