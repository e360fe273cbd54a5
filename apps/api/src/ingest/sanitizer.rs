use crate::ingest::models::ExtractedText;

/// Texts scoring below this are replaced wholesale by [`UNREADABLE_PLACEHOLDER`].
pub const MIN_READABILITY: f64 = 0.5;

pub const UNREADABLE_PLACEHOLDER: &str = "The uploaded resume could not be read reliably. \
    The file may be scanned, image-based or use an unsupported encoding. \
    Please provide a text-based PDF, DOCX or TXT resume for a detailed analysis.";

/// Fraction of chars that are ASCII alphanumerics or whitespace. Empty text scores 0.
pub fn readability_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let readable = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .count();
    readable as f64 / total as f64
}

/// Collapses whitespace, swaps unreadable text for the placeholder and hard-truncates
/// to `max_chars`.
pub fn sanitize(text: &str, max_chars: usize) -> ExtractedText {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let readability = readability_ratio(&collapsed);
    let readable = readability >= MIN_READABILITY;

    let chosen = if readable {
        collapsed
    } else {
        tracing::warn!(readability, "Extracted text looks garbled, using placeholder");
        UNREADABLE_PLACEHOLDER.to_string()
    };

    ExtractedText {
        text: truncate_chars(chosen, max_chars),
        readability,
        readable,
    }
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text,
    }
}
