//! Per-format text extraction with fallbacks.
//!
//! PDF failures degrade to a placeholder message; DOCX failures abort the request.
//! Anything that yields too little text goes through the printable-ASCII fallback.

use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, Table, TableCellContent, TableChild, TableRowChild,
};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::ingest::format::DocumentFormat;
use crate::ingest::models::RawDocument;
use crate::ingest::IngestError;

/// Extracted text must be longer than this (in chars, trimmed) to be accepted.
pub const MIN_TEXT_CHARS: usize = 50;

/// Extracts raw text from a downloaded document.
/// `now` is embedded in the PDF placeholder when a PDF cannot be read.
pub fn extract_text(doc: &RawDocument, now: DateTime<Utc>) -> Result<String, IngestError> {
    let format = DocumentFormat::detect(&doc.content_type, &doc.source_url);
    debug!(?format, size = doc.size(), "Extracting resume text");

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(&doc.bytes, now),
        DocumentFormat::Docx => extract_docx(&doc.bytes)?,
        DocumentFormat::PlainText => String::from_utf8_lossy(&doc.bytes).into_owned(),
        DocumentFormat::Unknown => String::new(),
    };

    if is_long_enough(&text) {
        return Ok(text.trim().to_string());
    }

    debug!(?format, "Primary extraction too short, using printable-ASCII fallback");
    let fallback = printable_ascii_fallback(&doc.bytes);
    if is_long_enough(&fallback) {
        Ok(fallback)
    } else {
        Err(IngestError::Unextractable)
    }
}

pub fn is_long_enough(text: &str) -> bool {
    text.trim().chars().count() > MIN_TEXT_CHARS
}

/// Decodes a PDF page by page. Never fails: unreadable PDFs yield a placeholder.
pub fn extract_pdf(bytes: &[u8], now: DateTime<Utc>) -> String {
    // pdf-extract panics on some malformed inputs
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    let text = match pages {
        Ok(Ok(pages)) => join_pdf_pages(&pages),
        Ok(Err(e)) => {
            warn!("PDF decoding failed: {e}");
            String::new()
        }
        Err(_) => {
            warn!("PDF decoder panicked");
            String::new()
        }
    };

    if is_long_enough(&text) {
        text
    } else {
        warn!(size = bytes.len(), "PDF yielded no usable text, substituting placeholder");
        pdf_placeholder(bytes.len(), now)
    }
}

/// Message stored in place of text for scanned or encrypted PDFs.
pub fn pdf_placeholder(size: usize, now: DateTime<Utc>) -> String {
    let size_kb = (size + 512) / 1024;
    format!(
        "Resume uploaded on {} ({} KB PDF). The document text could not be read automatically; \
         it may be a scanned image or a protected file. Profile details can be completed manually.",
        now.format("%Y-%m-%d %H:%M:%S UTC"),
        size_kb
    )
}

fn join_pdf_pages(pages: &[String]) -> String {
    let decoded: Vec<String> = pages
        .iter()
        .map(|page| {
            page.lines()
                .map(|run| percent_decode_str(run).decode_utf8_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();
    collapse_whitespace(&decoded.join("\n\n"))
}

/// Collapses runs of spaces within lines and runs of blank lines to a single blank line.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        blank_run = 0;
    }
    out
}

/// Reads the body text of a DOCX file, including paragraphs nested in tables,
/// hyperlinks, tracked insertions and content controls.
pub fn extract_docx(bytes: &[u8]) -> Result<String, IngestError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| {
        warn!("DOCX decoding failed: {e:?}");
        IngestError::Extraction("could not read DOCX document".to_string())
    })?;

    let mut text = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => collect_paragraph_text(p, &mut text),
            DocumentChild::Table(t) => collect_table_text(t, &mut text),
            DocumentChild::StructuredDataTag(tag) => collect_tag_text(tag, &mut text),
            _ => {}
        }
    }
    Ok(text)
}

fn collect_paragraph_text(paragraph: &Paragraph, out: &mut String) {
    collect_inline_text(&paragraph.children, out);
    out.push('\n');
}

fn collect_inline_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => collect_run_text(run, out),
            ParagraphChild::Hyperlink(link) => collect_inline_text(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for c in &insert.children {
                    if let InsertChild::Run(run) = c {
                        collect_run_text(run, out);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(tag) => collect_tag_text(tag, out),
            _ => {}
        }
    }
}

fn collect_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push(' '),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Cells are emitted in reading order, one paragraph per line.
fn collect_table_text(table: &Table, out: &mut String) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => collect_paragraph_text(p, out),
                    TableCellContent::Table(t) => collect_table_text(t, out),
                    TableCellContent::StructuredDataTag(tag) => collect_tag_text(tag, out),
                    _ => {}
                }
            }
        }
    }
}

fn collect_tag_text(tag: &StructuredDataTag, out: &mut String) {
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Run(run) => collect_run_text(run, out),
            StructuredDataTagChild::Paragraph(p) => collect_paragraph_text(p, out),
            StructuredDataTagChild::Table(t) => collect_table_text(t, out),
            StructuredDataTagChild::StructuredDataTag(inner) => collect_tag_text(inner, out),
            _ => {}
        }
    }
}

/// Last-resort decoding: keeps printable ASCII and newlines, drops everything else.
pub fn printable_ascii_fallback(bytes: &[u8]) -> String {
    let kept: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| (0x20..=0x7e).contains(b) || *b == b'\n')
        .collect();
    // only ASCII bytes remain
    String::from_utf8_lossy(&kept).trim().to_string()
}
