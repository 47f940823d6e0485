use std::any::Any;
use std::collections::BTreeMap;
use std::panic;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelection;
use crate::table_parse::{parse_number, soft_split_line_into_cells, split_line_into_cells};

const UNUSABLE_SCORE: i64 = i64::MIN / 4;

/// Below this score the first page also considers the whole-document text,
/// for files where `pdf-extract` cannot split output by page.
const WHOLE_TEXT_FALLBACK_SCORE: i64 = 80;

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();
    let cjk_count = text
        .chars()
        .filter(|ch| {
            ('\u{4E00}'..='\u{9FFF}').contains(ch) || ('\u{3400}'..='\u{4DBF}').contains(ch)
        })
        .count();
    let ext_a_count = text
        .chars()
        .filter(|ch| ('\u{3400}'..='\u{4DBF}').contains(ch))
        .count();

    replacement * 8 > total
        || control * 5 > total
        || (cjk_count > 20 && ext_a_count * 4 > cjk_count)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (text, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF])
        && let Some(text) = decode_utf16(rest)
    {
        return text;
    }

    if let Some(name) = encoding.map(str::to_ascii_lowercase) {
        let utf16_hint = ["utf16", "ucs2", "identity-h", "unicode"]
            .iter()
            .any(|hint| name.contains(hint));
        if utf16_hint && let Some(text) = decode_utf16(bytes) {
            return text;
        }

        let big5_hint = ["big5", "b5", "eten", "cns"]
            .iter()
            .any(|hint| name.contains(hint));
        if big5_hint {
            let (text, _, had_errors) = BIG5.decode(bytes);
            if !had_errors && !text.is_empty() {
                return text.into_owned();
            }
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Scores how tabular a page text looks: rows with several cells count the
/// most, rows carrying numbers a little, broken decoding is heavily penalised.
fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return UNUSABLE_SCORE;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    let mut numeric_lines = 0_i64;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        non_empty_lines += 1;

        let soft_cells = soft_split_line_into_cells(line);
        if split_line_into_cells(line).len() >= 2 || soft_cells.len() >= 3 {
            multi_cell_lines += 1;
        }
        if soft_cells.iter().any(|cell| parse_number(cell).is_some()) {
            numeric_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + numeric_lines * 15 + non_empty_lines - broken_penalty
}

fn extract_text_from_page_content(document: &Document, page_id: ObjectId) -> Option<String> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    text.push_str(&decode_pdf_bytes(encoding, bytes));
                }
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                    text.push(' ');
                }
                // Large negative kerning inside TJ is a visual gap between cells.
                Object::Integer(value) if *value < -100 => text.push(' '),
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Whole-document text from `pdf-extract`, or `None` when it fails.
///
/// `pdf-extract` panics on some malformed fonts, so the call runs under
/// `catch_unwind` and a panic counts as a failure.
fn extract_whole_text(input_pdf: &[u8]) -> Option<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(input_pdf)) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(error)) => {
            tracing::debug!(%error, "pdf-extract could not read the document");
            None
        }
        Err(payload) => {
            tracing::debug!(
                panic = panic_message(payload.as_ref()),
                "pdf-extract panicked while reading the document"
            );
            None
        }
    }
}

/// Reads the text of every selected page, choosing per page the candidate
/// text that looks most tabular.
pub(crate) fn read_pdf_pages(
    input_pdf: &[u8],
    page_selection: Option<&PageSelection>,
) -> Result<Vec<PageText>, ExtractError> {
    let document = Document::load_mem(input_pdf)?;
    let pages_map = document.get_pages();

    let (split_pages, whole_text) = match extract_whole_text(input_pdf) {
        Some(text) => {
            let pages = split_text_into_pages(&text);
            if pages.len() == pages_map.len() {
                (Some(pages), None)
            } else {
                (None, Some(text))
            }
        }
        None => (None, None),
    };

    let mut pages = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        if page_selection.is_some_and(|selection| !selection.contains(*page_no)) {
            continue;
        }

        let mut candidates = Vec::new();
        if let Some(text) = split_pages
            .as_ref()
            .and_then(|texts| texts.get(index))
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }
        if let Some(text) = extract_text_from_page_content(&document, *page_id) {
            candidates.push(text);
        }
        if let Some(text) = document
            .extract_text(&[*page_no])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        let local_best_score = candidates
            .iter()
            .map(|text| extraction_quality_score(text))
            .max()
            .unwrap_or(UNUSABLE_SCORE);
        if index == 0
            && local_best_score < WHOLE_TEXT_FALLBACK_SCORE
            && let Some(text) = whole_text.as_ref().filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }

        let text = candidates
            .into_iter()
            .max_by_key(|text| extraction_quality_score(text))
            .unwrap_or_default();
        if looks_decoding_broken(&text) {
            tracing::warn!(page = page_no, "page text looks wrongly decoded");
        }

        pages.push(PageText {
            page_number: *page_no,
            text,
        });
    }

    if pages.is_empty() && page_selection.is_some() {
        return Err(ExtractError::NoPagesSelected);
    }

    tracing::debug!(pages = pages.len(), "read page text");
    Ok(pages)
}
