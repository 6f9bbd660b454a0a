//! Resume PDF checks and text extraction.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;
/// Characters of resume / JD text sent to the model.
pub const MAX_PROMPT_CHARS: usize = 12_000;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Rejects empty, oversized or non-PDF uploads.
pub fn check_pdf(bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "resume must be at most {} MiB",
            MAX_RESUME_BYTES / (1024 * 1024)
        )));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation("file is not a PDF".to_string()));
    }
    Ok(())
}

/// Extracts and normalizes the text of a PDF on the blocking pool.
pub async fn extract_resume_text(bytes: Bytes) -> Result<String, AppError> {
    check_pdf(&bytes)?;

    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(extraction_failed)?
        .map_err(|e| AppError::UnprocessableEntity(format!("could not read PDF: {e}")))?;

    let text = normalize_whitespace(&raw);
    debug!("Extracted {} characters of resume text", text.len());

    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "no text found in PDF; scanned resumes are not supported".to_string(),
        ));
    }
    Ok(text)
}

/// `pdf_extract` panics on some malformed files; that is a bad upload, not a server fault.
fn extraction_failed(e: tokio::task::JoinError) -> AppError {
    if e.is_panic() {
        warn!("PDF extraction panicked on a malformed file");
        AppError::UnprocessableEntity("could not read PDF: file is malformed".to_string())
    } else {
        AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
    }
}

/// Collapses runs of spaces inside lines and runs of blank lines to a single blank line.
pub fn normalize_whitespace(text: &str) -> String {
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

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_for_prompt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_pdf_accepts_magic() {
        assert!(check_pdf(b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn test_check_pdf_rejects_other_files() {
        assert!(matches!(check_pdf(b"PK\x03\x04"), Err(AppError::Validation(_))));
        assert!(matches!(check_pdf(b""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_check_pdf_rejects_oversized() {
        let mut big = PDF_MAGIC.to_vec();
        big.resize(MAX_RESUME_BYTES + 1, b' ');
        assert!(matches!(check_pdf(&big), Err(AppError::PayloadTooLarge(_))));
    }

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  Jane   Doe \n\n\n\nSoftware  Engineer\n  Rust,  Go  \n";
        assert_eq!(
            normalize_whitespace(raw),
            "Jane Doe\n\nSoftware Engineer\nRust, Go"
        );
    }

    #[test]
    fn test_normalize_whitespace_empty() {
        assert_eq!(normalize_whitespace(" \n \t\n"), "");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_for_prompt("héllo", 2), "hé");
        assert_eq!(truncate_for_prompt("abc", 10), "abc");
        assert_eq!(truncate_for_prompt("abc", 0), "");
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf_before_parsing() {
        let result = extract_resume_text(Bytes::from_static(b"hello")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_extraction_panic_is_unprocessable() {
        let err = tokio::task::spawn_blocking(|| -> String { panic!("bad xref table") })
            .await
            .unwrap_err();
        assert!(matches!(
            extraction_failed(err),
            AppError::UnprocessableEntity(_)
        ));
    }
}
