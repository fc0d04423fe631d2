//! Uploaded document handling shared by CV upload and contract review.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A parsed multipart form: at most one `file` part plus plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<Bytes>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
            if data.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::Validation(format!(
                    "file must be at most {} MB",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            form.file = Some(data);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read field {name}: {e}")))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

/// Extracts plain text from a PDF. Runs on the blocking pool.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    if !is_pdf(&data) {
        return Err(AppError::Validation("file must be a PDF".to_string()));
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;

    let text = normalize_whitespace(&text);
    debug!("Extracted {} characters from PDF", text.len());
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF (scanned documents are not supported)"
                .to_string(),
        ));
    }
    Ok(text)
}

/// Collapses runs of blank lines and trailing spaces left behind by PDF extraction.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_checks_magic_bytes() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(!is_pdf(b"PK\x03\x04 docx"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn test_normalize_whitespace_collapses_blank_runs() {
        let raw = "Jane Doe   \n\n\n\nExperience\n   \nAcme  \n\n";
        assert_eq!(normalize_whitespace(raw), "Jane Doe\n\nExperience\n\nAcme");
    }

    #[tokio::test]
    async fn test_non_pdf_rejected_before_extraction() {
        let err = extract_pdf_text(Bytes::from_static(b"hello")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_upload_form_field_ignores_blank() {
        let mut form = UploadForm::default();
        form.fields.insert("title".into(), "  ".into());
        form.fields.insert("label".into(), " Main CV ".into());
        assert_eq!(form.field("title"), None);
        assert_eq!(form.field("label"), Some("Main CV"));
        assert_eq!(form.field("missing"), None);
    }
}
