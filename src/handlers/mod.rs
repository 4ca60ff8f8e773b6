pub mod auth;
pub mod health;
pub mod messages;
pub mod posts;
pub mod users;

use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;

use crate::error::{AppError, Result};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Parsed multipart form: text fields by name, file fields by field name.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, Vec<u8>>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Like `text`, but an empty value counts as absent. Partial edit forms
    /// send every field; only the ones actually filled in should apply.
    pub fn non_empty_text(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|v| !v.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

/// Drain a multipart payload into memory. Files are capped at 10 MB.
pub async fn read_multipart(mut payload: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;

        let name = field.name().to_string();
        let is_file = field
            .content_disposition()
            .get_filename()
            .map(|f| !f.is_empty())
            .unwrap_or(false);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;
            if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::BadRequest("File too large".to_string()));
            }
            data.extend_from_slice(&chunk);
        }

        if is_file {
            form.files.insert(name, data);
        } else {
            let value = String::from_utf8(data)
                .map_err(|_| AppError::BadRequest("Invalid form field encoding".to_string()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_fields_count_as_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("bio".to_string(), "".to_string());
        form.fields.insert("gender".to_string(), "male".to_string());

        assert_eq!(form.text("bio"), Some(""));
        assert_eq!(form.non_empty_text("bio"), None);
        assert_eq!(form.non_empty_text("gender"), Some("male"));
        assert_eq!(form.non_empty_text("missing"), None);
    }
}
