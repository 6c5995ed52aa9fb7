use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::domain::media::IncomingFile;

use super::error::ApiError;

/// Parses the stringy booleans sent by HTML forms.
/// `true`, `1`, `yes`, `on` in any case are true; everything else is false.
pub fn coerce_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// A fully buffered multipart form: text fields and file parts by name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, IncomingFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            if file_name.is_none() {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
                continue;
            }

            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Browsers submit an empty part for a file input left blank.
            if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            let content_type = content_type.unwrap_or_else(|| {
                file_name
                    .as_deref()
                    .and_then(|n| mime_guess::from_path(n).first_raw())
                    .unwrap_or("application/octet-stream")
                    .to_string()
            });
            form.files.insert(
                name,
                IncomingFile::new(bytes.to_vec(), content_type, file_name),
            );
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Missing fields read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.text(name).map(coerce_bool).unwrap_or(false)
    }

    pub fn take_file(&mut self, name: &str) -> Option<IncomingFile> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub fn from_parts(fields: &[(&str, &str)], files: Vec<(&str, IncomingFile)>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files
                .into_iter()
                .map(|(k, f)| (k.to_string(), f))
                .collect(),
        }
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}
