//! Multipart intake for the analyze endpoint

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use py3ready_core::AppError;

/// Name of the multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()));
    }
    AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
}

/// Read the single `file` field. Other fields are ignored; a second `file` field is rejected.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;
        upload = Some((filename, data));
    }

    upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}
