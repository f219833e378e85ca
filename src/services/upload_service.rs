//! Upload Service - profile and banner pictures on local disk

use std::path::Path;

use crate::domain::DomainError;

/// Public URL prefix under which the upload directory is served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Profile,
    Banner,
}

impl UploadKind {
    fn as_str(self) -> &'static str {
        match self {
            UploadKind::Profile => "profile",
            UploadKind::Banner => "banner",
        }
    }
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let truncated: String = cleaned.chars().take(MAX_NAME_LEN).collect();
    if truncated.is_empty() {
        "upload".to_string()
    } else {
        truncated
    }
}

/// Write an uploaded picture and return the URL it will be served from.
pub async fn store_upload(
    upload_dir: &Path,
    user_id: &str,
    kind: UploadKind,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, DomainError> {
    let file_name = format!(
        "{}_{}_{}_{}",
        user_id,
        kind.as_str(),
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(original_name)
    );

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| DomainError::Internal(format!("Failed to create upload dir: {}", e)))?;

    let path = upload_dir.join(&file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| DomainError::Internal(format!("Failed to save upload: {}", e)))?;

    tracing::info!("Stored {} picture for {} at {:?}", kind.as_str(), user_id, path);

    Ok(format!("{}/{}", UPLOADS_URL_PREFIX, file_name))
}

/// Delete a file previously returned by [`store_upload`]. URLs outside the
/// upload prefix are ignored.
pub async fn remove_upload(upload_dir: &Path, url: &str) {
    let Some(file_name) = url
        .strip_prefix(UPLOADS_URL_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return;
    };
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return;
    }

    if let Err(e) = tokio::fs::remove_file(upload_dir.join(file_name)).await {
        tracing::warn!("Failed to remove upload {}: {}", file_name, e);
    }
}
