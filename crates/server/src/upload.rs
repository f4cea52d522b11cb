//! File upload endpoint.
//!
//! Files land in the configured upload directory under a sanitised,
//! timestamped name and are served back at `/uploads/<name>`.

use api_types::{ApiResponse, upload::UploadView};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Utc;
use engine::AttachmentNew;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{ServerError, server::ServerState};

/// Attempts at finding a free name before the upload is refused.
const MAX_NAME_ATTEMPTS: u32 = 100;

const ALLOWED_EXTENSIONS: [&str; 18] = [
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip",
    "rar", "dwg", "dgn", "dwf", "dxf",
];

impl From<MultipartError> for ServerError {
    fn from(value: MultipartError) -> Self {
        Self::Generic(value.body_text())
    }
}

/// Lower-cased extension when it is one of the accepted document types.
fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; whitespace becomes `_`.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<stem>_<yyyymmdd_HHMMSS>.<ext>`, or `<stem>_<yyyymmdd_HHMMSS>_<n>.<ext>`
/// for the n-th retry.
fn stored_filename(original: &str, ext: &str, stamp: &str, attempt: u32) -> String {
    let stem = original
        .rsplit_once('.')
        .map_or(original, |(stem, _)| stem);
    let stem = stem.rsplit(['/', '\\']).next().unwrap_or(stem);
    let stem = sanitize_stem(stem);
    if attempt == 0 {
        format!("{stem}_{stamp}.{ext}")
    } else {
        format!("{stem}_{stamp}_{attempt}.{ext}")
    }
}

/// Write `bytes` under a name that does not exist yet. An existing file is
/// never replaced.
async fn store_new_file(
    dir: &Path,
    original: &str,
    ext: &str,
    bytes: &[u8],
) -> Result<(String, PathBuf), ServerError> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = stored_filename(original, ext, &stamp, attempt);
        let path = dir.join(&filename);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        };
        if let Err(err) = file.write_all(bytes).await {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(err.into());
        }
        file.flush().await?;
        return Ok((filename, path));
    }
    tracing::warn!("no free upload name for {original} at {stamp}");
    Err(ServerError::Generic("upload name conflict, retry later".to_string()))
}

pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadView>>, ServerError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut project_id: Option<i32> = None;
    let mut attachment_code: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                file = Some((name, bytes.to_vec()));
            }
            Some("project_id") => {
                project_id = field.text().await?.trim().parse().ok();
            }
            Some("attachment_code") => {
                let code = field.text().await?;
                attachment_code = Some(code.trim().to_string()).filter(|c| !c.is_empty());
            }
            _ => {}
        }
    }

    let Some((original_filename, bytes)) = file else {
        return Err(ServerError::Generic("no file uploaded".to_string()));
    };
    if original_filename.trim().is_empty() {
        return Err(ServerError::Generic("empty filename".to_string()));
    }
    let Some(ext) = allowed_extension(&original_filename) else {
        return Err(ServerError::Generic("file type not allowed".to_string()));
    };

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let (filename, path) =
        store_new_file(&state.upload_dir, &original_filename, &ext, &bytes).await?;
    let url = format!("/uploads/{filename}");
    let file_size = bytes.len() as u64;
    tracing::info!("stored upload {filename} ({file_size} bytes)");

    let mut attachment_id = None;
    if let (Some(project_id), Some(attachment_code)) = (project_id, attachment_code) {
        let created = state
            .engine
            .new_attachment(AttachmentNew {
                project_id,
                attachment_code,
                filename: filename.clone(),
                original_filename: original_filename.clone(),
                file_path: url.clone(),
                file_size: i64::try_from(file_size).unwrap_or(i64::MAX),
            })
            .await;
        match created {
            Ok(attachment) => attachment_id = Some(attachment.id),
            Err(err) => {
                if let Err(io_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!("failed to remove orphan upload {filename}: {io_err}");
                }
                return Err(err.into());
            }
        }
    }

    Ok(Json(
        ApiResponse::ok(UploadView {
            filename,
            original_filename,
            url,
            file_size,
            attachment_id,
        })
        .with_msg("uploaded"),
    ))
}
