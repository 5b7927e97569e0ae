// ==================== PROFILE PICTURE RECEIVER ====================
// Reads the multipart upload, validates the picture and writes it under
// <UPLOAD_DIR>/profiles with a generated name.

use crate::utils::error::AppError;
use crate::utils::validation::{self, ImageKind, MAX_FILE_SIZE, MSG_FILE_TOO_LARGE};
use actix_multipart::Multipart;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Multipart field carrying the picture
pub const FILE_FIELD: &str = "profilePicture";
/// Sub-directory of the upload root, also part of the public URL
pub const PROFILES_DIR: &str = "profiles";
/// URL prefix the upload root is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

pub const MSG_MISSING_FILE: &str = "Please upload a profile picture";
pub const MSG_UNEXPECTED_FIELD: &str = "Unexpected field";
pub const MSG_FIELD_TOO_LARGE: &str = "Form field is too large";
pub const MSG_FIELD_NOT_UTF8: &str = "Form field is not valid UTF-8";

const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;

// ==================== FORM PARSING ====================

#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: Option<String>,
    pub original_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Drains the multipart stream into an `UploadForm`.
///
/// Text parts may come before or after the file part. Only one file is
/// accepted, and only under `profilePicture`; the file stops being read as
/// soon as it passes `MAX_FILE_SIZE`.
pub async fn read_upload_form(mut payload: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        if let Some(original_name) = filename {
            if name != FILE_FIELD || form.file.is_some() {
                return Err(AppError::InvalidRequest(MSG_UNEXPECTED_FIELD.to_string()));
            }

            let content_type = field.content_type().map(|m| m.essence_str().to_string());
            let mut bytes = Vec::new();

            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {}", e)))?;
                if bytes.len() + chunk.len() > MAX_FILE_SIZE {
                    return Err(AppError::PayloadTooLarge(MSG_FILE_TOO_LARGE.to_string()));
                }
                bytes.extend_from_slice(&chunk);
            }

            // Browsers send an empty, unnamed part when no file was picked
            if original_name.is_empty() && bytes.is_empty() {
                continue;
            }

            form.file = Some(UploadedFile {
                content_type,
                original_name,
                bytes,
            });
            continue;
        }

        let mut value = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidRequest(format!("Failed to read field: {}", e)))?;
            if value.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
                log::debug!("Form field '{}' exceeds {} bytes", name, MAX_TEXT_FIELD_SIZE);
                return Err(AppError::InvalidRequest(MSG_FIELD_TOO_LARGE.to_string()));
            }
            value.extend_from_slice(&chunk);
        }

        let value = String::from_utf8(value)
            .map_err(|_| AppError::InvalidRequest(MSG_FIELD_NOT_UTF8.to_string()))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            other => log::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(form)
}

// ==================== STORAGE ====================

/// A picture written to disk
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

impl StoredFile {
    /// `<scheme>://<host>/uploads/profiles/<filename>`
    pub fn public_url(&self, scheme: &str, host: &str) -> String {
        format!(
            "{}://{}{}/{}/{}",
            scheme, host, PUBLIC_PREFIX, PROFILES_DIR, self.filename
        )
    }
}

/// Local directory holding uploaded pictures
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Opens the upload root, creating `<root>/profiles` if it doesn't exist yet.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(PROFILES_DIR))?;
        Ok(Self { root })
    }

    /// Directory served under `/uploads`
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, kind: ImageKind, bytes: &[u8]) -> Result<StoredFile, AppError> {
        let filename = format!("profile-{}.{}", uuid::Uuid::new_v4(), kind.extension());
        let path = self.root.join(PROFILES_DIR).join(&filename);

        let file = tokio::fs::File::create(&path).await?;
        write_or_remove(file, &path, bytes).await?;

        Ok(StoredFile { filename, path })
    }

    /// Best-effort removal of a file whose user record was never written
    pub async fn discard(&self, stored: &StoredFile) {
        if let Err(e) = tokio::fs::remove_file(&stored.path).await {
            log::warn!("⚠️  Failed to remove orphaned upload {}: {}", stored.path.display(), e);
        }
    }
}

/// Writes `bytes` to an already-created file, removing it if the write fails
/// so no truncated picture is left behind.
async fn write_or_remove<W>(mut writer: W, path: &Path, bytes: &[u8]) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;
    drop(writer);

    if let Err(e) = result {
        if let Err(rm) = tokio::fs::remove_file(path).await {
            log::warn!("⚠️  Failed to remove partial upload {}: {}", path.display(), rm);
        }
        return Err(e.into());
    }

    Ok(())
}

/// Validates the received file and persists it.
pub async fn receive_profile_picture(
    store: &UploadStore,
    file: &UploadedFile,
) -> Result<StoredFile, AppError> {
    let kind = validation::validate_image(file.content_type.as_deref(), &file.bytes)?;
    let stored = store.save(kind, &file.bytes).await?;

    log::info!(
        "🖼️  Stored {} ({}, {} bytes) as {}",
        file.original_name,
        kind.mime(),
        file.bytes.len(),
        stored.filename
    );

    Ok(stored)
}
