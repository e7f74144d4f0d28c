//! File payloads and the local, network-free checks run on them.

use crate::error::{ConverterError, Result};
use bytes::Bytes;
use mime::Mime;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Largest upload the backend accepts: 50 MiB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A named binary payload to upload.
///
/// Cloning is cheap: the content is reference-counted [`Bytes`].
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    name: String,
    content: Bytes,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a local file; the upload is named after the path's file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ConverterError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        debug!("Loaded {} ({} bytes)", path.display(), content.len());
        Ok(Self::new(name, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Lowercased text after the last `.` of the name, if any.
    ///
    /// A dotfile such as `.pdf` counts as having the extension `pdf`.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// MIME type sent with the multipart part.
    pub fn mime_type(&self) -> Mime {
        match self.extension().as_deref() {
            Some("pdf") => mime::APPLICATION_PDF,
            Some("docx") => DOCX_MIME
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
            Some("doc") => "application/msword"
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM),
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Human-readable size in the largest whole unit of Bytes/KB/MB/GB.
///
/// Values are rounded to two decimals with trailing zeros dropped, so
/// `1536` is `"1.5 KB"` and `1048576` is `"1 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Check `file` against an allowed extension set and the 50MB ceiling.
///
/// Returns the message to show the user, or `None` when the file is fine.
/// Extension matching is case-insensitive.
pub fn validate_file(file: &FileUpload, allowed: &[&str]) -> Option<String> {
    let ext = file.extension();
    let type_ok = ext
        .as_deref()
        .is_some_and(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e)));
    if !type_ok {
        return Some(format!(
            "Invalid file type. Allowed types: {}",
            allowed.join(", ")
        ));
    }
    if file.size() > MAX_FILE_SIZE {
        return Some("File too large. Maximum size is 50MB".to_string());
    }
    None
}
