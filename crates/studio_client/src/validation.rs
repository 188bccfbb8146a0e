//! Client-side gate for the video file. This is the only local check on
//! content; every generation step trusts the backend for semantics.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// 2 GiB, inclusive.
pub const MAX_VIDEO_BYTES: u64 = 2 * 1024 * 1024 * 1024;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoContainer {
    Mp4,
    Mov,
    Avi,
    Mkv,
}

impl VideoContainer {
    /// Accepts the short `video/<ext>` spellings as well as the registered types.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "video/mp4" => Some(Self::Mp4),
            "video/mov" | "video/quicktime" => Some(Self::Mov),
            "video/avi" | "video/x-msvideo" | "video/msvideo" => Some(Self::Avi),
            "video/mkv" | "video/x-matroska" => Some(Self::Mkv),
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Mov => "video/quicktime",
            Self::Avi => "video/x-msvideo",
            Self::Mkv => "video/x-matroska",
        }
    }
}

/// A video that passed validation and may be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    path: PathBuf,
    file_name: String,
    container: VideoContainer,
    size_bytes: u64,
}

impl VideoFile {
    /// Type is checked before size.
    pub fn validate(
        path: impl Into<PathBuf>,
        media_type: &str,
        size_bytes: u64,
    ) -> Result<Self, ValidationError> {
        let path = path.into();
        let container = VideoContainer::from_media_type(media_type).ok_or_else(|| {
            ValidationError::UnsupportedMediaType {
                media_type: media_type.to_string(),
            }
        })?;

        if size_bytes > MAX_VIDEO_BYTES {
            return Err(ValidationError::FileTooLarge {
                size_bytes,
                size: format_file_size(size_bytes),
            });
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path,
            file_name,
            container,
            size_bytes,
        })
    }

    /// Reads size from disk and guesses the media type from the extension.
    pub async fn inspect(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|err| ValidationError::Unreadable {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                })?;
        if !metadata.is_file() {
            return Err(ValidationError::NotAFile {
                path: path.display().to_string(),
            });
        }

        Self::validate(path, &guess_media_type(path), metadata.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn container(&self) -> VideoContainer {
        self.container
    }

    pub fn media_type(&self) -> &'static str {
        self.container.media_type()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.size_bytes)
    }
}

pub fn guess_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}

/// 1024-based, at most two decimals with trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Returns the trimmed title, or an error when nothing is left.
pub fn normalize_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}
