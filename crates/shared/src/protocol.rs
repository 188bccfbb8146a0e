use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{CaptionStyle, ExportFormat, SessionId, ThumbnailStyle};

pub mod routes {
    pub const UPLOAD: &str = "api/upload";
    pub const TRANSCRIBE: &str = "api/process/transcribe";
    pub const CAPTION: &str = "api/process/caption";
    pub const CONTENT: &str = "api/process/content";
    pub const THUMBNAIL: &str = "api/process/thumbnail";
    pub const IMAGE_PROMPTS: &str = "api/process/image-prompts";
    pub const UPLOAD_IMAGES: &str = "api/process/upload-images";
    pub const EXPORT: &str = "api/export";
    /// Followed by `/{session_id}`.
    pub const SESSION: &str = "api/session";
    /// Followed by `/{session_id}/{filename}`.
    pub const FILE: &str = "api/file";

    pub const UPLOAD_SESSION_FIELD: &str = "session_id";
    pub const UPLOAD_VIDEO_FIELD: &str = "video";
}

/// Common `{success, message, ...}` wrapper around every processing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRequest {
    pub session_id: SessionId,
    pub style: CaptionStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub session_id: SessionId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    pub session_id: SessionId,
    pub style: ThumbnailStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub session_id: SessionId,
    pub formats: Vec<ExportFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageRequest {
    pub session_id: SessionId,
    pub image_type: String,
    pub image_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub filename: String,
    /// Preformatted by the backend, e.g. `"12.3 MB"`.
    #[serde(default)]
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscribePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptInfo {
    pub word_count: u64,
    /// Seconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<CaptionInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionInfo {
    #[serde(default)]
    pub total_segments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub preview: Vec<CaptionSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentInfo {
    #[serde(default)]
    pub blog_sections: u64,
    #[serde(default)]
    pub x_post_length: u64,
    #[serde(default)]
    pub youtube_desc_length: u64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbnailPayload {
    /// Shape is backend-defined; kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagePromptsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadImagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportPayload {
    /// Format wire name to the path the backend wrote.
    #[serde(default)]
    pub exported_files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub steps_completed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<GeneratedContent>,
    #[serde(default)]
    pub export_formats: Vec<String>,
}

impl SessionData {
    /// The backend answers with an empty object before anything is uploaded.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.video_filename.is_none()
            && self.caption_style.is_none()
            && self.thumbnail_style.is_none()
            && self.content.is_none()
            && self.export_formats.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog: Option<BlogContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogContent {
    #[serde(default)]
    pub sections: Vec<serde_json::Value>,
    #[serde(default)]
    pub keywords: Vec<String>,
}
