use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{CaptionStyle, ExportFormat, SessionId, ThumbnailStyle},
    error::ErrorBody,
    protocol::{
        routes, CaptionInfo, CaptionPayload, CaptionRequest, ContentInfo, ContentPayload,
        ContentRequest, Envelope, ExportPayload, ExportRequest, ImagePromptsPayload,
        SessionRequest, SessionSnapshot, ThumbnailPayload, ThumbnailRequest, TranscribePayload,
        TranscriptInfo, UploadImagePayload, UploadImageRequest, UploadPayload, VideoInfo,
    },
};
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::ApiError, validation::VideoFile};

/// Network seam of the wizard: one method per backend operation.
#[async_trait]
pub trait StudioApi: Send + Sync {
    async fn upload_video(&self, session: &SessionId, video: &VideoFile)
        -> Result<VideoInfo, ApiError>;
    async fn transcribe(&self, session: &SessionId) -> Result<TranscriptInfo, ApiError>;
    async fn generate_captions(
        &self,
        session: &SessionId,
        style: CaptionStyle,
    ) -> Result<CaptionInfo, ApiError>;
    async fn generate_content(
        &self,
        session: &SessionId,
        title: &str,
    ) -> Result<ContentInfo, ApiError>;
    async fn generate_thumbnail(
        &self,
        session: &SessionId,
        style: ThumbnailStyle,
    ) -> Result<serde_json::Value, ApiError>;
    async fn session_snapshot(&self, session: &SessionId) -> Result<SessionSnapshot, ApiError>;
    async fn export(
        &self,
        session: &SessionId,
        formats: &[ExportFormat],
    ) -> Result<ExportPayload, ApiError>;
    async fn generate_image_prompts(
        &self,
        session: &SessionId,
    ) -> Result<serde_json::Value, ApiError>;
    async fn upload_image(
        &self,
        session: &SessionId,
        image_type: &str,
        bytes: &[u8],
    ) -> Result<String, ApiError>;
    async fn fetch_file(&self, session: &SessionId, filename: &str) -> Result<Vec<u8>, ApiError>;
}

pub struct HttpStudioApi {
    http: Client,
    base: Url,
}

impl HttpStudioApi {
    pub fn new(server_url: &str, connect_timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self {
            http,
            base: parse_base_url(server_url)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(&settings.server_url, settings.connect_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, route: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(route)?)
    }

    /// `route` plus escaped path segments.
    fn endpoint_with(&self, route: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.endpoint(route)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Malformed(format!("{} cannot carry a path", self.base)))?
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, T>(&self, route: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(route)?;
        debug!(%url, "posting backend request");
        let response = self.http.post(url).json(body).send().await?;
        read_envelope(response).await
    }
}

fn parse_base_url(server_url: &str) -> Result<Url, ApiError> {
    let trimmed = server_url.trim();
    // Url::join drops the last path segment unless the base ends with a slash.
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

async fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.reason().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Non-2xx and `success: false` both end up as errors here.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = checked(response).await?;
    let bytes = response.bytes().await?;
    let envelope: Envelope<T> =
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Malformed(err.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected(
            envelope
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "the server reported a failure".to_string()),
        ));
    }
    Ok(envelope.payload)
}

#[async_trait]
impl StudioApi for HttpStudioApi {
    async fn upload_video(
        &self,
        session: &SessionId,
        video: &VideoFile,
    ) -> Result<VideoInfo, ApiError> {
        let file = tokio::fs::File::open(video.path()).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, video.size_bytes())
            .file_name(video.file_name().to_string())
            .mime_str(video.media_type())?;
        let form = multipart::Form::new()
            .text(routes::UPLOAD_SESSION_FIELD, session.as_str().to_string())
            .part(routes::UPLOAD_VIDEO_FIELD, part);

        let url = self.endpoint(routes::UPLOAD)?;
        debug!(%url, file = video.file_name(), bytes = video.size_bytes(), "uploading video");
        let response = self.http.post(url).multipart(form).send().await?;
        let payload: UploadPayload = read_envelope(response).await?;
        Ok(payload.video_info.unwrap_or_else(|| VideoInfo {
            filename: video.file_name().to_string(),
            size: video.display_size(),
            path: None,
        }))
    }

    async fn transcribe(&self, session: &SessionId) -> Result<TranscriptInfo, ApiError> {
        let payload: TranscribePayload = self
            .post_json(
                routes::TRANSCRIBE,
                &SessionRequest {
                    session_id: session.clone(),
                },
            )
            .await?;
        payload
            .transcript
            .ok_or_else(|| ApiError::Malformed("transcription result has no transcript".into()))
    }

    async fn generate_captions(
        &self,
        session: &SessionId,
        style: CaptionStyle,
    ) -> Result<CaptionInfo, ApiError> {
        let payload: CaptionPayload = self
            .post_json(
                routes::CAPTION,
                &CaptionRequest {
                    session_id: session.clone(),
                    style,
                },
            )
            .await?;
        Ok(payload.captions.unwrap_or_default())
    }

    async fn generate_content(
        &self,
        session: &SessionId,
        title: &str,
    ) -> Result<ContentInfo, ApiError> {
        let payload: ContentPayload = self
            .post_json(
                routes::CONTENT,
                &ContentRequest {
                    session_id: session.clone(),
                    title: title.to_string(),
                },
            )
            .await?;
        Ok(payload.content.unwrap_or_default())
    }

    async fn generate_thumbnail(
        &self,
        session: &SessionId,
        style: ThumbnailStyle,
    ) -> Result<serde_json::Value, ApiError> {
        let payload: ThumbnailPayload = self
            .post_json(
                routes::THUMBNAIL,
                &ThumbnailRequest {
                    session_id: session.clone(),
                    style,
                },
            )
            .await?;
        Ok(payload.thumbnail.unwrap_or(serde_json::Value::Null))
    }

    async fn session_snapshot(&self, session: &SessionId) -> Result<SessionSnapshot, ApiError> {
        let url = self.endpoint_with(routes::SESSION, &[session.as_str()])?;
        let response = checked(self.http.get(url).send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Malformed(err.to_string()))
    }

    async fn export(
        &self,
        session: &SessionId,
        formats: &[ExportFormat],
    ) -> Result<ExportPayload, ApiError> {
        self.post_json(
            routes::EXPORT,
            &ExportRequest {
                session_id: session.clone(),
                formats: formats.to_vec(),
            },
        )
        .await
    }

    async fn generate_image_prompts(
        &self,
        session: &SessionId,
    ) -> Result<serde_json::Value, ApiError> {
        let payload: ImagePromptsPayload = self
            .post_json(
                routes::IMAGE_PROMPTS,
                &SessionRequest {
                    session_id: session.clone(),
                },
            )
            .await?;
        Ok(payload.prompts.unwrap_or(serde_json::Value::Null))
    }

    async fn upload_image(
        &self,
        session: &SessionId,
        image_type: &str,
        bytes: &[u8],
    ) -> Result<String, ApiError> {
        let payload: UploadImagePayload = self
            .post_json(
                routes::UPLOAD_IMAGES,
                &UploadImageRequest {
                    session_id: session.clone(),
                    image_type: image_type.to_string(),
                    image_data: STANDARD.encode(bytes),
                },
            )
            .await?;
        payload
            .file_path
            .ok_or_else(|| ApiError::Malformed("image upload result has no file_path".into()))
    }

    async fn fetch_file(&self, session: &SessionId, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint_with(routes::FILE, &[session.as_str(), filename])?;
        let response = checked(self.http.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
