use std::{
    collections::BTreeMap,
    future::Future,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{
    domain::{CaptionStyle, ExportFormat, ThumbnailStyle},
    protocol::{CaptionInfo, ContentInfo, VideoInfo},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    state::WizardState,
    step::{StepProgress, WizardStep},
    summary::{ExportSummary, TranscriptSummary},
    view::{LoadingNotice, WizardView},
};
use crate::{
    context::AppContext,
    error::{ApiError, ValidationError, WizardError},
    validation::{normalize_title, VideoFile},
};

/// Cancels whichever backend call the wizard is currently waiting on.
///
/// Every call arms a fresh token, so aborting one attempt never affects a
/// later retry.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl AbortHandle {
    /// Returns `false` when nothing was in flight.
    pub fn abort(&self) -> bool {
        match self.lock().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.lock() = Some(token.clone());
        token
    }

    fn disarm(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailOutcome {
    pub thumbnail: serde_json::Value,
    pub summary: Option<ExportSummary>,
}

/// Drives the six-step flow. Each step action runs only on its own step and
/// commits the transition only after the backend reports success.
pub struct WizardController<V: WizardView> {
    ctx: AppContext,
    state: WizardState,
    view: V,
    abort: AbortHandle,
    export_summary: Option<ExportSummary>,
}

impl<V: WizardView> WizardController<V> {
    pub fn new(ctx: AppContext, mut view: V) -> Self {
        let state = WizardState::new();
        view.step_changed(&state.progress());
        info!(session_id = %ctx.session(), "wizard initialized");
        Self {
            ctx,
            state,
            view,
            abort: AbortHandle::default(),
            export_summary: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn progress(&self) -> StepProgress {
        self.state.progress()
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Summary fetched after the thumbnail step, when the backend had one.
    pub fn export_summary(&self) -> Option<&ExportSummary> {
        self.export_summary.as_ref()
    }

    /// Validates a file whose media type and size are declared by the caller.
    pub fn choose_video(
        &mut self,
        path: impl Into<std::path::PathBuf>,
        media_type: &str,
        size_bytes: u64,
    ) -> Result<(), WizardError> {
        let candidate = VideoFile::validate(path, media_type, size_bytes);
        self.accept_video(candidate)
    }

    /// Validates a file on disk, guessing its media type from the extension.
    pub async fn choose_video_file(&mut self, path: impl AsRef<Path>) -> Result<(), WizardError> {
        let candidate = VideoFile::inspect(path).await;
        self.accept_video(candidate)
    }

    fn accept_video(
        &mut self,
        candidate: Result<VideoFile, ValidationError>,
    ) -> Result<(), WizardError> {
        self.guard("video selection", WizardStep::Upload)?;
        let video = candidate.map_err(|err| self.fail(err.into()))?;
        info!(
            file = video.file_name(),
            size = %video.display_size(),
            "video file selected"
        );
        self.view.video_selected(&video);
        self.state.set_video(video);
        Ok(())
    }

    pub async fn upload_video(&mut self) -> Result<VideoInfo, WizardError> {
        const ACTION: &str = "video upload";
        self.guard(ACTION, WizardStep::Upload)?;
        let Some(video) = self.state.uploaded_video().cloned() else {
            return Err(self.fail(ValidationError::MissingVideo.into()));
        };

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().upload_timeout;
        let info = self
            .call(
                ACTION,
                LoadingNotice::new("Uploading video...", "Sending the file to the server"),
                limit,
                async move { api.upload_video(&session, &video).await },
            )
            .await?;

        info!(file = %info.filename, size = %info.size, "video uploaded");
        self.advance();
        Ok(info)
    }

    /// On success the summary is shown first and the step only moves on after
    /// the configured auto-advance delay.
    pub async fn transcribe(&mut self) -> Result<TranscriptSummary, WizardError> {
        const ACTION: &str = "transcription";
        self.guard(ACTION, WizardStep::Transcribe)?;

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().request_timeout;
        let transcript = self
            .call(
                ACTION,
                LoadingNotice::new(
                    "Transcribing audio...",
                    "Speech recognition is turning the video's audio into text",
                ),
                limit,
                async move { api.transcribe(&session).await },
            )
            .await?;

        let summary = TranscriptSummary::from(&transcript);
        info!(
            words = summary.word_count,
            duration = %summary.duration_label(),
            "transcription finished"
        );
        self.view.transcript_ready(&summary);

        let delay = self.ctx.settings().auto_advance_delay;
        if !delay.is_zero() {
            // An abort here only cuts the wait short.
            let token = self.abort.arm();
            tokio::select! {
                biased;
                _ = token.cancelled() => debug!("auto-advance delay skipped"),
                _ = tokio::time::sleep(delay) => {}
            }
            self.abort.disarm();
        }
        self.advance();
        Ok(summary)
    }

    /// Replaces any earlier caption style.
    pub fn select_caption_style(&mut self, style: CaptionStyle) {
        debug!(%style, "caption style selected");
        self.state.set_caption_style(style);
    }

    pub async fn generate_captions(&mut self) -> Result<CaptionInfo, WizardError> {
        const ACTION: &str = "caption generation";
        self.guard(ACTION, WizardStep::Caption)?;
        let Some(style) = self.state.caption_style() else {
            return Err(self.fail(ValidationError::MissingCaptionStyle.into()));
        };

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().request_timeout;
        let captions = self
            .call(
                ACTION,
                LoadingNotice::new(
                    "Generating captions...",
                    format!("Creating captions in the {style} style"),
                ),
                limit,
                async move { api.generate_captions(&session, style).await },
            )
            .await?;

        info!(%style, segments = captions.total_segments, "captions generated");
        self.advance();
        Ok(captions)
    }

    pub fn set_title(&mut self, title: &str) {
        self.state.set_title(title);
    }

    pub async fn generate_content(&mut self) -> Result<ContentInfo, WizardError> {
        const ACTION: &str = "content generation";
        self.guard(ACTION, WizardStep::Content)?;
        let title = normalize_title(self.state.title()).map_err(|err| self.fail(err.into()))?;

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().request_timeout;
        let content = self
            .call(
                ACTION,
                LoadingNotice::new(
                    "Generating content...",
                    "Writing the blog article, X post and YouTube description",
                ),
                limit,
                async move { api.generate_content(&session, &title).await },
            )
            .await?;

        info!(
            blog_sections = content.blog_sections,
            x_post_length = content.x_post_length,
            "content generated"
        );
        self.advance();
        Ok(content)
    }

    /// Replaces any earlier thumbnail style.
    pub fn select_thumbnail_style(&mut self, style: ThumbnailStyle) {
        debug!(%style, "thumbnail style selected");
        self.state.set_thumbnail_style(style);
    }

    pub async fn generate_thumbnail(&mut self) -> Result<ThumbnailOutcome, WizardError> {
        const ACTION: &str = "thumbnail generation";
        self.guard(ACTION, WizardStep::Thumbnail)?;
        let Some(style) = self.state.thumbnail_style() else {
            return Err(self.fail(ValidationError::MissingThumbnailStyle.into()));
        };

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().request_timeout;
        let thumbnail = self
            .call(
                ACTION,
                LoadingNotice::new(
                    "Generating thumbnail...",
                    format!("Creating a thumbnail in the {style} style"),
                ),
                limit,
                async move { api.generate_thumbnail(&session, style).await },
            )
            .await?;
        info!(%style, "thumbnail generated");

        let summary = self.refresh_export_summary(limit).await;
        if let Some(summary) = &summary {
            self.view.export_summary_ready(summary);
        }
        self.export_summary = summary.clone();
        self.advance();
        Ok(ThumbnailOutcome { thumbnail, summary })
    }

    /// Best effort: the transition happens even when the snapshot cannot be
    /// fetched. Aborting skips the summary.
    async fn refresh_export_summary(&mut self, limit: Duration) -> Option<ExportSummary> {
        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let token = self.abort.arm();
        self.view.loading_started(&LoadingNotice::new(
            "Preparing export...",
            "Collecting what has been generated so far",
        ));

        let summary = tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("export summary refresh aborted");
                None
            }
            result = tokio::time::timeout(limit, api.session_snapshot(&session)) => match result {
                Ok(Ok(snapshot)) => ExportSummary::from_snapshot(&snapshot),
                Ok(Err(err)) => {
                    warn!(error = %err, "failed to refresh export summary");
                    None
                }
                Err(_) => {
                    warn!("export summary refresh timed out");
                    None
                }
            },
        };

        self.abort.disarm();
        self.view.loading_finished();
        summary
    }

    pub fn set_export_format(&mut self, format: ExportFormat, checked: bool) {
        self.state.set_export_format(format, checked);
    }

    /// Flips one format and returns whether it is now checked.
    pub fn toggle_export_format(&mut self, format: ExportFormat) -> bool {
        let checked = !self.state.is_export_format_selected(format);
        self.state.set_export_format(format, checked);
        checked
    }

    /// Terminal step. Returns format name to exported path.
    pub async fn export(&mut self) -> Result<BTreeMap<String, String>, WizardError> {
        const ACTION: &str = "export";
        self.guard(ACTION, WizardStep::Export)?;
        let formats = self.state.export_formats();
        if formats.is_empty() {
            return Err(self.fail(ValidationError::NoExportFormat.into()));
        }

        let api = self.ctx.api();
        let session = self.ctx.session().clone();
        let limit = self.ctx.settings().request_timeout;
        let request_formats = formats.clone();
        let exported = self
            .call(
                ACTION,
                LoadingNotice::new("Exporting...", "Saving the selected content to files"),
                limit,
                async move { api.export(&session, &request_formats).await },
            )
            .await?;

        info!(?formats, files = exported.exported_files.len(), "export finished");
        self.advance();
        self.view.success(
            "Export complete!",
            "The files were saved. Open the preview to review them.",
        );
        Ok(exported.exported_files)
    }

    /// Rejects actions that belong to another step or to a finished wizard.
    fn guard(&mut self, action: &'static str, expected: WizardStep) -> Result<(), WizardError> {
        let current = self.state.current_step();
        let err = if self.state.is_finished() {
            WizardError::Finished
        } else if current != expected {
            WizardError::WrongStep {
                action,
                expected,
                current,
            }
        } else {
            return Ok(());
        };
        Err(self.fail(err))
    }

    fn fail(&mut self, err: WizardError) -> WizardError {
        if err.is_local() {
            warn!(step = %self.state.current_step(), error = %err, "rejected before any request");
        } else {
            warn!(step = %self.state.current_step(), error = %err, "step failed");
        }
        self.view.error(&err.to_string());
        err
    }

    /// Runs one backend call behind the progress indicator, bounded by
    /// `limit` and by the abort handle.
    async fn call<T, F>(
        &mut self,
        action: &'static str,
        notice: LoadingNotice,
        limit: Duration,
        request: F,
    ) -> Result<T, WizardError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let token = self.abort.arm();
        debug!(action, step = %self.state.current_step(), "backend call started");
        self.view.loading_started(&notice);

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(WizardError::Aborted { action }),
            result = tokio::time::timeout(limit, request) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(source)) => Err(WizardError::Call { action, source }),
                Err(_) => Err(WizardError::Timeout { action, after: limit }),
            },
        };

        self.abort.disarm();
        self.view.loading_finished();
        outcome.map_err(|err| self.fail(err))
    }

    fn advance(&mut self) {
        let step = self.state.advance();
        info!(
            step = %step,
            number = step.number(),
            finished = self.state.is_finished(),
            "wizard advanced"
        );
        self.view.step_changed(&self.state.progress());
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
