use super::*;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use async_trait::async_trait;
use shared::{
    domain::SessionId,
    protocol::{ExportPayload, SessionSnapshot, TranscriptInfo},
};

use crate::{
    api::StudioApi, config::Settings, validation::MAX_VIDEO_BYTES, wizard::StepMarker,
};

#[derive(Default)]
struct ScriptedApi {
    calls: Mutex<Vec<String>>,
    failures: HashMap<&'static str, String>,
    hang_on: Option<&'static str>,
    hanging: AtomicBool,
    snapshot_fails: bool,
    caption_styles: Mutex<Vec<CaptionStyle>>,
    thumbnail_styles: Mutex<Vec<ThumbnailStyle>>,
    titles: Mutex<Vec<String>>,
    export_formats: Mutex<Vec<Vec<ExportFormat>>>,
}

impl ScriptedApi {
    fn ok() -> Self {
        Self::default()
    }

    fn failing(endpoint: &'static str, message: &str) -> Self {
        let mut api = Self::default();
        api.failures.insert(endpoint, message.to_string());
        api
    }

    fn hanging(endpoint: &'static str) -> Self {
        let api = Self {
            hang_on: Some(endpoint),
            ..Self::default()
        };
        api.hanging.store(true, Ordering::SeqCst);
        api
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    async fn enter(&self, endpoint: &'static str) -> Result<(), ApiError> {
        self.calls.lock().expect("lock").push(endpoint.to_string());
        if self.hang_on == Some(endpoint) && self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.failures.get(endpoint) {
            Some(message) => Err(ApiError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StudioApi for ScriptedApi {
    async fn upload_video(
        &self,
        _session: &SessionId,
        video: &VideoFile,
    ) -> Result<VideoInfo, ApiError> {
        self.enter("upload").await?;
        Ok(VideoInfo {
            filename: video.file_name().to_string(),
            size: video.display_size(),
            path: None,
        })
    }

    async fn transcribe(&self, _session: &SessionId) -> Result<TranscriptInfo, ApiError> {
        self.enter("transcribe").await?;
        Ok(TranscriptInfo {
            word_count: 120,
            duration: 95.0,
            text_preview: None,
        })
    }

    async fn generate_captions(
        &self,
        _session: &SessionId,
        style: CaptionStyle,
    ) -> Result<CaptionInfo, ApiError> {
        self.enter("caption").await?;
        self.caption_styles.lock().expect("lock").push(style);
        Ok(CaptionInfo::default())
    }

    async fn generate_content(
        &self,
        _session: &SessionId,
        title: &str,
    ) -> Result<ContentInfo, ApiError> {
        self.enter("content").await?;
        self.titles.lock().expect("lock").push(title.to_string());
        Ok(ContentInfo::default())
    }

    async fn generate_thumbnail(
        &self,
        _session: &SessionId,
        style: ThumbnailStyle,
    ) -> Result<serde_json::Value, ApiError> {
        self.enter("thumbnail").await?;
        self.thumbnail_styles.lock().expect("lock").push(style);
        Ok(serde_json::json!({"style": style.as_str()}))
    }

    async fn session_snapshot(&self, _session: &SessionId) -> Result<SessionSnapshot, ApiError> {
        self.enter("snapshot").await?;
        if self.snapshot_fails {
            return Err(ApiError::Status {
                status: 500,
                message: "snapshot unavailable".into(),
            });
        }
        Ok(serde_json::from_value(serde_json::json!({
            "data": {
                "content": {"blog": {"sections": [{}, {}]}, "twitter": "post", "youtube": "long description"},
                "thumbnail_style": "dramatic"
            }
        }))
        .expect("snapshot"))
    }

    async fn export(
        &self,
        _session: &SessionId,
        formats: &[ExportFormat],
    ) -> Result<ExportPayload, ApiError> {
        self.enter("export").await?;
        self.export_formats
            .lock()
            .expect("lock")
            .push(formats.to_vec());
        Ok(ExportPayload {
            exported_files: formats
                .iter()
                .map(|format| (format.to_string(), format!("exports/{format}.txt")))
                .collect(),
        })
    }

    async fn generate_image_prompts(
        &self,
        _session: &SessionId,
    ) -> Result<serde_json::Value, ApiError> {
        self.enter("image-prompts").await?;
        Ok(serde_json::Value::Null)
    }

    async fn upload_image(
        &self,
        _session: &SessionId,
        image_type: &str,
        _bytes: &[u8],
    ) -> Result<String, ApiError> {
        self.enter("upload-images").await?;
        Ok(format!("images/{image_type}.png"))
    }

    async fn fetch_file(&self, _session: &SessionId, _filename: &str) -> Result<Vec<u8>, ApiError> {
        self.enter("file").await?;
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingView {
    events: Vec<String>,
}

impl RecordingView {
    fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| event.strip_prefix("error:"))
            .collect()
    }

    fn steps(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| event.strip_prefix("step:"))
            .filter_map(|n| n.parse().ok())
            .collect()
    }
}

impl WizardView for RecordingView {
    fn loading_started(&mut self, notice: &LoadingNotice) {
        self.events.push(format!("loading:{}", notice.title));
    }

    fn loading_finished(&mut self) {
        self.events.push("loading-done".into());
    }

    fn step_changed(&mut self, progress: &StepProgress) {
        self.events.push(format!("step:{}", progress.current.number()));
    }

    fn video_selected(&mut self, video: &VideoFile) {
        self.events.push(format!("video:{}", video.file_name()));
    }

    fn transcript_ready(&mut self, summary: &TranscriptSummary) {
        self.events.push(format!("transcript:{summary}"));
    }

    fn export_summary_ready(&mut self, summary: &ExportSummary) {
        self.events
            .push(format!("summary:{}", summary.lines().join(" | ")));
    }

    fn error(&mut self, message: &str) {
        self.events.push(format!("error:{message}"));
    }

    fn success(&mut self, title: &str, _message: &str) {
        self.events.push(format!("success:{title}"));
    }
}

fn test_settings() -> Settings {
    Settings {
        request_timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
        auto_advance_delay: Duration::ZERO,
        ..Settings::default()
    }
}

fn wizard_with(
    api: ScriptedApi,
    settings: Settings,
) -> (WizardController<RecordingView>, Arc<ScriptedApi>) {
    let api = Arc::new(api);
    let ctx = AppContext::new(
        settings,
        SessionId::new("session_test").expect("session"),
        api.clone(),
    );
    (WizardController::new(ctx, RecordingView::default()), api)
}

fn wizard(api: ScriptedApi) -> (WizardController<RecordingView>, Arc<ScriptedApi>) {
    wizard_with(api, test_settings())
}

/// Completes every step before `target` with valid inputs.
async fn advance_to(wizard: &mut WizardController<RecordingView>, target: WizardStep) {
    while wizard.current_step() < target {
        match wizard.current_step() {
            WizardStep::Upload => {
                wizard
                    .choose_video("talk.mp4", "video/mp4", 1024)
                    .expect("select");
                wizard.upload_video().await.expect("upload");
            }
            WizardStep::Transcribe => {
                wizard.transcribe().await.expect("transcribe");
            }
            WizardStep::Caption => {
                wizard.select_caption_style(CaptionStyle::Standard);
                wizard.generate_captions().await.expect("captions");
            }
            WizardStep::Content => {
                wizard.set_title("Launch talk");
                wizard.generate_content().await.expect("content");
            }
            WizardStep::Thumbnail => {
                wizard.select_thumbnail_style(ThumbnailStyle::Dramatic);
                wizard.generate_thumbnail().await.expect("thumbnail");
            }
            WizardStep::Export => unreachable!("export is never a target predecessor"),
        }
    }
}

#[tokio::test]
async fn full_flow_moves_one_step_at_a_time() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Export).await;
    wizard.set_export_format(ExportFormat::Blog, true);
    let files = wizard.export().await.expect("export");

    assert!(wizard.is_finished());
    assert_eq!(files.get("blog").map(String::as_str), Some("exports/blog.txt"));
    assert_eq!(wizard.view().steps(), vec![1, 2, 3, 4, 5, 6, 6]);
    assert_eq!(
        api.calls(),
        vec!["upload", "transcribe", "caption", "content", "thumbnail", "snapshot", "export"]
    );
    assert!(wizard
        .view()
        .events
        .contains(&"success:Export complete!".to_string()));
    assert!(wizard
        .progress()
        .markers()
        .iter()
        .all(|(_, marker)| *marker == StepMarker::Completed));
}

#[tokio::test]
async fn unsupported_type_is_rejected_without_network() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());

    let err = wizard
        .choose_video("talk.webm", "video/webm", 10)
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::UnsupportedMediaType { .. })
    ));
    assert!(wizard.upload_video().await.is_err());

    assert!(api.calls().is_empty());
    assert_eq!(wizard.current_step(), WizardStep::Upload);
    assert_eq!(wizard.view().errors().len(), 2);
    assert!(wizard.view().errors()[0].contains("MP4, MOV, AVI or MKV"));
    assert_eq!(wizard.view().errors()[1], "select a video file first");
}

#[tokio::test]
async fn oversized_file_is_rejected_without_network() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());

    let err = wizard
        .choose_video("long.mkv", "video/mkv", MAX_VIDEO_BYTES + 1)
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::FileTooLarge { .. })
    ));
    assert!(wizard.state().uploaded_video().is_none());
    assert!(api.calls().is_empty());

    wizard
        .choose_video("long.mkv", "video/mkv", MAX_VIDEO_BYTES)
        .expect("exactly at the ceiling");
    wizard.upload_video().await.expect("upload");
    assert_eq!(wizard.current_step(), WizardStep::Transcribe);
}

#[tokio::test]
async fn second_caption_style_replaces_first() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Caption).await;

    wizard.select_caption_style(CaptionStyle::Standard);
    wizard.select_caption_style(CaptionStyle::Dynamic);
    assert_eq!(wizard.state().caption_style(), Some(CaptionStyle::Dynamic));
    wizard.generate_captions().await.expect("captions");

    assert_eq!(
        api.caption_styles.lock().expect("lock").clone(),
        vec![CaptionStyle::Dynamic]
    );
}

#[tokio::test]
async fn second_thumbnail_style_replaces_first() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Thumbnail).await;

    wizard.select_thumbnail_style(ThumbnailStyle::Dramatic);
    wizard.select_thumbnail_style(ThumbnailStyle::Professional);
    assert_eq!(
        wizard.state().thumbnail_style(),
        Some(ThumbnailStyle::Professional)
    );
    assert_eq!(wizard.state().caption_style(), Some(CaptionStyle::Standard));
    wizard.generate_thumbnail().await.expect("thumbnail");

    assert_eq!(
        api.thumbnail_styles.lock().expect("lock").clone(),
        vec![ThumbnailStyle::Professional]
    );
}

#[tokio::test]
async fn blank_title_is_rejected_locally() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Content).await;
    let calls_before = api.calls().len();

    wizard.set_title("   \t");
    let err = wizard.generate_content().await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::EmptyTitle)
    ));
    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(wizard.current_step(), WizardStep::Content);

    wizard.set_title("  Launch talk  ");
    wizard.generate_content().await.expect("content");
    assert_eq!(
        api.titles.lock().expect("lock").clone(),
        vec!["Launch talk".to_string()]
    );
}

#[tokio::test]
async fn export_requires_a_format_and_sends_checked_subset() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Export).await;

    let err = wizard.export().await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::NoExportFormat)
    ));
    assert!(!api.calls().contains(&"export".to_string()));

    assert!(wizard.toggle_export_format(ExportFormat::X));
    assert!(wizard.toggle_export_format(ExportFormat::Youtube));
    assert!(!wizard.toggle_export_format(ExportFormat::Youtube));
    wizard.set_export_format(ExportFormat::Blog, true);
    wizard.export().await.expect("export");

    assert_eq!(
        api.export_formats.lock().expect("lock").clone(),
        vec![vec![ExportFormat::Blog, ExportFormat::X]]
    );
}

#[tokio::test]
async fn application_failure_keeps_step_and_surfaces_message() {
    let cases = [
        ("upload", WizardStep::Upload),
        ("transcribe", WizardStep::Transcribe),
        ("caption", WizardStep::Caption),
        ("content", WizardStep::Content),
        ("thumbnail", WizardStep::Thumbnail),
        ("export", WizardStep::Export),
    ];

    for (endpoint, step) in cases {
        let (mut wizard, _api) = wizard(ScriptedApi::failing(endpoint, "X"));
        advance_to(&mut wizard, step).await;
        let steps_before = wizard.view().steps();

        let err = match step {
            WizardStep::Upload => {
                wizard
                    .choose_video("talk.mov", "video/mov", 1)
                    .expect("select");
                wizard.upload_video().await.map(|_| ()).unwrap_err()
            }
            WizardStep::Transcribe => wizard.transcribe().await.map(|_| ()).unwrap_err(),
            WizardStep::Caption => {
                wizard.select_caption_style(CaptionStyle::Minimal);
                wizard.generate_captions().await.map(|_| ()).unwrap_err()
            }
            WizardStep::Content => {
                wizard.set_title("t");
                wizard.generate_content().await.map(|_| ()).unwrap_err()
            }
            WizardStep::Thumbnail => {
                wizard.select_thumbnail_style(ThumbnailStyle::Mystery);
                wizard.generate_thumbnail().await.map(|_| ()).unwrap_err()
            }
            WizardStep::Export => {
                wizard.set_export_format(ExportFormat::Blog, true);
                wizard.export().await.map(|_| ()).unwrap_err()
            }
        };

        assert!(matches!(err, WizardError::Call { .. }), "{endpoint}: {err}");
        assert!(err.to_string().ends_with(": X"), "{endpoint}: {err}");
        assert_eq!(wizard.current_step(), step, "{endpoint}");
        assert!(!wizard.is_finished(), "{endpoint}");
        assert_eq!(wizard.view().steps(), steps_before, "{endpoint}");
        let last_error = wizard.view().errors().last().map(|e| e.to_string());
        assert!(last_error.is_some_and(|e| e.contains('X')), "{endpoint}");
        assert_eq!(
            wizard.view().events.last().map(String::as_str),
            Some(format!("error:{err}").as_str()),
            "{endpoint}"
        );
    }
}

#[tokio::test]
async fn actions_for_other_steps_are_rejected() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    wizard.select_caption_style(CaptionStyle::Standard);

    let err = wizard.generate_captions().await.unwrap_err();
    assert!(matches!(
        err,
        WizardError::WrongStep {
            expected: WizardStep::Caption,
            current: WizardStep::Upload,
            ..
        }
    ));
    assert!(api.calls().is_empty());

    advance_to(&mut wizard, WizardStep::Caption).await;
    let err = wizard
        .choose_video("again.mp4", "video/mp4", 1)
        .unwrap_err();
    assert!(matches!(err, WizardError::WrongStep { .. }));
    assert_eq!(wizard.current_step(), WizardStep::Caption);
}

#[tokio::test]
async fn finished_wizard_rejects_further_exports() {
    let (mut wizard, api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Export).await;
    wizard.set_export_format(ExportFormat::Youtube, true);
    wizard.export().await.expect("export");

    let err = wizard.export().await.unwrap_err();
    assert!(matches!(err, WizardError::Finished));
    assert_eq!(
        api.calls().iter().filter(|c| c.as_str() == "export").count(),
        1
    );
}

#[tokio::test]
async fn hung_request_times_out_and_can_be_retried() {
    let settings = Settings {
        request_timeout: Duration::from_millis(50),
        ..test_settings()
    };
    let (mut wizard, api) = wizard_with(ScriptedApi::hanging("transcribe"), settings);
    advance_to(&mut wizard, WizardStep::Transcribe).await;

    let err = wizard.transcribe().await.unwrap_err();
    assert!(matches!(err, WizardError::Timeout { action: "transcription", .. }));
    assert_eq!(wizard.current_step(), WizardStep::Transcribe);
    assert_eq!(
        wizard.view().events[wizard.view().events.len() - 2],
        "loading-done"
    );

    api.hanging.store(false, Ordering::SeqCst);
    wizard.transcribe().await.expect("retry");
    assert_eq!(wizard.current_step(), WizardStep::Caption);
}

#[tokio::test]
async fn abort_cancels_in_flight_call_only() {
    let (mut wizard, api) = wizard(ScriptedApi::hanging("caption"));
    advance_to(&mut wizard, WizardStep::Caption).await;
    wizard.select_caption_style(CaptionStyle::Dynamic);

    let handle = wizard.abort_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.abort();
    });
    let err = wizard.generate_captions().await.unwrap_err();
    assert!(matches!(err, WizardError::Aborted { .. }));
    assert_eq!(wizard.current_step(), WizardStep::Caption);

    api.hanging.store(false, Ordering::SeqCst);
    wizard.generate_captions().await.expect("retry after abort");
    assert_eq!(wizard.current_step(), WizardStep::Content);
}

#[tokio::test]
async fn snapshot_failure_does_not_block_export_step() {
    let api = ScriptedApi {
        snapshot_fails: true,
        ..ScriptedApi::default()
    };
    let (mut wizard, _api) = wizard(api);
    advance_to(&mut wizard, WizardStep::Thumbnail).await;
    wizard.select_thumbnail_style(ThumbnailStyle::Professional);

    let outcome = wizard.generate_thumbnail().await.expect("thumbnail");
    assert!(outcome.summary.is_none());
    assert!(wizard.export_summary().is_none());
    assert_eq!(wizard.current_step(), WizardStep::Export);
    assert!(wizard.view().errors().is_empty());
}

#[tokio::test]
async fn thumbnail_success_publishes_export_summary() {
    let (mut wizard, _api) = wizard(ScriptedApi::ok());
    advance_to(&mut wizard, WizardStep::Thumbnail).await;
    wizard.select_thumbnail_style(ThumbnailStyle::Dramatic);

    let outcome = wizard.generate_thumbnail().await.expect("thumbnail");
    assert_eq!(outcome.thumbnail, serde_json::json!({"style": "dramatic"}));
    let summary = wizard.export_summary().expect("summary");
    assert_eq!(summary.blog_sections, Some(2));
    assert_eq!(summary.thumbnail_style.as_deref(), Some("dramatic"));
    assert!(wizard
        .view()
        .events
        .iter()
        .any(|e| e.starts_with("summary:Blog: 2 sections generated")));
}

#[tokio::test]
async fn transcription_summary_shows_before_delayed_advance() {
    let settings = Settings {
        auto_advance_delay: Duration::from_millis(40),
        ..test_settings()
    };
    let (mut wizard, _api) = wizard_with(ScriptedApi::ok(), settings);
    advance_to(&mut wizard, WizardStep::Transcribe).await;

    let started = Instant::now();
    let summary = wizard.transcribe().await.expect("transcribe");
    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!((summary.minutes(), summary.seconds()), (1, 35));

    let events = &wizard.view().events;
    let transcript_at = events
        .iter()
        .position(|e| e == "transcript:120 words recognized, 1m 35s")
        .expect("summary shown");
    let caption_at = events.iter().position(|e| e == "step:3").expect("advanced");
    assert!(transcript_at < caption_at);
    assert_eq!(wizard.current_step(), WizardStep::Caption);
}

#[tokio::test]
async fn abort_during_snapshot_refresh_skips_summary_and_advances() {
    let settings = Settings {
        request_timeout: Duration::from_secs(2),
        ..test_settings()
    };
    let (mut wizard, _api) = wizard_with(ScriptedApi::hanging("snapshot"), settings);
    advance_to(&mut wizard, WizardStep::Thumbnail).await;
    wizard.select_thumbnail_style(ThumbnailStyle::Mystery);

    let handle = wizard.abort_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.abort();
    });
    let started = Instant::now();
    let outcome = wizard.generate_thumbnail().await.expect("thumbnail");

    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(outcome.summary.is_none());
    assert_eq!(wizard.current_step(), WizardStep::Export);
    assert!(wizard.view().errors().is_empty());

    let events = &wizard.view().events;
    let refresh_at = events
        .iter()
        .position(|e| e == "loading:Preparing export...")
        .expect("refresh shows its own indicator");
    assert_eq!(events[refresh_at + 1], "loading-done");
    assert_eq!(events[refresh_at + 2], "step:6");
}

#[tokio::test]
async fn abort_cuts_auto_advance_delay_short() {
    let settings = Settings {
        auto_advance_delay: Duration::from_secs(5),
        ..test_settings()
    };
    let (mut wizard, _api) = wizard_with(ScriptedApi::ok(), settings);
    advance_to(&mut wizard, WizardStep::Transcribe).await;

    let handle = wizard.abort_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.abort();
    });
    let started = Instant::now();
    wizard.transcribe().await.expect("transcribe");

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(wizard.current_step(), WizardStep::Caption);
}

#[tokio::test]
async fn abort_reports_whether_a_call_was_in_flight() {
    let (mut wizard, api) = wizard(ScriptedApi::hanging("transcribe"));
    let handle = wizard.abort_handle();
    assert!(!handle.abort());

    advance_to(&mut wizard, WizardStep::Transcribe).await;
    assert!(!handle.abort(), "finished calls leave nothing to abort");

    let (tx, rx) = tokio::sync::oneshot::channel();
    let in_flight = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(in_flight.abort());
    });
    let err = wizard.transcribe().await.unwrap_err();
    assert!(matches!(err, WizardError::Aborted { .. }));
    assert!(rx.await.expect("abort result"));
    assert!(!handle.abort());

    api.hanging.store(false, Ordering::SeqCst);
    wizard.transcribe().await.expect("retry");
}
