use std::collections::BTreeSet;

use shared::domain::{CaptionStyle, ExportFormat, ThumbnailStyle};

use super::step::{StepProgress, WizardStep};
use crate::validation::VideoFile;

/// In-memory wizard state. Never persisted; the backend owns the artifacts.
#[derive(Debug, Clone)]
pub struct WizardState {
    current_step: WizardStep,
    finished: bool,
    uploaded_video: Option<VideoFile>,
    caption_style: Option<CaptionStyle>,
    thumbnail_style: Option<ThumbnailStyle>,
    title: String,
    export_formats: BTreeSet<ExportFormat>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Upload,
            finished: false,
            uploaded_video: None,
            caption_style: None,
            thumbnail_style: None,
            title: String::new(),
            export_formats: BTreeSet::new(),
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self) -> StepProgress {
        StepProgress {
            current: self.current_step,
            finished: self.finished,
        }
    }

    pub fn uploaded_video(&self) -> Option<&VideoFile> {
        self.uploaded_video.as_ref()
    }

    pub fn caption_style(&self) -> Option<CaptionStyle> {
        self.caption_style
    }

    pub fn thumbnail_style(&self) -> Option<ThumbnailStyle> {
        self.thumbnail_style
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Checked formats in canonical wire order.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        self.export_formats.iter().copied().collect()
    }

    pub fn is_export_format_selected(&self, format: ExportFormat) -> bool {
        self.export_formats.contains(&format)
    }

    pub(crate) fn set_video(&mut self, video: VideoFile) {
        self.uploaded_video = Some(video);
    }

    pub(crate) fn set_caption_style(&mut self, style: CaptionStyle) {
        self.caption_style = Some(style);
    }

    pub(crate) fn set_thumbnail_style(&mut self, style: ThumbnailStyle) {
        self.thumbnail_style = Some(style);
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub(crate) fn set_export_format(&mut self, format: ExportFormat, checked: bool) {
        if checked {
            self.export_formats.insert(format);
        } else {
            self.export_formats.remove(&format);
        }
    }

    /// Moves exactly one step forward. The last step finishes the wizard instead.
    pub(crate) fn advance(&mut self) -> WizardStep {
        match self.current_step.next() {
            Some(next) => self.current_step = next,
            None => self.finished = true,
        }
        self.current_step
    }
}
