use std::fmt;

/// Wizard step definitions, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    Upload,
    Transcribe,
    Caption,
    Content,
    Thumbnail,
    Export,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Upload,
        WizardStep::Transcribe,
        WizardStep::Caption,
        WizardStep::Content,
        WizardStep::Thumbnail,
        WizardStep::Export,
    ];

    pub const TOTAL: usize = Self::ALL.len();

    /// 1-indexed position in the flow.
    pub fn number(self) -> usize {
        match self {
            WizardStep::Upload => 1,
            WizardStep::Transcribe => 2,
            WizardStep::Caption => 3,
            WizardStep::Content => 4,
            WizardStep::Thumbnail => 5,
            WizardStep::Export => 6,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Upload => "Upload video",
            WizardStep::Transcribe => "Transcribe audio",
            WizardStep::Caption => "Captions",
            WizardStep::Content => "Written content",
            WizardStep::Thumbnail => "Thumbnail",
            WizardStep::Export => "Export",
        }
    }

    /// `None` on the last step.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Upload => Some(WizardStep::Transcribe),
            WizardStep::Transcribe => Some(WizardStep::Caption),
            WizardStep::Caption => Some(WizardStep::Content),
            WizardStep::Content => Some(WizardStep::Thumbnail),
            WizardStep::Thumbnail => Some(WizardStep::Export),
            WizardStep::Export => None,
        }
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Upload => "upload",
            WizardStep::Transcribe => "transcribe",
            WizardStep::Caption => "caption",
            WizardStep::Content => "content",
            WizardStep::Thumbnail => "thumbnail",
            WizardStep::Export => "export",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Completed,
    Active,
    Pending,
}

/// What the step indicator and progress bar should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    pub current: WizardStep,
    pub finished: bool,
}

impl StepProgress {
    /// `current / total`, in `(0, 1]`.
    pub fn fraction(&self) -> f32 {
        self.current.number() as f32 / WizardStep::TOTAL as f32
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }

    pub fn marker(&self, step: WizardStep) -> StepMarker {
        if step < self.current || (self.finished && step == self.current) {
            StepMarker::Completed
        } else if step == self.current {
            StepMarker::Active
        } else {
            StepMarker::Pending
        }
    }

    pub fn markers(&self) -> Vec<(WizardStep, StepMarker)> {
        WizardStep::ALL
            .iter()
            .map(|&step| (step, self.marker(step)))
            .collect()
    }
}
