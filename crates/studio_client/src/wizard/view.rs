//! Presentation hooks. The controller only talks to a [`WizardView`]; cosmetic
//! behavior is layered on with [`WithEffects`].

use super::{
    step::StepProgress,
    summary::{ExportSummary, TranscriptSummary},
};
use crate::validation::VideoFile;

/// Title and message of the blocking progress indicator for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingNotice {
    pub title: String,
    pub message: String,
}

impl LoadingNotice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait WizardView: Send {
    fn loading_started(&mut self, _notice: &LoadingNotice) {}
    fn loading_finished(&mut self) {}
    fn step_changed(&mut self, _progress: &StepProgress) {}
    fn video_selected(&mut self, _video: &VideoFile) {}
    fn transcript_ready(&mut self, _summary: &TranscriptSummary) {}
    fn export_summary_ready(&mut self, _summary: &ExportSummary) {}
    fn error(&mut self, _message: &str) {}
    fn success(&mut self, _title: &str, _message: &str) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl WizardView for NullView {}

impl<V: WizardView + ?Sized> WizardView for Box<V> {
    fn loading_started(&mut self, notice: &LoadingNotice) {
        (**self).loading_started(notice)
    }

    fn loading_finished(&mut self) {
        (**self).loading_finished()
    }

    fn step_changed(&mut self, progress: &StepProgress) {
        (**self).step_changed(progress)
    }

    fn video_selected(&mut self, video: &VideoFile) {
        (**self).video_selected(video)
    }

    fn transcript_ready(&mut self, summary: &TranscriptSummary) {
        (**self).transcript_ready(summary)
    }

    fn export_summary_ready(&mut self, summary: &ExportSummary) {
        (**self).export_summary_ready(summary)
    }

    fn error(&mut self, message: &str) {
        (**self).error(message)
    }

    fn success(&mut self, title: &str, message: &str) {
        (**self).success(title, message)
    }
}

/// Cosmetic hooks run after the base view's hook of the same name.
pub trait EffectLayer: Send {
    fn loading_started(&mut self, _notice: &LoadingNotice) {}
    fn loading_finished(&mut self) {}
    fn success(&mut self, _title: &str, _message: &str) {}
}

/// Decorates a base view with an effect layer.
pub struct WithEffects<V, E> {
    base: V,
    effects: E,
}

impl<V: WizardView, E: EffectLayer> WithEffects<V, E> {
    pub fn new(base: V, effects: E) -> Self {
        Self { base, effects }
    }

    pub fn base(&self) -> &V {
        &self.base
    }

    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub fn into_parts(self) -> (V, E) {
        (self.base, self.effects)
    }
}

impl<V: WizardView, E: EffectLayer> WizardView for WithEffects<V, E> {
    fn loading_started(&mut self, notice: &LoadingNotice) {
        self.base.loading_started(notice);
        self.effects.loading_started(notice);
    }

    fn loading_finished(&mut self) {
        self.base.loading_finished();
        self.effects.loading_finished();
    }

    fn step_changed(&mut self, progress: &StepProgress) {
        self.base.step_changed(progress);
    }

    fn video_selected(&mut self, video: &VideoFile) {
        self.base.video_selected(video);
    }

    fn transcript_ready(&mut self, summary: &TranscriptSummary) {
        self.base.transcript_ready(summary);
    }

    fn export_summary_ready(&mut self, summary: &ExportSummary) {
        self.base.export_summary_ready(summary);
    }

    fn error(&mut self, message: &str) {
        self.base.error(message);
    }

    fn success(&mut self, title: &str, message: &str) {
        self.base.success(title, message);
        self.effects.success(title, message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().expect("lock").push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().expect("lock").clone()
        }
    }

    struct BaseView(Journal);

    impl WizardView for BaseView {
        fn loading_started(&mut self, notice: &LoadingNotice) {
            self.0.push(format!("base:loading:{}", notice.title));
        }

        fn loading_finished(&mut self) {
            self.0.push("base:done");
        }

        fn error(&mut self, message: &str) {
            self.0.push(format!("base:error:{message}"));
        }

        fn success(&mut self, title: &str, _message: &str) {
            self.0.push(format!("base:success:{title}"));
        }
    }

    struct Sparkles(Journal);

    impl EffectLayer for Sparkles {
        fn loading_started(&mut self, _notice: &LoadingNotice) {
            self.0.push("fx:spin");
        }

        fn loading_finished(&mut self) {
            self.0.push("fx:stop");
        }

        fn success(&mut self, _title: &str, _message: &str) {
            self.0.push("fx:burst");
        }
    }

    #[test]
    fn decorator_runs_base_hook_before_effect() {
        let journal = Journal::default();
        let mut view = WithEffects::new(BaseView(journal.clone()), Sparkles(journal.clone()));

        view.loading_started(&LoadingNotice::new("Uploading", "..."));
        view.loading_finished();
        view.error("nope");
        view.success("Done", "saved");

        assert_eq!(
            journal.entries(),
            vec![
                "base:loading:Uploading",
                "fx:spin",
                "base:done",
                "fx:stop",
                "base:error:nope",
                "base:success:Done",
                "fx:burst",
            ]
        );
    }

    #[test]
    fn boxed_views_forward_hooks() {
        let journal = Journal::default();
        let mut view: Box<dyn WizardView> = Box::new(BaseView(journal.clone()));
        view.error("boxed");
        assert_eq!(journal.entries(), vec!["base:error:boxed"]);
    }
}
