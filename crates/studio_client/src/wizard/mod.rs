//! The six-step processing wizard: step definitions, in-memory state,
//! presentation hooks and the controller that drives them.

mod controller;
mod state;
mod step;
mod summary;
mod view;

pub use controller::{AbortHandle, ThumbnailOutcome, WizardController};
pub use state::WizardState;
pub use step::{StepMarker, StepProgress, WizardStep};
pub use summary::{ExportSummary, TranscriptSummary};
pub use view::{EffectLayer, LoadingNotice, NullView, WithEffects, WizardView};
