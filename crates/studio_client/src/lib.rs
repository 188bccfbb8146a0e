//! Client for the VideoAI Studio processing backend.
//!
//! [`WizardController`] walks a session through upload, transcription,
//! captions, written content, thumbnail and export, one backend call per step.

pub mod api;
pub mod config;
mod context;
pub mod error;
pub mod validation;
pub mod wizard;

pub use api::{HttpStudioApi, StudioApi};
pub use config::{load_settings, Settings};
pub use context::AppContext;
pub use error::{ApiError, ValidationError, WizardError};
pub use validation::VideoFile;
pub use wizard::{WizardController, WizardStep};
