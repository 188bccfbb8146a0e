use std::time::Duration;

use thiserror::Error;

use crate::wizard::WizardStep;

/// Local precondition failures. Raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported video format ({media_type}); choose an MP4, MOV, AVI or MKV file")]
    UnsupportedMediaType { media_type: String },
    #[error("video file is too large ({size}); choose a file of 2 GB or less")]
    FileTooLarge { size_bytes: u64, size: String },
    #[error("{path} is not a regular file")]
    NotAFile { path: String },
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("select a video file first")]
    MissingVideo,
    #[error("select a caption style first")]
    MissingCaptionStyle,
    #[error("enter a video title first")]
    EmptyTitle,
    #[error("select a thumbnail style first")]
    MissingThumbnailStyle,
    #[error("select at least one export format")]
    NoExportFormat,
}

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{action} failed: {source}")]
    Call {
        action: &'static str,
        #[source]
        source: ApiError,
    },
    #[error("{action} timed out after {}s", .after.as_secs())]
    Timeout {
        action: &'static str,
        after: Duration,
    },
    #[error("{action} was aborted")]
    Aborted { action: &'static str },
    #[error("{action} belongs to the {expected} step but the wizard is on the {current} step")]
    WrongStep {
        action: &'static str,
        expected: WizardStep,
        current: WizardStep,
    },
    #[error("the wizard has already finished")]
    Finished,
}

impl WizardError {
    /// True for failures caught locally, before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_) | WizardError::WrongStep { .. } | WizardError::Finished
        )
    }
}
