use serde::{Deserialize, Serialize};

/// Failure body returned by the backend.
///
/// Application-level failures arrive as `{success:false, message}` with a 2xx
/// status; HTTP exceptions arrive as `{detail}` with a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: Some(message.into()),
            detail: None,
        }
    }

    /// Most specific human-readable reason carried by the body, if any.
    pub fn reason(&self) -> Option<&str> {
        fn non_blank(field: &Option<String>) -> Option<&str> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
        }

        non_blank(&self.detail).or_else(|| non_blank(&self.message))
    }
}
