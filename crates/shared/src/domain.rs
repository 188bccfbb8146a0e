use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend-issued correlation id for one in-progress project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidSessionId::Blank);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSessionId {
    #[error("session id is empty")]
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! tag_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|tag| tag.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| UnknownTag {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

tag_enum!(
    /// Caption layout requested from the backend. Controls words per segment.
    CaptionStyle, "caption style", {
        Standard => "standard",
        Dynamic => "dynamic",
        Minimal => "minimal",
    }
);

tag_enum!(
    ThumbnailStyle, "thumbnail style", {
        Dramatic => "dramatic",
        Mystery => "mystery",
        Professional => "professional",
    }
);

tag_enum!(
    /// Output content type persisted by the export step.
    ///
    /// `X` is the short social post, `Youtube` the long video description.
    /// Declaration order is the canonical order used on the wire.
    ExportFormat, "export format", {
        Blog => "blog",
        X => "x",
        Youtube => "youtube",
    }
);

impl ExportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Blog => "Blog article",
            ExportFormat::X => "X post",
            ExportFormat::Youtube => "YouTube description",
        }
    }
}
