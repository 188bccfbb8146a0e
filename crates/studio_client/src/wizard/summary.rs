use std::fmt;

use shared::protocol::{SessionSnapshot, TranscriptInfo};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscriptSummary {
    pub word_count: u64,
    pub duration_secs: f64,
}

impl TranscriptSummary {
    pub fn minutes(&self) -> u64 {
        (self.duration_secs.max(0.0) / 60.0).floor() as u64
    }

    pub fn seconds(&self) -> u64 {
        (self.duration_secs.max(0.0) % 60.0).floor() as u64
    }

    pub fn duration_label(&self) -> String {
        format!("{}m {}s", self.minutes(), self.seconds())
    }
}

impl From<&TranscriptInfo> for TranscriptSummary {
    fn from(info: &TranscriptInfo) -> Self {
        Self {
            word_count: info.word_count,
            duration_secs: info.duration,
        }
    }
}

impl fmt::Display for TranscriptSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} words recognized, {}",
            self.word_count,
            self.duration_label()
        )
    }
}

/// What the export step shows about the generated artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub blog_sections: Option<usize>,
    pub x_post_chars: Option<usize>,
    pub youtube_chars: Option<usize>,
    pub thumbnail_style: Option<String>,
}

impl ExportSummary {
    /// `None` when the snapshot carries no `data`.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let data = snapshot.data.as_ref().filter(|data| !data.is_empty())?;
        let content = data.content.as_ref();

        Some(Self {
            blog_sections: content
                .and_then(|content| content.blog.as_ref())
                .map(|blog| blog.sections.len()),
            x_post_chars: content
                .and_then(|content| content.twitter.as_deref())
                .filter(|post| !post.is_empty())
                .map(|post| post.chars().count()),
            youtube_chars: content
                .and_then(|content| content.youtube.as_deref())
                .filter(|desc| !desc.is_empty())
                .map(|desc| desc.chars().count()),
            thumbnail_style: data.thumbnail_style.clone(),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(sections) = self.blog_sections {
            lines.push(format!("Blog: {sections} sections generated"));
        }
        if let Some(chars) = self.x_post_chars {
            lines.push(format!("X: {chars} character post"));
        }
        if let Some(chars) = self.youtube_chars {
            lines.push(format!("YouTube: {chars} character description"));
        }
        if let Some(style) = &self.thumbnail_style {
            lines.push(format!("Thumbnail: {style} style"));
        }
        lines
    }
}
