//! Plain terminal rendering of the wizard hooks.

use console::style;
use studio_client::{
    wizard::{
        ExportSummary, LoadingNotice, StepMarker, StepProgress, TranscriptSummary, WizardView,
    },
    VideoFile,
};

pub struct TerminalView {
    show_loading: bool,
}

impl TerminalView {
    /// `show_loading` prints the loading notice itself; turn it off when a
    /// spinner takes care of that.
    pub fn new(show_loading: bool) -> Self {
        Self { show_loading }
    }
}

fn progress_bar(progress: &StepProgress, width: usize) -> String {
    let filled = (progress.fraction() * width as f32).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled.min(width)),
        "░".repeat(width.saturating_sub(filled))
    )
}

fn marker_line(progress: &StepProgress) -> String {
    progress
        .markers()
        .into_iter()
        .map(|(step, marker)| match marker {
            StepMarker::Completed => format!("{} {}", style("✔").green(), style(step.title()).dim()),
            StepMarker::Active => format!("{} {}", style("●").cyan(), style(step.title()).bold()),
            StepMarker::Pending => format!("{} {}", style("○").dim(), style(step.title()).dim()),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

impl WizardView for TerminalView {
    fn loading_started(&mut self, notice: &LoadingNotice) {
        if self.show_loading {
            println!(
                "  {} {} {}",
                style("…").cyan(),
                notice.title,
                style(&notice.message).dim()
            );
        }
    }

    fn step_changed(&mut self, progress: &StepProgress) {
        println!();
        if progress.finished {
            println!(
                "  {} {}",
                style(progress_bar(progress, 24)).green(),
                style("All steps complete").green().bold()
            );
        } else {
            println!(
                "  {} {}",
                style(format!(
                    "Step {}/{}: {}",
                    progress.current.number(),
                    studio_client::WizardStep::TOTAL,
                    progress.current.title()
                ))
                .white()
                .bold(),
                style(format!("{} {}%", progress_bar(progress, 24), progress.percent())).cyan()
            );
        }
        println!("  {}", marker_line(progress));
        println!("  {}", style("─".repeat(50)).dim());
    }

    fn video_selected(&mut self, video: &VideoFile) {
        println!(
            "  {} {} {}",
            style("🎬").cyan(),
            video.file_name(),
            style(format!("({}, {})", video.display_size(), video.media_type())).dim()
        );
    }

    fn transcript_ready(&mut self, summary: &TranscriptSummary) {
        println!(
            "  {} {} words recognized {}",
            style("✔").green(),
            style(summary.word_count).bold(),
            style(format!("({})", summary.duration_label())).dim()
        );
    }

    fn export_summary_ready(&mut self, summary: &ExportSummary) {
        println!("  {}", style("Generated so far").white().bold());
        for line in summary.lines() {
            println!("    {} {}", style("•").dim(), line);
        }
    }

    fn error(&mut self, message: &str) {
        eprintln!("  {} {}", style("✖").red().bold(), style(message).red());
    }

    fn success(&mut self, title: &str, message: &str) {
        println!("  {} {}", style("✔").green(), style(title).green().bold());
        println!("    {}", style(message).dim());
    }
}
