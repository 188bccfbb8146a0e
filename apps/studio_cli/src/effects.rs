//! Spinner while a request is in flight and a small celebration at the end.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use studio_client::wizard::{EffectLayer, LoadingNotice};

const CONFETTI: [&str; 6] = ["✦", "✧", "•", "★", "✺", "❖"];

#[derive(Default)]
pub struct SpinnerEffects {
    spinner: Option<ProgressBar>,
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn confetti_row(width: usize, seed: usize) -> String {
    (0..width)
        .map(|i| {
            let glyph = CONFETTI[(i * 7 + seed) % CONFETTI.len()];
            match (i + seed) % 4 {
                0 => style(glyph).magenta().to_string(),
                1 => style(glyph).yellow().to_string(),
                2 => style(glyph).cyan().to_string(),
                _ => style(glyph).green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl EffectLayer for SpinnerEffects {
    fn loading_started(&mut self, notice: &LoadingNotice) {
        if let Some(previous) = self.spinner.take() {
            previous.finish_and_clear();
        }
        self.spinner = Some(create_spinner(format!(
            "{} {}",
            style(&notice.title).bold(),
            style(&notice.message).dim()
        )));
    }

    fn loading_finished(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn success(&mut self, title: &str, _message: &str) {
        println!();
        println!("  {}", confetti_row(16, 0));
        println!("  {}  {}", style("🎉").bold(), style(title).green().bold());
        println!("  {}", confetti_row(16, 3));
    }
}

impl Drop for SpinnerEffects {
    fn drop(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
