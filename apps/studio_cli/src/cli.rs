use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::domain::{CaptionStyle, ExportFormat, ThumbnailStyle};

/// Turn a recorded talk into captions, articles, posts and a thumbnail.
#[derive(Parser, Debug)]
#[command(name = "studio", version, about)]
pub struct Cli {
    /// Settings file (defaults to ./studio.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Processing backend base URL
    #[arg(long, global = true)]
    pub server_url: Option<String>,
    /// Backend session to work in
    #[arg(long, global = true)]
    pub session_id: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk through every wizard step
    Run(RunArgs),
    /// Print the backend's raw view of the session
    Session,
    /// Ask the backend for image generation prompts
    ImagePrompts,
    /// Attach an image to the session
    UploadImage {
        /// Image role, e.g. thumbnail or illustration
        #[arg(long)]
        kind: String,
        path: PathBuf,
    },
    /// Download a file produced for the session
    FetchFile {
        name: String,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print where the generated content can be previewed
    Preview,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Video file to upload (MP4, MOV, AVI or MKV)
    #[arg(long)]
    pub video: Option<PathBuf>,
    #[arg(long)]
    pub caption_style: Option<CaptionStyle>,
    /// Title used for the written content
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub thumbnail_style: Option<ThumbnailStyle>,
    /// Comma separated: blog,x,youtube
    #[arg(long, value_delimiter = ',')]
    pub export: Vec<ExportFormat>,
    /// Plain output without spinners or the closing celebration
    #[arg(long)]
    pub no_effects: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_flags_parse_into_typed_tags() {
        let cli = Cli::parse_from([
            "studio",
            "--session-id",
            "session_1",
            "run",
            "--video",
            "talk.mp4",
            "--caption-style",
            "Dynamic",
            "--thumbnail-style",
            "mystery",
            "--export",
            "x,blog",
        ]);

        assert_eq!(cli.session_id.as_deref(), Some("session_1"));
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.caption_style, Some(CaptionStyle::Dynamic));
        assert_eq!(args.thumbnail_style, Some(ThumbnailStyle::Mystery));
        assert_eq!(args.export, vec![ExportFormat::X, ExportFormat::Blog]);
        assert!(!args.no_effects);
    }

    #[test]
    fn unknown_style_is_rejected() {
        let parsed = Cli::try_parse_from(["studio", "run", "--caption-style", "karaoke"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["studio", "fetch-file", "blog.md", "--server-url", "http://h:1"]);
        assert_eq!(cli.server_url.as_deref(), Some("http://h:1"));
        assert!(matches!(cli.command, Command::FetchFile { output: None, .. }));
    }
}
