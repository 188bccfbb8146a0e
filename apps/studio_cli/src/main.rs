mod cli;
mod commands;
mod effects;
mod prompts;
mod run;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use shared::domain::SessionId;
use studio_client::{load_settings, AppContext, Settings};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref());
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(session_id) = cli.session_id {
        settings.session_id = Some(session_id);
    }

    match cli.command {
        Command::Preview => {
            println!("{}", settings.preview_url);
            Ok(())
        }
        Command::Run(args) => run::run_wizard(connect(settings)?, args).await,
        Command::Session => commands::show_session(&connect(settings)?).await,
        Command::ImagePrompts => commands::image_prompts(&connect(settings)?).await,
        Command::UploadImage { kind, path } => {
            commands::upload_image(&connect(settings)?, &kind, &path).await
        }
        Command::FetchFile { name, output } => {
            commands::fetch_file(&connect(settings)?, &name, output.as_deref()).await
        }
    }
}

fn connect(settings: Settings) -> Result<AppContext> {
    let raw = settings.session_id.clone().context(
        "no session id: pass --session-id, set STUDIO_SESSION_ID or add session_id to studio.toml",
    )?;
    let session = SessionId::new(raw).context("invalid session id")?;
    tracing::info!(server = %settings.server_url, session_id = %session, "connecting");
    Ok(AppContext::connect(settings, session)?)
}
