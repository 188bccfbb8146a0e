//! One-shot commands that talk to the backend outside the wizard flow.

use std::{future::Future, path::Path};

use anyhow::{anyhow, Context, Result};
use studio_client::{ApiError, AppContext};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Bounds a single request by the configured request timeout.
async fn bounded<T>(
    ctx: &AppContext,
    what: &str,
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T> {
    let limit = ctx.settings().request_timeout;
    tokio::time::timeout(limit, request)
        .await
        .map_err(|_| anyhow!("{what} timed out after {}s", limit.as_secs()))?
        .with_context(|| format!("{what} failed"))
}

pub async fn show_session(ctx: &AppContext) -> Result<()> {
    eprintln!(
        "server: {}\nsession: {}",
        ctx.settings().server_url,
        ctx.session()
    );
    let snapshot = bounded(ctx, "session lookup", ctx.snapshot()).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub async fn image_prompts(ctx: &AppContext) -> Result<()> {
    let api = ctx.api();
    let prompts = bounded(
        ctx,
        "image prompt generation",
        api.generate_image_prompts(ctx.session()),
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&prompts)?);
    Ok(())
}

pub async fn upload_image(ctx: &AppContext, kind: &str, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let api = ctx.api();
    let stored = bounded(ctx, "image upload", api.upload_image(ctx.session(), kind, &bytes)).await?;
    info!(kind, bytes = bytes.len(), path = %stored, "image uploaded");
    println!("{stored}");
    Ok(())
}

pub async fn fetch_file(ctx: &AppContext, name: &str, output: Option<&Path>) -> Result<()> {
    let api = ctx.api();
    let bytes = bounded(ctx, "file download", api.fetch_file(ctx.session(), name)).await?;
    match output {
        Some(path) => {
            tokio::fs::write(path, &bytes)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            info!(file = name, bytes = bytes.len(), to = %path.display(), "file saved");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&bytes).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
