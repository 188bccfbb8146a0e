use anyhow::{anyhow, bail, Result};
use console::style;
use studio_client::{
    wizard::{WithEffects, WizardView},
    AppContext, WizardController, WizardError, WizardStep,
};
use tracing::{info, warn};

use crate::{cli::RunArgs, effects::SpinnerEffects, prompts, terminal::TerminalView};

/// Inputs still to be consumed. Flag values are used for the first attempt
/// only; retries prompt again.
struct Inputs {
    args: RunArgs,
    interactive: bool,
}

fn missing(flag: &str) -> anyhow::Error {
    anyhow!("{flag} is required when not running interactively")
}

impl Inputs {
    fn video(&mut self) -> Result<std::path::PathBuf> {
        match self.args.video.take() {
            Some(path) => Ok(path),
            None if self.interactive => prompts::video_path(),
            None => Err(missing("--video")),
        }
    }

    fn caption_style(&mut self) -> Result<shared::domain::CaptionStyle> {
        match self.args.caption_style.take() {
            Some(style) => Ok(style),
            None if self.interactive => prompts::caption_style(),
            None => Err(missing("--caption-style")),
        }
    }

    fn title(&mut self) -> Result<String> {
        match self.args.title.take() {
            Some(title) => Ok(title),
            None if self.interactive => prompts::title(),
            None => Err(missing("--title")),
        }
    }

    fn thumbnail_style(&mut self) -> Result<shared::domain::ThumbnailStyle> {
        match self.args.thumbnail_style.take() {
            Some(style) => Ok(style),
            None if self.interactive => prompts::thumbnail_style(),
            None => Err(missing("--thumbnail-style")),
        }
    }

    fn export_formats(&mut self) -> Result<Vec<shared::domain::ExportFormat>> {
        let flagged = std::mem::take(&mut self.args.export);
        if !flagged.is_empty() {
            return Ok(flagged);
        }
        if self.interactive {
            prompts::export_formats()
        } else {
            Err(missing("--export"))
        }
    }
}

pub async fn run_wizard(ctx: AppContext, args: RunArgs) -> Result<()> {
    let view: Box<dyn WizardView> = if args.no_effects {
        Box::new(TerminalView::new(true))
    } else {
        Box::new(WithEffects::new(TerminalView::new(false), SpinnerEffects::default()))
    };
    let preview_url = ctx.settings().preview_url.clone();
    let mut wizard = WizardController::new(ctx, view);

    let abort = wizard.abort_handle();
    let interrupt = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if abort.abort() {
                warn!("interrupt received, aborted the current request");
            } else {
                warn!("interrupt received with no request in flight, exiting");
                std::process::exit(130);
            }
        }
    });

    let mut inputs = Inputs {
        args,
        interactive: console::user_attended(),
    };
    let outcome = drive(&mut wizard, &mut inputs).await;
    interrupt.abort();

    // Drop the view so a running spinner is cleared before the final lines.
    let _ = wizard.into_view();
    let exported = outcome?;
    println!();
    for (format, path) in &exported {
        println!("  {} {:<8} {}", style("→").cyan(), format, path);
    }
    println!("  Preview: {}", style(preview_url).underlined());
    Ok(())
}

async fn drive<V: WizardView>(
    wizard: &mut WizardController<V>,
    inputs: &mut Inputs,
) -> Result<std::collections::BTreeMap<String, String>> {
    loop {
        let step = wizard.current_step();
        let attempt = attempt_step(wizard, inputs, step).await;
        match attempt {
            Ok(Some(exported)) => return Ok(exported),
            Ok(None) => continue,
            Err(err) => {
                // Anything other than a wizard error (a prompt failing, a
                // missing flag) ends the run.
                let Some(wizard_err) = err.downcast_ref::<WizardError>() else {
                    return Err(err);
                };
                if matches!(wizard_err, WizardError::Finished) {
                    return Err(err);
                }
                if !inputs.interactive || !prompts::retry_step(step.title())? {
                    bail!("stopped at the {step} step: {wizard_err}");
                }
                info!(%step, "retrying step");
            }
        }
    }
}

/// Runs one step. Returns the exported files once the last step succeeds.
async fn attempt_step<V: WizardView>(
    wizard: &mut WizardController<V>,
    inputs: &mut Inputs,
    step: WizardStep,
) -> Result<Option<std::collections::BTreeMap<String, String>>> {
    match step {
        WizardStep::Upload => {
            let path = inputs.video()?;
            wizard.choose_video_file(&path).await?;
            wizard.upload_video().await?;
        }
        WizardStep::Transcribe => {
            wizard.transcribe().await?;
        }
        WizardStep::Caption => {
            let style = inputs.caption_style()?;
            wizard.select_caption_style(style);
            wizard.generate_captions().await?;
        }
        WizardStep::Content => {
            let title = inputs.title()?;
            wizard.set_title(&title);
            wizard.generate_content().await?;
        }
        WizardStep::Thumbnail => {
            let style = inputs.thumbnail_style()?;
            wizard.select_thumbnail_style(style);
            wizard.generate_thumbnail().await?;
        }
        WizardStep::Export => {
            let formats = inputs.export_formats()?;
            for format in shared::domain::ExportFormat::ALL {
                wizard.set_export_format(*format, formats.contains(format));
            }
            return Ok(Some(wizard.export().await?));
        }
    }
    Ok(None)
}
