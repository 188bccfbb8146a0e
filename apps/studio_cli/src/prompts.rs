//! Interactive prompts using dialoguer

use std::path::PathBuf;

use anyhow::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use shared::domain::{CaptionStyle, ExportFormat, ThumbnailStyle};

pub fn video_path() -> Result<PathBuf> {
    let raw: String = Input::new()
        .with_prompt("Video file (MP4, MOV, AVI or MKV)")
        .interact_text()?;
    Ok(PathBuf::from(raw.trim()))
}

pub fn caption_style() -> Result<CaptionStyle> {
    let labels = ["Standard", "Dynamic", "Minimal"];
    let index = Select::new()
        .with_prompt("Caption style")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(CaptionStyle::ALL[index])
}

pub fn title() -> Result<String> {
    let title: String = Input::new()
        .with_prompt("Video title")
        .allow_empty(true)
        .interact_text()?;
    Ok(title)
}

pub fn thumbnail_style() -> Result<ThumbnailStyle> {
    let labels = ["Dramatic", "Mystery", "Professional"];
    let index = Select::new()
        .with_prompt("Thumbnail style")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(ThumbnailStyle::ALL[index])
}

pub fn export_formats() -> Result<Vec<ExportFormat>> {
    let labels: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.label()).collect();
    let picked = MultiSelect::new()
        .with_prompt("Export formats (space to toggle)")
        .items(&labels)
        .defaults(&[true; 3])
        .interact()?;
    Ok(picked.into_iter().map(|i| ExportFormat::ALL[i]).collect())
}

pub fn retry_step(step: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!("Retry the {step} step?"))
        .default(true)
        .interact()?;
    Ok(confirmed)
}
