use crate::app::locate;
use anyhow::{Context, Result, anyhow};
use blockpad_engine::{DocumentFormat, io};
use std::path::Path;

/// Convert `input` into `output`. Both formats come from the file names; an output
/// name without a known extension is written as `fallback`.
pub fn export(input: &Path, output: &Path, fallback: Option<DocumentFormat>) -> Result<usize> {
    let (input_root, input_name) = locate(input);
    let blocks = io::load_document(&input_name, &input_root)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let format = DocumentFormat::from_path(output)
        .or(fallback)
        .ok_or_else(|| anyhow!("Cannot tell the export format of {}", output.display()))?;
    let content = io::serialize_document(&blocks, format)?;

    let (output_root, output_name) = locate(output);
    io::write_file(&output_name, &output_root, &content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "exported {} blocks from {} to {} as {format:?}",
        blocks.len(),
        input.display(),
        output.display()
    );
    Ok(blocks.len())
}
