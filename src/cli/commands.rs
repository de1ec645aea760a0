// CLI command implementations
use super::config::{UnwrapConfig, WrapConfig};
use super::output::{OutputFormatter, TrackInfo};
use crate::identity::ContainerIdentity;
use crate::pipeline::{extract_frames, ingest_frames, scan_frame_directory, ExtractMode, ScanOptions};
use crate::track::{IabTrackReader, IabTrackWriter};
use crate::Error;
use anyhow::Context;
use std::io;

/// Build the container identity from the wrap options
pub fn wrap_identity(config: &WrapConfig) -> ContainerIdentity {
    let identity = ContainerIdentity::default()
        .with_edit_rate(config.fps)
        .with_spoken_language(config.lang.clone());

    match config.asset_id {
        Some(asset_uuid) => identity.with_asset_uuid(asset_uuid),
        None => identity,
    }
}

/// Wrap a directory of IA frames into a track file
pub fn run_wrap(config: &WrapConfig) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(Default::default(), config.quiet);

    let mut options = ScanOptions::default().with_order(config.order.into());
    if let Some(pattern) = &config.pattern {
        options = options.with_pattern(pattern)?;
    }

    // Input errors name their own path
    let files = scan_frame_directory(&config.input, &options)?;

    let identity = wrap_identity(config);
    let output_context = || format!("Cannot write output file {}", config.output.display());
    let mut writer = IabTrackWriter::create(&config.output, &identity).with_context(output_context)?;
    let summary = ingest_frames(&mut writer, &files).map_err(|e| match e {
        Error::FrameFile { .. } | Error::EmptyFrame | Error::FrameTooLarge { .. } => anyhow::Error::from(e),
        e => anyhow::Error::from(e).context(output_context()),
    })?;

    formatter.print_success(&format!(
        "Wrapped {} frames ({} bytes) into {}",
        summary.frames,
        summary.bytes,
        config.output.display()
    ));
    formatter.print_info(&format!(
        "Asset UUID: {}, edit rate: {}, language: {}",
        identity.asset_uuid(),
        identity.edit_rate,
        identity.descriptor.spoken_language
    ));
    Ok(())
}

/// Extract the IA frames of a track file
pub fn run_unwrap(config: &UnwrapConfig) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    let mut reader = IabTrackReader::open(&config.input)
        .with_context(|| format!("Cannot open input file {}", config.input.display()))?;

    if config.info {
        let info = TrackInfo::from_reader(&config.input, &reader)?;
        formatter.output(&info, &mut io::stdout().lock())?;
    }

    let mode = match &config.single {
        Some(name) => ExtractMode::Single(name.clone()),
        None => ExtractMode::PerFrame,
    };
    let summary = extract_frames(&mut reader, &config.output, &mode)
        .with_context(|| format!("Cannot unwrap {}", config.input.display()))?;
    reader.close()?;

    formatter.print_success(&format!(
        "Unwrapped {} frames ({} bytes) into {}",
        summary.frames,
        summary.bytes,
        config.output.display()
    ));
    Ok(())
}
