//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::config::EditorConfig;
use crate::engine::buffer::WaveformBuffer;
use crate::engine::io::{import_wav, write_wav};
use crate::engine::preview::OfflineMixer;
use crate::engine::session::EditorSession;
use crate::error::Result;

/// Render length for looped previews without `--seconds`
const DEFAULT_LOOP_SECONDS: f64 = 4.0;

/// Options for [`export`]
#[derive(Debug, Clone, Default)]
pub struct ExportArgs<'a> {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub double_speed: bool,
    pub slices: Option<usize>,
    pub manifest: Option<&'a Path>,
    pub config: Option<&'a Path>,
}

/// Options for [`preview`]
#[derive(Debug, Clone)]
pub struct PreviewArgs {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub looping: bool,
    pub output_rate: Option<u32>,
    pub seconds: Option<f64>,
    pub block_size: usize,
}

/// Print format details of a WAV file.
pub fn info(input: &Path) -> Result<()> {
    let decoded = import_wav(input)?;
    let buffer = WaveformBuffer::from_decoded(&decoded)?;

    println!("File: {}", input.display());
    println!("Sample rate: {} Hz", decoded.sample_rate);
    println!("Channels: {}", decoded.channel_count);
    println!("Frames: {}", decoded.frames());
    println!("Duration: {:.3} s", buffer.duration_secs());

    Ok(())
}

/// Load `input` into a fresh editor and apply the marker arguments.
fn open_session(
    input: &Path,
    config: EditorConfig,
    mixer: OfflineMixer,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<EditorSession<OfflineMixer>> {
    let mut session = EditorSession::new(mixer, config);
    session.load_wav(input)?;
    if let Some(start) = start {
        session.set_start(start);
    }
    if let Some(end) = end {
        session.set_end(end);
    }
    let selection = session.selection();
    info!("Selection: [{}, {})", selection.start, selection.end);
    Ok(session)
}

/// Export a selection of `input` to `output`.
pub fn export(input: &Path, output: &Path, args: &ExportArgs<'_>) -> Result<()> {
    let mut config = match args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    config.double_speed |= args.double_speed;
    if let Some(slices) = args.slices {
        config.slice_count = slices;
    }
    config.validate()?;

    let mixer = OfflineMixer::new(config.preview_output_rate, 1);
    let mut session = open_session(input, config, mixer, args.start, args.end)?;

    for existing in session.existing_outputs(output)? {
        warn!("Overwriting {}", existing.display());
    }

    let report = session.export(output)?;
    for file in &report.files {
        println!("{}  {} ({} samples)", file.sha256, file.path.display(), file.samples);
    }
    for failure in &report.failures {
        println!("FAILED {}: {}", failure.path.display(), failure.reason);
    }
    println!("{}", session.status_message());

    if let Some(manifest) = args.manifest {
        report.save_manifest(manifest)?;
        println!("Manifest written: {}", manifest.display());
    }

    Ok(())
}

/// Render the preview stream of a selection through an offline mixer.
pub fn preview(input: &Path, output: &Path, args: &PreviewArgs) -> Result<()> {
    let mut config = EditorConfig::default();
    config.preview_loop = args.looping;
    if let Some(rate) = args.output_rate {
        config.preview_output_rate = rate;
    }
    config.validate()?;

    let rate = config.preview_output_rate;
    let mixer = OfflineMixer::new(rate, args.block_size);
    let mut session = open_session(input, config, mixer, args.start, args.end)?;

    let seconds = match (args.seconds, args.looping) {
        (Some(s), _) => Some(s),
        (None, true) => Some(DEFAULT_LOOP_SECONDS),
        (None, false) => None,
    };
    let limit = seconds.map(|s| (s.max(0.0) * rate as f64) as usize);

    session.start_preview()?;
    let mut rendered = Vec::new();
    while session.is_playing() && limit.map_or(true, |n| rendered.len() < n) {
        let block = session.mixer_mut().render(args.block_size.max(1));
        rendered.extend_from_slice(&block);
    }
    session.stop_preview();
    if let Some(n) = limit {
        rendered.truncate(n);
    }

    write_wav(output, &rendered, rate)?;
    println!(
        "Preview rendered: {} samples at {} Hz to {}",
        rendered.len(),
        rate,
        output.display()
    );

    Ok(())
}

/// Write a default config file.
pub fn init_config(path: &Path) -> Result<()> {
    info!("Writing default config: {}", path.display());
    EditorConfig::default().save(path)?;
    println!("Config written: {}", path.display());
    Ok(())
}
