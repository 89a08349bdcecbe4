//! CLI Module
//!
//! Command-line interface for the pcmtool waveform engine.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pcmtool - preview and export selections of a waveform
#[derive(Parser, Debug)]
#[command(name = "pcmtool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show format details of a WAV file
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,
    },

    /// Resample a selection to 17500 Hz and write it as WAV
    #[command(name = "export")]
    Export {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file (slices are written as <name>-<n>.wav)
        output: PathBuf,

        /// First selected sample
        #[arg(long)]
        start: Option<usize>,

        /// Sample after the last selected one
        #[arg(long)]
        end: Option<usize>,

        /// Drop every other sample after resampling
        #[arg(long)]
        double_speed: bool,

        /// Number of equal slices to write
        #[arg(long)]
        slices: Option<usize>,

        /// Write a JSON manifest of the exported files
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Editor config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render the preview stream of a selection offline to WAV
    #[command(name = "preview")]
    Preview {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// First selected sample
        #[arg(long)]
        start: Option<usize>,

        /// Sample after the last selected one
        #[arg(long)]
        end: Option<usize>,

        /// Loop the selection
        #[arg(long = "loop")]
        looping: bool,

        /// Mixer output rate in Hz
        #[arg(long)]
        output_rate: Option<u32>,

        /// Seconds to render (looped previews default to 4)
        #[arg(long)]
        seconds: Option<f64>,

        /// Samples pulled per mixer block
        #[arg(long, default_value_t = 512)]
        block_size: usize,
    },

    /// Write a default editor config file
    #[command(name = "init-config")]
    InitConfig {
        /// Path for the config file
        path: PathBuf,
    },
}
