//! pcmtool CLI - Waveform Preview and Export
//!
//! Command-line interface for the pcmtool waveform engine.

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use pcmtool::cli::commands::{self, ExportArgs, PreviewArgs};
use pcmtool::cli::{Cli, Commands};
use pcmtool::Result;

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("pcmtool v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("pcmtool v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        error!("[{}] {}", e.error_code(), e);
        for suggestion in e.recovery_suggestions() {
            eprintln!("  hint: {}", suggestion);
        }
        std::process::exit(1);
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Info { input } => commands::info(&input),
        Commands::Export {
            input,
            output,
            start,
            end,
            double_speed,
            slices,
            manifest,
            config,
        } => commands::export(
            &input,
            &output,
            &ExportArgs {
                start,
                end,
                double_speed,
                slices,
                manifest: manifest.as_deref(),
                config: config.as_deref(),
            },
        ),
        Commands::Preview {
            input,
            output,
            start,
            end,
            looping,
            output_rate,
            seconds,
            block_size,
        } => commands::preview(
            &input,
            &output,
            &PreviewArgs {
                start,
                end,
                looping,
                output_rate,
                seconds,
                block_size,
            },
        ),
        Commands::InitConfig { path } => commands::init_config(&path),
    }
}
