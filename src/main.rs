use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicom_export::{
    ConvertConfig, Converter,
    config::{
        DEFAULT_FRAME_DELAY_MS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_INPUT_DIR,
        DEFAULT_LOOP_COUNT, DEFAULT_OUTPUT_DIR,
    },
    enums::Resampling,
};

/// Convert a directory of DICOM files into PNG stills and GIF animations.
#[derive(Parser, Debug)]
#[command(name = "dicom-export")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory searched recursively for DICOM files.
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR, value_name = "DIR")]
    input: PathBuf,

    /// Directory the converted tree is written to.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    output: PathBuf,

    /// Width of animation frames.
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH, value_name = "PIXELS")]
    width: u32,

    /// Height of animation frames.
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT, value_name = "PIXELS")]
    height: u32,

    /// Delay between animation frames in milliseconds, at least 10.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS, value_name = "MS")]
    delay: u32,

    /// Number of animation repetitions, 0 loops forever.
    #[arg(long, default_value_t = DEFAULT_LOOP_COUNT, value_name = "COUNT")]
    loop_count: u16,

    /// Filter used when resizing animation frames.
    #[arg(long, value_enum, default_value_t = Resampling::default())]
    filter: Resampling,

    /// Skip files that fail to decode or encode instead of stopping.
    #[arg(long)]
    continue_on_error: bool,

    /// Number of files converted in parallel.
    #[arg(short, long, default_value_t = 1, value_name = "N")]
    jobs: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dicom_export={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    let config = ConvertConfig {
        input_dir: args.input,
        output_dir: args.output,
        frame_width: args.width,
        frame_height: args.height,
        frame_delay_ms: args.delay,
        loop_count: args.loop_count,
        filter: args.filter,
        continue_on_error: args.continue_on_error,
        jobs: args.jobs,
    };

    let converter = Converter::new(config).context("Invalid settings")?;
    let summary = converter.run().with_context(|| {
        format!(
            "Conversion of '{}' stopped",
            converter.config().input_dir.display()
        )
    })?;

    if !summary.skipped.is_empty() {
        tracing::warn!(
            "{} files could not be converted, see the warnings above",
            summary.skipped.len()
        );
    }

    Ok(())
}
