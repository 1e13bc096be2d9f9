use bytefit::{Compressor, Options, OutputFormat};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bytefit")]
#[command(about = "Compress an image to fit a byte budget")]
#[command(long_about = "\
Compress an image to fit a byte budget.

The engine searches JPEG quality and image dimensions for the largest output
that still fits the target, so the result sits as close to the budget as the
codec allows. A source that already fits is copied through unchanged.

Examples:

  bytefit --target-kb 200 photo.jpg photo-small.jpg
  bytefit --target-kb 50 --format webp --min-quality 30 scan.png scan.webp")]
#[command(version)]
struct Cli {
    /// Byte target in kilobytes
    #[arg(long)]
    target_kb: u32,

    /// Output format
    #[arg(long, default_value = "jpeg")]
    format: OutputFormat,

    /// Upper quality bound
    #[arg(long, default_value_t = 92)]
    quality_ceiling: u8,

    /// Lower quality bound for the regular search passes
    #[arg(long, default_value_t = 40)]
    min_quality: u8,

    /// Cap output width in pixels before searching
    #[arg(long)]
    max_width: Option<u32>,

    /// Cap output height in pixels before searching
    #[arg(long)]
    max_height: Option<u32>,

    /// Input image
    input: PathBuf,

    /// Output file
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let options = Options {
        initial_quality: cli.quality_ceiling,
        min_quality: cli.min_quality,
        format: cli.format,
        max_width: cli.max_width,
        max_height: cli.max_height,
        ..Options::new(cli.target_kb)
    };

    let result = match Compressor::new().compress(cli.input.clone(), options).await {
        Ok(result) => result,
        Err(err) => {
            eprintln!("bytefit: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = tokio::fs::write(&cli.output, &result.bytes).await {
        eprintln!("bytefit: failed to write {}: {err}", cli.output.display());
        return ExitCode::FAILURE;
    }

    let dims = match (result.width, result.height) {
        (Some(w), Some(h)) => format!(" ({w}x{h})"),
        _ => String::new(),
    };
    println!(
        "{} → {} ({} bytes, q={}{dims})",
        cli.input.display(),
        cli.output.display(),
        result.bytes.len(),
        result.quality_used,
    );
    ExitCode::SUCCESS
}
