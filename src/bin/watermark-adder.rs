use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use watermark_adder::{Error, ProcessResult, WatermarkEngine, WatermarkSpec};

#[derive(Parser)]
#[command(
    name = "watermark-adder",
    about = "Add a semi-transparent text watermark to every PNG in a folder",
    version,
    after_help = "Each <name>.png gets a sibling watermarked_<name>.png; originals are left untouched.\n\
                  Files from earlier runs (watermarked_*.png) match the filter too and are processed again."
)]
struct Cli {
    /// Folder containing the PNG images (not searched recursively)
    folder: PathBuf,

    /// Text to draw onto each image
    watermark_text: String,

    /// TrueType/OpenType face to use instead of the built-in bold sans-serif
    #[arg(long, env = "WATERMARK_FONT")]
    font: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let spec = WatermarkSpec::new(cli.watermark_text);
    let engine = match &cli.font {
        Some(path) => WatermarkEngine::from_font_file(spec, path),
        None => WatermarkEngine::new(spec),
    };
    let engine = match engine {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Fatal: Failed to initialize engine: {e}");
            process::exit(1);
        }
    };

    let results = match engine.process_folder(&cli.folder) {
        Ok(results) => results,
        Err(Error::FolderNotFound(_)) => {
            println!("Error: Folder not found.");
            process::exit(1);
        }
        Err(e) => {
            println!("Error: {e}");
            process::exit(1);
        }
    };

    if results.is_empty() {
        println!("No PNG images found.");
        return;
    }

    for r in &results {
        print_result(r);
    }
}

fn print_result(result: &ProcessResult) {
    if result.is_success() {
        println!("Watermark added to: {}", result.output_name());
    } else {
        println!("Error processing file: {}", result.input_name());
    }
}

/// Logging stays silent unless asked for; the report lines are the output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
