use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use image::ImageFormat;
use log::LevelFilter;

use signature_transparency::{
    check_supported, default_output_path, process_bytes, process_file, sniff_format,
    ProcessOptions, ProcessResult, Threshold, UploadCache, DEFAULT_OUTPUT_NAME,
    DEFAULT_THRESHOLD,
};

#[derive(Parser)]
#[command(
    name = "signature-transparency",
    about = "Make the light background of a signature scan transparent",
    version,
    after_help = "Simple usage: signature-transparency scan.jpg  (writes scan_transparent.png)\n\
                  Read from stdin:  cat scan.png | signature-transparency - -o signature.png"
)]
struct Cli {
    /// Input image (png, jpg, jpeg), or `-` to read from stdin
    input: String,

    /// Output PNG file (default: {name}_transparent.png, or signature.png for stdin)
    #[arg(short, long)]
    output: Option<String>,

    /// Grayscale cutoff (0-255); pixels at or above it become transparent
    #[arg(short, long, default_value_t = i32::from(DEFAULT_THRESHOLD), allow_negative_numbers = true)]
    threshold: i32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    let threshold = match Threshold::new(cli.threshold) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let opts = ProcessOptions {
        threshold,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = if cli.input == "-" {
        let output = cli
            .output
            .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_NAME), PathBuf::from);
        process_stdin(&output, &opts)
    } else {
        let input_path = Path::new(&cli.input);
        if !input_path.is_file() {
            eprintln!("Error: Input file does not exist: {}", cli.input);
            process::exit(1);
        }
        if let Err(e) = check_supported(input_path) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
        let output = cli
            .output
            .map_or_else(|| default_output_path(input_path), PathBuf::from);
        process_file(input_path, &output, &opts)
    };

    print_result(&result, &opts);

    if !result.success {
        process::exit(1);
    }
}

fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "[{style}{}{style:#}] {}", record.level(), record.args())
        })
        .init();
}

/// Stage stdin in the upload cache, then run the transform on the staged copy.
fn process_stdin(output: &Path, opts: &ProcessOptions) -> ProcessResult {
    let label = Path::new("<stdin>");
    let failed = |message: String| ProcessResult {
        path: label.to_path_buf(),
        success: false,
        transparent_pixels: 0,
        total_pixels: 0,
        message,
    };

    let cache = match UploadCache::new(std::env::temp_dir().join("signature-transparency")) {
        Ok(c) => c,
        Err(e) => return failed(format!("Failed to open cache: {e}")),
    };
    let upload = match cache.store(std::io::stdin().lock()) {
        Ok(u) => u,
        Err(e) => return failed(format!("Failed to cache input: {e}")),
    };
    log::debug!("staged stdin at {}", upload.path().display());

    let bytes = match upload.read() {
        Ok(b) => b,
        Err(e) => return failed(format!("Failed to read cached input: {e}")),
    };
    match sniff_format(&bytes) {
        Some(ImageFormat::Png | ImageFormat::Jpeg) => {}
        Some(other) => return failed(format!("Unsupported image format: {other:?}")),
        None => return failed("Input is not a recognised image".to_string()),
    }

    process_bytes(&bytes, label, output, opts)
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        eprintln!(
            "[OK] {filename} ({:.0}% transparent at threshold {})",
            result.transparent_ratio() * 100.0,
            opts.threshold
        );
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
