use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::LevelFilter;

use clearnano::{
    default_output_path, is_supported_image, BatchProcessor, ImagePipeline, MaskRegistry,
    ProcessOptions, ProcessedResult, ResultStore, WatermarkSize,
};

#[derive(Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "clearnano",
    about = "Remove corner watermark logos via reverse alpha blending",
    version,
    after_help = "Processed images are written as PNG: photo.jpg -> photo_clean.png\n\n\
                  Mask assets bg_48.png and bg_96.png are read from the assets directory."
)]
struct Cli {
    /// Input image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory containing the mask assets
    #[arg(short, long, env = "CLEARNANO_ASSETS", default_value = clearnano::config::DEFAULT_ASSET_DIR)]
    assets: PathBuf,

    /// Force 48x48 watermark size
    #[arg(long, conflicts_with = "force_large")]
    force_small: bool,

    /// Force 96x96 watermark size
    #[arg(long)]
    force_large: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }

    fn options(&self) -> ProcessOptions {
        let force_size = if self.force_small {
            Some(WatermarkSize::Small)
        } else if self.force_large {
            Some(WatermarkSize::Large)
        } else {
            None
        };
        ProcessOptions {
            asset_dir: self.assets.clone(),
            force_size,
            output_dir: self.output.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let opts = cli.options();
    let masks = MaskRegistry::load(&opts.mask_configs());
    if masks.is_empty() {
        eprintln!(
            "Fatal: no mask assets could be loaded from {}",
            opts.asset_dir.display()
        );
        process::exit(1);
    }

    let paths = match collect_inputs(&cli.inputs) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // Each file is read, saved and released before the next one is loaded;
    // the store only keeps the released results for the summary.
    let pipeline = ImagePipeline::new(&masks).with_force_size(opts.force_size);
    let mut store = ResultStore::new();
    let mut fail_count = 0usize;
    BatchProcessor::new(&pipeline).process_each(
        paths.iter().cloned(),
        |mut result, done, total| {
            let saved = save_result(&result, &paths[done - 1], &opts);
            let line = match &saved {
                Ok(output) => format_report(&result, output.as_deref(), None),
                Err(e) => format_report(&result, None, Some(e)),
            };
            let failed = !result.is_ok() || saved.is_err();
            if failed {
                fail_count += 1;
            }
            if failed || !cli.quiet {
                eprintln!("{line} [{done}/{total}]");
            }
            result.release();
            store.append(result);
        },
    );

    if store.len() > 1 && !cli.quiet {
        let success_count = store.len() - fail_count;
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", store.len());
    }

    store.clear();

    if fail_count > 0 {
        process::exit(1);
    }
}

/// Expand directories (non-recursively, sorted) into supported image files.
fn collect_inputs(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect();
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn save_result(
    result: &ProcessedResult,
    input: &Path,
    opts: &ProcessOptions,
) -> clearnano::Result<Option<PathBuf>> {
    let Some(handle) = &result.processed else {
        return Ok(None);
    };
    let output = default_output_path(input, opts.output_dir.as_deref());
    handle.write_to(&output)?;
    Ok(Some(output))
}

/// One report line for `result`. `output` is where the cleaned image was
/// written.
fn format_report(
    result: &ProcessedResult,
    output: Option<&Path>,
    save_error: Option<&clearnano::Error>,
) -> String {
    if let Some(failure) = &result.failure {
        return format!("[FAIL] {}: {}", result.filename, failure.message);
    }
    if let Some(e) = save_error {
        return format!("[FAIL] {}: failed to save: {e}", result.filename);
    }
    let (w, h) = result.dimensions.unwrap_or_default();
    let line = format!(
        "[OK] {} ({w}x{h}, {}px mask)",
        result.filename,
        result.mask_size.unwrap_or_default()
    );
    match output {
        Some(output) => format!("{line} -> {}", output.display()),
        None => line,
    }
}
