//! Remove the watermark from a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example remove_watermark -- <assets_dir> input.jpg output.png
//! ```

use std::env;
use std::path::Path;
use std::process;

use clearnano::{ImagePipeline, InputFile, MaskConfig, MaskRegistry};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <assets_dir> <input> <output>", args[0]);
        process::exit(1);
    }

    let masks = MaskRegistry::load(&MaskConfig::defaults(Path::new(&args[1])));
    let pipeline = ImagePipeline::new(&masks);

    let outcome = InputFile::read(Path::new(&args[2]))
        .and_then(|input| pipeline.process(input))
        .and_then(|mut result| {
            if let Some(handle) = &result.processed {
                handle.write_to(Path::new(&args[3]))?;
            }
            result.release();
            Ok(result)
        });

    match outcome {
        Ok(result) => println!(
            "Done: {0}x{0} mask removed from {1}",
            result.mask_size.unwrap_or_default(),
            result.filename
        ),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
