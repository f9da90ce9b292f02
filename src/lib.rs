//! Remove corner watermark logos via reverse alpha blending.
//!
//! Some image generators composite a semi-transparent white logo a fixed
//! margin away from the bottom-right corner. Given the alpha mask the logo was
//! blended with, this crate inverts the blend equation to recover the original
//! pixels. Two mask sizes exist (48x48 and 96x96) and the one in use is
//! decided by the image dimensions alone; no visual detection is performed.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use clearnano::{BatchProcessor, ImagePipeline, MaskConfig, MaskRegistry};
//!
//! let masks = MaskRegistry::load(&MaskConfig::defaults("assets".as_ref()));
//! let pipeline = ImagePipeline::new(&masks);
//! let files = vec![PathBuf::from("photo.jpg"), PathBuf::from("scan.png")];
//!
//! let results = BatchProcessor::new(&pipeline)
//!     .process_all(files, |done, total| println!("{done}/{total}"));
//! for r in &results {
//!     if let Some(handle) = &r.processed {
//!         handle.write_to(r.output_file_name().as_ref()).unwrap();
//!     }
//! }
//! ```

#![deny(missing_docs)]

pub mod batch;
pub mod blending;
pub mod config;
pub mod error;
pub mod mask;
pub mod output;
pub mod pipeline;
pub mod placement;

pub use batch::{BatchInput, BatchProcessor, ResultId, ResultStore};
pub use config::ProcessOptions;
pub use error::{Error, ErrorKind, Result};
pub use mask::{Mask, MaskConfig, MaskRegistry};
pub use output::{default_output_path, is_supported_image, output_file_name, OutputHandle};
pub use pipeline::{Failure, ImagePipeline, InputFile, ProcessedResult};
pub use placement::{locate, locate_with, WatermarkPlacement, WatermarkSize};
