//! Processing configuration.

use std::path::PathBuf;

use crate::mask::MaskConfig;
use crate::placement::WatermarkSize;

/// Directory searched for mask assets when nothing else is configured.
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// Options controlling mask loading and watermark processing.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Directory holding `bg_48.png` and `bg_96.png`.
    pub asset_dir: PathBuf,
    /// Force a specific watermark size instead of the dimension policy.
    pub force_size: Option<WatermarkSize>,
    /// Directory for processed files; `None` writes next to each input.
    pub output_dir: Option<PathBuf>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            force_size: None,
            output_dir: None,
        }
    }
}

impl ProcessOptions {
    /// Mask configs derived from [`ProcessOptions::asset_dir`].
    #[must_use]
    pub fn mask_configs(&self) -> Vec<MaskConfig> {
        MaskConfig::defaults(&self.asset_dir)
    }
}
