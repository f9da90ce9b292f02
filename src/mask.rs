//! Alpha masks and the registry that loads them.
//!
//! A mask is a square capture of the watermark logo rendered on black. The
//! blend strength at each pixel is encoded as grayscale intensity:
//! `alpha = max(R, G, B) / 255.0`. The buffer's own alpha channel is ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::{Error, Result};

/// File name of the 48x48 mask inside an asset directory.
pub const SMALL_MASK_FILE: &str = "bg_48.png";
/// File name of the 96x96 mask inside an asset directory.
pub const LARGE_MASK_FILE: &str = "bg_96.png";

/// A square alpha mask of a fixed nominal size.
#[derive(Debug, Clone)]
pub struct Mask {
    size: u32,
    pixels: RgbaImage,
}

impl Mask {
    /// Build a mask from a decoded image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoad`] if the image is not `size x size`.
    pub fn from_image(size: u32, image: &DynamicImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != size || height != size {
            return Err(Error::AssetLoad {
                size,
                path: PathBuf::new(),
                reason: format!("expected {size}x{size} pixels, got {width}x{height}"),
            });
        }
        Ok(Self {
            size,
            pixels: image.to_rgba8(),
        })
    }

    /// Decode a mask from encoded image bytes (PNG or any format `image` reads).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetLoad`] if the bytes cannot be decoded or have the
    /// wrong dimensions.
    pub fn from_bytes(size: u32, bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::AssetLoad {
            size,
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;
        Self::from_image(size, &image)
    }

    /// Nominal size; the mask is `size x size` pixels.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw RGBA pixels of the mask.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Blend alpha in `[0, 1]` at a local coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the mask.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> f64 {
        let px = self.pixels.get_pixel(x, y);
        f64::from(px[0].max(px[1]).max(px[2])) / 255.0
    }
}

/// Where to find the mask of a given nominal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskConfig {
    /// Nominal mask size in pixels.
    pub size: u32,
    /// Path to the mask image.
    pub path: PathBuf,
}

impl MaskConfig {
    /// The two standard masks (48 and 96) inside `asset_dir`.
    #[must_use]
    pub fn defaults(asset_dir: &Path) -> Vec<Self> {
        vec![
            Self {
                size: 48,
                path: asset_dir.join(SMALL_MASK_FILE),
            },
            Self {
                size: 96,
                path: asset_dir.join(LARGE_MASK_FILE),
            },
        ]
    }

    fn load(&self) -> Result<Mask> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.asset_error(e.to_string()))?;
        Mask::from_bytes(self.size, &bytes).map_err(|e| match e {
            Error::AssetLoad { reason, .. } => self.asset_error(reason),
            other => other,
        })
    }

    fn asset_error(&self, reason: String) -> Error {
        Error::AssetLoad {
            size: self.size,
            path: self.path.clone(),
            reason,
        }
    }
}

/// Immutable set of loaded masks, keyed by nominal size.
///
/// Built once at startup and shared read-only by every pipeline run.
#[derive(Debug, Clone, Default)]
pub struct MaskRegistry {
    masks: BTreeMap<u32, Mask>,
}

impl MaskRegistry {
    /// Load every configured mask.
    ///
    /// Each config is decoded independently. A failure is logged and that size
    /// is left out, so the registry may hold a strict subset of the request.
    #[must_use]
    pub fn load(configs: &[MaskConfig]) -> Self {
        let mut masks = BTreeMap::new();
        for config in configs {
            match config.load() {
                Ok(mask) => {
                    log::info!("Loaded mask: {0}x{0}", mask.size());
                    masks.insert(config.size, mask);
                }
                Err(e) => log::warn!("{e}"),
            }
        }
        Self { masks }
    }

    /// Build a registry from masks already in memory.
    #[must_use]
    pub fn from_masks(masks: impl IntoIterator<Item = Mask>) -> Self {
        Self {
            masks: masks.into_iter().map(|m| (m.size(), m)).collect(),
        }
    }

    /// Mask for `size`, if it loaded.
    #[must_use]
    pub fn get(&self, size: u32) -> Option<&Mask> {
        self.masks.get(&size)
    }

    /// Loaded sizes in ascending order.
    #[must_use]
    pub fn sizes(&self) -> Vec<u32> {
        self.masks.keys().copied().collect()
    }

    /// Number of loaded masks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Whether no mask loaded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}
