//! Watermark placement policy.
//!
//! The logo sits a fixed margin away from the bottom-right corner. Its size
//! and margin depend only on the image dimensions, in two buckets:
//!
//! - **Large** (96x96, 64px margin): both width AND height > 1024
//! - **Small** (48x48, 32px margin): otherwise (including 1024x1024)

use crate::error::{Error, Result};

/// Dimension above which (on both axes) the large watermark is used.
const LARGE_THRESHOLD: u32 = 1024;

/// Watermark size classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkSize {
    /// 48x48 watermark, 32px margin.
    Small,
    /// 96x96 watermark, 64px margin.
    Large,
}

impl WatermarkSize {
    /// Select the bucket for an image of the given dimensions.
    #[must_use]
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        if width > LARGE_THRESHOLD && height > LARGE_THRESHOLD {
            Self::Large
        } else {
            Self::Small
        }
    }

    /// Edge length of the mask in pixels.
    #[must_use]
    pub fn mask_size(self) -> u32 {
        match self {
            Self::Small => 48,
            Self::Large => 96,
        }
    }

    /// Distance from the bottom-right corner in pixels.
    #[must_use]
    pub fn margin(self) -> u32 {
        match self {
            Self::Small => 32,
            Self::Large => 64,
        }
    }
}

/// Where the watermark region lies in one particular image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkPlacement {
    /// Edge length of the mask in pixels.
    pub mask_size: u32,
    /// Distance from the bottom-right corner in pixels.
    pub margin: u32,
    /// X coordinate of the region's top-left corner.
    pub origin_x: u32,
    /// Y coordinate of the region's top-left corner.
    pub origin_y: u32,
}

/// Locate the watermark region for an image of `width x height`.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if the image is smaller than
/// `margin + mask_size` on either axis.
pub fn locate(width: u32, height: u32) -> Result<WatermarkPlacement> {
    locate_with(width, height, None)
}

/// Like [`locate`], but `force_size` overrides the size bucket.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if the region does not fit.
pub fn locate_with(
    width: u32,
    height: u32,
    force_size: Option<WatermarkSize>,
) -> Result<WatermarkPlacement> {
    let size = force_size.unwrap_or_else(|| WatermarkSize::for_dimensions(width, height));
    let mask_size = size.mask_size();
    let margin = size.margin();

    let out_of_bounds = || Error::RegionOutOfBounds {
        width,
        height,
        mask_size,
        margin,
    };
    let origin_x = width
        .checked_sub(margin + mask_size)
        .ok_or_else(out_of_bounds)?;
    let origin_y = height
        .checked_sub(margin + mask_size)
        .ok_or_else(out_of_bounds)?;

    Ok(WatermarkPlacement {
        mask_size,
        margin,
        origin_x,
        origin_y,
    })
}
