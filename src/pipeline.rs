//! Per-image watermark removal pipeline.

use std::io::Cursor;
use std::path::Path;

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};

use crate::blending;
use crate::error::{Error, ErrorKind, Result};
use crate::mask::MaskRegistry;
use crate::output::{output_file_name, OutputHandle, OUTPUT_FORMAT};
use crate::placement::{self, WatermarkPlacement, WatermarkSize};

/// One raw input item: a display name and its undecoded bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name shown to the user and used to derive the output name.
    pub name: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Wrap bytes already in memory.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            name: display_name(path),
            bytes,
        })
    }
}

/// File name of `path`, or the whole path when it has none.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

/// Why an item failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable reason.
    pub message: String,
}

/// Outcome of processing one input.
///
/// Exactly one of `processed` or `failure` is set.
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    /// Name of the input file.
    pub filename: String,
    /// The input bytes in their original format.
    pub original: Option<OutputHandle>,
    /// The cleaned image, PNG encoded.
    pub processed: Option<OutputHandle>,
    /// Original `(width, height)`.
    pub dimensions: Option<(u32, u32)>,
    /// Edge length of the mask that was applied.
    pub mask_size: Option<u32>,
    /// Set when processing failed.
    pub failure: Option<Failure>,
}

impl ProcessedResult {
    /// Error-shaped result for `filename`.
    #[must_use]
    pub fn failed(filename: impl Into<String>, error: &Error) -> Self {
        Self {
            filename: filename.into(),
            original: None,
            processed: None,
            dimensions: None,
            mask_size: None,
            failure: Some(Failure {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }

    /// Whether the item was processed successfully.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Suggested download name, e.g. `photo_clean.png`.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        output_file_name(&self.filename)
    }

    /// Release both output handles. Idempotent.
    pub fn release(&mut self) {
        for handle in [&mut self.original, &mut self.processed]
            .into_iter()
            .flatten()
        {
            handle.release();
        }
    }
}

/// Runs decode, locate, blend and encode for one image at a time.
///
/// Borrows the registry; cheap to create per batch.
pub struct ImagePipeline<'a> {
    masks: &'a MaskRegistry,
    force_size: Option<WatermarkSize>,
}

impl<'a> ImagePipeline<'a> {
    /// Pipeline using the placement policy to pick mask sizes.
    #[must_use]
    pub fn new(masks: &'a MaskRegistry) -> Self {
        Self {
            masks,
            force_size: None,
        }
    }

    /// Always use `force_size` instead of the placement policy.
    #[must_use]
    pub fn with_force_size(mut self, force_size: Option<WatermarkSize>) -> Self {
        self.force_size = force_size;
        self
    }

    /// Remove the watermark from a decoded image in place.
    ///
    /// Returns the placement that was applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegionOutOfBounds`] if the image is too small and
    /// [`Error::NoSuitableMask`] if the needed mask did not load.
    pub fn remove(&self, image: &mut RgbaImage) -> Result<WatermarkPlacement> {
        let (width, height) = image.dimensions();
        let placement = placement::locate_with(width, height, self.force_size)?;

        let mask = self
            .masks
            .get(placement.mask_size)
            .ok_or(Error::NoSuitableMask {
                width,
                height,
                mask_size: placement.mask_size,
            })?;

        let mut region = extract_region(image, &placement)?;
        blending::blend(&mut region, mask);
        imageops::replace(
            image,
            &region,
            i64::from(placement.origin_x),
            i64::from(placement.origin_y),
        );

        log::debug!(
            "Blended {0}x{0} region at ({1}, {2})",
            placement.mask_size,
            placement.origin_x,
            placement.origin_y
        );
        Ok(placement)
    }

    /// Process one input file.
    ///
    /// Any failure short-circuits; no partially processed image is returned.
    /// The input bytes move into the result's `original` handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`], [`Error::RegionOutOfBounds`],
    /// [`Error::NoSuitableMask`] or [`Error::Encode`] depending on the step
    /// that failed.
    pub fn process(&self, input: InputFile) -> Result<ProcessedResult> {
        let original_format = image::guess_format(&input.bytes).map_err(Error::Decode)?;
        let mut image = image::load_from_memory_with_format(&input.bytes, original_format)
            .map_err(Error::Decode)?
            .to_rgba8();
        let dimensions = image.dimensions();
        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            input.name,
            dimensions.0,
            dimensions.1,
            original_format
        );

        let placement = self.remove(&mut image)?;
        let encoded = encode(image)?;

        log::info!(
            "Removed {0}x{0} watermark from {1}",
            placement.mask_size,
            input.name
        );

        Ok(ProcessedResult {
            filename: input.name,
            original: Some(OutputHandle::new(original_format, input.bytes)),
            processed: Some(OutputHandle::new(OUTPUT_FORMAT, encoded)),
            dimensions: Some(dimensions),
            mask_size: Some(placement.mask_size),
            failure: None,
        })
    }
}

/// Copy the watermark region out of `image`.
fn extract_region(image: &RgbaImage, placement: &WatermarkPlacement) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let fits = |origin: u32, extent: u32| {
        origin
            .checked_add(placement.mask_size)
            .is_some_and(|end| end <= extent)
    };
    if !fits(placement.origin_x, width) || !fits(placement.origin_y, height) {
        return Err(Error::RegionOutOfBounds {
            width,
            height,
            mask_size: placement.mask_size,
            margin: placement.margin,
        });
    }

    Ok(imageops::crop_imm(
        image,
        placement.origin_x,
        placement.origin_y,
        placement.mask_size,
        placement.mask_size,
    )
    .to_image())
}

fn encode(image: RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::Mask;
    use image::Rgba;

    fn mask(size: u32, value: u8) -> Mask {
        let pixels = RgbaImage::from_pixel(size, size, Rgba([value, value, value, 255]));
        Mask::from_image(size, &DynamicImage::ImageRgba8(pixels)).unwrap()
    }

    fn png_input(name: &str, image: &RgbaImage) -> InputFile {
        InputFile::new(name, encode(image.clone()).unwrap())
    }

    #[test]
    fn process_only_touches_watermark_region() {
        let registry = MaskRegistry::from_masks([mask(48, 128)]);
        let pipeline = ImagePipeline::new(&registry);
        let source = RgbaImage::from_pixel(200, 150, Rgba([200, 200, 200, 255]));

        let result = pipeline.process(png_input("a.png", &source)).unwrap();

        assert!(result.is_ok());
        assert_eq!(result.dimensions, Some((200, 150)));
        assert_eq!(result.mask_size, Some(48));

        let bytes = result.processed.as_ref().unwrap().bytes().unwrap();
        let cleaned = image::load_from_memory(bytes).unwrap().to_rgba8();
        assert_eq!(cleaned.dimensions(), (200, 150));

        let (ox, oy) = (200 - 80, 150 - 80);
        for (x, y, px) in cleaned.enumerate_pixels() {
            let inside = (ox..ox + 48).contains(&x) && (oy..oy + 48).contains(&y);
            if inside {
                assert_ne!(px, source.get_pixel(x, y));
            } else {
                assert_eq!(px, source.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn original_handle_keeps_input_bytes_and_format() {
        let registry = MaskRegistry::from_masks([mask(48, 0)]);
        let pipeline = ImagePipeline::new(&registry);
        let input = png_input("b.png", &RgbaImage::new(100, 100));

        let expected = input.bytes.clone();
        let result = pipeline.process(input).unwrap();

        let original = result.original.unwrap();
        assert_eq!(original.format(), ImageFormat::Png);
        assert_eq!(original.bytes().unwrap(), expected.as_slice());
    }

    #[test]
    fn missing_mask_is_no_suitable_mask() {
        let registry = MaskRegistry::from_masks([mask(48, 10)]);
        let pipeline = ImagePipeline::new(&registry);
        let input = png_input("big.png", &RgbaImage::new(1100, 1100));

        let err = pipeline.process(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSuitableMask);
    }

    #[test]
    fn garbage_bytes_are_decode_errors() {
        let registry = MaskRegistry::from_masks([mask(48, 10)]);
        let pipeline = ImagePipeline::new(&registry);

        let err = pipeline
            .process(InputFile::new("notes.txt", b"hello".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn tiny_image_is_out_of_bounds() {
        let registry = MaskRegistry::from_masks([mask(48, 10)]);
        let pipeline = ImagePipeline::new(&registry);

        let err = pipeline
            .process(png_input("tiny.png", &RgbaImage::new(60, 60)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegionOutOfBounds);
    }

    #[test]
    fn extract_region_rejects_overhanging_placement() {
        let image = RgbaImage::new(100, 100);
        let placement = WatermarkPlacement {
            mask_size: 48,
            margin: 0,
            origin_x: 60,
            origin_y: 0,
        };
        let err = extract_region(&image, &placement).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegionOutOfBounds);
    }

    #[test]
    fn force_size_uses_requested_mask() {
        let registry = MaskRegistry::from_masks([mask(48, 10), mask(96, 10)]);
        let pipeline = ImagePipeline::new(&registry).with_force_size(Some(WatermarkSize::Large));
        let mut image = RgbaImage::new(400, 400);

        let placement = pipeline.remove(&mut image).unwrap();
        assert_eq!(placement.mask_size, 96);
    }

    #[test]
    fn failed_result_has_no_handles() {
        let err = Error::Io(std::io::Error::other("unreadable"));
        let mut result = ProcessedResult::failed("c.gif", &err);
        assert!(!result.is_ok());
        assert!(result.processed.is_none());
        assert_eq!(result.failure.as_ref().unwrap().kind, ErrorKind::Io);
        assert_eq!(result.output_file_name(), "c_clean.png");
        result.release();
    }
}
