//! Output artifacts: owned encoded-image handles, file naming and saving.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::{Error, Result};

/// Format every processed image is encoded to.
pub const OUTPUT_FORMAT: ImageFormat = ImageFormat::Png;

/// Suffix inserted before the extension of processed file names.
const CLEAN_SUFFIX: &str = "_clean";

/// An owned, encoded image held in memory until released.
///
/// Release is explicit and idempotent: after [`OutputHandle::release`] the
/// bytes are gone and further releases do nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputHandle {
    format: ImageFormat,
    bytes: Option<Vec<u8>>,
}

impl OutputHandle {
    /// Take ownership of encoded bytes in `format`.
    #[must_use]
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            bytes: Some(bytes),
        }
    }

    /// Encoding of the held bytes.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of the held bytes.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Encoded bytes, or `None` once released.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Whether [`OutputHandle::release`] has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.bytes.is_none()
    }

    /// Drop the held bytes. Safe to call any number of times.
    pub fn release(&mut self) {
        if self.bytes.take().is_some() {
            log::trace!("Released {} output handle", self.mime_type());
        }
    }

    /// Write the held bytes to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the handle was released or writing fails.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.bytes().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "output handle already released",
            ))
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tif" | "tiff"
        ),
        None => false,
    }
}

/// Suggested file name for the processed version of `name`.
///
/// Example: `"photo.jpg"` becomes `"photo_clean.png"`. Only the last extension
/// is replaced, and a name without one just gains the suffix.
#[must_use]
pub fn output_file_name(name: &str) -> String {
    let ext = OUTPUT_FORMAT.extensions_str()[0];
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    format!("{stem}{CLEAN_SUFFIX}.{ext}")
}

/// Output path for `input`, inside `output_dir` or next to the input.
#[must_use]
pub fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    let dir = output_dir.unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")));
    dir.join(output_file_name(&name))
}
