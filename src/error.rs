//! Error types for the clearnano crate.

use std::path::PathBuf;

/// Errors that can occur while loading masks or processing an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mask asset could not be read, decoded, or had the wrong dimensions.
    #[error("failed to load {size}x{size} mask from {}: {reason}", .path.display())]
    AssetLoad {
        /// Nominal mask size that was requested.
        size: u32,
        /// Asset location.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// The placement policy picked a mask size the registry does not hold.
    #[error("no suitable mask found for image size {width}x{height} (needs {mask_size}x{mask_size})")]
    NoSuitableMask {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Mask size selected by the placement policy.
        mask_size: u32,
    },

    /// The watermark region does not fit inside the image.
    #[error(
        "image too small ({width}x{height}) for {mask_size}x{mask_size} watermark with {margin}px margin"
    )]
    RegionOutOfBounds {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Mask size in pixels.
        mask_size: u32,
        /// Corner margin in pixels.
        margin: u32,
    },

    /// The input bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The processed buffer could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classification of this error, as stored in failed results.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssetLoad { .. } => ErrorKind::AssetLoad,
            Self::NoSuitableMask { .. } => ErrorKind::NoSuitableMask,
            Self::RegionOutOfBounds { .. } => ErrorKind::RegionOutOfBounds,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Flat classification of [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::AssetLoad`].
    AssetLoad,
    /// See [`Error::NoSuitableMask`].
    NoSuitableMask,
    /// See [`Error::RegionOutOfBounds`].
    RegionOutOfBounds,
    /// See [`Error::Decode`].
    Decode,
    /// See [`Error::Encode`].
    Encode,
    /// See [`Error::Io`].
    Io,
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let decode = Error::Decode(image::ImageError::IoError(std::io::Error::other("truncated")));
        assert!(decode.to_string().contains("truncated"));

        let too_small = Error::RegionOutOfBounds {
            width: 60,
            height: 60,
            mask_size: 48,
            margin: 32,
        };
        let msg = too_small.to_string();
        assert!(msg.contains("60x60"));
        assert!(msg.contains("48x48"));
        assert!(msg.contains("32px"));

        let no_mask = Error::NoSuitableMask {
            width: 2000,
            height: 1500,
            mask_size: 96,
        };
        assert!(no_mask.to_string().contains("2000x1500"));
    }

    #[test]
    fn asset_load_message_names_path() {
        let err = Error::AssetLoad {
            size: 96,
            path: PathBuf::from("assets/bg_96.png"),
            reason: "missing".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("96x96"));
        assert!(msg.contains("bg_96.png"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn kind_matches_variant() {
        let err = Error::Io(std::io::Error::other("x"));
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = Error::RegionOutOfBounds {
            width: 1,
            height: 1,
            mask_size: 48,
            margin: 32,
        };
        assert_eq!(err.kind(), ErrorKind::RegionOutOfBounds);
    }
}
