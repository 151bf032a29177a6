//! Error types for the watermark-adder crate.

use std::path::PathBuf;

/// Errors that can occur while watermarking a folder of images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input path does not exist or is not a directory.
    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// The folder exists but its entries could not be listed.
    #[error("failed to read folder {}: {source}", .path.display())]
    ReadFolder {
        /// The folder being listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An input file could not be read or is not a valid image.
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        /// The input file.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// The watermarked image could not be encoded or written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// The output file.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },

    /// A font file could not be read.
    #[error("failed to read font {}: {source}", .path.display())]
    FontRead {
        /// The font file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Font data could not be parsed as TrueType/OpenType.
    #[error("invalid font data: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let missing = Error::FolderNotFound(PathBuf::from("/no/such/dir"));
        assert!(missing.to_string().contains("/no/such/dir"));

        let write = Error::Write {
            path: PathBuf::from("out/watermarked_a.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )),
        };
        let msg = write.to_string();
        assert!(msg.contains("watermarked_a.png"));
        assert!(msg.contains("read-only"));

        let font = Error::FontRead {
            path: PathBuf::from("Arial Bold.ttf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(font.to_string().contains("Arial Bold.ttf"));
        assert!(font.to_string().contains("gone"));
    }

    #[test]
    fn invalid_font_converts_from_ab_glyph() {
        let err: Error = ab_glyph::InvalidFont.into();
        assert!(matches!(err, Error::InvalidFont(_)));
    }
}
