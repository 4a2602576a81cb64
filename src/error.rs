//! Error types for the signature-transparency crate.

/// Errors that can occur while isolating a signature.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument is outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The input bytes are not a decodable raster image.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The transformed image could not be encoded as PNG.
    #[error("failed to encode PNG: {0}")]
    Encode(image::ImageError),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file type is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
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

        let unsupported = Error::UnsupportedFormat("gif".to_string());
        assert!(unsupported.to_string().contains("gif"));

        let invalid = Error::InvalidArgument("threshold 256 is outside 0..=255".to_string());
        let msg = invalid.to_string();
        assert!(msg.starts_with("invalid argument"));
        assert!(msg.contains("256"));
    }

    #[test]
    fn decode_error_wraps_image_error() {
        let err = image::load_from_memory(b"not an image").map_err(Error::Decode);
        let msg = err.unwrap_err().to_string();
        assert!(msg.starts_with("failed to decode image"));
    }
}
