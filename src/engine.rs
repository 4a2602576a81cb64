//! File-level processing around the thresholding transform.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};
use crate::threshold::{self, Threshold};

/// File name offered for results that have no input path to derive one from.
pub const DEFAULT_OUTPUT_NAME: &str = "signature.png";

/// Options controlling signature processing.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Luminance cutoff; pixels at or above it become transparent.
    pub threshold: Threshold,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Number of pixels made transparent.
    pub transparent_pixels: usize,
    /// Total number of pixels in the image.
    pub total_pixels: usize,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn failed(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            transparent_pixels: 0,
            total_pixels: 0,
            message,
        }
    }

    /// Fraction of the image that became transparent, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn transparent_ratio(&self) -> f32 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.transparent_pixels as f32 / self.total_pixels as f32
        }
    }
}

/// Load `input`, make its background transparent and write a PNG to `output`.
///
/// Never fails outright; errors are reported through [`ProcessResult`].
#[must_use]
pub fn process_file(input: &Path, output: &Path, opts: &ProcessOptions) -> ProcessResult {
    let bytes = match std::fs::read(input) {
        Ok(b) => b,
        Err(e) => return ProcessResult::failed(input, format!("Failed to read: {e}")),
    };
    process_bytes(&bytes, input, output, opts)
}

/// Like [`process_file`], for image bytes already in memory.
///
/// `source` is only used to label the result.
#[must_use]
pub fn process_bytes(
    bytes: &[u8],
    source: &Path,
    output: &Path,
    opts: &ProcessOptions,
) -> ProcessResult {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => return ProcessResult::failed(source, format!("Failed to load: {e}")),
    };

    let isolated = threshold::isolate_image(&decoded, opts.threshold);
    let transparent_pixels = threshold::transparent_pixel_count(&isolated);
    let total_pixels = isolated.width() as usize * isolated.height() as usize;
    log::debug!(
        "{}: {transparent_pixels}/{total_pixels} pixels transparent at threshold {}",
        source.display(),
        opts.threshold
    );

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return ProcessResult::failed(
                    source,
                    format!("Failed to create output directory: {e}"),
                );
            }
        }
    }

    match save_png(&isolated, output) {
        Ok(()) => ProcessResult {
            path: source.to_path_buf(),
            success: true,
            transparent_pixels,
            total_pixels,
            message: format!("Saved {}", output.display()),
        },
        Err(e) => ProcessResult::failed(source, format!("Failed to save: {e}")),
    }
}

/// Check if a file has a supported input extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

/// Require a supported input extension.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] naming the offending extension.
pub fn check_supported(path: &Path) -> Result<()> {
    if is_supported_image(path) {
        Ok(())
    } else {
        let ext = path
            .extension()
            .map_or_else(|| "(none)".to_string(), |e| e.to_string_lossy().to_string());
        Err(Error::UnsupportedFormat(ext))
    }
}

/// Save an RGBA image as PNG, whatever extension `path` has.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = threshold::encode_png(img)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"scan.jpg"` becomes `"scan_transparent.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    match input.file_stem() {
        Some(stem) => parent.join(format!("{}_transparent.png", stem.to_string_lossy())),
        None => parent.join(DEFAULT_OUTPUT_NAME),
    }
}

/// Guess the input format from its leading bytes.
#[must_use]
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_appends_transparent_suffix() {
        let p = default_output_path(Path::new("/tmp/scan.jpg"));
        assert_eq!(p, PathBuf::from("/tmp/scan_transparent.png"));

        let p = default_output_path(Path::new("signature.png"));
        assert_eq!(
            p.file_name().unwrap().to_str().unwrap(),
            "signature_transparent.png"
        );
    }

    #[test]
    fn is_supported_image_accepts_upload_formats() {
        assert!(is_supported_image(Path::new("scan.jpg")));
        assert!(is_supported_image(Path::new("scan.JPEG")));
        assert!(is_supported_image(Path::new("scan.png")));
    }

    #[test]
    fn is_supported_image_rejects_other_formats() {
        assert!(!is_supported_image(Path::new("scan.gif")));
        assert!(!is_supported_image(Path::new("scan.webp")));
        assert!(!is_supported_image(Path::new("scan")));
    }

    #[test]
    fn check_supported_names_extension() {
        assert!(check_supported(Path::new("a.png")).is_ok());
        let err = check_supported(Path::new("a.tiff")).unwrap_err();
        assert!(err.to_string().contains("tiff"));
        let err = check_supported(Path::new("a")).unwrap_err();
        assert!(err.to_string().contains("(none)"));
    }

    #[test]
    fn transparent_ratio_handles_empty_result() {
        let r = ProcessResult::failed(Path::new("x.png"), String::new());
        assert!(r.transparent_ratio().abs() < f32::EPSILON);
    }

    #[test]
    fn sniff_format_recognises_png_signature() {
        let png = threshold::encode_png(&RgbaImage::new(1, 1)).unwrap();
        assert_eq!(sniff_format(&png), Some(ImageFormat::Png));
        assert_eq!(sniff_format(b"nope"), None);
    }
}
