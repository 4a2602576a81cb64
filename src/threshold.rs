//! Grayscale thresholding into a transparent-background RGBA image.
//!
//! The transform is a linear pipeline over freshly allocated buffers:
//!
//! 1. decode and reduce to 8-bit luminance,
//! 2. binarize: `v >= threshold` becomes white (255), anything darker black (0),
//! 3. expand to RGBA,
//! 4. rewrite every exact white pixel to fully transparent white.
//!
//! The comparison is inclusive, so a threshold of 0 yields a fully transparent
//! image and a threshold of 255 keeps only pure-white pixels transparent.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Default threshold, the midpoint of the dark half of the intensity range.
pub const DEFAULT_THRESHOLD: u8 = 127;

/// Output pixel for everything at or above the threshold.
pub const TRANSPARENT_WHITE: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Output pixel for everything below the threshold.
pub const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A grayscale cutoff in `0..=255`.
///
/// Pixels whose luminance is at or above the threshold are treated as
/// background and made transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(u8);

impl Threshold {
    /// Validate an integer threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is outside `0..=255`.
    pub fn new(value: i32) -> Result<Self> {
        u8::try_from(value).map(Self).map_err(|_| {
            Error::InvalidArgument(format!("threshold {value} is outside 0..=255"))
        })
    }

    /// The raw cutoff value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl From<u8> for Threshold {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl TryFrom<i32> for Threshold {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduce an image to single-channel 8-bit luminance.
#[must_use]
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Map each gray value to white (`v >= threshold`) or black.
#[must_use]
pub fn binarize(gray: &GrayImage, threshold: Threshold) -> GrayImage {
    let cutoff = threshold.value();
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let Luma([v]) = *gray.get_pixel(x, y);
        if v >= cutoff {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Expand a gray image to RGBA, turning exact white into transparent white.
///
/// Any other value keeps its gray level at full opacity. Applied to the
/// output of [`binarize`] this yields only [`OPAQUE_BLACK`] and
/// [`TRANSPARENT_WHITE`].
#[must_use]
pub fn mask_white(gray: &GrayImage) -> RgbaImage {
    let mut rgba = DynamicImage::ImageLuma8(gray.clone()).to_rgba8();
    for px in rgba.pixels_mut() {
        if px[0] == 255 && px[1] == 255 && px[2] == 255 {
            *px = TRANSPARENT_WHITE;
        }
    }
    rgba
}

/// Run the grayscale, binarize and mask stages on a decoded image.
#[must_use]
pub fn isolate_image(image: &DynamicImage, threshold: Threshold) -> RgbaImage {
    let gray = to_grayscale(image);
    let binary = binarize(&gray, threshold);
    mask_white(&binary)
}

/// Encode an RGBA image as PNG.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the PNG encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(Error::Encode)?;
    Ok(buf.into_inner())
}

/// Decode `image_bytes`, make its light background transparent, and return
/// the result as PNG bytes.
///
/// The threshold is validated before any decoding work is done.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `threshold` is outside `0..=255`.
/// - [`Error::Decode`] if the bytes are empty, corrupt, or not a supported
///   raster format.
/// - [`Error::Encode`] if the output cannot be encoded.
pub fn isolate(image_bytes: &[u8], threshold: i32) -> Result<Vec<u8>> {
    let threshold = Threshold::new(threshold)?;
    let decoded = image::load_from_memory(image_bytes).map_err(Error::Decode)?;
    log::debug!(
        "decoded {}x{} image, thresholding at {threshold}",
        decoded.width(),
        decoded.height()
    );
    encode_png(&isolate_image(&decoded, threshold))
}

/// Count the fully transparent pixels of an image.
#[must_use]
pub fn transparent_pixel_count(image: &RgbaImage) -> usize {
    image.pixels().filter(|px| px[3] == 0).count()
}
