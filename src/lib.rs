//! Make the background of a scanned signature transparent.
//!
//! The input image is reduced to grayscale and binarized against a threshold:
//! every pixel at or above the threshold becomes fully transparent white, every
//! darker pixel opaque black. The result is a PNG that can be laid over any
//! document.
//!
//! # Quick Start
//!
//! ```no_run
//! let scan = std::fs::read("signature.jpg").unwrap();
//! let png = signature_transparency::isolate(&scan, 127).expect("valid image");
//! std::fs::write("signature.png", png).unwrap();
//! ```
//!
//! # Stages
//!
//! The individual stages are exposed for callers that already hold a decoded
//! image:
//!
//! ```
//! use image::{DynamicImage, GrayImage};
//! use signature_transparency::{isolate_image, Threshold, TRANSPARENT_WHITE};
//!
//! let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, image::Luma([255])));
//! let out = isolate_image(&white, Threshold::from(200));
//! assert!(out.pixels().all(|px| *px == TRANSPARENT_WHITE));
//! ```

#![deny(missing_docs)]

pub mod cache;
mod engine;
pub mod error;
pub mod threshold;

pub use cache::{CachedUpload, UploadCache};
pub use engine::{
    check_supported, default_output_path, is_supported_image, process_bytes, process_file,
    save_png, sniff_format, ProcessOptions, ProcessResult, DEFAULT_OUTPUT_NAME,
};
pub use error::{Error, Result};
pub use threshold::{
    binarize, encode_png, isolate, isolate_image, mask_white, to_grayscale,
    transparent_pixel_count, Threshold, DEFAULT_THRESHOLD, OPAQUE_BLACK, TRANSPARENT_WHITE,
};
