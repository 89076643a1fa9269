//! Overlay compositing.
//!
//! A fixed overlay image is scaled once, centered over each downloaded
//! frame and alpha-blended using the overlay's own transparency. The frame
//! is rewritten in place, before it is committed to the cache, so a cached
//! frame is never composited twice.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MoonError, Result};

/// Immutable overlay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// Image drawn over the frame.
    pub path: PathBuf,
    /// Factor applied to the overlay's dimensions, in `(0, 1]`.
    pub scale: f64,
}

impl OverlaySpec {
    /// Create an overlay spec, rejecting scales outside `(0, 1]`.
    pub fn new(path: impl Into<PathBuf>, scale: f64) -> Result<Self> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(MoonError::ConfigValidationError {
                message: format!("overlay scale must be in (0, 1], got {}", scale),
            });
        }
        Ok(Self {
            path: path.into(),
            scale,
        })
    }
}

/// Where the scaled overlay lands on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Scale the overlay (rounding down) and center it over the base.
pub fn placement(base: (u32, u32), overlay: (u32, u32), scale: f64) -> Placement {
    let width = scaled(overlay.0, scale);
    let height = scaled(overlay.1, scale);
    Placement {
        x: (base.0 as i64 - width as i64) / 2,
        y: (base.1 as i64 - height as i64) / 2,
        width,
        height,
    }
}

fn scaled(dim: u32, scale: f64) -> u32 {
    ((dim as f64 * scale).floor() as u32).max(1)
}

/// Draws the configured overlay onto frames.
pub struct Compositor {
    spec: OverlaySpec,
    overlay: RgbaImage,
}

impl Compositor {
    /// Load the overlay image named by `spec`.
    pub fn load(spec: OverlaySpec) -> Result<Self> {
        let overlay = image::open(&spec.path)
            .map_err(|e| MoonError::CompositeFailed {
                path: spec.path.clone(),
                message: format!("cannot load overlay: {}", e),
            })?
            .to_rgba8();
        Ok(Self { spec, overlay })
    }

    /// Composite the overlay onto the image at `base_path`, replacing it.
    ///
    /// The base format is sniffed from its content, so staging files with
    /// arbitrary extensions work. Formats without alpha are written back
    /// as RGB.
    pub fn overlay(&self, base_path: &Path) -> Result<PathBuf> {
        let failed = |message: String| MoonError::CompositeFailed {
            path: base_path.to_path_buf(),
            message,
        };

        let reader = ImageReader::open(base_path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| failed(e.to_string()))?;
        let format = reader.format().unwrap_or(ImageFormat::Jpeg);
        let mut canvas = reader
            .decode()
            .map_err(|e| failed(format!("cannot decode base image: {}", e)))?
            .to_rgba8();

        let at = placement(
            canvas.dimensions(),
            self.overlay.dimensions(),
            self.spec.scale,
        );
        let top = imageops::resize(&self.overlay, at.width, at.height, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &top, at.x, at.y);
        debug!(
            "Composited {}x{} overlay at ({}, {}) onto {:?}",
            at.width, at.height, at.x, at.y, base_path
        );

        let output = match format {
            ImageFormat::Png | ImageFormat::WebP => DynamicImage::ImageRgba8(canvas),
            _ => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
        };
        output
            .save_with_format(base_path, format)
            .map_err(|e| failed(format!("cannot write composited image: {}", e)))?;

        Ok(base_path.to_path_buf())
    }
}
