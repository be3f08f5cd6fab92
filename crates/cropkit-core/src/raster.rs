//! In-memory RGB raster and the region renderer used by the encode loop.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::crop::CropRegion;

/// A raster held as packed 8-bit RGB.
///
/// This doubles as the pipeline's drawing surface: the encode loop renders
/// a crop region into a fresh `Raster` at each candidate size and hands it
/// to the encoder backend.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbImage,
}

impl Raster {
    /// Build a raster from packed RGB bytes (3 bytes per pixel, row-major).
    ///
    /// Returns `None` when the buffer length does not match
    /// `width * height * 3`.
    pub fn from_rgb_bytes(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, pixels).map(|image| Self { image })
    }

    /// Build a raster filled with a single color. Used for encoder support
    /// probes and tests.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(rgb)),
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed RGB bytes, row-major, 3 bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Render `region` of this raster into a new raster of the requested
    /// size.
    ///
    /// The region is copied directly and scaled to fill the whole output,
    /// with no letterboxing. Bilinear interpolation keeps this fast enough
    /// to run once per candidate size in the encode loop.
    pub fn render_region(&self, region: &CropRegion, out_width: u32, out_height: u32) -> Raster {
        let out_width = out_width.max(1);
        let out_height = out_height.max(1);

        let cropped =
            imageops::crop_imm(&self.image, region.x, region.y, region.width, region.height)
                .to_image();

        if cropped.width() == out_width && cropped.height() == out_height {
            return Self { image: cropped };
        }

        Self {
            image: imageops::resize(&cropped, out_width, out_height, FilterType::Triangle),
        }
    }
}
