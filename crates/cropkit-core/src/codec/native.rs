//! Default codec backend built on the `image` crate.
//!
//! Decoding handles the common upload formats (JPEG, PNG, WebP, GIF) and
//! applies EXIF orientation so the raster matches what the user saw in the
//! crop preview. Encoding covers JPEG and PNG through `image`, and lossy
//! WebP through libwebp when the `webp` feature is enabled; without that
//! feature a WebP encode reports `Unsupported` and format negotiation
//! settles on JPEG.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};

use super::{CodecError, EncodedImage, ImageCodec, SourceImage};
use crate::options::{JPEG_MIME, PNG_MIME, WEBP_MIME};
use crate::raster::Raster;

/// Codec backed by the `image` crate and libwebp.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for NativeCodec {
    fn decode_fast(&self, bytes: &[u8], media_type: &str) -> Result<SourceImage, CodecError> {
        let format = format_for_media_type(media_type).ok_or_else(|| CodecError::Unsupported {
            media_type: media_type.to_string(),
        })?;

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        Ok(finish_decode(decoded, bytes))
    }

    fn decode_fallback(&self, bytes: &[u8]) -> Result<SourceImage, CodecError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let decoded = reader
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        Ok(finish_decode(decoded, bytes))
    }

    fn encode(
        &self,
        raster: &Raster,
        media_type: &str,
        quality: f64,
    ) -> Result<EncodedImage, CodecError> {
        match media_type {
            JPEG_MIME => encode_jpeg(raster, quality),
            PNG_MIME => encode_png(raster),
            #[cfg(feature = "webp")]
            WEBP_MIME => encode_webp(raster, quality),
            other => Err(CodecError::Unsupported {
                media_type: other.to_string(),
            }),
        }
    }
}

/// Dispatch table from declared media types to the decoders the fast path
/// may use. Anything else is left for the sniffing fallback.
fn format_for_media_type(media_type: &str) -> Option<ImageFormat> {
    match media_type {
        JPEG_MIME => Some(ImageFormat::Jpeg),
        PNG_MIME => Some(ImageFormat::Png),
        WEBP_MIME => Some(ImageFormat::WebP),
        "image/gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Orient the decoded image upright and convert it to packed RGB.
fn finish_decode(decoded: DynamicImage, bytes: &[u8]) -> SourceImage {
    let oriented = apply_orientation(decoded, exif_orientation(bytes));
    SourceImage::new(Raster::from_image(oriented.into_rgb8()))
}

/// Read the EXIF orientation tag (1-8), defaulting to 1 (normal) when the
/// container carries no usable EXIF data.
fn exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1),
        Err(_) => 1,
    }
}

/// EXIF orientation transforms mapped onto `DynamicImage` operations.
fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Map pipeline quality in `(0, 1]` to the 1-100 scale the encoders expect.
fn quality_percent(quality: f64) -> u8 {
    ((quality * 100.0).round() as u8).clamp(1, 100)
}

fn encode_jpeg(raster: &Raster, quality: f64) -> Result<EncodedImage, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality_percent(quality));

    encoder
        .write_image(
            raster.as_bytes(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(EncodedImage {
        media_type: JPEG_MIME.to_string(),
        bytes: buffer.into_inner(),
    })
}

fn encode_png(raster: &Raster) -> Result<EncodedImage, CodecError> {
    let mut buffer = Cursor::new(Vec::new());

    PngEncoder::new(&mut buffer)
        .write_image(
            raster.as_bytes(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(EncodedImage {
        media_type: PNG_MIME.to_string(),
        bytes: buffer.into_inner(),
    })
}

#[cfg(feature = "webp")]
fn encode_webp(raster: &Raster, quality: f64) -> Result<EncodedImage, CodecError> {
    let encoder = webp::Encoder::from_rgb(raster.as_bytes(), raster.width(), raster.height());
    let encoded = encoder.encode(f32::from(quality_percent(quality)));

    Ok(EncodedImage {
        media_type: WEBP_MIME.to_string(),
        bytes: encoded.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_source, encoder_supports, resolve_output_format};
    use crate::crop::CropRect;
    use crate::file::InputFile;
    use crate::options::EncodingOptions;
    use crate::pipeline::process_upload;
    use image::{Rgb, RgbImage};

    /// A busy gradient pattern so lossy encoders produce realistic sizes.
    fn sample_raster(width: u32, height: u32) -> Raster {
        Raster::from_image(RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x * 31 + y * 17) % 251) as u8,
            ])
        }))
    }

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        encode_jpeg(&sample_raster(width, height), 0.9).unwrap().bytes
    }

    #[test]
    fn fast_path_decodes_a_declared_jpeg() {
        let codec = NativeCodec::new();
        let bytes = sample_jpeg(64, 48);

        let source = codec.decode_fast(&bytes, JPEG_MIME).unwrap();

        assert_eq!((source.width(), source.height()), (64, 48));
    }

    #[test]
    fn fast_path_rejects_a_wrong_declared_type() {
        let codec = NativeCodec::new();
        let bytes = sample_jpeg(16, 16);

        assert!(codec.decode_fast(&bytes, PNG_MIME).is_err());
    }

    #[test]
    fn fallback_sniffs_mislabeled_content() {
        let codec = NativeCodec::new();
        // JPEG bytes declared as PNG: the fast path fails, sniffing works.
        let file = InputFile::new("photo.png", PNG_MIME, sample_jpeg(32, 32));

        let source = decode_source(&codec, &file).unwrap();

        assert_eq!((source.width(), source.height()), (32, 32));
    }

    #[test]
    fn both_paths_reject_garbage() {
        let codec = NativeCodec::new();
        let file = InputFile::new("photo.jpg", JPEG_MIME, vec![0x00, 0x01, 0x02, 0x03]);

        assert!(decode_source(&codec, &file).is_err());
    }

    #[test]
    fn jpeg_output_carries_the_magic_bytes() {
        let encoded = encode_jpeg(&sample_raster(20, 20), 0.8).unwrap();

        assert_eq!(encoded.media_type, JPEG_MIME);
        assert_eq!(&encoded.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn png_output_carries_the_magic_bytes() {
        let encoded = encode_png(&sample_raster(20, 20)).unwrap();

        assert_eq!(encoded.media_type, PNG_MIME);
        assert_eq!(&encoded.bytes[1..4], b"PNG");
    }

    #[cfg(feature = "webp")]
    #[test]
    fn webp_output_is_a_riff_container() {
        let encoded = encode_webp(&sample_raster(20, 20), 0.8).unwrap();

        assert_eq!(encoded.media_type, WEBP_MIME);
        assert_eq!(&encoded.bytes[0..4], b"RIFF");
        assert_eq!(&encoded.bytes[8..12], b"WEBP");
    }

    #[test]
    fn lower_quality_means_smaller_jpeg() {
        let raster = sample_raster(120, 120);

        let high = encode_jpeg(&raster, 0.92).unwrap();
        let low = encode_jpeg(&raster, 0.55).unwrap();

        assert!(low.len() < high.len());
    }

    #[test]
    fn quality_percent_clamps_into_encoder_range() {
        assert_eq!(quality_percent(0.92), 92);
        assert_eq!(quality_percent(0.001), 1);
        assert_eq!(quality_percent(2.0), 100);
    }

    #[test]
    fn unknown_output_types_negotiate_down_to_jpeg() {
        let codec = NativeCodec::new();

        assert!(!encoder_supports(&codec, "image/bmp"));
        assert_eq!(resolve_output_format(&codec, "image/bmp"), JPEG_MIME);
    }

    #[cfg(feature = "webp")]
    #[test]
    fn webp_is_the_negotiated_default() {
        let codec = NativeCodec::new();
        assert_eq!(resolve_output_format(&codec, WEBP_MIME), WEBP_MIME);
    }

    // End-to-end runs against the real codec.

    #[test]
    fn pipeline_happy_path_fits_the_default_budget() {
        let codec = NativeCodec::new();
        let file = InputFile::new("avatar.jpeg", JPEG_MIME, sample_jpeg(512, 384));
        let crop = Some(CropRect::new(64.0, 32.0, 256.0, 256.0));

        let processed =
            process_upload(&codec, &file, crop, &EncodingOptions::default()).unwrap();

        assert!(processed.len() <= 409_600);
        if cfg!(feature = "webp") {
            assert_eq!(processed.media_type, WEBP_MIME);
            assert_eq!(processed.file_name, "avatar.webp");
        } else {
            assert_eq!(processed.media_type, JPEG_MIME);
            assert_eq!(processed.file_name, "avatar.jpg");
        }
    }

    #[test]
    fn pipeline_tiny_budget_still_produces_output() {
        let codec = NativeCodec::new();
        let file = InputFile::new("avatar.jpeg", JPEG_MIME, sample_jpeg(512, 512));
        let crop = Some(CropRect::new(0.0, 0.0, 512.0, 512.0));

        let mut options = EncodingOptions::default();
        options.max_dimension = 256;
        options.target_bytes = 500;

        let processed = process_upload(&codec, &file, crop, &options).unwrap();

        assert!(!processed.is_empty());
    }

    #[test]
    fn pipeline_rejects_corrupt_bytes_with_decode_error() {
        let codec = NativeCodec::new();
        let mut bytes = sample_jpeg(64, 64);
        bytes.truncate(24);
        let file = InputFile::new("avatar.jpeg", JPEG_MIME, bytes);

        let err = process_upload(
            &codec,
            &file,
            Some(CropRect::new(0.0, 0.0, 64.0, 64.0)),
            &EncodingOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Selected file is not a valid image.");
    }
}
