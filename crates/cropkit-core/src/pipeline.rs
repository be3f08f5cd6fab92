//! The render/encode search loop.
//!
//! [`process_upload`] is the single entry point: it validates its inputs,
//! decodes the source, clamps the crop, negotiates the output format once,
//! then walks candidate sizes and qualities until an encoded result fits
//! the byte budget. The first result that fits wins; when the budget is
//! unreachable the best effort found so far is returned instead of
//! failing.
//!
//! # Search order
//!
//! Attempts run strictly sequentially, large to small and high quality to
//! low:
//!
//! 1. Render the crop region at the current candidate size.
//! 2. Step quality down from 0.92 in 0.08 decrements until the result fits
//!    or the quality floor is reached.
//! 3. Shrink the candidate size by 10% and repeat, stopping once the
//!    longer side is at or under 200px.
//!
//! Both loops are additionally bounded by `max_iterations`, so the search
//! always terminates.

use crate::codec::{self, EncodedImage, ImageCodec};
use crate::crop::CropRect;
use crate::error::ProcessError;
use crate::file::{self, InputFile, ProcessedFile};
use crate::options::EncodingOptions;

/// Quality of the first encode attempt at each candidate size.
const INITIAL_QUALITY: f64 = 0.92;

/// Quality decrement between attempts at one size.
const QUALITY_STEP: f64 = 0.08;

/// Scale factor applied to both sides when a size is exhausted.
const DIMENSION_STEP: f64 = 0.9;

/// Once the longer side is at or under this, no further shrinking happens.
const DIMENSION_FLOOR: u32 = 200;

/// Run the full upload-preparation pipeline against `codec`.
///
/// Decodes `file`, clamps `crop` to the decoded bounds, and searches for
/// the highest-quality, largest rendering of the crop that encodes to at
/// most `options.target_bytes`. The decoded source is released on every
/// exit path.
///
/// # Errors
///
/// - [`ProcessError::InvalidInput`] when the file is empty or not declared
///   as an image.
/// - [`ProcessError::MissingCrop`] when `crop` is `None`.
/// - [`ProcessError::InvalidOptions`] when an option is out of domain.
/// - [`ProcessError::Decode`] when both decode paths reject the bytes.
/// - [`ProcessError::EncodingUnavailable`] when the encoder never produces
///   a result.
pub fn process_upload(
    codec: &dyn ImageCodec,
    file: &InputFile,
    crop: Option<CropRect>,
    options: &EncodingOptions,
) -> Result<ProcessedFile, ProcessError> {
    if file.bytes.is_empty() || !file.is_image() {
        return Err(ProcessError::InvalidInput);
    }
    let crop = crop.ok_or(ProcessError::MissingCrop)?;
    options.validate()?;

    let source = codec::decode_source(codec, file).map_err(ProcessError::Decode)?;
    let region = crop.normalize(source.width(), source.height());

    let (mut render_width, mut render_height) =
        initial_render_size(region.width, region.height, options.max_dimension);

    let output_format = codec::resolve_output_format(codec, &options.output_format);

    let mut best_effort: Option<EncodedImage> = None;

    for _ in 0..options.max_iterations {
        let surface = source
            .raster()
            .render_region(&region, render_width, render_height);

        let mut quality = INITIAL_QUALITY;
        for _ in 0..options.max_iterations {
            let encoded = codec
                .encode(&surface, &output_format, quality)
                .map_err(|_| ProcessError::EncodingUnavailable)?;

            if encoded.len() as u64 <= options.target_bytes {
                return Ok(file::package(&file.name, encoded, &output_format));
            }
            best_effort = Some(encoded);

            if quality <= options.min_quality {
                break;
            }
            quality = step_quality(quality, options.min_quality);
        }

        if render_width.max(render_height) <= DIMENSION_FLOOR {
            break;
        }
        render_width = shrink(render_width);
        render_height = shrink(render_height);
    }

    let encoded = best_effort.ok_or(ProcessError::EncodingUnavailable)?;
    Ok(file::package(&file.name, encoded, &output_format))
}

/// Scale the crop size down so the longer side fits `max_dimension`,
/// preserving aspect ratio and rounding to whole pixels. Never scales up.
fn initial_render_size(crop_width: u32, crop_height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = crop_width.max(crop_height).max(1);
    let scale = (f64::from(max_dimension) / f64::from(longest)).min(1.0);

    let width = (f64::from(crop_width) * scale).round().max(1.0) as u32;
    let height = (f64::from(crop_height) * scale).round().max(1.0) as u32;
    (width, height)
}

/// Step quality down by one increment, floored at `min_quality`. The
/// result is rounded to two decimals so repeated subtraction cannot drift.
fn step_quality(quality: f64, min_quality: f64) -> f64 {
    let stepped = ((quality - QUALITY_STEP) * 100.0).round() / 100.0;
    stepped.max(min_quality)
}

fn shrink(dimension: u32) -> u32 {
    ((f64::from(dimension) * DIMENSION_STEP).floor() as u32).max(1)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use std::sync::atomic::Ordering;

    use proptest::prelude::*;

    use super::*;
    use crate::codec::fake::FakeCodec;

    proptest! {
        /// Property: the search terminates within its iteration budget for
        /// any byte target, returning either a result or a typed error.
        #[test]
        fn prop_search_terminates_within_budget(
            source_edge in 1u32..=64,
            target_bytes in 1u64..=100_000,
            max_iterations in 1u32..=6,
        ) {
            let codec = FakeCodec::new(source_edge, source_edge);
            let mut options = EncodingOptions::default();
            options.target_bytes = target_bytes;
            options.max_iterations = max_iterations;

            let result = process_upload(
                &codec,
                &InputFile::new("p.jpg", "image/jpeg", vec![1u8; 8]),
                Some(CropRect::new(0.0, 0.0, f64::from(source_edge), f64::from(source_edge))),
                &options,
            );

            prop_assert!(result.is_ok());

            // At most one probe pair plus the bounded quality/size grid.
            let bound = 2 + u64::from(max_iterations) * u64::from(max_iterations);
            prop_assert!(codec.encodes.load(Ordering::SeqCst) as u64 <= bound);

            // The source is always released exactly once.
            prop_assert_eq!(codec.disposals.load(Ordering::SeqCst), 1);
            prop_assert_eq!(codec.live_refs.load(Ordering::SeqCst), 0);
        }
    }
}
