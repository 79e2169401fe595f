//! Frame transformer - handles all static image related logic
//!
//! Includes:
//! - Image decoding
//! - The fixed filter chain
//! - Encoding with the configured quality

use crate::{
    common::errors::TaskError,
    config::FilterChainConfig,
    utils::{is_non_empty_file, write_atomically},
    workflow::types::{Outcome, TransformTask},
};
use image::{
    DynamicImage, ImageFormat, RgbImage,
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
};
use std::{
    fs::read,
    io::Cursor,
    path::Path,
};

/// PIL's EDGE_ENHANCE_MORE kernel; it sums to 1 so brightness is preserved
pub const EDGE_ENHANCE_MORE: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

// ────────────────────────────────────────────────────────────────
// Public API
// ────────────────────────────────────────────────────────────────

/// Run the filter chain on `source/file_name` and write the result to
/// `destination/file_name`. Nothing is written unless every step succeeds.
pub fn transform(
    task: &TransformTask,
    source: &Path,
    destination: &Path,
    filters: &FilterChainConfig,
    skip_existing: bool,
) -> Outcome {
    let input = source.join(&task.file_name);
    let output = destination.join(&task.file_name);

    if skip_existing && is_non_empty_file(&output) {
        debug!("Skipping {}, already processed", task.file_name);
        return Outcome::Success;
    }

    let result = decode_image(&input)
        .and_then(|image| apply_filter_chain(image, filters))
        .and_then(|frame| encode_image(frame, &output, filters.quality));

    Outcome::from_result(&task.file_name, result)
}

// ────────────────────────────────────────────────────────────────
// Decoding
// ────────────────────────────────────────────────────────────────

pub fn decode_image(file_path: &Path) -> Result<DynamicImage, TaskError> {
    let file_in_memory = read(file_path).map_err(|e| TaskError::read(file_path, e))?;
    image::load_from_memory(&file_in_memory).map_err(TaskError::Decode)
}

// ────────────────────────────────────────────────────────────────
// Filter chain
// ────────────────────────────────────────────────────────────────

/// Apply the fixed, order-significant chain. Output has the input's dimensions.
pub fn apply_filter_chain(
    image: DynamicImage,
    filters: &FilterChainConfig,
) -> Result<RgbImage, TaskError> {
    let frame = image.to_rgb8();
    let (width, height) = frame.dimensions();

    let frame = gaussian_blur(frame, filters.primary_blur);
    let frame = enhance_contrast(&frame, filters.contrast_factor);
    let mut frame = convolve3x3(&frame, &EDGE_ENHANCE_MORE);
    imageops::invert(&mut frame);
    let frame = gaussian_blur(frame, filters.secondary_blur);

    let (up_width, up_height) = scaled_dimensions(width, height, filters.resample_factor)?;
    let frame = imageops::resize(&frame, up_width, up_height, FilterType::Lanczos3);
    let frame = imageops::resize(&frame, width, height, FilterType::Lanczos3);

    Ok(frame)
}

/// A sigma of zero disables the blur
fn gaussian_blur(frame: RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 {
        return frame;
    }
    imageops::blur(&frame, sigma)
}

fn scaled_dimensions(width: u32, height: u32, factor: u32) -> Result<(u32, u32), TaskError> {
    match (width.checked_mul(factor), height.checked_mul(factor)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(TaskError::Filter(format!(
            "cannot upscale {}x{} by {}: dimensions overflow",
            width, height, factor
        ))),
    }
}

/// 3x3 convolution over the interior; the one-pixel border is copied unfiltered.
pub fn convolve3x3(frame: &RgbImage, kernel: &[f32; 9]) -> RgbImage {
    let (width, height) = frame.dimensions();
    let mut out = frame.clone();
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = x + k as u32 % 3 - 1;
                let sy = y + k as u32 / 3 - 1;
                let source = frame.get_pixel(sx, sy);
                for (sum, channel) in acc.iter_mut().zip(source.0) {
                    *sum += weight * channel as f32;
                }
            }
            let pixel = out.get_pixel_mut(x, y);
            for (channel, sum) in pixel.0.iter_mut().zip(acc) {
                *channel = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Scale every channel's distance from the mean luminance by `factor`.
///
/// 1.0 is the identity, 0.0 collapses the frame to flat grey.
pub fn enhance_contrast(frame: &RgbImage, factor: f32) -> RgbImage {
    let mean = mean_luminance(frame);
    let mut out = frame.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let value = mean + factor * (*channel as f32 - mean);
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// ITU-R 601-2 luma in 16-bit fixed point, each pixel rounded to the nearest level
fn mean_luminance(frame: &RgbImage) -> f32 {
    let count = frame.width() as u64 * frame.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let total: u64 = frame
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u64
        })
        .sum();
    (total as f64 / count as f64).round() as f32
}

// ────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────

/// Encode in the format implied by the file extension. Lossy formats use `quality`.
pub fn encode_image(frame: RgbImage, output: &Path, quality: u8) -> Result<(), TaskError> {
    let format = ImageFormat::from_path(output).map_err(TaskError::Encode)?;
    let image = DynamicImage::ImageRgb8(frame);

    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            image.write_with_encoder(encoder).map_err(TaskError::Encode)?;
        }
        _ => image.write_to(&mut buffer, format).map_err(TaskError::Encode)?,
    }

    write_atomically(output, &buffer.into_inner()).map_err(|e| TaskError::write(output, e))
}
