//! Receipt image normalization before text detection.
//!
//! Pipeline: decode → grayscale → bilateral smoothing → adaptive local
//! binarization → bound resolution → PNG encode. Receipt photos are noisy
//! (thermal paper, phone cameras, uneven lighting); binarizing against a
//! local Gaussian-weighted threshold keeps the print legible where a global
//! threshold would wash out half the page.
//!
//! Decode failure is NOT an error: the original bytes are passed through
//! unchanged so recognition still gets something to chew on.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use tracing::{debug, warn};

/// Longer side is capped here after binarization — bounds recognition cost,
/// and receipt print gains nothing past this resolution.
const MAX_DIMENSION: u32 = 2000;

/// Bilateral filter window radius (diameter 7).
const BILATERAL_RADIUS: u32 = 3;

/// Bilateral range sigma — intensity similarity falloff.
const BILATERAL_SIGMA_COLOR: f32 = 50.0;

/// Bilateral spatial sigma — distance falloff within the window.
const BILATERAL_SIGMA_SPACE: f32 = 50.0;

/// Adaptive threshold neighborhood size (odd).
const ADAPTIVE_BLOCK_SIZE: u32 = 31;

/// Constant subtracted from the local weighted mean.
const ADAPTIVE_OFFSET: f32 = 7.0;

/// Normalize raw image bytes into OCR-friendly PNG bytes.
///
/// Best-effort by design: if the input cannot be decoded (corrupt upload,
/// unknown format) or the result cannot be encoded, the original bytes are
/// returned unchanged and the recognition step attempts them as-is.
pub fn normalize(raw: &[u8]) -> Vec<u8> {
    let img = match image::load_from_memory(raw) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "Image decode failed; passing original bytes to recognition");
            return raw.to_vec();
        }
    };

    let gray = img.to_luma8();
    let smoothed = bilateral_filter(
        &gray,
        BILATERAL_RADIUS,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPACE,
    );
    let binary = adaptive_threshold(&smoothed, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_OFFSET);
    let bounded = bound_resolution(binary, MAX_DIMENSION);

    debug!(
        input = format!("{}x{}", gray.width(), gray.height()),
        output = format!("{}x{}", bounded.width(), bounded.height()),
        "Receipt image normalized"
    );

    match encode_png(&bounded) {
        Ok(png) => png,
        Err(e) => {
            warn!(error = %e, "PNG encode failed; passing original bytes to recognition");
            raw.to_vec()
        }
    }
}

/// Edge-preserving bilateral filter on a grayscale image.
///
/// Weights each neighbor by spatial distance AND intensity similarity, so
/// noise inside flat regions is smoothed while text edges stay crisp.
pub fn bilateral_filter(
    img: &GrayImage,
    radius: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let mut output = GrayImage::new(w, h);
    let color_sq_2 = 2.0 * sigma_color * sigma_color;
    let space_sq_2 = 2.0 * sigma_space * sigma_space;

    for y in 0..h {
        for x in 0..w {
            let center = img.get_pixel(x, y).0[0] as f32;

            let mut sum = 0.0f32;
            let mut weight_sum = 0.0f32;

            let y_start = y.saturating_sub(radius);
            let y_end = (y + radius + 1).min(h);
            let x_start = x.saturating_sub(radius);
            let x_end = (x + radius + 1).min(w);

            for ny in y_start..y_end {
                for nx in x_start..x_end {
                    let neighbor = img.get_pixel(nx, ny).0[0] as f32;

                    let dx = nx as f32 - x as f32;
                    let dy = ny as f32 - y as f32;
                    let spatial_weight = (-(dx * dx + dy * dy) / space_sq_2).exp();

                    let diff = neighbor - center;
                    let range_weight = (-(diff * diff) / color_sq_2).exp();

                    let weight = spatial_weight * range_weight;
                    sum += neighbor * weight;
                    weight_sum += weight;
                }
            }

            let value = if weight_sum > 0.0 {
                (sum / weight_sum).round().clamp(0.0, 255.0) as u8
            } else {
                center as u8
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }

    output
}

/// Gaussian-weighted adaptive binarization.
///
/// Each pixel is compared against the Gaussian-weighted mean of its
/// `block_size` neighborhood minus `offset`: above → white, else black.
/// Local thresholding survives the uneven lighting of receipt photos.
pub fn adaptive_threshold(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let local_mean = gaussian_blur(img, block_size);
    let (w, h) = (img.width(), img.height());
    let mut output = GrayImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let value = img.get_pixel(x, y).0[0] as f32;
            let threshold = local_mean.get_pixel(x, y).0[0] as f32 - offset;
            let out = if value > threshold { 255 } else { 0 };
            output.put_pixel(x, y, Luma([out]));
        }
    }

    output
}

/// Separable Gaussian blur with a `ksize`-wide kernel.
///
/// Sigma is derived from the kernel size (0.3·((ksize−1)/2 − 1) + 0.8, the
/// conventional mapping), so callers only choose the neighborhood.
fn gaussian_blur(img: &GrayImage, ksize: u32) -> GrayImage {
    let radius = (ksize / 2) as i64;
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let sigma_sq_2 = 2.0 * sigma * sigma;

    let kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / sigma_sq_2).exp())
        .collect();
    let kernel_sum: f32 = kernel.iter().sum();

    let (w, h) = (img.width() as i64, img.height() as i64);

    // Horizontal pass
    let mut horizontal = vec![0.0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x + k as i64 - radius).clamp(0, w - 1);
                sum += weight * img.get_pixel(sx as u32, y as u32).0[0] as f32;
            }
            horizontal[(y * w + x) as usize] = sum / kernel_sum;
        }
    }

    // Vertical pass
    let mut output = GrayImage::new(w as u32, h as u32);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y + k as i64 - radius).clamp(0, h - 1);
                sum += weight * horizontal[(sy * w + x) as usize];
            }
            let value = (sum / kernel_sum).round().clamp(0.0, 255.0) as u8;
            output.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    output
}

/// Downscale so the longer side does not exceed `max_dim`, preserving aspect.
/// Images already within bounds pass through untouched. Never upscales.
fn bound_resolution(img: GrayImage, max_dim: u32) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    let largest = w.max(h);
    if largest <= max_dim {
        return img;
    }

    let scale = max_dim as f32 / largest as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);

    debug!(
        from = format!("{w}x{h}"),
        to = format!("{new_w}x{new_h}"),
        "Downscaling oversized receipt image"
    );

    image::imageops::resize(&img, new_w, new_h, FilterType::Triangle)
}

/// Encode a grayscale image as PNG bytes.
fn encode_png(img: &GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let dynamic = DynamicImage::ImageLuma8(img.clone());
    let mut cursor = Cursor::new(Vec::new());
    dynamic.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}
