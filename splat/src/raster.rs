//! Converts the tool's raw pixel maps into web images.

use crate::error::SplatError;
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use std::path::{Path, PathBuf};

/// 3x3 sharpening kernel, row major.
const SHARPEN: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];

/// Sum of [`SHARPEN`].
const SHARPEN_SCALE: i32 = 16;

/// Sharpens the pixel map at `src` and saves it as a PNG next to it.
///
/// Returns the path of the PNG, which has the same base name as `src`.
pub fn convert_ppm(src: &Path) -> Result<PathBuf, SplatError> {
    let raw = image::open(src)?.into_rgb8();
    let dest = src.with_extension("png");
    sharpen(&raw).save_with_format(&dest, ImageFormat::Png)?;
    debug!("converted {} -> {}", src.display(), dest.display());
    Ok(dest)
}

/// Applies [`SHARPEN`], leaving the one pixel border untouched.
///
/// Channels are rounded to the nearest value, not truncated.
fn sharpen(img: &RgbImage) -> RgbImage {
    let (width, height) = img.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return *img.get_pixel(x, y);
        }
        let mut sums = [0i32; 3];
        for (idx, weight) in SHARPEN.iter().enumerate() {
            let (dx, dy) = (idx as u32 % 3, idx as u32 / 3);
            let Rgb(px) = img.get_pixel(x + dx - 1, y + dy - 1);
            for (sum, channel) in sums.iter_mut().zip(px) {
                *sum += weight * i32::from(*channel);
            }
        }
        Rgb(sums.map(|sum| {
            (sum + SHARPEN_SCALE / 2)
                .div_euclid(SHARPEN_SCALE)
                .clamp(0, i32::from(u8::MAX)) as u8
        }))
    })
}
