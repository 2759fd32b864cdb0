//! Mask redaction.
//!
//! Masks are burned into the image file as flat gray rectangles. This is the
//! one edit that rewrites image pixels and cannot be undone.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::constants::REDACTION_GRAY;
use crate::mask::Mask;

/// Pixel column/row range covered by `mask`, clamped to the image.
fn pixel_bounds(mask: &Mask, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let edges = mask.rect.edges();
    // Float-to-int casts saturate, so negative edges land on 0
    let x1 = ((edges.left * width as f32) as u32).min(width);
    let x2 = ((edges.right * width as f32) as u32).min(width);
    let y1 = ((edges.top * height as f32) as u32).min(height);
    let y2 = ((edges.bottom * height as f32) as u32).min(height);
    (x1 < x2 && y1 < y2).then_some((x1, y1, x2, y2))
}

/// Fill every mask's rectangle with neutral gray.
pub fn apply_masks(img: &mut RgbImage, masks: &[Mask]) {
    let (width, height) = img.dimensions();
    let gray = Rgb([REDACTION_GRAY; 3]);
    for mask in masks {
        let Some((x1, y1, x2, y2)) = pixel_bounds(mask, width, height) else {
            continue;
        };
        for y in y1..y2 {
            for x in x1..x2 {
                img.put_pixel(x, y, gray);
            }
        }
    }
}

/// Decode `path`, redact `masks`, and write the result back in place.
pub fn redact_file(path: &Path, masks: &[Mask]) -> Result<(), image::ImageError> {
    if masks.is_empty() {
        return Ok(());
    }
    let mut img = image::open(path)?.to_rgb8();
    apply_masks(&mut img, masks);
    img.save(path)?;
    log::info!("🩶 Applied {} masks to {:?}", masks.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NormRect;

    fn white(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_apply_masks_fills_region() {
        let mut img = white(100, 40);
        let mask = Mask::new(NormRect::new(0.5, 0.5, 0.25, 0.5));
        apply_masks(&mut img, &[mask]);

        // x 37..62, y 10..30
        assert_eq!(img.get_pixel(37, 10), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(61, 29), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(36, 10), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(62, 20), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(50, 30), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_apply_masks_clamps_to_image() {
        let mut img = white(10, 10);
        let mask = Mask::new(NormRect::new(0.0, 1.0, 0.5, 0.5));
        apply_masks(&mut img, &[mask]);
        assert_eq!(img.get_pixel(0, 9), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(1, 7), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(2, 9), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(0, 6), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_redact_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        white(20, 20).save(&path).unwrap();

        redact_file(&path, &[Mask::new(NormRect::new(0.5, 0.5, 0.5, 0.5))]).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(10, 10), &Rgb([128, 128, 128]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }
}
