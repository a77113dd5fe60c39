//! Outline and mask textures derived from a transparent PNG.
//!
//! `inner` is the source alpha. `dilated` is `inner` grown by the outline
//! width, and `outer` is its negation (white outside the outline).

use image::{DynamicImage, GrayImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{
    blur, derive_output, extract_alpha, negate, open_rgba, save, threshold, tint, BlendMode,
    OUTLINE_WIDTH,
};
use crate::error::Result;

const MASK_COLOR: [u8; 3] = [255, 0, 0];

struct Layers {
    inner: GrayImage,
    dilated: GrayImage,
}

impl Layers {
    fn from_image(img: &RgbaImage) -> Self {
        let inner = extract_alpha(img);
        let dilated = threshold(&blur(&inner, OUTLINE_WIDTH), 1);
        Self { inner, dilated }
    }

    fn outer(&self) -> GrayImage {
        negate(&self.dilated)
    }

    fn feathered_outer(&self) -> GrayImage {
        blur(&self.outer(), OUTLINE_WIDTH)
    }
}

fn write_mask(dst: &Path, mask: &GrayImage) -> Result<PathBuf> {
    save(DynamicImage::ImageRgba8(tint(MASK_COLOR, mask)), dst)?;
    info!("Created: {}", dst.display());
    Ok(dst.to_path_buf())
}

/// Subtract `b` from `a`, saturating at zero.
fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        image::Luma([a.get_pixel(x, y)[0].saturating_sub(b.get_pixel(x, y)[0])])
    })
}

/// Hard-edged outline mask: on everywhere except the outline ring. Writes `-mask.png`.
pub fn outline_mask(png: &Path) -> Result<PathBuf> {
    let dst = derive_output(png, "-mask.png")?;
    let layers = Layers::from_image(&open_rgba(png)?);
    let mask = BlendMode::Add.blend_gray(&layers.outer(), &layers.inner);
    write_mask(&dst, &mask)
}

/// Like [`outline_mask`] but the outline fades into the background.
pub fn outline_feathered(png: &Path) -> Result<PathBuf> {
    let dst = derive_output(png, "-mask.png")?;
    let layers = Layers::from_image(&open_rgba(png)?);
    let mask = BlendMode::Add.blend_gray(&layers.feathered_outer(), &layers.inner);
    write_mask(&dst, &mask)
}

/// Feathered outer mask with the shape itself left off. Writes `-mask-no-center.png`.
pub fn outline_feathered_no_center(png: &Path) -> Result<PathBuf> {
    let dst = derive_output(png, "-mask-no-center.png")?;
    let layers = Layers::from_image(&open_rgba(png)?);
    write_mask(&dst, &layers.feathered_outer())
}

/// White outline ring on a transparent background. Writes `-outline-only.png`.
pub fn outline_only(png: &Path) -> Result<PathBuf> {
    let dst = derive_output(png, "-outline-only.png")?;
    let layers = Layers::from_image(&open_rgba(png)?);
    let ring = subtract(&layers.dilated, &layers.inner);
    let out = RgbaImage::from_fn(ring.width(), ring.height(), |x, y| {
        image::Rgba([255, 255, 255, ring.get_pixel(x, y)[0]])
    });
    save(DynamicImage::ImageRgba8(out), &dst)?;
    info!("Created: {}", dst.display());
    Ok(dst)
}

/// Mask of just the shape, no outline. Writes `-inner-mask.png`.
pub fn inner_mask(png: &Path) -> Result<PathBuf> {
    let dst = derive_output(png, "-inner-mask.png")?;
    let inner = extract_alpha(&open_rgba(png)?);
    write_mask(&dst, &inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    /// 64x64 transparent canvas with an opaque 16x16 square in the middle.
    fn square(dir: &TempDir) -> PathBuf {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            if (24..40).contains(&x) && (24..40).contains(&y) {
                Rgba([0, 0, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let path = dir.path().join("ship.png");
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_outline_mask_has_dark_ring() {
        let dir = TempDir::new().unwrap();
        let src = square(&dir);
        let dst = outline_mask(&src).unwrap();
        assert_eq!(dst, dir.path().join("ship-mask.png"));

        let out = image::open(&dst).unwrap().to_rgba8();
        // shape and far background are red, the ring next to the shape is black
        assert_eq!(out.get_pixel(32, 32).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(21, 32).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_outline_only_ring_is_outside_shape() {
        let dir = TempDir::new().unwrap();
        let dst = outline_only(&square(&dir)).unwrap();
        let out = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(32, 32)[3], 0);
        assert_eq!(out.get_pixel(21, 32)[3], 255);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_inner_mask_matches_alpha() {
        let dir = TempDir::new().unwrap();
        let dst = inner_mask(&square(&dir)).unwrap();
        assert!(dst.ends_with("ship-inner-mask.png"));
        let out = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(30, 30).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(10, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_feathered_variants_write_expected_names() {
        let dir = TempDir::new().unwrap();
        let src = square(&dir);
        assert!(outline_feathered(&src).unwrap().ends_with("ship-mask.png"));
        assert!(outline_feathered_no_center(&src)
            .unwrap()
            .ends_with("ship-mask-no-center.png"));
    }
}
