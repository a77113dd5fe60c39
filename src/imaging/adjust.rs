use image::{imageops, imageops::FilterType, DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tracing::info;

use super::{ensure_distinct, open_rgba, save, BlendMode};
use crate::error::{BuildError, Result};

/// Inset and viewport of the clip circle, in a 256 unit square.
const CLIP_VIEWBOX: f32 = 256.0;
const CLIP_INSET: f32 = 16.0;

const TILE_CONTRAST: f32 = 0.7;
const TILE_BRIGHTNESS: f32 = 1.2;
const TILE_SATURATION: f32 = 1.3;
const TILE_CROP: (u32, u32, u32, u32) = (70, 70, 884, 884);
const TILE_UI_SIZE: u32 = 512;

/// Bounding box `(x, y, w, h)` of the pixels with non-zero alpha.
fn opaque_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if px[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Trim the transparent border and re-center the content. Overwrites `png`.
pub fn center(png: &Path) -> Result<()> {
    let img = open_rgba(png)?;
    let (width, height) = img.dimensions();
    let Some((x, y, w, h)) = opaque_bounds(&img) else {
        info!("Nothing to center: {}", png.display());
        return Ok(());
    };
    let trimmed = imageops::crop_imm(&img, x, y, w, h).to_image();
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    imageops::overlay(
        &mut canvas,
        &trimmed,
        ((width - w) / 2) as i64,
        ((height - h) / 2) as i64,
    );
    save(DynamicImage::ImageRgba8(canvas), png)?;
    info!("Overwrote: {}", png.display());
    Ok(())
}

/// Flatten onto white and write a `.jpg` next to `png`.
pub fn opaque_jpg(png: &Path, grayscale: bool) -> Result<std::path::PathBuf> {
    let dst = png.with_extension("jpg");
    ensure_distinct(png, &dst)?;
    let img = open_rgba(png)?;
    let flat = RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y);
        let a = px[3] as f32 / 255.0;
        let over = |c: u8| (c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
        Rgb([over(px[0]), over(px[1]), over(px[2])])
    });
    let out = DynamicImage::ImageRgb8(flat);
    let out = if grayscale { out.grayscale() } else { out };
    save(out, &dst)?;
    info!("Created: {}", dst.display());
    Ok(dst)
}

/// White disc whose alpha is the anti-aliased coverage of the clip circle.
fn circle_coverage(w: u32, h: u32) -> RgbaImage {
    let scale = w.min(h) as f32 / CLIP_VIEWBOX;
    let radius = ((CLIP_VIEWBOX - CLIP_INSET * 2.0) / 2.0).floor() * scale;
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
        Rgba([255, 255, 255, (coverage * 255.0).round() as u8])
    })
}

/// Keep only the pixels inside a centered circle, anti-aliased at the edge.
pub fn clip_circle(src: &Path, dst: &Path) -> Result<()> {
    ensure_distinct(src, dst)?;
    let mut img = open_rgba(src)?;
    let (w, h) = img.dimensions();
    BlendMode::DestIn.blend_rgba(&mut img, &circle_coverage(w, h));
    save(DynamicImage::ImageRgba8(img), dst)?;
    info!("Created: {}", dst.display());
    Ok(())
}

/// Linear contrast about mid-gray, then brightness and saturation boost.
pub fn tile_color_adjust(img: &mut RgbImage) {
    let offset = 128.0 - 128.0 * TILE_CONTRAST;
    for px in img.pixels_mut() {
        let c = px.0.map(|v| v as f32 * TILE_CONTRAST + offset);
        let luma = 0.299 * c[0] + 0.587 * c[1] + 0.114 * c[2];
        px.0 = c.map(|v| {
            let saturated = luma + (v - luma) * TILE_SATURATION;
            (saturated * TILE_BRIGHTNESS).round().clamp(0.0, 255.0) as u8
        });
    }
}

/// Adjust a system tile texture in place and write its 512px `.png` UI image.
///
/// The UI image is cut from the tile interior and takes its alpha from
/// `blank_png`, the hex-shaped blank tile.
pub fn adjust_tile(jpg: &Path, blank_png: &Path) -> Result<()> {
    info!("Transforming image: {}", jpg.display());
    let mut img = open_rgba(jpg).map(|i| DynamicImage::ImageRgba8(i).to_rgb8())?;
    tile_color_adjust(&mut img);
    save(DynamicImage::ImageRgb8(img.clone()), jpg)?;

    let (left, top, width, height) = TILE_CROP;
    if img.width() < left + width || img.height() < top + height {
        return Err(BuildError::InvalidImage(
            jpg.to_path_buf(),
            format!(
                "tile is {}x{}, need at least {}x{}",
                img.width(),
                img.height(),
                left + width,
                top + height
            ),
        ));
    }
    let interior = imageops::crop_imm(&img, left, top, width, height).to_image();
    let interior = imageops::resize(&interior, TILE_UI_SIZE, TILE_UI_SIZE, FilterType::Lanczos3);
    let blank = open_rgba(blank_png)?;
    let blank = imageops::resize(&blank, TILE_UI_SIZE, TILE_UI_SIZE, FilterType::Lanczos3);

    let ui = RgbaImage::from_fn(TILE_UI_SIZE, TILE_UI_SIZE, |x, y| {
        let c = interior.get_pixel(x, y);
        Rgba([c[0], c[1], c[2], blank.get_pixel(x, y)[3]])
    });
    let png = jpg.with_extension("png");
    ensure_distinct(jpg, &png)?;
    save(DynamicImage::ImageRgba8(ui), &png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_center_moves_content_to_middle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icon.png");
        let img = RgbaImage::from_fn(20, 20, |x, y| {
            if x < 4 && y < 4 {
                Rgba([1, 2, 3, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        img.save(&path).unwrap();

        center(&path).unwrap();
        let out = image::open(&path).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(opaque_bounds(&out), Some((8, 8, 4, 4)));
    }

    #[test]
    fn test_opaque_jpg_flattens_to_white() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("card.png");
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])).save(&path).unwrap();

        let dst = opaque_jpg(&path, false).unwrap();
        assert_eq!(dst, dir.path().join("card.jpg"));
        let out = image::open(&dst).unwrap().to_rgb8();
        assert!(out.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn test_clip_circle_clears_corners() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("portrait.png");
        let dst = dir.path().join("portrait-circle.png");
        RgbaImage::from_pixel(256, 256, Rgba([9, 9, 9, 255])).save(&src).unwrap();

        clip_circle(&src, &dst).unwrap();
        let out = image::open(&dst).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(10, 128)[3], 0);
        assert_eq!(out.get_pixel(128, 128)[3], 255);
        assert_eq!(out.get_pixel(30, 128)[3], 255);
        // dest-in keeps the color channels
        assert_eq!(out.get_pixel(0, 0).0[..3], [9, 9, 9]);
    }

    #[test]
    fn test_clip_circle_same_path_rejected() {
        let p = Path::new("a.png");
        assert!(matches!(clip_circle(p, p), Err(BuildError::SrcIsDst(_))));
    }

    #[test]
    fn test_tile_color_adjust_keeps_gray_neutral() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([128, 128, 128]));
        tile_color_adjust(&mut img);
        let p = img.get_pixel(0, 0).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        // 128 stays 128 under the contrast step, then brightens
        assert_eq!(p[0], 154);
    }

    #[test]
    fn test_adjust_tile_rejects_small_image() {
        let dir = TempDir::new().unwrap();
        let jpg = dir.path().join("tile-001.jpg");
        let blank = dir.path().join("blank.png");
        DynamicImage::ImageRgb8(RgbImage::new(100, 100)).save(&jpg).unwrap();
        RgbaImage::new(100, 100).save(&blank).unwrap();
        assert!(matches!(
            adjust_tile(&jpg, &blank),
            Err(BuildError::InvalidImage(_, _))
        ));
    }
}
