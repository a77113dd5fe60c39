//! Image compositing for textures: outline masks, clipping and tile adjustment.
//!
//! Every operation reads one file and writes a derived one. Grayscale masks
//! are `GrayImage`s where 255 means "on".

pub mod adjust;
pub mod blending;
pub mod mask;

use image::{imageops, DynamicImage, GrayImage, Luma, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::files;

pub use adjust::{adjust_tile, center, clip_circle, opaque_jpg};
pub use blending::BlendMode;
pub use mask::{
    inner_mask, outline_feathered, outline_feathered_no_center, outline_mask, outline_only,
};

/// Gaussian sigma of the generated outlines, in pixels.
pub const OUTLINE_WIDTH: f32 = 5.0;

/// Single-file operations exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageOp {
    Center,
    OpaqueJpg,
    OpaqueJpgGray,
    OutlineMask,
    OutlineFeathered,
    OutlineFeatheredNoCenter,
    OutlineOnly,
    InnerMask,
    /// Writes `<stem>-circle.png`.
    ClipCircle,
}

impl ImageOp {
    /// Run on `png`, returning the file written.
    pub fn apply(&self, png: &Path) -> Result<PathBuf> {
        match self {
            ImageOp::Center => center(png).map(|_| png.to_path_buf()),
            ImageOp::OpaqueJpg => opaque_jpg(png, false),
            ImageOp::OpaqueJpgGray => opaque_jpg(png, true),
            ImageOp::OutlineMask => outline_mask(png),
            ImageOp::OutlineFeathered => outline_feathered(png),
            ImageOp::OutlineFeatheredNoCenter => outline_feathered_no_center(png),
            ImageOp::OutlineOnly => outline_only(png),
            ImageOp::InnerMask => inner_mask(png),
            ImageOp::ClipCircle => {
                let dst = derive_output(png, "-circle.png")?;
                clip_circle(png, &dst)?;
                Ok(dst)
            }
        }
    }
}

pub fn open_rgba(path: &Path) -> Result<RgbaImage> {
    files::require_file(path)?;
    let img = image::open(path).map_err(|e| BuildError::image(path, e))?;
    Ok(img.to_rgba8())
}

/// Save with the format implied by the extension. JPEGs drop alpha.
pub fn save(img: DynamicImage, path: &Path) -> Result<()> {
    files::ensure_parent(path)?;
    let is_jpeg = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);
    let img = if is_jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };
    img.save(path).map_err(|e| BuildError::image(path, e))
}

/// `foo.png` → `foo<suffix>`. A non-`.png` input maps to itself and is rejected.
pub fn derive_output(src: &Path, suffix: &str) -> Result<PathBuf> {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dst = match name.strip_suffix(".png") {
        Some(stem) if !stem.is_empty() => src.with_file_name(format!("{}{}", stem, suffix)),
        _ => src.to_path_buf(),
    };
    ensure_distinct(src, &dst)?;
    Ok(dst)
}

pub fn ensure_distinct(src: &Path, dst: &Path) -> Result<()> {
    if src == dst {
        return Err(BuildError::SrcIsDst(src.to_path_buf()));
    }
    Ok(())
}

pub fn extract_alpha(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| Luma([img.get_pixel(x, y)[3]]))
}

pub fn blur(mask: &GrayImage, sigma: f32) -> GrayImage {
    imageops::blur(mask, sigma)
}

/// Values at or above `t` become 255, everything else 0.
pub fn threshold(mask: &GrayImage, t: u8) -> GrayImage {
    map_gray(mask, |v| if v >= t { 255 } else { 0 })
}

pub fn negate(mask: &GrayImage) -> GrayImage {
    map_gray(mask, |v| 255 - v)
}

fn map_gray(mask: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = mask.clone();
    for px in out.pixels_mut() {
        px[0] = f(px[0]);
    }
    out
}

/// An opaque `color` layer multiplied by `mask`.
pub fn tint(color: [u8; 3], mask: &GrayImage) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(
        mask.width(),
        mask.height(),
        image::Rgba([color[0], color[1], color[2], 255]),
    );
    let overlay = RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y)[0];
        image::Rgba([v, v, v, 255])
    });
    BlendMode::Multiply.blend_rgba(&mut out, &overlay);
    out
}
