use image::{GrayImage, Luma, RgbaImage};

/// Per-channel blend modes used by the mask compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Saturating sum.
    Add,
    /// `a * b / 255` on every channel, alpha included.
    Multiply,
    /// Keep the destination, scaled by the source alpha.
    DestIn,
}

impl BlendMode {
    /// Blends `src` onto `dst` and returns the result.
    pub fn blend_u8(&self, dst: &[u8], src: &[u8]) -> [u8; 4] {
        match self {
            BlendMode::Add => map_each(dst, src, |a, b| a.saturating_add(b)),
            BlendMode::Multiply => map_each(dst, src, mul),
            BlendMode::DestIn => [dst[0], dst[1], dst[2], mul(dst[3], src[3])],
        }
    }

    /// Blends `src` onto `dst` in place. Both images must be the same size.
    pub fn blend_rgba(&self, dst: &mut RgbaImage, src: &RgbaImage) {
        debug_assert_eq!(dst.dimensions(), src.dimensions());
        for (d, s) in dst.pixels_mut().zip(src.pixels()) {
            d.0 = self.blend_u8(&d.0, &s.0);
        }
    }

    /// Blends two grayscale masks of the same size.
    pub fn blend_gray(&self, a: &GrayImage, b: &GrayImage) -> GrayImage {
        debug_assert_eq!(a.dimensions(), b.dimensions());
        GrayImage::from_fn(a.width(), a.height(), |x, y| {
            let (pa, pb) = (a.get_pixel(x, y)[0], b.get_pixel(x, y)[0]);
            let v = match self {
                BlendMode::Add => pa.saturating_add(pb),
                BlendMode::Multiply | BlendMode::DestIn => mul(pa, pb),
            };
            Luma([v])
        })
    }
}

fn map_each(a: &[u8], b: &[u8], f: impl Fn(u8, u8) -> u8) -> [u8; 4] {
    [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2]), f(a[3], b[3])]
}

fn mul(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_saturates() {
        let out = BlendMode::Add.blend_u8(&[200, 10, 0, 255], &[100, 10, 0, 255]);
        assert_eq!(out, [255, 20, 0, 255]);
    }

    #[test]
    fn test_multiply_identity_and_zero() {
        let px = [255, 128, 7, 255];
        assert_eq!(BlendMode::Multiply.blend_u8(&px, &[255, 255, 255, 255]), px);
        assert_eq!(BlendMode::Multiply.blend_u8(&px, &[0, 0, 0, 255]), [0, 0, 0, 255]);
    }

    #[test]
    fn test_dest_in_keeps_color() {
        let out = BlendMode::DestIn.blend_u8(&[10, 20, 30, 255], &[0, 0, 0, 0]);
        assert_eq!(out, [10, 20, 30, 0]);
    }
}
