//! Flattening of RGBA mattes onto a solid background color
//!
//! Blending uses integer arithmetic with floor rounding:
//! `out = (bg * (255 - a) + fg * a) / 255`. Both ends are exact, so a fully
//! opaque pixel keeps the matte's color and a fully transparent one takes the
//! background color.

use crate::{
    config::BackgroundColor,
    error::Result,
    types::TransparencyChannel,
    utils::NumericValidator,
};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Composites provider mattes over solid colors
pub struct Compositor;

impl Compositor {
    /// Flatten a matte onto a solid background color
    ///
    /// Returns a new opaque raster with the matte's dimensions; the matte is
    /// left untouched.
    ///
    /// # Errors
    /// - `CompositeError::InvalidInput` for a zero-sized matte
    ///
    /// # Examples
    /// ```rust
    /// use image::{Rgba, RgbaImage};
    /// use matte_compositor::{BackgroundColor, Compositor};
    ///
    /// let matte = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 128]));
    /// let flat = Compositor::composite(&matte, BackgroundColor::black()).unwrap();
    /// assert_eq!(flat.get_pixel(0, 0).0, [100, 50, 25]);
    /// ```
    pub fn composite(matte: &RgbaImage, background: BackgroundColor) -> Result<RgbImage> {
        let (width, height) = matte.dimensions();
        NumericValidator::validate_dimensions(width, height)?;

        let backdrop = Self::solid_background(width, height, background);
        Ok(Self::blend_over(matte, &backdrop))
    }

    /// Flatten any decoded raster; 3-channel input counts as fully opaque
    pub fn composite_dynamic(image: &DynamicImage, background: BackgroundColor) -> Result<RgbImage> {
        Self::composite(&image.to_rgba8(), background)
    }

    /// Raster of the given size filled with one color
    #[must_use]
    pub fn solid_background(width: u32, height: u32, color: BackgroundColor) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color.channels()))
    }

    /// Transparency channel of a matte
    #[must_use]
    pub fn extract_transparency(matte: &RgbaImage) -> TransparencyChannel {
        TransparencyChannel::from_matte(matte)
    }

    /// Blend one channel value: `background` at alpha 0, `foreground` at 255
    #[must_use]
    pub fn blend_channel(background: u8, foreground: u8, alpha: u8) -> u8 {
        let a = u32::from(alpha);
        let value = (u32::from(background) * (255 - a) + u32::from(foreground) * a) / 255;
        value as u8
    }

    /// Blend one matte pixel over one background pixel
    #[must_use]
    pub fn blend_pixel(background: Rgb<u8>, matte: Rgba<u8>) -> Rgb<u8> {
        let Rgba([r, g, b, alpha]) = matte;
        let Rgb([br, bg, bb]) = background;
        Rgb([
            Self::blend_channel(br, r, alpha),
            Self::blend_channel(bg, g, alpha),
            Self::blend_channel(bb, b, alpha),
        ])
    }

    // Callers guarantee equal dimensions; `backdrop` is built from the matte's size.
    fn blend_over(matte: &RgbaImage, backdrop: &RgbImage) -> RgbImage {
        debug_assert_eq!(matte.dimensions(), backdrop.dimensions());

        let (width, height) = backdrop.dimensions();
        RgbImage::from_fn(width, height, |x, y| {
            Self::blend_pixel(*backdrop.get_pixel(x, y), *matte.get_pixel(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositeError;

    fn two_by_two_matte() -> RgbaImage {
        let alphas = [255u8, 0, 128, 64];
        RgbaImage::from_fn(2, 2, |x, y| Rgba([200, 100, 50, alphas[(y * 2 + x) as usize]]))
    }

    #[test]
    fn test_two_by_two_scenario_over_black() {
        let flat = Compositor::composite(&two_by_two_matte(), BackgroundColor::black()).unwrap();

        assert_eq!(flat.dimensions(), (2, 2));
        assert_eq!(flat.get_pixel(0, 0).0, [200, 100, 50]);
        assert_eq!(flat.get_pixel(1, 0).0, [0, 0, 0]);
        assert_eq!(flat.get_pixel(0, 1).0, [100, 50, 25]);
        assert_eq!(flat.get_pixel(1, 1).0, [50, 25, 12]);
    }

    #[test]
    fn test_opaque_pixels_keep_matte_color() {
        let background = BackgroundColor::new(255, 110, 196);
        let matte = RgbaImage::from_fn(7, 3, |x, y| Rgba([(x * 30) as u8, (y * 80) as u8, 9, 255]));
        let flat = Compositor::composite(&matte, background).unwrap();

        for (x, y, pixel) in flat.enumerate_pixels() {
            let source = matte.get_pixel(x, y);
            assert_eq!(pixel.0, [source[0], source[1], source[2]]);
        }
    }

    #[test]
    fn test_transparent_pixels_take_background() {
        let background = BackgroundColor::new(18, 52, 86);
        let matte = RgbaImage::from_pixel(4, 5, Rgba([250, 250, 250, 0]));
        let flat = Compositor::composite(&matte, background).unwrap();

        assert!(flat.pixels().all(|p| p.0 == background.channels()));
    }

    #[test]
    fn test_blend_channel_bounds_and_floor() {
        for value in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(Compositor::blend_channel(value, 77, 0), value);
            assert_eq!(Compositor::blend_channel(77, value, 255), value);
        }
        // 50 * 64 / 255 = 12.55, floored
        assert_eq!(Compositor::blend_channel(0, 50, 64), 12);
        // Blending a color with itself never drifts
        for alpha in 0..=255u8 {
            assert_eq!(Compositor::blend_channel(200, 200, alpha), 200);
        }
    }

    #[test]
    fn test_blend_stays_between_endpoints() {
        for alpha in (0..=255u8).step_by(17) {
            let out = Compositor::blend_channel(30, 220, alpha);
            assert!((30..=220).contains(&out));
        }
    }

    #[test]
    fn test_matte_is_not_modified() {
        let matte = two_by_two_matte();
        let before = matte.clone();
        let _ = Compositor::composite(&matte, BackgroundColor::white()).unwrap();
        assert_eq!(matte, before);
    }

    #[test]
    fn test_zero_sized_matte_is_rejected() {
        let matte = RgbaImage::new(0, 3);
        let err = Compositor::composite(&matte, BackgroundColor::black()).unwrap_err();
        assert!(matches!(err, CompositeError::InvalidInput(_)));
    }

    #[test]
    fn test_composite_dynamic_rgb_is_opaque() {
        let rgb = RgbImage::from_pixel(2, 2, Rgb([9, 8, 7]));
        let flat =
            Compositor::composite_dynamic(&DynamicImage::ImageRgb8(rgb.clone()), BackgroundColor::white())
                .unwrap();
        assert_eq!(flat, rgb);
    }

    #[test]
    fn test_solid_background_and_transparency() {
        let solid = Compositor::solid_background(3, 1, BackgroundColor::new(1, 2, 3));
        assert!(solid.pixels().all(|p| p.0 == [1, 2, 3]));

        let channel = Compositor::extract_transparency(&two_by_two_matte());
        assert_eq!(channel.as_raw(), &[255, 0, 128, 64]);
    }
}
