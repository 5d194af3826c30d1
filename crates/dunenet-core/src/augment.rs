//! Joint geometric augmentation of image/label pairs, plus image-only
//! brightness jitter.

use image::imageops;
use image::{GrayImage, ImageBuffer, Pixel, RgbImage};
use rand::Rng;

use crate::error::{Result, TerrainError};

/// Brightness factors are drawn from this range.
pub const BRIGHTNESS_RANGE: std::ops::Range<f32> = 0.85..1.15;

/// One recorded sequence of geometric choices: horizontal flip, vertical
/// flip, then `quarter_turns · 90°` counter-clockwise rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// 0..=3
    pub quarter_turns: u8,
}

impl Geometry {
    /// Draw flips with probability 0.5 each and a uniform turn count.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let flip_horizontal = rng.gen_bool(0.5);
        let flip_vertical = rng.gen_bool(0.5);
        let quarter_turns = rng.gen_range(0..4u8);
        Self { flip_horizontal, flip_vertical, quarter_turns }
    }

    /// Apply this sequence to any raster.
    pub fn apply<P>(&self, img: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>>
    where
        P: Pixel + 'static,
    {
        let mut out = img.clone();
        if self.flip_horizontal {
            out = imageops::flip_horizontal(&out);
        }
        if self.flip_vertical {
            out = imageops::flip_vertical(&out);
        }
        match self.quarter_turns % 4 {
            1 => imageops::rotate270(&out),
            2 => imageops::rotate180(&out),
            3 => imageops::rotate90(&out),
            _ => out,
        }
    }
}

/// Scale every channel by `factor`, clamping to the byte range.
pub fn scale_brightness(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for ch in out.iter_mut() {
        *ch = (*ch as f32 * factor).clamp(0.0, 255.0) as u8;
    }
    out
}

/// Apply recorded choices to a pair. The label never sees the brightness
/// step.
pub fn augment_with(
    image: &RgbImage,
    label: &GrayImage,
    geometry: Geometry,
    brightness: f32,
) -> Result<(RgbImage, GrayImage)> {
    if image.dimensions() != label.dimensions() {
        let (image_width, image_height) = image.dimensions();
        let (label_width, label_height) = label.dimensions();
        return Err(TerrainError::ShapeMismatch { image_width, image_height, label_width, label_height });
    }
    let image = scale_brightness(&geometry.apply(image), brightness);
    let label = geometry.apply(label);
    Ok((image, label))
}

/// Random flips, quarter-turn rotation and brightness jitter, drawn from
/// `rng` in that order.
pub fn augment<R: Rng + ?Sized>(
    image: &RgbImage,
    label: &GrayImage,
    rng: &mut R,
) -> Result<(RgbImage, GrayImage)> {
    let geometry = Geometry::sample(rng);
    let brightness = rng.gen_range(BRIGHTNESS_RANGE);
    augment_with(image, label, geometry, brightness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 3×2 label with distinct values, image encoding the same value.
    fn pair() -> (RgbImage, GrayImage) {
        let label = GrayImage::from_fn(3, 2, |x, y| Luma([(y * 3 + x) as u8]));
        let image = RgbImage::from_fn(3, 2, |x, y| {
            let v = (y * 3 + x) as u8 * 20;
            Rgb([v, v, v])
        });
        (image, label)
    }

    #[test]
    fn counter_clockwise_quarter_turn() {
        // 0 1 2        2 5
        // 3 4 5   →    1 4
        //              0 3
        let (_, label) = pair();
        let g = Geometry { quarter_turns: 1, ..Geometry::default() };
        let out = g.apply(&label);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.as_raw(), &vec![2, 5, 1, 4, 0, 3]);
    }

    #[test]
    fn flips_mirror_axes() {
        let (_, label) = pair();
        let h = Geometry { flip_horizontal: true, ..Geometry::default() }.apply(&label);
        assert_eq!(h.as_raw(), &vec![2, 1, 0, 5, 4, 3]);
        let v = Geometry { flip_vertical: true, ..Geometry::default() }.apply(&label);
        assert_eq!(v.as_raw(), &vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn label_matches_direct_geometry_for_every_sequence() {
        let (image, label) = pair();
        for bits in 0..16u8 {
            let g = Geometry {
                flip_horizontal: bits & 1 != 0,
                flip_vertical: bits & 2 != 0,
                quarter_turns: bits >> 2,
            };
            let (img2, lbl2) = augment_with(&image, &label, g, 1.1).unwrap();
            assert_eq!(lbl2, g.apply(&label), "sequence {g:?}");
            // Image and label moved together: pixel value still encodes the label.
            for (p, l) in img2.pixels().zip(lbl2.pixels()) {
                assert_eq!(p.0[0], ((l.0[0] as f32 * 20.0) * 1.1) as u8);
            }
        }
    }

    #[test]
    fn random_augment_keeps_alignment() {
        let (image, label) = pair();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..32 {
            let (img2, lbl2) = augment(&image, &label, &mut rng).unwrap();
            assert_eq!(img2.dimensions(), lbl2.dimensions());
            let mut values: Vec<u8> = lbl2.as_raw().clone();
            values.sort_unstable();
            assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn replaying_the_rng_replays_the_sequence() {
        let (image, label) = pair();
        let mut a = ChaCha8Rng::seed_from_u64(4);
        let mut b = ChaCha8Rng::seed_from_u64(4);
        let (_, lbl) = augment(&image, &label, &mut a).unwrap();
        let g = Geometry::sample(&mut b);
        assert_eq!(lbl, g.apply(&label));
    }

    #[test]
    fn brightness_clamps_to_byte_range() {
        let img = RgbImage::from_pixel(1, 1, Rgb([250, 100, 0]));
        assert_eq!(scale_brightness(&img, 1.5).get_pixel(0, 0).0, [255, 150, 0]);
    }

    #[test]
    fn mismatched_shapes_fail_fast() {
        let image = RgbImage::new(4, 4);
        let label = GrayImage::new(4, 3);
        assert_eq!(
            augment_with(&image, &label, Geometry::default(), 1.0).unwrap_err(),
            TerrainError::ShapeMismatch { image_width: 4, image_height: 4, label_width: 4, label_height: 3 }
        );
    }
}
