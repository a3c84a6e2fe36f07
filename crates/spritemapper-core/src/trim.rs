use crate::model::{Rect, Sprite};
use image::RgbaImage;
use std::sync::Arc;

/// Bounding box of the pixels with alpha above `threshold`, in image
/// coordinates. `None` when every pixel is at or below the threshold.
pub fn compute_trim_rect(rgba: &RgbaImage, threshold: u8) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    let opaque = |x: u32, y: u32| rgba.get_pixel(x, y)[3] > threshold;

    let x1 = (0..w).find(|&x| (0..h).any(|y| opaque(x, y)))?;
    let x2 = (x1..w).rev().find(|&x| (0..h).any(|y| opaque(x, y)))?;
    let y1 = (0..h).find(|&y| (x1..=x2).any(|x| opaque(x, y)))?;
    let y2 = (y1..h).rev().find(|&y| (x1..=x2).any(|x| opaque(x, y)))?;

    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}

/// Shrinks `sprite` to its opaque content.
///
/// Records the pre-trim size in `original_size` and the kept region in
/// `color_rect`. With `reserve_border` the region grows by one pixel to the
/// right and bottom, capped at the original size. A fully transparent
/// sprite ends up zero-sized. Sprites without pixels are left alone.
pub fn trim_sprite(sprite: &mut Sprite, threshold: u8, reserve_border: bool) {
    let Some(img) = sprite.image.clone() else {
        return;
    };
    let (w, h) = img.dimensions();
    sprite.original_size = (w, h);

    let Some(mut keep) = compute_trim_rect(&img, threshold) else {
        sprite.color_rect = Rect::default();
        sprite.rect.w = 0;
        sprite.rect.h = 0;
        sprite.image = Some(Arc::new(RgbaImage::new(0, 0)));
        return;
    };
    if reserve_border {
        keep.w = (keep.w + 1).min(w - keep.x);
        keep.h = (keep.h + 1).min(h - keep.y);
    }

    sprite.color_rect = keep;
    sprite.rect.w = keep.w;
    sprite.rect.h = keep.h;
    if keep != Rect::new(0, 0, w, h) {
        let cropped = image::imageops::crop_imm(&*img, keep.x, keep.y, keep.w, keep.h);
        sprite.image = Some(Arc::new(cropped.to_image()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(10, 8, Rgba([0, 0, 0, 0]));
        for y in 2..5 {
            for x in 3..7 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        img
    }

    #[test]
    fn finds_opaque_bounds() {
        assert_eq!(compute_trim_rect(&sample(), 0), Some(Rect::new(3, 2, 4, 3)));
    }

    #[test]
    fn threshold_ignores_faint_pixels() {
        let mut img = sample();
        img.put_pixel(0, 0, Rgba([0, 0, 0, 10]));
        assert_eq!(compute_trim_rect(&img, 0), Some(Rect::new(0, 0, 7, 5)));
        assert_eq!(compute_trim_rect(&img, 10), Some(Rect::new(3, 2, 4, 3)));
    }

    #[test]
    fn trim_crops_payload() {
        let mut s = Sprite::with_image("s", sample());
        trim_sprite(&mut s, 0, false);
        assert_eq!((s.w(), s.h()), (4, 3));
        assert_eq!(s.original_size, (10, 8));
        assert_eq!(s.color_rect, Rect::new(3, 2, 4, 3));
        assert!(s.is_trimmed());
        let img = s.image.as_ref().expect("payload");
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn reserve_border_is_capped() {
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([0, 0, 0, 0]));
        img.put_pixel(5, 5, Rgba([1, 1, 1, 255]));
        img.put_pixel(2, 3, Rgba([1, 1, 1, 255]));
        let mut s = Sprite::with_image("s", img);
        trim_sprite(&mut s, 0, true);
        assert_eq!(s.color_rect, Rect::new(2, 3, 4, 3));
    }

    #[test]
    fn transparent_sprite_collapses() {
        let mut s = Sprite::with_image("s", RgbaImage::new(5, 5));
        trim_sprite(&mut s, 0, false);
        assert!(s.is_empty());
        assert_eq!(s.color_rect, Rect::default());
        assert_eq!(s.original_size, (5, 5));
    }
}
