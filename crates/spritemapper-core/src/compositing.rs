use image::{Rgba, RgbaImage};

/// Blit `src` into `canvas` with its top-left at `(dx, dy)`, optionally
/// rotated 90° clockwise, and optionally outline the blitted area in red.
///
/// Pixels falling outside the canvas are dropped.
pub fn blit_sprite(
    src: &RgbaImage,
    canvas: &mut RgbaImage,
    dx: u32,
    dy: u32,
    rotated: bool,
    outlines: bool,
) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    // rendered size
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        for xx in 0..rw {
            let (ix, iy) = if rotated {
                (yy, sh - 1 - xx)
            } else {
                (xx, yy)
            };
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(ix, iy));
            }
        }
    }

    if outlines && rw > 0 && rh > 0 {
        let red = Rgba([255, 0, 0, 255]);
        let mut put = |x: u32, y: u32| {
            if x < cw && y < ch {
                canvas.put_pixel(x, y, red);
            }
        };
        for xx in 0..rw {
            put(dx + xx, dy);
            put(dx + xx, dy + rh - 1);
        }
        for yy in 0..rh {
            put(dx, dy + yy);
            put(dx + rw - 1, dy + yy);
        }
    }
}
