//! Chooser and splitter functions shared by the free-list engines.

use crate::config::{FreeSpaceChooser, SplitStrategy};
use crate::model::{Rect, Sprite};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of a guillotine cut.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Full-width bottom child, right child as tall as the sprite.
    Horizontal,
    /// Full-height right child, bottom child as wide as the sprite.
    Vertical,
}

/// Gaps left on the right and below after placing `sprite` into `space`,
/// in whichever orientation fits (unrotated first).
fn leftovers(space: &Rect, sprite: &Sprite) -> (u32, u32) {
    let (w, h) = if sprite.w() <= space.w && sprite.h() <= space.h {
        (sprite.w(), sprite.h())
    } else {
        (sprite.h(), sprite.w())
    };
    (space.w.saturating_sub(w), space.h.saturating_sub(h))
}

impl FreeSpaceChooser {
    /// Orders two candidate spaces for `sprite`; `Less` means `a` is preferred.
    pub fn compare(&self, a: &Rect, b: &Rect, sprite: &Sprite) -> Ordering {
        match self {
            FreeSpaceChooser::BestFit => {
                let fa = a.area().saturating_sub(sprite.area());
                let fb = b.area().saturating_sub(sprite.area());
                fa.cmp(&fb)
            }
            FreeSpaceChooser::BestShortSide => {
                let (aw, ah) = leftovers(a, sprite);
                let (bw, bh) = leftovers(b, sprite);
                aw.min(ah).cmp(&bw.min(bh))
            }
            FreeSpaceChooser::BestLongSide => {
                let (aw, ah) = leftovers(a, sprite);
                let (bw, bh) = leftovers(b, sprite);
                bw.max(bh).cmp(&aw.max(ah))
            }
            FreeSpaceChooser::TopLeft => a.y.cmp(&b.y).then(a.x.cmp(&b.x)),
        }
    }

    /// Index into `free` of the preferred space among `candidates`.
    ///
    /// Equivalent to a stable sort followed by taking the head: the first
    /// candidate wins ties.
    pub fn pick(&self, free: &[Rect], candidates: &[usize], sprite: &Sprite) -> Option<usize> {
        let mut best: Option<usize> = None;
        for &i in candidates {
            best = match best {
                Some(b) if self.compare(&free[i], &free[b], sprite) != Ordering::Less => Some(b),
                _ => Some(i),
            };
        }
        best
    }
}

/// The two children of a guillotine cut, `(right, bottom)`, possibly empty.
///
/// The sprite occupies the top-left corner of `space`; `sw`/`sh` is its
/// placed size. Each child starts `spacing` past the sprite, and the child
/// beside the sprite is only as long as the sprite, so the cut leaves a
/// `spacing` strip between the two siblings as well.
pub fn split_children(space: &Rect, sw: u32, sh: u32, spacing: u32, split: Split) -> (Rect, Rect) {
    let used_w = sw.saturating_add(spacing);
    let used_h = sh.saturating_add(spacing);
    let rest_w = space.w.saturating_sub(used_w);
    let rest_h = space.h.saturating_sub(used_h);
    let rx = space.x.saturating_add(used_w);
    let by = space.y.saturating_add(used_h);
    match split {
        Split::Horizontal => (
            Rect::new(rx, space.y, rest_w, sh.min(space.h)),
            Rect::new(space.x, by, space.w, rest_h),
        ),
        Split::Vertical => (
            Rect::new(rx, space.y, rest_w, space.h),
            Rect::new(space.x, by, sw.min(space.w), rest_h),
        ),
    }
}

fn area_difference(space: &Rect, sw: u32, sh: u32, spacing: u32, split: Split) -> u64 {
    let (a, b) = split_children(space, sw, sh, spacing, split);
    a.area().abs_diff(b.area())
}

impl SplitStrategy {
    /// Cut direction for `space` after `placed` went into its top-left corner.
    ///
    /// `Horizontal` means the full-width child is the bottom one. The axis
    /// rules compare the sides of `space`: `LongestAxis` cuts horizontally
    /// when the space is taller than wide, `ShortestAxis` when it is wider
    /// than tall. The leftover rules compare the gap below the sprite with
    /// the gap to its right: `LongestLeftoverAxis` cuts horizontally when the
    /// gap below is the larger one, `ShortestLeftoverAxis` when it is the
    /// smaller one. Ties cut vertically.
    pub fn choose(&self, space: &Rect, placed: &Rect, spacing: u32) -> Split {
        let (sw, sh) = (placed.w, placed.h);
        let horizontal_if = |cond: bool| {
            if cond {
                Split::Horizontal
            } else {
                Split::Vertical
            }
        };
        match self {
            SplitStrategy::LongestAxis => horizontal_if(space.h > space.w),
            SplitStrategy::ShortestAxis => horizontal_if(space.h < space.w),
            SplitStrategy::LongestLeftoverAxis => {
                let lw = space.w.saturating_sub(sw);
                let lh = space.h.saturating_sub(sh);
                horizontal_if(lh > lw)
            }
            SplitStrategy::ShortestLeftoverAxis => {
                let lw = space.w.saturating_sub(sw);
                let lh = space.h.saturating_sub(sh);
                horizontal_if(lh < lw)
            }
            SplitStrategy::MaximumAreaDifference => {
                let h = area_difference(space, sw, sh, spacing, Split::Horizontal);
                let v = area_difference(space, sw, sh, spacing, Split::Vertical);
                if v > h { Split::Vertical } else { Split::Horizontal }
            }
            SplitStrategy::MinimumAreaDifference => {
                let h = area_difference(space, sw, sh, spacing, Split::Horizontal);
                let v = area_difference(space, sw, sh, spacing, Split::Vertical);
                if v < h { Split::Vertical } else { Split::Horizontal }
            }
        }
    }
}
