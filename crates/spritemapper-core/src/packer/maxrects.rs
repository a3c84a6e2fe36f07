use super::{SpriteLayouter, choose_space, effective_height, paginate};
use crate::config::FreeSpaceChooser;
use crate::error::Result;
use crate::model::{Rect, Sprite};

/// MaxRects packer: tracks maximal, possibly overlapping free rectangles.
#[derive(Debug, Clone)]
pub struct MaxRectsLayouter {
    chooser: FreeSpaceChooser,
}

impl MaxRectsLayouter {
    pub fn new(chooser: FreeSpaceChooser) -> Self {
        Self { chooser }
    }

    pub fn chooser(&self) -> FreeSpaceChooser {
        self.chooser
    }

    fn layout_page(
        &self,
        sprites: &mut [Sprite],
        pending: &[usize],
        page: usize,
        page_rect: Rect,
        spacing: u32,
    ) -> Vec<usize> {
        let mut free = vec![page_rect];
        let mut deferred = Vec::new();
        for &i in pending {
            if sprites[i].is_empty() {
                sprites[i].place(0, 0, page);
                continue;
            }
            let Some(idx) = choose_space(self.chooser, &free, &sprites[i]) else {
                deferred.push(i);
                continue;
            };
            let space = free[idx];
            let s = &mut sprites[i];
            if !s.fits(&space) {
                s.rotate();
            }
            s.place(space.x, space.y, page);
            free = split_free_list(free, &s.rect, spacing);
            prune_free_list(&mut free);
        }
        deferred
    }
}

/// Keep-out box around a placed sprite, signed so it may leave the page.
#[derive(Debug, Clone, Copy)]
struct KeepOut {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl KeepOut {
    fn around(r: &Rect, spacing: u32) -> Self {
        let sp = spacing as i64;
        Self {
            left: r.left() as i64 - sp,
            top: r.top() as i64 - sp,
            right: r.right() as i64 + sp,
            bottom: r.bottom() as i64 + sp,
        }
    }

    fn collides(&self, r: &Rect) -> bool {
        self.right > r.left() as i64
            && self.left < r.right() as i64
            && self.bottom > r.top() as i64
            && self.top < r.bottom() as i64
    }
}

/// Replaces every free rectangle touching the keep-out box with its slices
/// north, south, east and west of it.
fn split_free_list(free: Vec<Rect>, placed: &Rect, spacing: u32) -> Vec<Rect> {
    let k = KeepOut::around(placed, spacing);
    let mut out = Vec::with_capacity(free.len() + 4);
    for fr in free {
        if !k.collides(&fr) {
            out.push(fr);
            continue;
        }
        let (left, top) = (fr.left() as i64, fr.top() as i64);
        let (right, bottom) = (fr.right() as i64, fr.bottom() as i64);
        // North
        if k.top > top {
            out.push(Rect::new(fr.x, fr.y, fr.w, (k.top - top) as u32));
        }
        // South
        if k.bottom < bottom {
            out.push(Rect::new(fr.x, k.bottom as u32, fr.w, (bottom - k.bottom) as u32));
        }
        // East
        if k.right < right {
            out.push(Rect::new(k.right as u32, fr.y, (right - k.right) as u32, fr.h));
        }
        // West
        if k.left > left {
            out.push(Rect::new(fr.x, fr.y, (k.left - left) as u32, fr.h));
        }
    }
    out
}

/// Drops every free rectangle inside another; of two identical ones the
/// first survives.
fn prune_free_list(free: &mut Vec<Rect>) {
    let mut i = 0;
    while i < free.len() {
        let a = free[i];
        let mut j = i + 1;
        let mut remove_i = false;
        while j < free.len() {
            let b = free[j];
            if b.inside(&a) {
                free.remove(j);
                continue;
            }
            if a.inside(&b) {
                remove_i = true;
                break;
            }
            j += 1;
        }
        if remove_i {
            free.remove(i);
        } else {
            i += 1;
        }
    }
}

impl SpriteLayouter for MaxRectsLayouter {
    fn layout(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &mut [Sprite],
    ) -> Result<usize> {
        let page_rect = Rect::new(0, 0, max_width, effective_height(max_height));
        paginate(sprites, |sprites, pending, page| {
            self.layout_page(sprites, pending, page, page_rect, spacing)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_produces_maximal_slices() {
        let free = vec![Rect::new(0, 0, 100, 100)];
        let out = split_free_list(free, &Rect::new(40, 40, 20, 20), 0);
        assert_eq!(
            out,
            vec![
                Rect::new(0, 0, 100, 40),
                Rect::new(0, 60, 100, 40),
                Rect::new(60, 0, 40, 100),
                Rect::new(0, 0, 40, 100),
            ]
        );
    }

    #[test]
    fn split_honours_spacing_on_all_sides() {
        let free = vec![Rect::new(0, 0, 100, 100)];
        let out = split_free_list(free, &Rect::new(40, 40, 20, 20), 5);
        assert!(out.contains(&Rect::new(0, 0, 100, 35)));
        assert!(out.contains(&Rect::new(0, 65, 100, 35)));
        assert!(out.contains(&Rect::new(65, 0, 35, 100)));
        assert!(out.contains(&Rect::new(0, 0, 35, 100)));
    }

    #[test]
    fn corner_placement_drops_empty_slices() {
        let free = vec![Rect::new(0, 0, 50, 50)];
        let out = split_free_list(free, &Rect::new(0, 0, 10, 10), 2);
        assert_eq!(out, vec![Rect::new(0, 12, 50, 38), Rect::new(12, 0, 38, 50)]);
    }

    #[test]
    fn prune_removes_contained_and_keeps_first_duplicate() {
        let mut free = vec![
            Rect::new(0, 0, 10, 10),
            Rect::new(2, 2, 3, 3),
            Rect::new(0, 0, 10, 10),
            Rect::new(20, 0, 5, 5),
        ];
        prune_free_list(&mut free);
        assert_eq!(free, vec![Rect::new(0, 0, 10, 10), Rect::new(20, 0, 5, 5)]);
    }
}
