use super::{SpriteLayouter, effective_height};
use crate::error::{Result, SpriteMapperError};
use crate::model::Sprite;

/// Row packer: sprites go left to right on a shelf; a new shelf starts below
/// the tallest sprite of the previous one.
///
/// A sprite wider than the page that cannot be rotated to fit is placed
/// anyway and overflows the right edge. Only the page height triggers a
/// retry on a fresh page.
#[derive(Debug, Clone, Default)]
pub struct ShelfLayouter;

impl ShelfLayouter {
    pub fn new() -> Self {
        Self
    }
}

impl SpriteLayouter for ShelfLayouter {
    fn layout(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &mut [Sprite],
    ) -> Result<usize> {
        if sprites.is_empty() {
            return Ok(0);
        }
        let max_h = effective_height(max_height);

        let mut x = 0u32;
        let mut y = 0u32;
        let mut next_y = 0u32;
        let mut page = 0usize;
        let mut on_page = 0usize;

        let mut i = 0;
        while i < sprites.len() {
            let s = &mut sprites[i];
            if s.is_empty() {
                s.place(0, 0, page);
                i += 1;
                continue;
            }
            let was_rotated = s.rotated;

            if x.saturating_add(s.w()) > max_width {
                if x.saturating_add(s.h()) <= max_width {
                    s.rotate();
                } else {
                    // close the shelf
                    x = 0;
                    y = next_y;
                    if s.w() > max_width && s.h() <= max_width {
                        s.rotate();
                    }
                }
            }

            if y.saturating_add(s.h()) > max_h {
                if on_page == 0 {
                    return Err(SpriteMapperError::NoFreeSpace {
                        name: s.name.clone(),
                        width: s.w(),
                        height: s.h(),
                        page,
                    });
                }
                if s.rotated != was_rotated {
                    s.rotate();
                }
                page += 1;
                x = 0;
                y = 0;
                next_y = 0;
                on_page = 0;
                continue;
            }

            s.place(x, y, page);
            x = s.right().saturating_add(spacing);
            next_y = next_y.max(s.bottom().saturating_add(spacing));
            on_page += 1;
            i += 1;
        }
        Ok(page + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_sprite_overflows_without_retry() {
        let mut sprites = vec![Sprite::new("wide", 30, 20)];
        let pages = ShelfLayouter.layout(10, 0, 0, &mut sprites).expect("layout");
        assert_eq!(pages, 1);
        assert_eq!((sprites[0].rect.x, sprites[0].rect.y), (0, 0));
        assert!(!sprites[0].rotated);
        assert!(sprites[0].right() > 10);
    }

    #[test]
    fn spacing_separates_shelves() {
        let mut sprites = vec![
            Sprite::new("a", 10, 10),
            Sprite::new("b", 10, 10),
            Sprite::new("c", 10, 10),
        ];
        let pages = ShelfLayouter.layout(25, 0, 2, &mut sprites).expect("layout");
        assert_eq!(pages, 1);
        assert_eq!((sprites[1].rect.x, sprites[1].rect.y), (12, 0));
        assert_eq!((sprites[2].rect.x, sprites[2].rect.y), (0, 12));
    }

    #[test]
    fn trailing_spacing_does_not_seal_the_page() {
        // "b" ends exactly on the page edge; only the gap after it would
        // overflow, so it stays on page 0.
        let mut sprites = vec![
            Sprite::new("a", 10, 10),
            Sprite::new("b", 10, 10),
            Sprite::new("c", 10, 10),
        ];
        let pages = ShelfLayouter.layout(10, 22, 2, &mut sprites).expect("layout");
        assert_eq!(pages, 2);
        assert_eq!((sprites[1].rect.x, sprites[1].rect.y, sprites[1].page), (0, 12, Some(0)));
        assert_eq!(sprites[1].bottom(), 22);
        assert_eq!((sprites[2].rect.x, sprites[2].rect.y, sprites[2].page), (0, 0, Some(1)));
    }

    #[test]
    fn retried_sprite_keeps_original_orientation() {
        // "b" is rotated to fit the first shelf's remaining width, but its
        // rotated height overflows; on the new page it starts unrotated.
        let mut sprites = vec![Sprite::new("a", 10, 10), Sprite::new("b", 20, 5)];
        let pages = ShelfLayouter.layout(20, 15, 0, &mut sprites).expect("layout");
        assert_eq!(pages, 2);
        assert_eq!(sprites[1].page, Some(1));
        assert!(!sprites[1].rotated);
        assert_eq!((sprites[1].w(), sprites[1].h()), (20, 5));
    }
}
