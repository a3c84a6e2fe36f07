use super::heuristics::split_children;
use super::{SpriteLayouter, choose_space, effective_height, paginate};
use crate::config::{FreeSpaceChooser, SplitStrategy};
use crate::error::Result;
use crate::model::{Rect, Sprite};

/// Guillotine packer: keeps a list of disjoint free rectangles. The chosen
/// rectangle is cut in two after each placement; sprites that fit nowhere
/// wait for the next page.
#[derive(Debug, Clone)]
pub struct GuillotineLayouter {
    chooser: FreeSpaceChooser,
    splitter: SplitStrategy,
}

impl GuillotineLayouter {
    pub fn new(chooser: FreeSpaceChooser, splitter: SplitStrategy) -> Self {
        Self { chooser, splitter }
    }

    pub fn chooser(&self) -> FreeSpaceChooser {
        self.chooser
    }

    pub fn splitter(&self) -> SplitStrategy {
        self.splitter
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
            let s = &mut sprites[i];
            let space = free.remove(idx);
            if !s.fits(&space) {
                s.rotate();
            }
            s.place(space.x, space.y, page);

            let split = self.splitter.choose(&space, &s.rect, spacing);
            let (right, bottom) = split_children(&space, s.w(), s.h(), spacing, split);
            for child in [right, bottom] {
                if !child.is_empty() {
                    free.push(child);
                }
            }
        }
        deferred
    }
}

impl SpriteLayouter for GuillotineLayouter {
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
    fn children_never_overlap_the_placed_sprite() {
        let mut l = GuillotineLayouter::new(FreeSpaceChooser::BestFit, SplitStrategy::LongestAxis);
        let mut sprites = vec![
            Sprite::new("a", 30, 10),
            Sprite::new("b", 30, 10),
            Sprite::new("c", 10, 10),
        ];
        let pages = l.layout(40, 20, 0, &mut sprites).expect("layout");
        assert_eq!(pages, 1);
        for i in 0..sprites.len() {
            for j in i + 1..sprites.len() {
                assert!(!sprites[i].rect.collides(&sprites[j].rect));
            }
        }
    }

    #[test]
    fn siblings_keep_spacing_apart() {
        // "a" leaves a short right child above a full-width bottom child;
        // "b" fills the right child's width, "c" the bottom child's.
        let mut l = GuillotineLayouter::new(FreeSpaceChooser::TopLeft, SplitStrategy::LongestAxis);
        let mut sprites = vec![
            Sprite::new("a", 10, 10),
            Sprite::new("b", 88, 12),
            Sprite::new("c", 100, 10),
        ];
        let pages = l.layout(100, 120, 2, &mut sprites).expect("layout");
        assert_eq!(pages, 1);
        for i in 0..sprites.len() {
            for j in i + 1..sprites.len() {
                let (a, b) = (&sprites[i].rect, &sprites[j].rect);
                let apart = a.right() + 2 <= b.left()
                    || b.right() + 2 <= a.left()
                    || a.bottom() + 2 <= b.top()
                    || b.bottom() + 2 <= a.top();
                assert!(apart, "{} vs {}", sprites[i], sprites[j]);
            }
        }
    }

    #[test]
    fn unfitting_sprite_is_deferred() {
        let mut l = GuillotineLayouter::new(FreeSpaceChooser::TopLeft, SplitStrategy::ShortestAxis);
        let mut sprites = vec![Sprite::new("a", 10, 10), Sprite::new("b", 10, 10)];
        let pages = l.layout(10, 10, 0, &mut sprites).expect("layout");
        assert_eq!(pages, 2);
        assert_eq!(sprites[0].page, Some(0));
        assert_eq!(sprites[1].page, Some(1));
        assert_eq!((sprites[1].rect.x, sprites[1].rect.y), (0, 0));
    }
}
