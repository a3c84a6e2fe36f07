use crate::error::Result;
use crate::model::{Rect, Sprite};
use std::fmt;

pub mod guillotine;
pub mod heuristics;
pub mod maxrects;
pub mod optimal;
pub mod registry;
pub mod shelf;

pub use guillotine::GuillotineLayouter;
pub use maxrects::MaxRectsLayouter;
pub use optimal::{LayoutScore, OptimalLayouter, to_lower_pot, to_upper_pot};
pub use shelf::ShelfLayouter;

/// Page height used when the caller passes `max_height == 0`.
pub const UNBOUNDED_HEIGHT: u32 = 1 << 30;

/// A layouter assigns `x`, `y`, `rotated` and `page` to every sprite.
///
/// `max_height == 0` means unbounded. Returns the number of pages used;
/// `NoFreeSpace` when a sprite cannot be placed on an otherwise empty page.
pub trait SpriteLayouter {
    fn layout(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &mut [Sprite],
    ) -> Result<usize>;
}

/// Closed set of layout engines.
#[derive(Debug, Clone)]
pub enum LayoutEngine {
    Shelf(ShelfLayouter),
    Guillotine(GuillotineLayouter),
    MaxRects(MaxRectsLayouter),
    Optimal(OptimalLayouter),
}

impl LayoutEngine {
    /// The engine that produced the last layout; for a selector this is the
    /// innermost winner.
    pub fn resolved(&self) -> &LayoutEngine {
        match self {
            LayoutEngine::Optimal(o) => match o.last_used() {
                Some(inner) => inner.resolved(),
                None => self,
            },
            _ => self,
        }
    }
}

impl SpriteLayouter for LayoutEngine {
    fn layout(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &mut [Sprite],
    ) -> Result<usize> {
        match self {
            LayoutEngine::Shelf(l) => l.layout(max_width, max_height, spacing, sprites),
            LayoutEngine::Guillotine(l) => l.layout(max_width, max_height, spacing, sprites),
            LayoutEngine::MaxRects(l) => l.layout(max_width, max_height, spacing, sprites),
            LayoutEngine::Optimal(l) => l.layout(max_width, max_height, spacing, sprites),
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutEngine::Shelf(_) => f.write_str("Shelf"),
            LayoutEngine::Guillotine(l) => {
                write!(f, "Guillotine({}, {})", l.chooser(), l.splitter())
            }
            LayoutEngine::MaxRects(l) => write!(f, "MaxRects({})", l.chooser()),
            LayoutEngine::Optimal(l) => write!(f, "Optimal[{}]", l.len()),
        }
    }
}

impl From<ShelfLayouter> for LayoutEngine {
    fn from(l: ShelfLayouter) -> Self {
        LayoutEngine::Shelf(l)
    }
}
impl From<GuillotineLayouter> for LayoutEngine {
    fn from(l: GuillotineLayouter) -> Self {
        LayoutEngine::Guillotine(l)
    }
}
impl From<MaxRectsLayouter> for LayoutEngine {
    fn from(l: MaxRectsLayouter) -> Self {
        LayoutEngine::MaxRects(l)
    }
}
impl From<OptimalLayouter> for LayoutEngine {
    fn from(l: OptimalLayouter) -> Self {
        LayoutEngine::Optimal(l)
    }
}

pub(crate) fn effective_height(max_height: u32) -> u32 {
    if max_height == 0 {
        UNBOUNDED_HEIGHT
    } else {
        max_height
    }
}

/// True if the sprite fits `space` unrotated or rotated.
pub(crate) fn fits_any(sprite: &Sprite, space: &Rect) -> bool {
    let (w, h) = (sprite.w(), sprite.h());
    (w <= space.w && h <= space.h) || (h <= space.w && w <= space.h)
}

/// Index of the free rectangle `chooser` prefers among those `sprite` fits.
pub(crate) fn choose_space(
    chooser: crate::config::FreeSpaceChooser,
    free: &[Rect],
    sprite: &Sprite,
) -> Option<usize> {
    let candidates: Vec<usize> = free
        .iter()
        .enumerate()
        .filter(|(_, r)| fits_any(sprite, r))
        .map(|(i, _)| i)
        .collect();
    chooser.pick(free, &candidates, sprite)
}

/// Shared page loop of the free-list engines: place what fits, defer the
/// rest to the next page, fail when a page places nothing.
///
/// `place` runs one page; it gets the indices still waiting and returns
/// those it could not place.
pub(crate) fn paginate<F>(sprites: &mut [Sprite], mut place: F) -> Result<usize>
where
    F: FnMut(&mut [Sprite], &[usize], usize) -> Vec<usize>,
{
    let mut pending: Vec<usize> = (0..sprites.len()).collect();
    let mut page = 0usize;
    while !pending.is_empty() {
        let deferred = place(sprites, &pending, page);
        if deferred.len() == pending.len() {
            let s = &sprites[deferred[0]];
            return Err(crate::error::SpriteMapperError::NoFreeSpace {
                name: s.name.clone(),
                width: s.w(),
                height: s.h(),
                page,
            });
        }
        pending = deferred;
        page += 1;
    }
    Ok(page)
}
