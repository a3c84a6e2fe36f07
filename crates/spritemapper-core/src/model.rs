use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    pub fn left(&self) -> u32 {
        self.x
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    pub fn top(&self) -> u32 {
        self.y
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Size-only test: true if a `w x h` box fits into `other`'s size, wherever it is.
    pub fn fits(&self, other: &Rect) -> bool {
        self.w <= other.w && self.h <= other.h
    }
    /// Open-interval overlap; rectangles sharing only an edge do not collide.
    pub fn collides(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
    /// Returns true if `other` is fully inside `self` (inclusive edges).
    pub fn contains(&self, other: &Rect) -> bool {
        self.left() <= other.left()
            && self.right() >= other.right()
            && self.top() <= other.top()
            && self.bottom() >= other.bottom()
    }
    /// Returns true if `self` is fully inside `other` (inclusive edges).
    pub fn inside(&self, other: &Rect) -> bool {
        other.contains(self)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({},{}, {},{})", self.x, self.y, self.w, self.h)
    }
}

/// Width and height of a page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An image fragment to be placed on a page.
///
/// Layout engines only touch `rect.x`, `rect.y`, `rotated` (together with the
/// `w`/`h` swap done by [`Sprite::rotate`]) and `page`. The trim pass changes
/// `rect.w`, `rect.h`, `color_rect` and the payload.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub name: String,
    /// Placement rectangle in page coordinates, post-rotation size.
    pub rect: Rect,
    pub rotated: bool,
    /// Opaque sub-rectangle within the original image.
    pub color_rect: Rect,
    /// Size of the original image before trimming.
    pub original_size: (u32, u32),
    /// Page the sprite was laid out on; `None` before layout.
    pub page: Option<usize>,
    /// Pixel payload. Shared between trial copies.
    pub image: Option<Arc<RgbaImage>>,
}

impl Sprite {
    /// A sprite without pixel payload (layout-only).
    pub fn new(name: impl Into<String>, w: u32, h: u32) -> Self {
        Self {
            name: name.into(),
            rect: Rect::new(0, 0, w, h),
            rotated: false,
            color_rect: Rect::new(0, 0, w, h),
            original_size: (w, h),
            page: None,
            image: None,
        }
    }

    pub fn with_image(name: impl Into<String>, image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        let mut sprite = Self::new(name, w, h);
        sprite.image = Some(Arc::new(image));
        sprite
    }

    pub fn w(&self) -> u32 {
        self.rect.w
    }
    pub fn h(&self) -> u32 {
        self.rect.h
    }
    pub fn right(&self) -> u32 {
        self.rect.right()
    }
    pub fn bottom(&self) -> u32 {
        self.rect.bottom()
    }
    pub fn area(&self) -> u64 {
        self.rect.area()
    }
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }
    pub fn fits(&self, space: &Rect) -> bool {
        self.rect.fits(space)
    }

    /// Turns the sprite 90 degrees: swaps width and height and toggles `rotated`.
    pub fn rotate(&mut self) -> &mut Self {
        std::mem::swap(&mut self.rect.w, &mut self.rect.h);
        self.rotated = !self.rotated;
        self
    }

    /// Moves the sprite to `(x, y)` on `page`.
    pub fn place(&mut self, x: u32, y: u32, page: usize) {
        self.rect.x = x;
        self.rect.y = y;
        self.page = Some(page);
    }

    /// True if the sprite lost transparent margins during trimming.
    pub fn is_trimmed(&self) -> bool {
        self.color_rect != Rect::new(0, 0, self.original_size.0, self.original_size.1)
    }
}

impl fmt::Display for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sprite({},{},{},{},{},{})",
            self.name,
            if self.rotated { "rotated" } else { "not rotated" },
            self.rect.x,
            self.rect.y,
            self.rect.w,
            self.rect.h
        )
    }
}

/// Tight bounding size of every page `0..page_count`.
pub fn page_dimensions(sprites: &[Sprite], page_count: usize) -> Vec<Size> {
    let mut dims = vec![Size::default(); page_count];
    for s in sprites {
        if let Some(d) = s.page.and_then(|p| dims.get_mut(p)) {
            d.width = d.width.max(s.right());
            d.height = d.height.max(s.bottom());
        }
    }
    dims
}

/// Sum of sprite areas.
pub fn collective_area(sprites: &[Sprite]) -> u64 {
    sprites.iter().map(Sprite::area).sum()
}

/// A placed frame within a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame<K = String> {
    /// Sprite name (e.g., relative file path).
    pub key: K,
    /// Placed rectangle within the page (post-rotation width/height, border included).
    pub frame: Rect,
    /// True if the frame was rotated 90° when placed.
    pub rotated: bool,
    /// True if the source was trimmed.
    pub trimmed: bool,
    /// Source sub-rect within the original image after trimming.
    pub source: Rect,
    /// Original (untrimmed) image size.
    pub source_size: (u32, u32),
}

/// A single atlas page (logical record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<K = String> {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame<K>>,
}

/// Atlas-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub app: String,
    pub version: String,
    pub format: String,
    pub power_of_two: bool,
    pub max_dim: (u32, u32),
    pub spacing: u32,
    pub border: u32,
    pub trimmed: bool,
    /// Engine that produced the layout, e.g. `MaxRects(BestFit)`.
    pub layouter: String,
}

/// Atlas of pages and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas<K = String> {
    pub pages: Vec<Page<K>>,
    pub meta: Meta,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_pages: usize,
    pub num_frames: usize,
    /// Sum of width * height over all pages.
    pub total_page_area: u64,
    /// Sum of frame width * height.
    pub used_frame_area: u64,
    /// used_frame_area / total_page_area (0.0 to 1.0).
    pub occupancy: f64,
    pub num_rotated: usize,
    pub num_trimmed: usize,
}

impl<K> Atlas<K> {
    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> PackStats {
        let mut num_frames = 0;
        let mut total_page_area = 0u64;
        let mut used_frame_area = 0u64;
        let mut num_rotated = 0;
        let mut num_trimmed = 0;

        for page in &self.pages {
            total_page_area += page.width as u64 * page.height as u64;
            for frame in &page.frames {
                num_frames += 1;
                used_frame_area += frame.frame.area();
                if frame.rotated {
                    num_rotated += 1;
                }
                if frame.trimmed {
                    num_trimmed += 1;
                }
            }
        }

        let occupancy = if total_page_area > 0 {
            used_frame_area as f64 / total_page_area as f64
        } else {
            0.0
        };

        PackStats {
            num_pages: self.pages.len(),
            num_frames,
            total_page_area,
            used_frame_area,
            occupancy,
            num_rotated,
            num_trimmed,
        }
    }
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Frames: {}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}, Trimmed: {}",
            self.num_pages,
            self.num_frames,
            self.occupancy * 100.0,
            self.total_page_area,
            self.used_frame_area,
            self.num_rotated,
            self.num_trimmed,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_page_area.saturating_sub(self.used_frame_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0 {
            (self.wasted_area() as f64 / self.total_page_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
