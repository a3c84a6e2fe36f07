use crate::compositing::blit_sprite;
use crate::config::{MapperConfig, SortOrder};
use crate::error::{Result, SpriteMapperError};
use crate::model::{Atlas, Frame, Meta, PackStats, Page, Rect, Size, Sprite, page_dimensions};
use crate::packer::{LayoutEngine, OptimalLayouter, SpriteLayouter, to_upper_pot};
use crate::trim::trim_sprite;
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info, instrument};

/// In-memory image to map (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Output RGBA page and its logical page record.
pub struct OutputPage {
    pub page: Page,
    pub rgba: RgbaImage,
}

/// Output of a mapping run: atlas metadata and RGBA pages.
pub struct MapOutput {
    pub atlas: Atlas,
    pub pages: Vec<OutputPage>,
}

impl MapOutput {
    /// Convenience for `atlas.stats()`.
    pub fn stats(&self) -> PackStats {
        self.atlas.stats()
    }
}

/// Stable sort used before layout. Ties fall back to the sprite name.
pub fn sort_sprites(sprites: &mut [Sprite], order: &SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::NameAsc => sprites.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::AreaDesc => {
            sprites.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| a.name.cmp(&b.name)))
        }
        SortOrder::MaxSideDesc => sprites.sort_by(|a, b| {
            b.w()
                .max(b.h())
                .cmp(&a.w().max(a.h()))
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortOrder::HeightDesc => {
            sprites.sort_by(|a, b| b.h().cmp(&a.h()).then_with(|| a.name.cmp(&b.name)))
        }
        SortOrder::WidthDesc => {
            sprites.sort_by(|a, b| b.w().cmp(&a.w()).then_with(|| a.name.cmp(&b.name)))
        }
    }
}

/// Drives one sprite sheet: preprocessing, layout and the derived outputs.
#[derive(Debug)]
pub struct SpriteMapper {
    sprites: Vec<Sprite>,
    cfg: MapperConfig,
    layouter: OptimalLayouter,
    page_count: usize,
    prepared: bool,
}

impl SpriteMapper {
    pub fn new(sprites: Vec<Sprite>, cfg: MapperConfig) -> Result<Self> {
        cfg.validate()?;
        let layouter = OptimalLayouter::for_families(&cfg.algorithms)
            .with_border(cfg.border)
            .with_power_of_two(cfg.power_of_two)
            .with_parallel(cfg.parallel);
        Ok(Self {
            sprites,
            cfg,
            layouter,
            page_count: 0,
            prepared: false,
        })
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn config(&self) -> &MapperConfig {
        &self.cfg
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Engine that produced the current layout.
    pub fn last_used(&self) -> Option<&LayoutEngine> {
        self.layouter.last_used().map(LayoutEngine::resolved)
    }

    fn prepare(&mut self) {
        if self.prepared {
            return;
        }
        if self.cfg.trim {
            for s in &mut self.sprites {
                trim_sprite(s, self.cfg.trim_threshold, self.cfg.reserve_border);
            }
        }
        if self.cfg.landscape {
            for s in &mut self.sprites {
                if s.h() > s.w() {
                    s.rotate();
                }
            }
        }
        sort_sprites(&mut self.sprites, &self.cfg.sort_order);
        self.prepared = true;
    }

    /// Trims, orients and sorts the sprites (once), then lays them out.
    ///
    /// Returns the page count; `OutOfSpace` if no engine could place them.
    #[instrument(skip_all, fields(sprites = self.sprites.len()))]
    pub fn do_layout(&mut self) -> Result<usize> {
        self.prepare();
        if self.sprites.is_empty() {
            self.page_count = 0;
            return Ok(0);
        }
        let pages = self.layouter.layout(
            self.cfg.max_width,
            self.cfg.max_height,
            self.cfg.spacing,
            &mut self.sprites,
        )?;
        self.page_count = pages;
        if pages == 0 {
            return Err(SpriteMapperError::OutOfSpace {
                total: self.sprites.len(),
            });
        }
        if let Some(engine) = self.last_used() {
            info!(pages, engine = %engine, "layout done");
        }
        Ok(pages)
    }

    /// Tight extents of each page, border excluded.
    pub fn layout_dimensions(&self) -> Result<Vec<Size>> {
        if self.page_count == 0 {
            return Err(SpriteMapperError::OutOfSpace {
                total: self.sprites.len(),
            });
        }
        Ok(page_dimensions(&self.sprites, self.page_count))
    }

    /// Final texture size of each page: extents plus border, POT-ceiled when enabled.
    pub fn page_sizes(&self) -> Result<Vec<Size>> {
        let pad = self.cfg.border.saturating_mul(2);
        let pot = self.cfg.power_of_two;
        let round = |v: u32| if pot { to_upper_pot(v) } else { v };
        Ok(self
            .layout_dimensions()?
            .into_iter()
            .map(|d| Size::new(round(d.width + pad), round(d.height + pad)))
            .collect())
    }

    /// Renders every page. Sprites without pixels are skipped.
    pub fn compose_pages(&self) -> Result<Vec<RgbaImage>> {
        let sizes = self.page_sizes()?;
        let mut canvases: Vec<RgbaImage> = sizes
            .iter()
            .map(|s| RgbaImage::new(s.width, s.height))
            .collect();
        let b = self.cfg.border;
        for s in &self.sprites {
            let (Some(page), Some(img)) = (s.page, s.image.as_ref()) else {
                continue;
            };
            if s.is_empty() {
                continue;
            }
            if let Some(canvas) = canvases.get_mut(page) {
                blit_sprite(
                    img,
                    canvas,
                    s.rect.x + b,
                    s.rect.y + b,
                    s.rotated,
                    self.cfg.draw_frames,
                );
            }
        }
        debug!(pages = canvases.len(), "composed pages");
        Ok(canvases)
    }

    /// Serializable description of the layout. Frame positions include the border.
    pub fn to_atlas(&self) -> Result<Atlas> {
        let sizes = self.page_sizes()?;
        let b = self.cfg.border;
        let mut pages: Vec<Page> = sizes
            .iter()
            .enumerate()
            .map(|(id, s)| Page {
                id,
                width: s.width,
                height: s.height,
                frames: Vec::new(),
            })
            .collect();
        for s in &self.sprites {
            let Some(page) = s.page.and_then(|p| pages.get_mut(p)) else {
                continue;
            };
            page.frames.push(Frame {
                key: s.name.clone(),
                frame: Rect::new(s.rect.x + b, s.rect.y + b, s.w(), s.h()),
                rotated: s.rotated,
                trimmed: s.is_trimmed(),
                source: s.color_rect,
                source_size: s.original_size,
            });
        }
        let meta = Meta {
            app: "spritemapper".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            format: "RGBA8888".into(),
            power_of_two: self.cfg.power_of_two,
            max_dim: (self.cfg.max_width, self.cfg.max_height),
            spacing: self.cfg.spacing,
            border: self.cfg.border,
            trimmed: self.cfg.trim,
            layouter: self
                .last_used()
                .map_or_else(|| "none".to_string(), |e| e.to_string()),
        };
        Ok(Atlas { pages, meta })
    }
}

/// Maps decoded images into composed pages plus metadata.
///
/// Notes:
/// - Sorting is stable; equal keys keep input order after the name tie-break.
/// - Every family in `cfg.algorithms` is tried; the best layout wins.
#[instrument(skip_all)]
pub fn map_images(inputs: Vec<InputImage>, cfg: MapperConfig) -> Result<MapOutput> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(SpriteMapperError::Empty);
    }
    let sprites = inputs
        .into_iter()
        .map(|i| Sprite::with_image(i.key, i.image.to_rgba8()))
        .collect();
    let mut mapper = SpriteMapper::new(sprites, cfg)?;
    mapper.do_layout()?;
    let atlas = mapper.to_atlas()?;
    let pages = atlas
        .pages
        .iter()
        .cloned()
        .zip(mapper.compose_pages()?)
        .map(|(page, rgba)| OutputPage { page, rgba })
        .collect();
    Ok(MapOutput { atlas, pages })
}

/// Same preprocessing and layout as [`map_images`] but skips compositing.
#[instrument(skip_all)]
pub fn layout_images(inputs: Vec<InputImage>, cfg: MapperConfig) -> Result<Atlas> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(SpriteMapperError::Empty);
    }
    let sprites = inputs
        .into_iter()
        .map(|i| Sprite::with_image(i.key, i.image.to_rgba8()))
        .collect();
    let mut mapper = SpriteMapper::new(sprites, cfg)?;
    mapper.do_layout()?;
    mapper.to_atlas()
}

/// Lays out sizes without pixel data. Inputs are `(key, width, height)`;
/// trimming does not apply.
#[instrument(skip_all)]
pub fn map_layout<K: Into<String>>(inputs: Vec<(K, u32, u32)>, cfg: MapperConfig) -> Result<Atlas> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(SpriteMapperError::Empty);
    }
    let sprites = inputs
        .into_iter()
        .map(|(k, w, h)| Sprite::new(k, w, h))
        .collect();
    let mut mapper = SpriteMapper::new(sprites, cfg)?;
    mapper.do_layout()?;
    mapper.to_atlas()
}
