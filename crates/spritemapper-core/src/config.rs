//! Algorithm families and mapping configuration.
//! Key notes:
//!   - `algorithms` lists the families tried; the best layout across them wins
//!   - `max_height == 0` means pages grow downwards without limit
//!   - `parallel` runs the trial layouts on rayon when the `parallel` feature is on

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level algorithm families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmFamily {
    /// Left-to-right rows (fast, single configuration).
    Shelf,
    /// Disjoint free list split by guillotine cuts (4 choosers x 6 splitters).
    Guillotine,
    /// Maximal, possibly overlapping free rectangles (4 choosers).
    MaxRects,
}

impl AlgorithmFamily {
    pub const ALL: [AlgorithmFamily; 3] = [Self::Shelf, Self::Guillotine, Self::MaxRects];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shelf => "shelf",
            Self::Guillotine => "guillotine",
            Self::MaxRects => "maxrects",
        }
    }
}

impl AlgorithmFamily {
    /// Parses a comma-separated list such as `"maxrects, shelf"`.
    /// Empty entries are ignored; duplicates are kept.
    pub fn parse_list(list: &str) -> crate::error::Result<Vec<AlgorithmFamily>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                name.parse().map_err(|_| {
                    crate::error::SpriteMapperError::UnknownAlgorithm(name.to_string())
                })
            })
            .collect()
    }
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmFamily {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shelf" => Ok(Self::Shelf),
            "guillotine" => Ok(Self::Guillotine),
            "maxrects" => Ok(Self::MaxRects),
            _ => Err(()),
        }
    }
}

/// Orders candidate free rectangles for the sprite about to be placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FreeSpaceChooser {
    /// Smallest leftover area.
    BestFit,
    /// Smallest of the two leftover side gaps.
    BestShortSide,
    /// Largest of the two leftover side gaps.
    BestLongSide,
    /// Row-major: smallest y, then smallest x.
    TopLeft,
}

impl FreeSpaceChooser {
    pub const ALL: [FreeSpaceChooser; 4] = [
        Self::BestFit,
        Self::BestShortSide,
        Self::BestLongSide,
        Self::TopLeft,
    ];
}

impl fmt::Display for FreeSpaceChooser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for FreeSpaceChooser {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bf" | "bestfit" => Ok(Self::BestFit),
            "bss" | "bestshortside" => Ok(Self::BestShortSide),
            "bls" | "bestlongside" => Ok(Self::BestLongSide),
            "tl" | "topleft" => Ok(Self::TopLeft),
            _ => Err(()),
        }
    }
}

/// Decides how Guillotine cuts a consumed free rectangle in two.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    LongestAxis,
    ShortestAxis,
    LongestLeftoverAxis,
    ShortestLeftoverAxis,
    MaximumAreaDifference,
    MinimumAreaDifference,
}

impl SplitStrategy {
    pub const ALL: [SplitStrategy; 6] = [
        Self::LongestAxis,
        Self::ShortestAxis,
        Self::LongestLeftoverAxis,
        Self::ShortestLeftoverAxis,
        Self::MaximumAreaDifference,
        Self::MinimumAreaDifference,
    ];
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for SplitStrategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "la" | "longestaxis" => Ok(Self::LongestAxis),
            "sa" | "shortestaxis" => Ok(Self::ShortestAxis),
            "lla" | "longestleftoveraxis" => Ok(Self::LongestLeftoverAxis),
            "sla" | "shortestleftoveraxis" => Ok(Self::ShortestLeftoverAxis),
            "maxad" | "maximumareadifference" => Ok(Self::MaximumAreaDifference),
            "minad" | "minimumareadifference" => Ok(Self::MinimumAreaDifference),
            _ => Err(()),
        }
    }
}

/// Sorting orders for deterministic packing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AreaDesc,
    MaxSideDesc,
    HeightDesc,
    WidthDesc,
    NameAsc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "height_desc" => Ok(Self::HeightDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Maximum page width in pixels, border included.
    pub max_width: u32,
    /// Maximum page height in pixels, border included. 0 means unbounded.
    pub max_height: u32,
    /// Pixels between sprites.
    pub spacing: u32,
    /// Pixels around the entire page.
    pub border: u32,
    /// Round page dimensions up to powers of two.
    pub power_of_two: bool,

    /// Trim transparent borders (alpha <= trim_threshold).
    pub trim: bool,
    pub trim_threshold: u8,
    /// Keep one transparent pixel at the right/bottom of trimmed sprites.
    pub reserve_border: bool,
    /// Rotate portrait sprites to landscape before layout.
    #[serde(default = "default_landscape")]
    pub landscape: bool,
    /// Draw red outlines on output pages (debug).
    pub draw_frames: bool,

    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<AlgorithmFamily>,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,
    /// Run trial layouts in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 0,
            spacing: 0,
            border: 0,
            power_of_two: false,
            trim: true,
            trim_threshold: 0,
            reserve_border: false,
            landscape: default_landscape(),
            draw_frames: false,
            algorithms: default_algorithms(),
            sort_order: default_sort_order(),
            parallel: false,
        }
    }
}

impl MapperConfig {
    /// Validates the configuration parameters.
    ///
    /// A border that eats the whole page is not an error here; the layout
    /// simply produces no pages.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteMapperError;

        if self.max_width == 0 {
            return Err(SpriteMapperError::InvalidConfig(
                "max_width must be a positive integer".into(),
            ));
        }
        if self.algorithms.is_empty() {
            return Err(SpriteMapperError::InvalidConfig(
                "at least one algorithm family must be selected".into(),
            ));
        }
        Ok(())
    }
}

fn default_landscape() -> bool {
    true
}
fn default_algorithms() -> Vec<AlgorithmFamily> {
    vec![AlgorithmFamily::MaxRects]
}
fn default_sort_order() -> SortOrder {
    SortOrder::AreaDesc
}

/// Builder for `MapperConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct MapperConfigBuilder {
    cfg: MapperConfig,
}

impl MapperConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: MapperConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn spacing(mut self, v: u32) -> Self {
        self.cfg.spacing = v;
        self
    }
    pub fn border(mut self, v: u32) -> Self {
        self.cfg.border = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn reserve_border(mut self, v: bool) -> Self {
        self.cfg.reserve_border = v;
        self
    }
    pub fn landscape(mut self, v: bool) -> Self {
        self.cfg.landscape = v;
        self
    }
    pub fn draw_frames(mut self, v: bool) -> Self {
        self.cfg.draw_frames = v;
        self
    }
    pub fn algorithms(mut self, v: Vec<AlgorithmFamily>) -> Self {
        self.cfg.algorithms = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> MapperConfig {
        self.cfg
    }
}

impl MapperConfig {
    /// Create a fluent builder for `MapperConfig`.
    pub fn builder() -> MapperConfigBuilder {
        MapperConfigBuilder::new()
    }
}
