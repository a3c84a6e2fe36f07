//! Core library for mapping sprites onto texture pages.
//!
//! - Engines: Shelf, Guillotine (4 choosers x 6 splitters), MaxRects (4 choosers)
//! - Selection: `OptimalLayouter` runs engines on copies and keeps the smallest, squarest result
//! - Pipeline: `map_images` takes in-memory images and returns pages + metadata
//! - Data model is serde-serializable; JSON and Zwoptex2 plist exporters are included.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use spritemapper_core::{InputImage, MapperConfig, map_images};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: img1 },
//!   InputImage { key: "b".into(), image: img2 },
//! ];
//! let cfg = MapperConfig { max_width: 512, ..Default::default() };
//! let out = map_images(inputs, cfg)?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod export_plist;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod trim;

pub use config::*;
pub use error::*;
pub use export::*;
pub use export_plist::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use trim::*;

/// Convenience prelude for common types and functions.
/// Importing `spritemapper_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        AlgorithmFamily, FreeSpaceChooser, MapperConfig, MapperConfigBuilder, SortOrder,
        SplitStrategy,
    };
    pub use crate::model::{Atlas, Frame, Meta, PackStats, Page, Rect, Size, Sprite};
    pub use crate::packer::heuristics::Split;
    pub use crate::packer::{
        GuillotineLayouter, LayoutEngine, MaxRectsLayouter, OptimalLayouter, ShelfLayouter,
        SpriteLayouter,
    };
    pub use crate::{
        InputImage, MapOutput, OutputPage, SpriteMapper, layout_images, map_images, map_layout,
    };
}
