//! Document viewer core: page cache, render pipeline, incremental updates,
//! text search and navigation.

mod cache;
pub mod engine;
mod error;
mod format;
pub mod geometry;
#[cfg(feature = "mupdf")]
pub mod mupdf_engine;
pub mod parsing;
pub mod render;
pub mod search;
mod surface;
mod types;
mod viewer;

pub use cache::{PLACEHOLDER_SIZE, PageCache, PageSlot};
pub use engine::{DocumentSource, Engine, LinkDest, OutlineNode, RawLink};
pub use error::{EngineError, Result, ViewerError};
pub use format::DocumentFormat;
pub use geometry::{IRect, Matrix, Rect};
#[cfg(feature = "mupdf")]
pub use mupdf_engine::MupdfEngine;
pub use surface::{BGR_CHANNELS, PixelSurface};
pub use types::*;
pub use viewer::{Document, DocumentOptions};

/// Default target resolution in dots per inch
pub const DEFAULT_RESOLUTION: u32 = 160;
/// Default number of page cache slots
pub const DEFAULT_CACHE_SIZE: usize = 3;
/// Fill value for a page with nothing to draw
pub const DEFAULT_PLACEHOLDER_GRAY: u8 = 0xd0;
