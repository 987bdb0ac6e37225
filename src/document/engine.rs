//! Seam between the viewer core and the rendering engine that parses and
//! rasterizes documents.

use std::path::PathBuf;

use super::error::EngineError;
use super::format::DocumentFormat;
use super::geometry::{IRect, Matrix, Rect};
use super::surface::PixelSurface;
use super::types::TextPage;

/// Where document bytes come from
#[derive(Clone, Debug)]
pub enum DocumentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl DocumentSource {
    /// Resolve the format to open with, consulting the file extension when
    /// the MIME hint is not recognised.
    #[must_use]
    pub fn resolve_format(&self, mime: &str) -> DocumentFormat {
        match self {
            Self::Bytes(_) => DocumentFormat::from_mime(mime),
            Self::Path(path) => DocumentFormat::for_path(path, mime),
        }
    }
}

/// Link destination as reported by the engine, before classification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkDest {
    /// Page in the same document
    Goto { page: i32 },
    /// Page in another document
    GotoRemote {
        page: i32,
        file_spec: String,
        new_window: bool,
    },
    Uri(String),
    /// Launch an external file or application
    Launch(String),
    /// Named action such as `NextPage`
    Named(String),
    None,
}

/// Link region in page units
#[derive(Clone, Debug, PartialEq)]
pub struct RawLink {
    pub rect: Rect,
    pub dest: LinkDest,
}

/// Node of the engine's outline tree
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutlineNode {
    pub title: Option<String>,
    pub dest: Option<LinkDest>,
    pub children: Vec<OutlineNode>,
}

/// Rendering engine capabilities consumed by [`super::Document`].
///
/// Display lists are recorded in page units and replayed through a
/// transform; page handles and lists are owned by the page cache slots.
pub trait Engine: Sized {
    type Page;
    type DisplayList;

    fn open(source: DocumentSource, format: DocumentFormat) -> Result<Self, EngineError>;

    fn page_count(&self) -> Result<i32, EngineError>;

    fn load_page(&mut self, number: i32) -> Result<Self::Page, EngineError>;

    /// Page extent at 72 units per inch
    fn bound_page(&self, page: &Self::Page) -> Result<Rect, EngineError>;

    /// Record the page content stream (text, images, vector art)
    fn list_page_contents(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError>;

    /// Record every annotation on the page
    fn list_annotations(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError>;

    /// Composite `list` over the existing surface pixels, touching only
    /// pixels inside `clip`.
    fn run_display_list(
        &self,
        list: &Self::DisplayList,
        surface: &mut PixelSurface<'_>,
        ctm: &Matrix,
        clip: IRect,
    ) -> Result<(), EngineError>;

    /// Bring the page's interactive state (form values, annotation
    /// appearances) up to date before listing it.
    ///
    /// Returns `true` when annotation appearances changed, meaning a cached
    /// annotation list is stale.
    fn update_page(&mut self, _page: &mut Self::Page) -> Result<bool, EngineError> {
        Ok(false)
    }

    /// Take the bounds (page units) of the next annotation with a pending
    /// visual change. Each change is reported once.
    fn poll_changed_annotation(
        &mut self,
        _page: &mut Self::Page,
    ) -> Result<Option<Rect>, EngineError> {
        Ok(None)
    }

    /// Structured text with character boxes transformed by `ctm`
    fn extract_text(&self, page: &Self::Page, ctm: &Matrix) -> Result<TextPage, EngineError>;

    fn load_links(&self, page: &Self::Page) -> Result<Vec<RawLink>, EngineError>;

    fn load_outline(&self) -> Result<Vec<OutlineNode>, EngineError>;

    fn needs_password(&self) -> bool;

    fn authenticate_password(&mut self, password: &str) -> bool;
}
