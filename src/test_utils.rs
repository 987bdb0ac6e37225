//! Scripted in-memory engine for exercising the viewer without a real
//! rendering backend.
//!
//! Pages are made of solid rectangles in page units; display lists are
//! plain copies of those rectangles, so renders are exact and repeatable.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::document::{
    DocumentFormat, DocumentSource, Engine, EngineError, IRect, LinkDest, Matrix, OutlineNode,
    PixelSurface, RawLink, Rect, TextBlock, TextChar, TextLine, TextPage, TextSpan,
};

/// Solid rectangle drawn by a display list
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub rect: Rect,
    pub bgr: [u8; 3],
}

/// Content of one scripted page
#[derive(Clone, Debug, Default)]
pub struct ScriptedPage {
    pub media_box: Rect,
    pub content: Vec<Shape>,
    pub annotations: Vec<Shape>,
    pub text: TextPage,
    pub links: Vec<RawLink>,
    pub fail_load: bool,
}

/// Width and height of one scripted glyph box, in page units
pub const GLYPH_SIZE: f32 = 10.0;
/// Left and top margin of scripted text, in page units
pub const TEXT_ORIGIN: f32 = 72.0;

impl ScriptedPage {
    /// US Letter page with no content
    #[must_use]
    pub fn letter() -> Self {
        Self::with_media_box(Rect::new(0.0, 0.0, 612.0, 792.0))
    }

    #[must_use]
    pub fn with_media_box(media_box: Rect) -> Self {
        Self {
            media_box,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn content(mut self, rect: Rect, bgr: [u8; 3]) -> Self {
        self.content.push(Shape { rect, bgr });
        self
    }

    #[must_use]
    pub fn annotation(mut self, rect: Rect, bgr: [u8; 3]) -> Self {
        self.annotations.push(Shape { rect, bgr });
        self
    }

    #[must_use]
    pub fn link(mut self, rect: Rect, dest: LinkDest) -> Self {
        self.links.push(RawLink { rect, dest });
        self
    }

    /// Lay out one text line per entry, each glyph a `GLYPH_SIZE` square
    /// starting at `TEXT_ORIGIN`, lines `2 * GLYPH_SIZE` apart.
    #[must_use]
    pub fn text_lines(mut self, lines: &[&str]) -> Self {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(row, text)| {
                let y0 = TEXT_ORIGIN + row as f32 * GLYPH_SIZE * 2.0;
                let chars = text
                    .chars()
                    .enumerate()
                    .map(|(col, c)| {
                        let x0 = TEXT_ORIGIN + col as f32 * GLYPH_SIZE;
                        TextChar {
                            c,
                            bbox: Rect::new(x0, y0, x0 + GLYPH_SIZE, y0 + GLYPH_SIZE),
                        }
                    })
                    .collect();
                TextLine {
                    spans: vec![TextSpan { chars }],
                }
            })
            .collect();
        self.text = TextPage {
            blocks: vec![TextBlock { lines }],
        };
        self
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

/// Page handle; the token lets tests count live handles
#[derive(Debug)]
pub struct ScriptedPageHandle {
    pub number: usize,
    _token: Rc<()>,
}

/// Engine document backed by [`ScriptedPage`]s
pub struct ScriptedEngine {
    pages: Vec<ScriptedPage>,
    outline: Vec<OutlineNode>,
    password: Option<String>,
    authenticated: bool,
    interactive: bool,
    pending_changes: Vec<VecDeque<usize>>,
    appearance_changed: Vec<bool>,
    live_token: Rc<()>,
    loads: usize,
    content_lists: Cell<usize>,
    annot_lists: Cell<usize>,
    pub fail_annotation_list: bool,
    pub fail_render: bool,
    pub fail_text: bool,
    pub fail_outline: bool,
}

/// Magic prefix recognised by [`ScriptedEngine::open`]
pub const SCRIPT_MAGIC: &[u8] = b"%SCRIPTED";

impl ScriptedEngine {
    #[must_use]
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        let count = pages.len();
        Self {
            pages,
            outline: Vec::new(),
            password: None,
            authenticated: true,
            interactive: true,
            pending_changes: vec![VecDeque::new(); count],
            appearance_changed: vec![false; count],
            live_token: Rc::new(()),
            loads: 0,
            content_lists: Cell::new(0),
            annot_lists: Cell::new(0),
            fail_annotation_list: false,
            fail_render: false,
            fail_text: false,
            fail_outline: false,
        }
    }

    /// `count` letter pages, each with a distinct grey band
    #[must_use]
    pub fn with_blank_pages(count: usize) -> Self {
        let pages = (0..count)
            .map(|i| {
                let shade = (i % 200) as u8;
                ScriptedPage::letter().content(Rect::new(72.0, 72.0, 540.0, 144.0), [shade; 3])
            })
            .collect();
        Self::new(pages)
    }

    #[must_use]
    pub fn outline(mut self, outline: Vec<OutlineNode>) -> Self {
        self.outline = outline;
        self
    }

    #[must_use]
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self.authenticated = false;
        self
    }

    /// Behave like a non-interactive format (no change tracking)
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Recolour an annotation the way a form edit would, queueing a change
    pub fn set_annotation_color(&mut self, page: usize, annot: usize, bgr: [u8; 3]) {
        self.pages[page].annotations[annot].bgr = bgr;
        if self.interactive {
            self.pending_changes[page].push_back(annot);
            self.appearance_changed[page] = true;
        }
    }

    /// Number of `load_page` calls so far
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Page handles currently alive outside the engine
    #[must_use]
    pub fn live_pages(&self) -> usize {
        Rc::strong_count(&self.live_token) - 1
    }

    /// (content, annotation) display lists recorded so far
    #[must_use]
    pub fn list_builds(&self) -> (usize, usize) {
        (self.content_lists.get(), self.annot_lists.get())
    }

    fn page(&self, handle: &ScriptedPageHandle) -> &ScriptedPage {
        &self.pages[handle.number]
    }
}

impl Engine for ScriptedEngine {
    type Page = ScriptedPageHandle;
    type DisplayList = Vec<Shape>;

    /// Accepts `%SCRIPTED <page count>`; anything else fails to open.
    fn open(source: DocumentSource, _format: DocumentFormat) -> Result<Self, EngineError> {
        let bytes = match source {
            DocumentSource::Bytes(bytes) => bytes,
            DocumentSource::Path(path) => std::fs::read(path)?,
        };
        let rest = bytes
            .strip_prefix(SCRIPT_MAGIC)
            .ok_or_else(|| EngineError::open("missing script header"))?;
        let count = std::str::from_utf8(rest)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .ok_or_else(|| EngineError::open("bad page count"))?;
        Ok(Self::with_blank_pages(count))
    }

    fn page_count(&self) -> Result<i32, EngineError> {
        Ok(self.pages.len() as i32)
    }

    fn load_page(&mut self, number: i32) -> Result<Self::Page, EngineError> {
        self.loads += 1;
        let idx = usize::try_from(number)
            .ok()
            .filter(|&i| i < self.pages.len())
            .ok_or_else(|| EngineError::page(number, "out of range"))?;
        if self.pages[idx].fail_load {
            return Err(EngineError::page(number, "scripted failure"));
        }
        Ok(ScriptedPageHandle {
            number: idx,
            _token: Rc::clone(&self.live_token),
        })
    }

    fn bound_page(&self, page: &Self::Page) -> Result<Rect, EngineError> {
        Ok(self.page(page).media_box)
    }

    fn list_page_contents(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError> {
        self.content_lists.set(self.content_lists.get() + 1);
        Ok(self.page(page).content.clone())
    }

    fn list_annotations(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError> {
        if self.fail_annotation_list {
            return Err(EngineError::render("scripted annotation failure"));
        }
        self.annot_lists.set(self.annot_lists.get() + 1);
        Ok(self.page(page).annotations.clone())
    }

    fn run_display_list(
        &self,
        list: &Self::DisplayList,
        surface: &mut PixelSurface<'_>,
        ctm: &Matrix,
        clip: IRect,
    ) -> Result<(), EngineError> {
        if self.fail_render {
            return Err(EngineError::render("scripted render failure"));
        }
        for shape in list {
            let area = ctm.transform_rect(&shape.rect).round_out().intersect(&clip);
            surface.fill_rect_bgr(area, shape.bgr);
        }
        Ok(())
    }

    fn update_page(&mut self, page: &mut Self::Page) -> Result<bool, EngineError> {
        Ok(std::mem::take(&mut self.appearance_changed[page.number]))
    }

    fn poll_changed_annotation(
        &mut self,
        page: &mut Self::Page,
    ) -> Result<Option<Rect>, EngineError> {
        let number = page.number;
        Ok(self.pending_changes[number]
            .pop_front()
            .map(|idx| self.pages[number].annotations[idx].rect))
    }

    fn extract_text(&self, page: &Self::Page, ctm: &Matrix) -> Result<TextPage, EngineError> {
        if self.fail_text {
            return Err(EngineError::text("scripted text failure"));
        }
        let mut text = self.page(page).text.clone();
        for block in &mut text.blocks {
            for line in &mut block.lines {
                for span in &mut line.spans {
                    for ch in &mut span.chars {
                        ch.bbox = ctm.transform_rect(&ch.bbox);
                    }
                }
            }
        }
        Ok(text)
    }

    fn load_links(&self, page: &Self::Page) -> Result<Vec<RawLink>, EngineError> {
        Ok(self.page(page).links.clone())
    }

    fn load_outline(&self) -> Result<Vec<OutlineNode>, EngineError> {
        if self.fail_outline {
            return Err(EngineError::outline("scripted outline failure"));
        }
        if !self.authenticated {
            return Ok(Vec::new());
        }
        Ok(self.outline.clone())
    }

    fn needs_password(&self) -> bool {
        !self.authenticated
    }

    fn authenticate_password(&mut self, password: &str) -> bool {
        match &self.password {
            None => true,
            Some(expected) => {
                self.authenticated = expected == password;
                self.authenticated
            }
        }
    }
}

/// Blank BGR buffer for a `width` by `height` target
#[must_use]
pub fn bgr_buffer(width: i32, height: i32) -> Vec<u8> {
    vec![0; width as usize * height as usize * 3]
}

/// Pixel at `(x, y)` of a buffer whose origin is `(0, 0)`
#[must_use]
pub fn pixel_at(buffer: &[u8], width: i32, x: i32, y: i32) -> [u8; 3] {
    let offset = (y as usize * width as usize + x as usize) * 3;
    [buffer[offset], buffer[offset + 1], buffer[offset + 2]]
}
