//! Public document API: page selection, drawing, incremental updates,
//! search and navigation for the current page.

use std::path::PathBuf;

use log::{debug, info, warn};

use super::cache::PageCache;
use super::engine::{DocumentSource, Engine, OutlineNode};
use super::error::{Result, ViewerError};
use super::geometry::{Matrix, Rect};
use super::parsing::{links, outline};
use super::render::{self, Slot};
use super::search;
use super::surface::PixelSurface;
use super::types::{Link, OutlineItem, SearchHit};
use super::{DEFAULT_CACHE_SIZE, DEFAULT_PLACEHOLDER_GRAY, DEFAULT_RESOLUTION};

/// Tunables fixed for the lifetime of a document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Target resolution in dots per inch
    pub resolution: u32,
    /// Number of page cache slots
    pub cache_size: usize,
    /// Cap on hits returned by one search
    pub max_search_hits: usize,
    /// Fill value for pages with nothing to draw
    pub placeholder_gray: u8,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            cache_size: DEFAULT_CACHE_SIZE,
            max_search_hits: search::MAX_SEARCH_HITS,
            placeholder_gray: DEFAULT_PLACEHOLDER_GRAY,
        }
    }
}

/// An open document with its page cache.
///
/// All calls must come from one thread at a time; nothing here blocks on
/// anything but the engine.
pub struct Document<E: Engine> {
    // Declared before `engine` so cached pages and lists drop first
    cache: PageCache<E::Page, E::DisplayList>,
    outline: Vec<OutlineNode>,
    options: DocumentOptions,
    engine: E,
}

impl<E: Engine> Document<E> {
    /// Open a document from memory or disk. `mime` is a format hint; PDF is
    /// assumed when it is not recognised.
    pub fn create(source: DocumentSource, mime: &str, options: DocumentOptions) -> Result<Self> {
        let format = source.resolve_format(mime);
        info!("opening {:?} document", format);
        let engine = E::open(source, format).map_err(|e| {
            warn!("failed to open document: {e}");
            ViewerError::from_open(&e)
        })?;
        Self::from_engine(engine, options)
    }

    pub fn open_bytes(bytes: Vec<u8>, mime: &str, options: DocumentOptions) -> Result<Self> {
        Self::create(DocumentSource::Bytes(bytes), mime, options)
    }

    pub fn open_path(
        path: impl Into<PathBuf>,
        mime: &str,
        options: DocumentOptions,
    ) -> Result<Self> {
        Self::create(DocumentSource::Path(path.into()), mime, options)
    }

    /// Wrap an already opened engine document. A zero resolution is raised
    /// to 1 dpi so pages never measure 0x0.
    pub fn from_engine(engine: E, mut options: DocumentOptions) -> Result<Self> {
        options.resolution = options.resolution.max(1);
        let outline = engine.load_outline().map_err(|e| {
            warn!("failed to load outline: {e}");
            ViewerError::from_open(&e)
        })?;
        Ok(Self {
            cache: PageCache::new(options.cache_size),
            outline,
            options,
            engine,
        })
    }

    /// Make `number` the current page, loading it into a cache slot if it is
    /// not resident.
    ///
    /// On failure the slot keeps the page number with placeholder
    /// dimensions, so drawing still yields a blank page.
    pub fn goto_page(&mut self, number: i32) -> Result<()> {
        if let Some(idx) = self.cache.find(number) {
            debug!("page {number} cached in slot {idx}");
            self.cache.set_current(idx);
            return Ok(());
        }

        let idx = self.cache.victim_for(number);
        self.cache.set_current(idx);
        let slot = self.cache.slot_mut(idx);
        if let Some(old) = slot.number.filter(|_| slot.is_loaded()) {
            debug!("evicting page {old} from slot {idx} for page {number}");
        }
        slot.reassign(number);

        load_slot(&mut self.engine, slot, number, self.options.resolution).map_err(|e| {
            warn!("failed to load page {number}: {e}");
            ViewerError::GenericFailure
        })
    }

    /// Render the current page into `buffer`, a packed BGR image of
    /// `width` by `height` pixels whose origin is `(x, y)` in target space.
    pub fn draw_page(
        &mut self,
        buffer: &mut [u8],
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        invert: bool,
    ) -> Result<()> {
        let mut surface = PixelSurface::wrap(buffer, x, y, width, height)?;
        let slot = current_slot_mut(&mut self.cache)?;
        render::draw_slot(
            &mut self.engine,
            slot,
            &mut surface,
            self.options.resolution,
            invert,
            self.options.placeholder_gray,
        )?;
        Ok(())
    }

    /// Bring `buffer` up to date with annotation changes on `number`.
    ///
    /// When `number` is the current page only the changed regions are
    /// redrawn and `buffer` must hold the previous render of the same
    /// rectangle. Otherwise the page is selected and drawn in full.
    #[expect(
        clippy::too_many_arguments,
        reason = "Same target rectangle as draw_page plus the page number"
    )]
    pub fn update_page(
        &mut self,
        number: i32,
        buffer: &mut [u8],
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        invert: bool,
    ) -> Result<()> {
        let current = self.cache.current_index();
        if current.is_none() || self.cache.find(number) != current {
            self.goto_page(number)?;
            return self.draw_page(buffer, x, y, width, height, invert);
        }

        let mut surface = PixelSurface::wrap(buffer, x, y, width, height)?;
        let slot = current_slot_mut(&mut self.cache)?;
        render::update_slot(
            &mut self.engine,
            slot,
            &mut surface,
            self.options.resolution,
            invert,
        )?;
        Ok(())
    }

    /// Try `password` on an encrypted document. The outline is reloaded on
    /// success since it may have been unreadable before.
    pub fn authenticate_password(&mut self, password: &str) -> bool {
        let ok = self.engine.authenticate_password(password);
        if ok {
            match self.engine.load_outline() {
                Ok(outline) => self.outline = outline,
                Err(e) => warn!("outline unavailable after authentication: {e}"),
            }
        }
        ok
    }

    #[must_use]
    pub fn needs_password(&self) -> bool {
        self.engine.needs_password()
    }

    pub fn page_count(&self) -> Result<i32> {
        Ok(self.engine.page_count()?)
    }

    /// Device-pixel width of the current page, 0 before any page is selected
    #[must_use]
    pub fn page_width(&self) -> i32 {
        self.cache.current().map_or(0, |slot| slot.width)
    }

    /// Device-pixel height of the current page, 0 before any page is selected
    #[must_use]
    pub fn page_height(&self) -> i32 {
        self.cache.current().map_or(0, |slot| slot.height)
    }

    /// Page number the current slot was last assigned to
    #[must_use]
    pub fn current_page(&self) -> Option<i32> {
        self.cache.current().and_then(|slot| slot.number)
    }

    /// Links on the current page, rectangles in target space
    pub fn links(&self) -> Result<Vec<Link>> {
        let (page, _) = self.current_page_handle()?;
        let raw = self.engine.load_links(page)?;
        Ok(links::collect_links(&raw, &self.base_transform()))
    }

    /// Search the current page for `needle`
    pub fn search_text(&self, needle: &str) -> Result<Vec<SearchHit>> {
        let (page, number) = self.current_page_handle()?;
        let text = self.engine.extract_text(page, &self.base_transform())?;
        let hits = search::search_page(&text, needle, self.options.max_search_hits);
        debug!("{} hit(s) for {needle:?} on page {number}", hits.len());
        Ok(hits)
    }

    /// Flattened outline of the document
    #[must_use]
    pub fn outline(&self) -> Vec<OutlineItem> {
        outline::flatten_outline(&self.outline)
    }

    /// Media box of the current page, `None` if it is not loaded
    #[must_use]
    pub fn media_box(&self) -> Option<Rect> {
        self.cache
            .current()
            .filter(|slot| slot.is_loaded())
            .map(|slot| slot.media_box)
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.options.resolution
    }

    #[must_use]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Page numbers currently held by the cache
    #[must_use]
    pub fn resident_pages(&self) -> Vec<i32> {
        self.cache.resident_pages()
    }

    /// Release every cached page and display list
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct engine access, e.g. to apply form edits before an update
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn base_transform(&self) -> Matrix {
        Matrix::for_resolution(self.options.resolution)
    }

    fn current_page_handle(&self) -> Result<(&E::Page, i32)> {
        let slot = self.cache.current().ok_or_else(|| {
            warn!("no page selected");
            ViewerError::InvalidArgument
        })?;
        match (&slot.page, slot.number) {
            (Some(page), Some(number)) => Ok((page, number)),
            _ => Err(ViewerError::GenericFailure),
        }
    }
}

fn current_slot_mut<P, L>(
    cache: &mut PageCache<P, L>,
) -> Result<&mut super::cache::PageSlot<P, L>> {
    cache.current_mut().ok_or_else(|| {
        warn!("no page selected");
        ViewerError::InvalidArgument
    })
}

/// Load `number` into a freshly reassigned slot and measure it
fn load_slot<E: Engine>(
    engine: &mut E,
    slot: &mut Slot<E>,
    number: i32,
    resolution: u32,
) -> std::result::Result<(), super::error::EngineError> {
    let page = engine.load_page(number)?;
    let page = slot.page.insert(page);
    slot.media_box = engine.bound_page(page)?;

    let bbox = Matrix::for_resolution(resolution)
        .transform_rect(&slot.media_box)
        .round_out();
    slot.width = bbox.width();
    slot.height = bbox.height();
    debug!(
        "loaded page {number}: {}x{} px, media box {:?}",
        slot.width, slot.height, slot.media_box
    );
    Ok(())
}
