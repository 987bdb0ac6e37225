//! Two-phase render pipeline: record display lists once per slot, then
//! composite them into caller buffers, either whole or one dirty region at
//! a time.

use log::debug;

use super::cache::PageSlot;
use super::engine::Engine;
use super::error::EngineError;
use super::geometry::{IRect, Matrix, Rect};
use super::surface::PixelSurface;

/// Background behind page content
pub const PAPER_WHITE: u8 = 0xff;

/// Cache slot type for a given engine
pub type Slot<E> = PageSlot<<E as Engine>::Page, <E as Engine>::DisplayList>;

/// Pre-computed transform from page units to the target rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterSpec {
    /// Page units to target pixels
    pub transform: Matrix,
    /// Media box under `transform`, rounded out
    pub page_bbox: IRect,
}

impl RasterSpec {
    /// Scale for `resolution`, then stretch so the media box covers exactly
    /// `width` by `height` pixels. The slot's stored size was rounded, so
    /// the plain resolution scale can be off by a pixel either way.
    #[must_use]
    pub fn compute(media_box: &Rect, resolution: u32, width: i32, height: i32) -> Self {
        let base = Matrix::for_resolution(resolution);
        let bbox = base.transform_rect(media_box).round_out();

        let transform = if bbox.is_empty() {
            base
        } else {
            let xscale = width as f32 / bbox.width() as f32;
            let yscale = height as f32 / bbox.height() as f32;
            base.concat(&Matrix::scale(xscale, yscale))
        };

        Self {
            transform,
            page_bbox: transform.transform_rect(media_box).round_out(),
        }
    }
}

/// Record whichever display lists the slot is missing.
///
/// The engine is told about in-memory edits first; if it reports changed
/// annotation appearances the cached annotation list is dropped and
/// re-recorded. A list that was recorded before a later failure stays on the
/// slot.
pub fn ensure_display_lists<E: Engine>(
    engine: &mut E,
    slot: &mut Slot<E>,
) -> Result<(), EngineError> {
    let Some(page) = slot.page.as_mut() else {
        return Ok(());
    };

    if engine.update_page(page)? && slot.annot_list.is_some() {
        debug!("annotations changed on page {:?}, dropping list", slot.number);
        slot.annot_list = None;
    }

    if slot.content_list.is_none() {
        debug!("recording content list for page {:?}", slot.number);
        slot.content_list = Some(engine.list_page_contents(page)?);
    }

    if slot.annot_list.is_none() {
        debug!("recording annotation list for page {:?}", slot.number);
        slot.annot_list = Some(engine.list_annotations(page)?);
    }

    Ok(())
}

/// Replay the slot's lists, content first and annotations on top
fn composite<E: Engine>(
    engine: &E,
    slot: &Slot<E>,
    surface: &mut PixelSurface<'_>,
    ctm: &Matrix,
    clip: IRect,
) -> Result<(), EngineError> {
    for list in [&slot.content_list, &slot.annot_list].into_iter().flatten() {
        engine.run_display_list(list, surface, ctm, clip)?;
    }
    Ok(())
}

/// Render the whole slot into `surface`.
///
/// A slot without any display list (its page failed to load, or the engine
/// gave nothing to draw) is painted `placeholder_gray`.
pub fn draw_slot<E: Engine>(
    engine: &mut E,
    slot: &mut Slot<E>,
    surface: &mut PixelSurface<'_>,
    resolution: u32,
    invert: bool,
    placeholder_gray: u8,
) -> Result<(), EngineError> {
    ensure_display_lists(engine, slot)?;

    if slot.content_list.is_none() && slot.annot_list.is_none() {
        surface.fill(placeholder_gray);
        return Ok(());
    }

    surface.fill(PAPER_WHITE);

    let target = surface.bbox();
    let spec = RasterSpec::compute(
        &slot.media_box,
        resolution,
        target.width(),
        target.height(),
    );
    let clip = spec.page_bbox.intersect(&target);
    composite(&*engine, slot, surface, &spec.transform, clip)?;

    if invert {
        surface.invert();
    }
    Ok(())
}

/// Redraw only the regions of annotations the engine reports as changed.
///
/// Pixels outside those regions are left as they are, so `surface` must
/// already hold a previous render of the same slot and rectangle. Returns
/// the number of regions repainted.
pub fn update_slot<E: Engine>(
    engine: &mut E,
    slot: &mut Slot<E>,
    surface: &mut PixelSurface<'_>,
    resolution: u32,
    invert: bool,
) -> Result<usize, EngineError> {
    ensure_display_lists(engine, slot)?;

    let target = surface.bbox();
    let spec = RasterSpec::compute(
        &slot.media_box,
        resolution,
        target.width(),
        target.height(),
    );

    let mut repainted = 0;
    loop {
        let Some(page) = slot.page.as_mut() else {
            break;
        };
        let Some(annot_bounds) = engine.poll_changed_annotation(page)? else {
            break;
        };

        let dirty = spec
            .transform
            .transform_rect(&annot_bounds)
            .round_out()
            .intersect(&target);
        if dirty.is_empty() {
            continue;
        }

        surface.fill_rect(dirty, PAPER_WHITE);
        composite(&*engine, slot, surface, &spec.transform, dirty)?;
        if invert {
            surface.invert_rect(dirty);
        }
        repainted += 1;
    }

    if repainted > 0 {
        debug!("repainted {repainted} region(s) on page {:?}", slot.number);
    }
    Ok(repainted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_stretches_to_requested_size() {
        let media = Rect::new(0.0, 0.0, 612.0, 792.0);
        let spec = RasterSpec::compute(&media, 72, 306, 396);
        assert_eq!(spec.page_bbox, IRect::new(0, 0, 306, 396));
    }

    #[test]
    fn raster_absorbs_rounding_error() {
        // 595.3pt at 96dpi is 793.73px, stored as 794 after rounding out
        let media = Rect::new(0.0, 0.0, 595.3, 841.9);
        let spec = RasterSpec::compute(&media, 96, 793, 1122);
        assert_eq!(spec.page_bbox, IRect::new(0, 0, 793, 1122));
    }

    #[test]
    fn raster_with_empty_media_box_keeps_base_scale() {
        let spec = RasterSpec::compute(&Rect::EMPTY, 144, 100, 100);
        assert_eq!(spec.transform, Matrix::for_resolution(144));
        assert!(spec.page_bbox.is_empty());
    }
}
