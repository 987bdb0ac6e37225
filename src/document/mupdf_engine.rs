//! MuPDF backend for the [`Engine`] seam.
//!
//! Page handles and display lists are the mupdf-rs wrappers. Rendering goes
//! through a scratch RGB pixmap covering the clip rectangle, so engine
//! output composites over whatever the caller's BGR surface already holds.

use log::debug;
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Device, DisplayList, Pixmap, TextPageFlags};

use super::engine::{DocumentSource, Engine, LinkDest, OutlineNode, RawLink};
use super::error::EngineError;
use super::format::DocumentFormat;
use super::geometry::{IRect, Matrix, Rect};
use super::surface::{BGR_CHANNELS, PixelSurface};
use super::types::{TextBlock, TextChar, TextLine, TextPage, TextSpan};

/// Open MuPDF document.
///
/// mupdf-rs has `PdfPage::update` but no per-annotation change polling, so
/// the trait defaults are kept: [`Engine::update_page`] reports no changes.
pub struct MupdfEngine {
    doc: mupdf::Document,
    format: DocumentFormat,
}

impl MupdfEngine {
    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

impl Engine for MupdfEngine {
    type Page = mupdf::Page;
    type DisplayList = DisplayList;

    fn open(source: DocumentSource, format: DocumentFormat) -> Result<Self, EngineError> {
        let bytes = match source {
            DocumentSource::Bytes(bytes) => bytes,
            DocumentSource::Path(path) => std::fs::read(&path)?,
        };
        if bytes.is_empty() {
            return Err(EngineError::open("empty document"));
        }
        let doc = mupdf::Document::from_bytes(&bytes, format.mime_type())?;
        debug!("opened {} byte {:?} document", bytes.len(), format);
        Ok(Self { doc, format })
    }

    fn page_count(&self) -> Result<i32, EngineError> {
        Ok(self.doc.page_count()?)
    }

    fn load_page(&mut self, number: i32) -> Result<Self::Page, EngineError> {
        self.doc
            .load_page(number)
            .map_err(|e| EngineError::page(number, e.to_string()))
    }

    fn bound_page(&self, page: &Self::Page) -> Result<Rect, EngineError> {
        Ok(from_mupdf_rect(&page.bounds()?))
    }

    fn list_page_contents(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError> {
        Ok(page.to_display_list(false)?)
    }

    fn list_annotations(&self, page: &Self::Page) -> Result<Self::DisplayList, EngineError> {
        let list = DisplayList::new(page.bounds()?)?;
        {
            let device = Device::from_display_list(&list)?;
            page.run_annotations(&device, &mupdf::Matrix::IDENTITY)?;
        }
        Ok(list)
    }

    fn run_display_list(
        &self,
        list: &Self::DisplayList,
        surface: &mut PixelSurface<'_>,
        ctm: &Matrix,
        clip: IRect,
    ) -> Result<(), EngineError> {
        let area = clip.intersect(&surface.bbox());
        if area.is_empty() {
            return Ok(());
        }

        let mut pixmap = Pixmap::new_with_rect(
            &Colorspace::device_rgb(),
            mupdf::IRect::new(area.x0, area.y0, area.x1, area.y1),
            false,
        )?;
        let stride = pixmap.stride() as usize;
        let row_bytes = area.width() as usize * BGR_CHANNELS;

        {
            let samples = pixmap.samples_mut();
            let mut row = 0;
            surface.for_each_row(area, |src| {
                let dst = &mut samples[row * stride..row * stride + row_bytes];
                swap_red_blue(src, dst);
                row += 1;
            });
        }

        {
            let device = Device::from_pixmap(&pixmap)?;
            list.run(&device, &to_mupdf_matrix(ctm), to_mupdf_rect(&Rect::from(area)))?;
        }

        let samples = pixmap.samples();
        let mut row = 0;
        surface.for_each_row(area, |dst| {
            let src = &samples[row * stride..row * stride + row_bytes];
            let mut scratch = [0u8; BGR_CHANNELS];
            for (out, px) in dst
                .chunks_exact_mut(BGR_CHANNELS)
                .zip(src.chunks_exact(BGR_CHANNELS))
            {
                swap_red_blue(px, &mut scratch);
                out.copy_from_slice(&scratch);
            }
            row += 1;
        });
        Ok(())
    }

    fn extract_text(&self, page: &Self::Page, ctm: &Matrix) -> Result<TextPage, EngineError> {
        let text_page = page.to_text_page(TextPageFlags::empty())?;
        let mut blocks = Vec::new();

        for block in text_page.blocks() {
            if block.r#type() != TextBlockType::Text {
                continue;
            }
            let lines = block
                .lines()
                .map(|line| {
                    let chars = line
                        .chars()
                        .filter_map(|ch| {
                            let c = ch.char()?;
                            let quad = ch.quad();
                            let xs = [quad.ul.x, quad.ur.x, quad.ll.x, quad.lr.x];
                            let ys = [quad.ul.y, quad.ur.y, quad.ll.y, quad.lr.y];
                            let bbox = Rect::new(
                                xs.iter().copied().fold(f32::INFINITY, f32::min),
                                ys.iter().copied().fold(f32::INFINITY, f32::min),
                                xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                                ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
                            );
                            Some(TextChar {
                                c,
                                bbox: ctm.transform_rect(&bbox),
                            })
                        })
                        .collect();
                    TextLine {
                        spans: vec![TextSpan { chars }],
                    }
                })
                .collect();
            blocks.push(TextBlock { lines });
        }

        Ok(TextPage { blocks })
    }

    fn load_links(&self, page: &Self::Page) -> Result<Vec<RawLink>, EngineError> {
        Ok(page
            .links()?
            .map(|link| RawLink {
                rect: from_mupdf_rect(&link.bounds),
                dest: match link.dest {
                    Some(dest) => LinkDest::Goto {
                        page: dest.loc.page_number as i32,
                    },
                    None => classify_uri(&link.uri),
                },
            })
            .collect())
    }

    fn load_outline(&self) -> Result<Vec<OutlineNode>, EngineError> {
        let outlines = self
            .doc
            .outlines()
            .map_err(|e| EngineError::outline(e.to_string()))?;
        Ok(convert_outlines(&outlines))
    }

    fn needs_password(&self) -> bool {
        self.doc.needs_password().unwrap_or(false)
    }

    fn authenticate_password(&mut self, password: &str) -> bool {
        self.doc.authenticate(password).unwrap_or(false)
    }
}

/// Outline subtree walk. mupdf-rs hands the tree over already materialised,
/// so recursion depth is bounded by what it built.
fn convert_outlines(outlines: &[mupdf::Outline]) -> Vec<OutlineNode> {
    outlines
        .iter()
        .map(|outline| OutlineNode {
            title: Some(outline.title.clone()).filter(|t| !t.is_empty()),
            dest: match (&outline.dest, &outline.uri) {
                (Some(dest), _) => Some(LinkDest::Goto {
                    page: dest.loc.page_number as i32,
                }),
                (None, Some(uri)) => Some(classify_uri(uri)),
                (None, None) => None,
            },
            children: convert_outlines(&outline.down),
        })
        .collect()
}

/// Sort a non-internal link URI into a destination kind.
///
/// Relative or `file:` references with a `#page=N` fragment point into
/// another document; other schemes are plain URIs.
pub fn classify_uri(uri: &str) -> LinkDest {
    if uri.is_empty() {
        return LinkDest::None;
    }
    let (file, fragment) = uri.split_once('#').unwrap_or((uri, ""));
    let has_scheme = file.split_once(':').is_some_and(|(scheme, _)| {
        scheme.len() > 1 && scheme.chars().all(|c| c.is_ascii_alphabetic())
    });

    if !has_scheme || file.starts_with("file:") {
        let file_spec = file.strip_prefix("file://").unwrap_or(file);
        let file_spec = file_spec.strip_prefix("file:").unwrap_or(file_spec);
        let page = fragment
            .strip_prefix("page=")
            .and_then(|p| p.parse::<i32>().ok())
            .map_or(0, |p| (p - 1).max(0));
        if file_spec.is_empty() {
            return LinkDest::Goto { page };
        }
        return LinkDest::GotoRemote {
            page,
            file_spec: file_spec.to_string(),
            new_window: false,
        };
    }

    if let Some(target) = file.strip_prefix("launch:") {
        return LinkDest::Launch(target.to_string());
    }
    LinkDest::Uri(uri.to_string())
}

/// Copy one packed 3-channel row, reversing channel order per pixel
fn swap_red_blue(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst
        .chunks_exact_mut(BGR_CHANNELS)
        .zip(src.chunks_exact(BGR_CHANNELS))
    {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
    }
}

fn from_mupdf_rect(r: &mupdf::Rect) -> Rect {
    Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn to_mupdf_rect(r: &Rect) -> mupdf::Rect {
    mupdf::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn to_mupdf_matrix(m: &Matrix) -> mupdf::Matrix {
    mupdf::Matrix::new(m.a, m.b, m.c, m.d, m.e, m.f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_links_are_uris() {
        assert_eq!(
            classify_uri("https://mupdf.com/docs"),
            LinkDest::Uri("https://mupdf.com/docs".into())
        );
        assert_eq!(
            classify_uri("mailto:someone@example.com"),
            LinkDest::Uri("mailto:someone@example.com".into())
        );
    }

    #[test]
    fn file_links_with_page_fragment_are_remote() {
        assert_eq!(
            classify_uri("appendix.pdf#page=3"),
            LinkDest::GotoRemote {
                page: 2,
                file_spec: "appendix.pdf".into(),
                new_window: false,
            }
        );
        assert_eq!(
            classify_uri("file:///tmp/other.pdf"),
            LinkDest::GotoRemote {
                page: 0,
                file_spec: "/tmp/other.pdf".into(),
                new_window: false,
            }
        );
    }

    #[test]
    fn bare_fragment_is_internal() {
        assert_eq!(classify_uri("#page=5"), LinkDest::Goto { page: 4 });
        assert_eq!(classify_uri(""), LinkDest::None);
    }

    #[test]
    fn channel_swap() {
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0; 6];
        swap_red_blue(&src, &mut dst);
        assert_eq!(dst, [3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        let result = MupdfEngine::open(
            DocumentSource::Bytes(b"definitely not a pdf".to_vec()),
            DocumentFormat::Pdf,
        );
        assert!(result.is_err());
    }
}
