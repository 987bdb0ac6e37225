//! Link classification into the variants the viewer navigates by.

use crate::document::engine::{LinkDest, RawLink};
use crate::document::geometry::Matrix;
use crate::document::types::{Link, LinkTarget};

/// Map an engine destination to a navigable target.
///
/// Launch actions, named actions and empty destinations have no
/// counterpart and yield `None`.
#[must_use]
pub fn classify(dest: &LinkDest) -> Option<LinkTarget> {
    match dest {
        LinkDest::Goto { page } => Some(LinkTarget::Internal { page: *page }),
        LinkDest::GotoRemote {
            page,
            file_spec,
            new_window,
        } => Some(LinkTarget::Remote {
            page: *page,
            file_spec: file_spec.clone(),
            new_window: *new_window,
        }),
        LinkDest::Uri(uri) => Some(LinkTarget::Uri { uri: uri.clone() }),
        LinkDest::Launch(_) | LinkDest::Named(_) | LinkDest::None => None,
    }
}

/// Classify `raw` links and move their rectangles into target space
#[must_use]
pub fn collect_links(raw: &[RawLink], ctm: &Matrix) -> Vec<Link> {
    raw.iter()
        .filter_map(|link| {
            let target = classify(&link.dest)?;
            Some(Link {
                rect: ctm.transform_rect(&link.rect),
                target,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::geometry::Rect;

    #[test]
    fn unsupported_kinds_are_dropped() {
        let raw = vec![
            RawLink {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
                dest: LinkDest::Goto { page: 3 },
            },
            RawLink {
                rect: Rect::new(0.0, 0.0, 5.0, 5.0),
                dest: LinkDest::GotoRemote {
                    page: 1,
                    file_spec: "appendix.pdf".into(),
                    new_window: true,
                },
            },
            RawLink {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                dest: LinkDest::Launch("calc.exe".into()),
            },
        ];

        let links = collect_links(&raw, &Matrix::scale(2.0, 2.0));
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target, LinkTarget::Internal { page: 3 });
        assert_eq!(links[0].rect, Rect::new(20.0, 20.0, 40.0, 40.0));
        assert_eq!(
            links[1].target,
            LinkTarget::Remote {
                page: 1,
                file_spec: "appendix.pdf".into(),
                new_window: true,
            }
        );
    }

    #[test]
    fn uri_links_keep_their_uri() {
        let target = classify(&LinkDest::Uri("https://mupdf.com".into()));
        assert_eq!(
            target,
            Some(LinkTarget::Uri {
                uri: "https://mupdf.com".into()
            })
        );
        assert_eq!(classify(&LinkDest::Named("NextPage".into())), None);
        assert_eq!(classify(&LinkDest::None), None);
    }
}
