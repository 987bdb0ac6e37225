//! Outline flattening.

use crate::document::engine::{LinkDest, OutlineNode};
use crate::document::types::OutlineItem;

/// Flatten the outline tree in pre-order.
///
/// Only nodes that jump to a page of this document and carry a non-empty
/// title are emitted, but every node's children are visited and keep the
/// level of their real position in the tree.
#[must_use]
pub fn flatten_outline(roots: &[OutlineNode]) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    // Pending siblings per level, reversed so `pop` yields document order
    let mut stack: Vec<(usize, &OutlineNode)> = roots.iter().rev().map(|n| (0, n)).collect();

    while let Some((level, node)) = stack.pop() {
        if let Some(item) = outline_item(node, level) {
            items.push(item);
        }
        stack.extend(node.children.iter().rev().map(|child| (level + 1, child)));
    }

    items
}

fn outline_item(node: &OutlineNode, level: usize) -> Option<OutlineItem> {
    let Some(LinkDest::Goto { page }) = node.dest else {
        return None;
    };
    if page < 0 {
        return None;
    }
    let title = node.title.as_deref().filter(|t| !t.is_empty())?;
    Some(OutlineItem {
        level,
        page_number: page,
        title: title.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(title: Option<&str>, page: i32, children: Vec<OutlineNode>) -> OutlineNode {
        OutlineNode {
            title: title.map(str::to_string),
            dest: Some(LinkDest::Goto { page }),
            children,
        }
    }

    fn summary(items: &[OutlineItem]) -> Vec<(String, usize)> {
        items.iter().map(|i| (i.title.clone(), i.level)).collect()
    }

    #[test]
    fn pre_order_with_levels() {
        let tree = vec![node(
            Some("A"),
            0,
            vec![
                node(Some("B"), 1, vec![node(Some("D"), 3, vec![])]),
                node(Some("C"), 2, vec![]),
            ],
        )];
        let items = flatten_outline(&tree);
        assert_eq!(
            summary(&items),
            vec![
                ("A".to_string(), 0),
                ("B".to_string(), 1),
                ("D".to_string(), 2),
                ("C".to_string(), 1),
            ]
        );
        assert_eq!(items[2].page_number, 3);
    }

    #[test]
    fn siblings_after_deep_subtree_return_to_their_level() {
        let tree = vec![
            node(
                Some("1"),
                0,
                vec![node(Some("1.1"), 1, vec![node(Some("1.1.1"), 2, vec![])])],
            ),
            node(Some("2"), 3, vec![]),
        ];
        let levels: Vec<usize> = flatten_outline(&tree).iter().map(|i| i.level).collect();
        assert_eq!(levels, vec![0, 1, 2, 0]);
    }

    #[test]
    fn untitled_node_skipped_but_children_kept() {
        let tree = vec![
            node(None, 0, vec![node(Some("child"), 4, vec![])]),
            node(Some(""), 1, vec![]),
            node(Some("last"), 5, vec![]),
        ];
        let items = flatten_outline(&tree);
        assert_eq!(
            summary(&items),
            vec![("child".to_string(), 1), ("last".to_string(), 0)]
        );
    }

    #[test]
    fn non_goto_destinations_skipped() {
        let mut uri = node(Some("site"), 0, vec![node(Some("inner"), 2, vec![])]);
        uri.dest = Some(LinkDest::Uri("https://example.com".into()));
        let mut remote = node(Some("remote"), 0, vec![]);
        remote.dest = Some(LinkDest::GotoRemote {
            page: 1,
            file_spec: "other.pdf".into(),
            new_window: false,
        });
        let mut none = node(Some("none"), 0, vec![]);
        none.dest = None;
        let negative = node(Some("negative"), -1, vec![]);

        let items = flatten_outline(&[uri, remote, none, negative]);
        assert_eq!(summary(&items), vec![("inner".to_string(), 1)]);
    }

    #[test]
    fn empty_tree() {
        assert!(flatten_outline(&[]).is_empty());
    }
}
