//! Left-to-right layered layout for a forest of node cards.
//!
//! Depth runs along x: every child sits `horizontal_gap` past its parent's
//! right edge. Along y each node reserves a band as tall as its subtree;
//! sibling bands are stacked with `vertical_gap` between them and the node is
//! centered inside its own band. Root trees stack top to bottom in input
//! order with twice the vertical gap between them.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::config::LayoutConfig;
use crate::model::node::{Node, NodeId};

/// What a layout pass produced besides the positions written into the nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSummary {
    /// Band height reserved for each node's subtree, in input order
    pub subtree_heights: IndexMap<NodeId, f64>,
    /// Right edge of the rightmost card
    pub width: f64,
    /// Bottom edge of the lowest card
    pub height: f64,
    /// Nodes that no root leads to (only possible when parent links form a
    /// cycle); their positions are left untouched
    pub unreachable: Vec<NodeId>,
}

/// Parent/child structure of a node slice, by index.
pub(crate) struct ChildIndex {
    pub(crate) roots: Vec<usize>,
    pub(crate) children: Vec<Vec<usize>>,
}

impl ChildIndex {
    /// A node whose parent is absent from the slice is a root.
    pub(crate) fn build(nodes: &[Node]) -> ChildIndex {
        let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id).or_insert(i);
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            let parent = node
                .parent_id
                .and_then(|p| index.get(&p).copied())
                .filter(|&p| p != i);
            match parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }
        ChildIndex { roots, children }
    }

    /// Pre-order walk from every root; nodes on a parent cycle never appear.
    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.children.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(self.children[i].iter().rev());
        }
        order
    }
}

/// Assign `x`/`y` to every node reachable from a root.
///
/// Heights must already be derived; they are read, never recomputed. The
/// result depends only on ids, parent links, sizes and input order.
pub fn layout_forest(nodes: &mut [Node], config: &LayoutConfig) -> LayoutSummary {
    let forest = ChildIndex::build(nodes);
    let order = forest.preorder();
    let gap = config.vertical_gap;

    // Post-order: children always come after their parent in `order`.
    let mut subtree = vec![0.0_f64; nodes.len()];
    for &i in order.iter().rev() {
        let kids = &forest.children[i];
        let own = nodes[i].height;
        subtree[i] = if kids.is_empty() {
            own
        } else {
            let stacked: f64 = kids.iter().map(|&k| subtree[k]).sum::<f64>()
                + (kids.len() - 1) as f64 * gap;
            own.max(stacked)
        };
    }

    // Pre-order: each entry is (node, x, top of its band).
    let mut stack = Vec::with_capacity(forest.roots.len());
    let mut root_top = config.margin_y;
    for &r in &forest.roots {
        stack.push((r, config.margin_x, root_top));
        root_top += subtree[r] + 2.0 * gap;
    }
    stack.reverse();

    while let Some((i, x, top)) = stack.pop() {
        let node = &mut nodes[i];
        node.x = x;
        node.y = top + (subtree[i] - node.height) / 2.0;

        let child_x = x + node.width + config.horizontal_gap;
        let mut child_top = top;
        let mut placed = Vec::with_capacity(forest.children[i].len());
        for &k in &forest.children[i] {
            placed.push((k, child_x, child_top));
            child_top += subtree[k] + gap;
        }
        stack.extend(placed.into_iter().rev());
    }

    let mut reached = vec![false; nodes.len()];
    for &i in &order {
        reached[i] = true;
    }

    let mut summary = LayoutSummary::default();
    for (i, node) in nodes.iter().enumerate() {
        if reached[i] {
            summary.subtree_heights.entry(node.id).or_insert(subtree[i]);
            summary.width = summary.width.max(node.x + node.width);
            summary.height = summary.height.max(node.y + node.height);
        } else {
            summary.unreachable.push(node.id);
        }
    }

    if !summary.unreachable.is_empty() {
        log::warn!(
            "event=layout_unreachable count={} ids={:?}",
            summary.unreachable.len(),
            summary.unreachable
        );
    }
    log::debug!(
        "event=layout nodes={} roots={} width={} height={}",
        nodes.len(),
        forest.roots.len(),
        summary.width,
        summary.height
    );

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
