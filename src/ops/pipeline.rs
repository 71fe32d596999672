use crate::model::board::Board;
use crate::model::config::LayoutConfig;
use crate::model::node::Node;
use crate::ops::filter::{Filter, filter_visible};
use crate::ops::height::apply_heights;
use crate::ops::layout::{LayoutSummary, layout_forest};

/// Positioned visible nodes plus what the layout pass reported
#[derive(Debug, Clone)]
pub struct VisibleLayout {
    pub nodes: Vec<Node>,
    pub summary: LayoutSummary,
}

/// Derive heights, apply the filter and lay out the visible forest.
///
/// Runs from scratch on the given snapshot; the board is not modified.
pub fn compute_visible_layout(board: &Board, filter: &Filter, config: &LayoutConfig) -> VisibleLayout {
    let mut nodes = filter_visible(&board.nodes, filter, &board.owners);
    apply_heights(&mut nodes, &config.heights);
    let summary = layout_forest(&mut nodes, config);
    VisibleLayout { nodes, summary }
}
