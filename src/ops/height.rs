use crate::model::config::HeightMetrics;
use crate::model::node::Node;

/// Card height for a node, derived purely from its content.
///
/// `base + subtasks * subtask_row + metadata_row`, plus one `link_row` when
/// the node has any links.
pub fn derive_height(node: &Node, metrics: &HeightMetrics) -> f64 {
    let subtask_rows = node.subtasks.len() as f64 * metrics.subtask_row;
    let link_row = if node.links.is_empty() {
        0.0
    } else {
        metrics.link_row
    };
    metrics.base + subtask_rows + metrics.metadata_row + link_row
}

/// Overwrite every node's height from its current content.
pub fn apply_heights(nodes: &mut [Node], metrics: &HeightMetrics) {
    for node in nodes.iter_mut() {
        node.height = derive_height(node, metrics);
    }
}
