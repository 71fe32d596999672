use std::collections::HashSet;

use serde::Serialize;

use crate::model::node::{Node, NodeId, Priority};
use crate::ops::check::CheckResult;
use crate::ops::layout::{ChildIndex, LayoutSummary};
use crate::util::unicode::{single_line, truncate_to_width};

/// Node titles longer than this are cut in human-readable listings
const TITLE_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct PositionedNodeJson {
    pub id: NodeId,
    #[serde(rename = "parentId")]
    pub parent_id: Option<NodeId>,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "subtreeHeight", skip_serializing_if = "Option::is_none")]
    pub subtree_height: Option<f64>,
}

#[derive(Serialize)]
pub struct LayoutJson {
    pub filter: String,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<PositionedNodeJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreachable: Vec<NodeId>,
}

/// One row of the outline, in pre-order; `depth` 0 is a root
#[derive(Serialize)]
pub struct OutlineEntryJson {
    pub id: NodeId,
    #[serde(rename = "parentId")]
    pub parent_id: Option<NodeId>,
    pub depth: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

#[derive(Serialize)]
pub struct FilterJson {
    pub filter: String,
    pub visible: Vec<NodeId>,
}

#[derive(Serialize)]
pub struct MutationJson {
    pub action: &'static str,
    pub ids: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn layout_to_json(nodes: &[Node], summary: &LayoutSummary, filter: String) -> LayoutJson {
    let unreachable: HashSet<NodeId> = summary.unreachable.iter().copied().collect();
    LayoutJson {
        filter,
        width: summary.width,
        height: summary.height,
        nodes: nodes
            .iter()
            .filter(|n| !unreachable.contains(&n.id))
            .map(|n| PositionedNodeJson {
                id: n.id,
                parent_id: n.parent_id,
                text: n.text.clone(),
                x: n.x,
                y: n.y,
                width: n.width,
                height: n.height,
                subtree_height: summary.subtree_heights.get(&n.id).copied(),
            })
            .collect(),
        unreachable: summary.unreachable.clone(),
    }
}

/// The visible forest as a flat pre-order list. Kept flat so arbitrarily
/// deep chains never recurse while building, serializing or dropping.
pub fn outline_to_json(nodes: &[Node]) -> Vec<OutlineEntryJson> {
    outline_order(nodes)
        .into_iter()
        .map(|(i, depth)| {
            let node = &nodes[i];
            OutlineEntryJson {
                id: node.id,
                parent_id: (depth > 0).then_some(node.parent_id).flatten(),
                depth,
                text: node.text.clone(),
                tags: node.tags.clone(),
                priority: (node.priority != Priority::None).then(|| node.priority.level()),
            }
        })
        .collect()
}

/// Pre-order walk of the visible forest as `(index, depth)`, children in
/// input order. Nodes on a parent cycle are never reached from a root.
fn outline_order(nodes: &[Node]) -> Vec<(usize, usize)> {
    let tree = ChildIndex::build(nodes);
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(usize, usize)> = tree.roots.iter().rev().map(|&r| (r, 0)).collect();
    while let Some((i, depth)) = stack.pop() {
        order.push((i, depth));
        stack.extend(tree.children[i].iter().rev().map(|&c| (c, depth + 1)));
    }
    order
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a node as a one-line summary: `ID !P title #tags [done/total]`
pub fn format_node_line(node: &Node) -> String {
    let prio = match node.priority {
        Priority::None => String::new(),
        p => format!("!{} ", p.level()),
    };
    let tags_str = if node.tags.is_empty() {
        String::new()
    } else {
        format!(
            " {}",
            node.tags
                .iter()
                .map(|t| format!("#{}", t))
                .collect::<Vec<_>>()
                .join(" ")
        )
    };
    let progress = if node.subtasks.is_empty() {
        String::new()
    } else {
        let done = node.subtasks.iter().filter(|s| s.done).count();
        format!(" [{}/{}]", done, node.subtasks.len())
    };
    let title = truncate_to_width(&single_line(&node.text), TITLE_WIDTH);
    format!("{} {}{}{}{}", node.id, prio, title, tags_str, progress)
}

/// The visible forest as an indented list, children in input order.
pub fn format_outline(nodes: &[Node]) -> Vec<String> {
    outline_order(nodes)
        .into_iter()
        .map(|(i, depth)| format!("{}{}", "  ".repeat(depth), format_node_line(&nodes[i])))
        .collect()
}

/// One line per positioned node: id, position, size, title.
pub fn format_layout(nodes: &[Node], summary: &LayoutSummary) -> Vec<String> {
    let unreachable: HashSet<NodeId> = summary.unreachable.iter().copied().collect();
    let mut lines = Vec::new();
    for node in nodes.iter().filter(|n| !unreachable.contains(&n.id)) {
        lines.push(format!(
            "{:>5}  x={:<8} y={:<8} {}x{}  {}",
            node.id.0,
            node.x,
            node.y,
            node.width,
            node.height,
            truncate_to_width(&single_line(&node.text), TITLE_WIDTH)
        ));
    }
    lines.push(format!("extent: {}x{}", summary.width, summary.height));
    if !summary.unreachable.is_empty() {
        lines.push(format!(
            "unplaced (parent cycle): {}",
            summary
                .unreachable
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    lines
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    use crate::ops::check::{CheckError, CheckWarning};

    let mut lines = Vec::new();
    for err in &result.errors {
        lines.push(match err {
            CheckError::DuplicateId { node_id } => format!("error: duplicate node id {}", node_id),
            CheckError::SelfParent { node_id } => {
                format!("error: node {} is its own parent", node_id)
            }
            CheckError::Cycle { node_ids } => format!(
                "error: parent cycle {}",
                node_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            ),
        });
    }
    for warn in &result.warnings {
        lines.push(match warn {
            CheckWarning::DanglingParent { node_id, parent_id } => format!(
                "warning: node {} has unknown parent {} (shown as a root)",
                node_id, parent_id
            ),
            CheckWarning::UnknownOwner { node_id, owner_id } => {
                format!("warning: node {} has unknown owner {}", node_id, owner_id.0)
            }
            CheckWarning::UnknownMeeting { node_id, meeting_id } => format!(
                "warning: node {} has unknown meeting {}",
                node_id, meeting_id.0
            ),
            CheckWarning::BadWidth { node_id, width } => {
                format!("warning: node {} has non-positive width {}", node_id, width)
            }
        });
    }
    if result.valid {
        lines.push("ok".to_string());
    }
    lines
}
