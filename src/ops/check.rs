use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::board::Board;
use crate::model::node::{MeetingId, NodeId, OwnerId};

/// Structured result from `mt check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A structural problem that would break layout or reparenting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two nodes share an id
    #[serde(rename = "duplicate_id")]
    DuplicateId { node_id: NodeId },
    /// A node names itself as parent
    #[serde(rename = "self_parent")]
    SelfParent { node_id: NodeId },
    /// Parent links loop; ids listed in walk order
    #[serde(rename = "cycle")]
    Cycle { node_ids: Vec<NodeId> },
}

/// A non-fatal inconsistency (the core degrades gracefully).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// Parent id names no node; the node is laid out as a root
    #[serde(rename = "dangling_parent")]
    DanglingParent { node_id: NodeId, parent_id: NodeId },
    #[serde(rename = "unknown_owner")]
    UnknownOwner { node_id: NodeId, owner_id: OwnerId },
    #[serde(rename = "unknown_meeting")]
    UnknownMeeting { node_id: NodeId, meeting_id: MeetingId },
    /// Width must be positive for the horizontal layering to make sense
    #[serde(rename = "bad_width")]
    BadWidth { node_id: NodeId, width: f64 },
}

/// Validate a board and return structured results.
///
/// This is a read-only operation.
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();

    let mut seen = HashSet::new();
    for node in &board.nodes {
        if !seen.insert(node.id) {
            result.errors.push(CheckError::DuplicateId { node_id: node.id });
        }
    }

    let parents: HashMap<NodeId, Option<NodeId>> = board
        .nodes
        .iter()
        .map(|n| (n.id, n.parent_id))
        .collect();
    let owners: HashSet<OwnerId> = board.owners.iter().map(|o| o.id).collect();
    let meetings: HashSet<MeetingId> = board.meetings.iter().map(|m| m.id).collect();

    for node in &board.nodes {
        match node.parent_id {
            Some(p) if p == node.id => {
                result.errors.push(CheckError::SelfParent { node_id: node.id });
            }
            Some(p) if !parents.contains_key(&p) => {
                result.warnings.push(CheckWarning::DanglingParent {
                    node_id: node.id,
                    parent_id: p,
                });
            }
            _ => {}
        }
        for owner_id in &node.owner_ids {
            if !owners.contains(owner_id) {
                result.warnings.push(CheckWarning::UnknownOwner {
                    node_id: node.id,
                    owner_id: *owner_id,
                });
            }
        }
        for meeting_id in &node.meeting_ids {
            if !meetings.contains(meeting_id) {
                result.warnings.push(CheckWarning::UnknownMeeting {
                    node_id: node.id,
                    meeting_id: *meeting_id,
                });
            }
        }
        if node.width.is_nan() || node.width <= 0.0 {
            result.warnings.push(CheckWarning::BadWidth {
                node_id: node.id,
                width: node.width,
            });
        }
    }

    for cycle in find_cycles(board, &parents) {
        result.errors.push(CheckError::Cycle { node_ids: cycle });
    }

    result.valid = result.errors.is_empty();
    result
}

/// Each cycle of length two or more, reported once, starting from the
/// member that appears first in the board.
fn find_cycles(board: &Board, parents: &HashMap<NodeId, Option<NodeId>>) -> Vec<Vec<NodeId>> {
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut cycles = Vec::new();

    for node in &board.nodes {
        if settled.contains(&node.id) {
            continue;
        }
        let mut path: Vec<NodeId> = Vec::new();
        let mut on_path: HashSet<NodeId> = HashSet::new();
        let mut cursor = Some(node.id);

        while let Some(current) = cursor {
            if settled.contains(&current) {
                break;
            }
            if !on_path.insert(current) {
                let start = path.iter().position(|&id| id == current).unwrap_or(0);
                let cycle = path[start..].to_vec();
                if cycle.len() > 1 {
                    cycles.push(cycle);
                }
                break;
            }
            path.push(current);
            cursor = parents.get(&current).copied().flatten();
        }
        settled.extend(path);
    }

    cycles
}
