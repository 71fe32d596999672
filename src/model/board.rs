use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::node::{MeetingId, Node, NodeId, OwnerId};

/// A person tasks can be assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
}

/// A meeting that nodes can be linked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Full editor snapshot: every node plus the owner and meeting directories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Nodes in display order (root order and sibling order follow this)
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

impl Board {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn meeting(&self, id: MeetingId) -> Option<&Meeting> {
        self.meetings.iter().find(|m| m.id == id)
    }
}
