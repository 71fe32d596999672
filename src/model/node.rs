use serde::{Deserialize, Serialize};

/// Stable node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NodeId)
    }
}

/// Owner identifier (resolved to a name through the board's owner list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

/// Meeting identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(pub u64);

impl std::str::FromStr for MeetingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MeetingId)
    }
}

/// Node priority. Stored as `0` (none) through `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    #[default]
    None,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn level(self) -> u8 {
        match self {
            Priority::None => 0,
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::P3 => 3,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::None),
            1 => Ok(Priority::P1),
            2 => Ok(Priority::P2),
            3 => Ok(Priority::P3),
            other => Err(format!("priority must be 0-3, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.level()
    }
}

/// A hyperlink attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub label: String,
}

/// A checklist row inside a node card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A task/topic entry in the mind map.
///
/// `x`, `y` and `height` are derived: layout overwrites the position, and the
/// height pass overwrites `height` from the content before every layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub text: String,

    // --- Geometry ---
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub height: f64,

    // --- Content ---
    #[serde(default)]
    pub links: Vec<Link>,
    /// Rich-text notes (HTML fragment as produced by the editor)
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub owner_ids: Vec<OwnerId>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub meeting_ids: Vec<MeetingId>,
}

/// Default card width, kept in sync with `LayoutConfig::default_width`
pub const DEFAULT_NODE_WIDTH: f64 = 220.0;

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

impl Node {
    /// Create a node with no content and default geometry
    pub fn new(id: NodeId, parent_id: Option<NodeId>, text: impl Into<String>) -> Self {
        Node {
            id,
            parent_id,
            text: text.into(),
            x: 0.0,
            y: 0.0,
            width: DEFAULT_NODE_WIDTH,
            height: 0.0,
            links: Vec::new(),
            notes: String::new(),
            subtasks: Vec::new(),
            tags: Vec::new(),
            owner_ids: Vec::new(),
            priority: Priority::None,
            meeting_ids: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_from_u8() {
        assert_eq!(Priority::try_from(0).unwrap(), Priority::None);
        assert_eq!(Priority::try_from(3).unwrap(), Priority::P3);
        assert!(Priority::try_from(4).is_err());
    }

    #[test]
    fn test_node_deserialize_defaults() {
        let node: Node = serde_json::from_str(r#"{"id": 7, "text": "Plan"}"#).unwrap();
        assert_eq!(node.id, NodeId(7));
        assert!(node.is_root());
        assert_eq!(node.width, DEFAULT_NODE_WIDTH);
        assert_eq!(node.priority, Priority::None);
        assert!(node.subtasks.is_empty());
    }

    #[test]
    fn test_node_camel_case_keys() {
        let node: Node = serde_json::from_str(
            r#"{"id": 2, "parentId": 1, "ownerIds": [4], "meetingIds": [9], "priority": 2}"#,
        )
        .unwrap();
        assert_eq!(node.parent_id, Some(NodeId(1)));
        assert_eq!(node.owner_ids, vec![OwnerId(4)]);
        assert_eq!(node.meeting_ids, vec![MeetingId(9)]);
        assert_eq!(node.priority, Priority::P2);
    }

    #[test]
    fn test_node_rejects_bad_priority() {
        let result = serde_json::from_str::<Node>(r#"{"id": 1, "priority": 9}"#);
        assert!(result.is_err());
    }
}
