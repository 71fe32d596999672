use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};

use crate::model::board::{Board, Owner};
use crate::model::node::{MeetingId, Node, NodeId, OwnerId, Priority};
use crate::util::rich_text::plain_text;

/// Error type for building a filter descriptor
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("only one filter can be active at a time (got {0})")]
    Conflicting(String),
    #[error("invalid priority: {0}")]
    InvalidPriority(String),
    #[error("invalid search query: {0}")]
    InvalidQuery(#[from] regex::Error),
}

/// A case-insensitive literal substring query
#[derive(Debug, Clone)]
pub struct TextQuery {
    raw: String,
    re: Regex,
}

impl TextQuery {
    pub fn new(raw: &str) -> Result<Self, FilterError> {
        let re = RegexBuilder::new(&regex::escape(raw))
            .case_insensitive(true)
            .build()?;
        Ok(TextQuery {
            raw: raw.to_string(),
            re,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.re.is_match(haystack)
    }
}

impl PartialEq for TextQuery {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TextQuery {}

/// The active visibility filter. Modes are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    /// Everything visible
    #[default]
    None,
    /// Text, notes, tags, subtasks or owner names contain the query
    Text(TextQuery),
    /// Exact priority level; `Priority::None` means off
    Priority(Priority),
    /// Node carries this tag (case-insensitive)
    Tag(String),
    /// The node, its ancestors and its whole subtree
    FocusNode(NodeId),
    /// Nodes linked to this meeting
    FocusMeeting(MeetingId),
}

impl Filter {
    /// Build a filter from optional CLI/UI inputs, at most one of which may be set.
    ///
    /// A blank query and priority `0` both mean "off".
    pub fn from_parts(
        query: Option<&str>,
        priority: Option<u8>,
        tag: Option<&str>,
        focus: Option<NodeId>,
        meeting: Option<MeetingId>,
    ) -> Result<Filter, FilterError> {
        let mut active = Vec::new();

        if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
            active.push(Filter::Text(TextQuery::new(q.trim())?));
        }
        if let Some(p) = priority {
            let p = Priority::try_from(p).map_err(FilterError::InvalidPriority)?;
            if p != Priority::None {
                active.push(Filter::Priority(p));
            }
        }
        if let Some(t) = tag.map(|t| t.trim().trim_start_matches('#')) {
            if !t.is_empty() {
                active.push(Filter::Tag(t.to_string()));
            }
        }
        if let Some(id) = focus {
            active.push(Filter::FocusNode(id));
        }
        if let Some(id) = meeting {
            active.push(Filter::FocusMeeting(id));
        }

        if active.len() > 1 {
            let names: Vec<&str> = active.iter().map(|f| f.mode_name()).collect();
            return Err(FilterError::Conflicting(names.join(", ")));
        }
        Ok(active.pop().unwrap_or_default())
    }

    /// False for `None` and for the variants that carry an "off" value:
    /// `Priority::None`, a blank query, or a blank tag.
    pub fn is_active(&self) -> bool {
        match self {
            Filter::None | Filter::Priority(Priority::None) => false,
            Filter::Text(q) => !q.as_str().trim().is_empty(),
            Filter::Tag(t) => !t.trim().is_empty(),
            Filter::Priority(_) | Filter::FocusNode(_) | Filter::FocusMeeting(_) => true,
        }
    }

    /// Short name of the filter mode, used in logs and messages
    pub fn mode_name(&self) -> &'static str {
        match self {
            Filter::None => "none",
            Filter::Text(_) => "text",
            Filter::Priority(_) => "priority",
            Filter::Tag(_) => "tag",
            Filter::FocusNode(_) => "focus",
            Filter::FocusMeeting(_) => "meeting",
        }
    }

    /// True when the filter targets a node or meeting that no longer exists.
    ///
    /// Such a filter yields an empty map; callers should clear it.
    pub fn is_dangling(&self, board: &Board) -> bool {
        match self {
            Filter::FocusNode(id) => board.node(*id).is_none(),
            Filter::FocusMeeting(id) => board.meeting(*id).is_none(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::None => write!(f, "none"),
            Filter::Text(q) => write!(f, "text \"{}\"", q.as_str()),
            Filter::Priority(p) => write!(f, "priority {}", p.level()),
            Filter::Tag(t) => write!(f, "tag #{}", t),
            Filter::FocusNode(id) => write!(f, "focus node {}", id),
            Filter::FocusMeeting(id) => write!(f, "meeting {}", id.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

fn text_matches(node: &Node, query: &TextQuery, owners: &HashMap<OwnerId, &str>) -> bool {
    if query.is_match(&node.text) {
        return true;
    }
    if !node.notes.is_empty() && query.is_match(&plain_text(&node.notes)) {
        return true;
    }
    if node.tags.iter().any(|t| query.is_match(t)) {
        return true;
    }
    if node.subtasks.iter().any(|s| query.is_match(&s.text)) {
        return true;
    }
    node.owner_ids
        .iter()
        .filter_map(|id| owners.get(id))
        .any(|name| query.is_match(name))
}

fn node_matches(node: &Node, filter: &Filter, owners: &HashMap<OwnerId, &str>) -> bool {
    match filter {
        Filter::None => true,
        Filter::Text(query) => text_matches(node, query, owners),
        Filter::Priority(p) => node.priority == *p,
        Filter::Tag(tag) => node.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
        Filter::FocusNode(id) => node.id == *id,
        Filter::FocusMeeting(id) => node.meeting_ids.contains(id),
    }
}

// ---------------------------------------------------------------------------
// Closure
// ---------------------------------------------------------------------------

/// Insert `start` and its ancestor chain, stopping at a visited node or a
/// parent outside the collection.
fn include_with_ancestors(
    start: NodeId,
    by_id: &HashMap<NodeId, &Node>,
    visible: &mut HashSet<NodeId>,
) {
    let mut cursor = Some(start);
    while let Some(current) = cursor {
        let Some(node) = by_id.get(&current) else {
            break;
        };
        if !visible.insert(current) {
            break;
        }
        cursor = node.parent_id;
    }
}

/// Insert every node transitively below `root`.
fn include_descendants(root: NodeId, nodes: &[Node], visible: &mut HashSet<NodeId>) {
    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id {
            children.entry(parent).or_default().push(node.id);
        }
    }

    let mut seen = HashSet::from([root]);
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        if let Some(kids) = children.get(&current) {
            for &kid in kids {
                if seen.insert(kid) {
                    visible.insert(kid);
                    stack.push(kid);
                }
            }
        }
    }
}

/// Ids of the nodes that stay visible under `filter`.
///
/// Every match brings its full ancestor chain; a focus filter also brings the
/// focus node's whole subtree. A filter naming a missing node or meeting
/// yields an empty set.
pub fn visible_ids(nodes: &[Node], filter: &Filter, owners: &[Owner]) -> HashSet<NodeId> {
    if !filter.is_active() {
        return nodes.iter().map(|n| n.id).collect();
    }

    let mut by_id: HashMap<NodeId, &Node> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.entry(node.id).or_insert(node);
    }
    let owner_names: HashMap<OwnerId, &str> =
        owners.iter().map(|o| (o.id, o.name.as_str())).collect();

    let mut visible = HashSet::new();
    let mut matched = 0usize;

    match filter {
        Filter::FocusNode(id) => {
            if by_id.contains_key(id) {
                matched = 1;
                include_with_ancestors(*id, &by_id, &mut visible);
                include_descendants(*id, nodes, &mut visible);
            }
        }
        _ => {
            for node in nodes {
                if node_matches(node, filter, &owner_names) {
                    matched += 1;
                    include_with_ancestors(node.id, &by_id, &mut visible);
                }
            }
        }
    }

    log::debug!(
        "event=filter mode={} nodes={} matched={} visible={}",
        filter.mode_name(),
        nodes.len(),
        matched,
        visible.len()
    );
    visible
}

/// The visible subset of `nodes`, in original order.
pub fn filter_visible(nodes: &[Node], filter: &Filter, owners: &[Owner]) -> Vec<Node> {
    if !filter.is_active() {
        return nodes.to_vec();
    }
    let visible = visible_ids(nodes, filter, owners);
    nodes
        .iter()
        .filter(|n| visible.contains(&n.id))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::Meeting;
    use crate::model::node::Subtask;
    use pretty_assertions::assert_eq;

    fn node(id: u64, parent: Option<u64>, text: &str) -> Node {
        Node::new(NodeId(id), parent.map(NodeId), text)
    }

    /// 1 Launch
    /// ├── 2 Marketing
    /// │   └── 4 Press kit
    /// │       └── 6 Fix urgent typo
    /// └── 3 Engineering
    ///     └── 5 Backend
    /// 7 Personal
    fn sample_nodes() -> Vec<Node> {
        let mut nodes = vec![
            node(1, None, "Launch"),
            node(2, Some(1), "Marketing"),
            node(3, Some(1), "Engineering"),
            node(4, Some(2), "Press kit"),
            node(5, Some(3), "Backend"),
            node(6, Some(4), "Fix urgent typo"),
            node(7, None, "Personal"),
        ];
        nodes[4].priority = Priority::P1;
        nodes[6].priority = Priority::P1;
        nodes[2].tags = vec!["Infra".to_string()];
        nodes[3].notes = "<p>Ask <b>Dana</b> about the logo</p>".to_string();
        nodes[4].subtasks = vec![Subtask {
            text: "Migrate database".to_string(),
            done: false,
        }];
        nodes[4].owner_ids = vec![OwnerId(1)];
        nodes[5].meeting_ids = vec![MeetingId(10)];
        nodes[6].meeting_ids = vec![MeetingId(10)];
        nodes
    }

    fn owners() -> Vec<Owner> {
        vec![Owner {
            id: OwnerId(1),
            name: "Quentin".to_string(),
        }]
    }

    fn ids(nodes: &[Node]) -> Vec<u64> {
        nodes.iter().map(|n| n.id.0).collect()
    }

    fn text(q: &str) -> Filter {
        Filter::Text(TextQuery::new(q).unwrap())
    }

    // --- None ---

    #[test]
    fn test_none_is_identity() {
        let nodes = sample_nodes();
        let out = filter_visible(&nodes, &Filter::None, &owners());
        assert_eq!(out, nodes);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_visible(&[], &text("x"), &[]).is_empty());
        assert!(filter_visible(&[], &Filter::None, &[]).is_empty());
    }

    // --- Text ---

    #[test]
    fn test_text_match_deep_leaf_brings_ancestors() {
        let out = filter_visible(&sample_nodes(), &text("urgent"), &owners());
        assert_eq!(ids(&out), vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let out = filter_visible(&sample_nodes(), &text("URGENT"), &owners());
        assert_eq!(ids(&out), vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_text_matches_plain_text_notes() {
        let out = filter_visible(&sample_nodes(), &text("ask dana"), &owners());
        assert_eq!(ids(&out), vec![1, 2, 4]);
    }

    #[test]
    fn test_text_does_not_match_markup() {
        let out = filter_visible(&sample_nodes(), &text("<b>"), &owners());
        assert!(out.is_empty());
    }

    #[test]
    fn test_text_matches_tag() {
        let out = filter_visible(&sample_nodes(), &text("infra"), &owners());
        assert_eq!(ids(&out), vec![1, 3]);
    }

    #[test]
    fn test_text_matches_subtask() {
        let out = filter_visible(&sample_nodes(), &text("database"), &owners());
        assert_eq!(ids(&out), vec![1, 3, 5]);
    }

    #[test]
    fn test_text_matches_owner_name() {
        let out = filter_visible(&sample_nodes(), &text("quent"), &owners());
        assert_eq!(ids(&out), vec![1, 3, 5]);
    }

    #[test]
    fn test_text_unknown_owner_ignored() {
        let out = filter_visible(&sample_nodes(), &text("quent"), &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_text_query_is_literal() {
        let mut nodes = sample_nodes();
        nodes[6].text = "Budget (Q3)".to_string();
        let out = filter_visible(&nodes, &text("(q3"), &owners());
        assert_eq!(ids(&out), vec![7]);
    }

    // --- Priority / tag ---

    #[test]
    fn test_priority_filter() {
        let out = filter_visible(&sample_nodes(), &Filter::Priority(Priority::P1), &owners());
        assert_eq!(ids(&out), vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_priority_none_is_off() {
        let mut nodes = vec![
            Node::new(NodeId(1), None, "unprioritized"),
            Node::new(NodeId(2), None, "urgent"),
        ];
        nodes[1].priority = Priority::P2;

        let filter = Filter::Priority(Priority::None);
        assert!(!filter.is_active());
        let out = filter_visible(&nodes, &filter, &[]);
        assert_eq!(ids(&out), vec![1, 2]);
        assert_eq!(visible_ids(&nodes, &filter, &[]).len(), 2);
    }

    #[test]
    fn test_blank_text_and_tag_are_off() {
        let nodes = sample_nodes();
        let all: Vec<u64> = nodes.iter().map(|n| n.id.0).collect();
        for filter in [
            Filter::Text(TextQuery::new("").unwrap()),
            Filter::Tag("  ".into()),
        ] {
            assert!(!filter.is_active());
            assert_eq!(ids(&filter_visible(&nodes, &filter, &owners())), all);
        }
    }

    #[test]
    fn test_tag_filter_exact_and_case_insensitive() {
        let out = filter_visible(&sample_nodes(), &Filter::Tag("infra".into()), &owners());
        assert_eq!(ids(&out), vec![1, 3]);
        let out = filter_visible(&sample_nodes(), &Filter::Tag("inf".into()), &owners());
        assert!(out.is_empty());
    }

    // --- Focus ---

    #[test]
    fn test_focus_is_ancestors_self_and_descendants() {
        let out = filter_visible(&sample_nodes(), &Filter::FocusNode(NodeId(2)), &owners());
        assert_eq!(ids(&out), vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_focus_root_is_whole_tree_only() {
        let out = filter_visible(&sample_nodes(), &Filter::FocusNode(NodeId(1)), &owners());
        assert_eq!(ids(&out), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_focus_stale_id_is_empty() {
        let out = filter_visible(&sample_nodes(), &Filter::FocusNode(NodeId(99)), &owners());
        assert!(out.is_empty());
    }

    // --- Meeting ---

    #[test]
    fn test_meeting_filter() {
        let out = filter_visible(&sample_nodes(), &Filter::FocusMeeting(MeetingId(10)), &owners());
        assert_eq!(ids(&out), vec![1, 2, 4, 6, 7]);
    }

    #[test]
    fn test_meeting_unknown_is_empty() {
        let out = filter_visible(&sample_nodes(), &Filter::FocusMeeting(MeetingId(11)), &owners());
        assert!(out.is_empty());
    }

    // --- Malformed input ---

    #[test]
    fn test_dangling_parent_stops_ancestor_walk() {
        let nodes = vec![node(1, Some(42), "orphan urgent"), node(2, None, "other")];
        let out = filter_visible(&nodes, &text("urgent"), &[]);
        assert_eq!(ids(&out), vec![1]);
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let nodes = vec![node(1, Some(2), "urgent a"), node(2, Some(1), "b")];
        let out = filter_visible(&nodes, &text("urgent"), &[]);
        assert_eq!(ids(&out), vec![1, 2]);
        let out = filter_visible(&nodes, &Filter::FocusNode(NodeId(1)), &[]);
        assert_eq!(ids(&out), vec![1, 2]);
    }

    // --- Descriptor ---

    #[test]
    fn test_from_parts_none() {
        let f = Filter::from_parts(None, None, None, None, None).unwrap();
        assert_eq!(f, Filter::None);
    }

    #[test]
    fn test_from_parts_blank_query_and_zero_priority_are_off() {
        let f = Filter::from_parts(Some("  "), Some(0), Some("#"), None, None).unwrap();
        assert_eq!(f, Filter::None);
    }

    #[test]
    fn test_from_parts_single_mode() {
        let f = Filter::from_parts(None, Some(2), None, None, None).unwrap();
        assert_eq!(f, Filter::Priority(Priority::P2));
        let f = Filter::from_parts(None, None, Some("#infra"), None, None).unwrap();
        assert_eq!(f, Filter::Tag("infra".to_string()));
        let f = Filter::from_parts(Some(" urgent "), None, None, None, None).unwrap();
        assert_eq!(f, text("urgent"));
    }

    #[test]
    fn test_from_parts_conflict() {
        let err = Filter::from_parts(Some("x"), None, None, Some(NodeId(1)), None).unwrap_err();
        assert!(matches!(err, FilterError::Conflicting(_)));
        assert!(err.to_string().contains("text, focus"));
    }

    #[test]
    fn test_from_parts_bad_priority() {
        let err = Filter::from_parts(None, Some(5), None, None, None).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPriority(_)));
    }

    #[test]
    fn test_is_dangling() {
        let board = Board {
            nodes: sample_nodes(),
            owners: owners(),
            meetings: vec![Meeting {
                id: MeetingId(10),
                title: "Weekly".to_string(),
                date: None,
            }],
        };
        assert!(!Filter::FocusNode(NodeId(2)).is_dangling(&board));
        assert!(Filter::FocusNode(NodeId(99)).is_dangling(&board));
        assert!(!Filter::FocusMeeting(MeetingId(10)).is_dangling(&board));
        assert!(Filter::FocusMeeting(MeetingId(3)).is_dangling(&board));
        assert!(!text("zzz").is_dangling(&board));
    }
}
