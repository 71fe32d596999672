use serde::{Deserialize, Serialize};

use super::node::DEFAULT_NODE_WIDTH;

/// Configuration from mindtree.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap between a parent's right edge and its children's left edge
    #[serde(default = "default_horizontal_gap")]
    pub horizontal_gap: f64,
    /// Gap between sibling subtrees; root trees are separated by twice this
    #[serde(default = "default_vertical_gap")]
    pub vertical_gap: f64,
    #[serde(default = "default_margin")]
    pub margin_x: f64,
    #[serde(default = "default_margin")]
    pub margin_y: f64,
    /// Width given to nodes created from the CLI
    #[serde(default = "default_width")]
    pub default_width: f64,
    #[serde(default)]
    pub heights: HeightMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            horizontal_gap: default_horizontal_gap(),
            vertical_gap: default_vertical_gap(),
            margin_x: default_margin(),
            margin_y: default_margin(),
            default_width: default_width(),
            heights: HeightMetrics::default(),
        }
    }
}

/// Row heights used to derive a node card's height from its content.
///
/// A node with no subtasks and no links is `base + metadata_row` high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightMetrics {
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(default = "default_subtask_row")]
    pub subtask_row: f64,
    #[serde(default = "default_metadata_row")]
    pub metadata_row: f64,
    #[serde(default = "default_link_row")]
    pub link_row: f64,
}

impl Default for HeightMetrics {
    fn default() -> Self {
        HeightMetrics {
            base: default_base(),
            subtask_row: default_subtask_row(),
            metadata_row: default_metadata_row(),
            link_row: default_link_row(),
        }
    }
}

fn default_horizontal_gap() -> f64 {
    120.0
}

fn default_vertical_gap() -> f64 {
    20.0
}

fn default_margin() -> f64 {
    50.0
}

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_base() -> f64 {
    36.0
}

fn default_subtask_row() -> f64 {
    28.0
}

fn default_metadata_row() -> f64 {
    24.0
}

fn default_link_row() -> f64 {
    24.0
}
