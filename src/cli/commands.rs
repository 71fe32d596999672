use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::node::{MeetingId, NodeId};

#[derive(Parser)]
#[command(name = "mt", about = concat!("mindtree v", env!("CARGO_PKG_VERSION"), " - lay out and filter a mind-map task tree"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Layout config file (default: mindtree.toml next to the board)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace (default: $MINDTREE_LOG or warn)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lay out the visible nodes and print their positions
    Layout(ViewArgs),
    /// Print the visible nodes as a nested list
    Outline(ViewArgs),
    /// Print the ids of the nodes a filter keeps visible
    Filter(ViewArgs),
    /// Validate board integrity
    Check(CheckArgs),
    /// Add a node (root, or child with --parent)
    Add(AddArgs),
    /// Move a node under a new parent, or make it a root
    Mv(MvArgs),
    /// Remove a node and its whole subtree
    Rm(RmArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

/// Filter flags; at most one may be given
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Case-insensitive text search over text, notes, tags, subtasks and owners
    #[arg(short, long)]
    pub query: Option<String>,
    /// Only nodes with this priority (1-3; 0 = off)
    #[arg(long)]
    pub priority: Option<u8>,
    /// Only nodes carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Focus one node: its ancestors, itself and its subtree
    #[arg(long, value_name = "ID")]
    pub focus: Option<NodeId>,
    /// Only nodes linked to this meeting
    #[arg(long, value_name = "ID")]
    pub meeting: Option<MeetingId>,
}

#[derive(Args)]
pub struct ViewArgs {
    /// Board JSON file
    pub board: PathBuf,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Board JSON file
    pub board: PathBuf,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Board JSON file
    pub board: PathBuf,
    /// Node text
    pub text: String,
    /// Parent node ID (default: new root)
    #[arg(long, value_name = "ID")]
    pub parent: Option<NodeId>,
    /// Tag to attach (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// Priority 0-3
    #[arg(long)]
    pub priority: Option<u8>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Board JSON file
    pub board: PathBuf,
    /// Node to move
    pub id: NodeId,
    /// New parent node ID
    #[arg(long, value_name = "ID", required_unless_present = "root", conflicts_with = "root")]
    pub parent: Option<NodeId>,
    /// Detach the node and make it a root
    #[arg(long)]
    pub root: bool,
}

#[derive(Args)]
pub struct RmArgs {
    /// Board JSON file
    pub board: PathBuf,
    /// Node to remove (with its subtree)
    pub id: NodeId,
}
