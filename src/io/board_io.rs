use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::board::Board;
use crate::ops::forest::{Forest, ForestError};

/// Error type for board file I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize board: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("invalid board: {0}")]
    Invalid(#[from] ForestError),
}

/// Load a board export (`{ nodes, owners, meetings }`) from a JSON file.
pub fn load_board(path: &Path) -> Result<Board, BoardError> {
    let text = fs::read_to_string(path).map_err(|e| BoardError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let board: Board = serde_json::from_str(&text).map_err(|e| BoardError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!(
        "event=board_load path={} nodes={} owners={} meetings={}",
        path.display(),
        board.nodes.len(),
        board.owners.len(),
        board.meetings.len()
    );
    Ok(board)
}

/// Load a board and take its nodes into a `Forest`, rejecting duplicate ids
/// and parent cycles. Used by every command that edits the tree.
pub fn load_forest(path: &Path) -> Result<(Board, Forest), BoardError> {
    let mut board = load_board(path)?;
    let nodes = std::mem::take(&mut board.nodes);
    let forest = Forest::from_nodes(nodes)?;
    Ok((board, forest))
}

/// Write a board back to disk as pretty JSON.
pub fn save_board(path: &Path, board: &Board) -> Result<(), BoardError> {
    let mut content = serde_json::to_string_pretty(board)?;
    content.push('\n');
    atomic_write(path, content.as_bytes()).map_err(|e| BoardError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!(
        "event=board_save path={} nodes={}",
        path.display(),
        board.nodes.len()
    );
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
