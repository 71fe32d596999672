use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io;
use crate::io::config_io;
use crate::io::lock::BoardLock;
use crate::model::board::Board;
use crate::model::config::LayoutConfig;
use crate::model::node::Priority;
use crate::ops::check::check_board;
use crate::ops::filter::{Filter, FilterError, filter_visible, visible_ids};
use crate::ops::forest::Forest;
use crate::ops::pipeline::compute_visible_layout;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let config_path = cli.config.as_deref();

    match cli.command {
        // Read commands
        Commands::Layout(args) => cmd_layout(args, config_path, json),
        Commands::Outline(args) => cmd_outline(args, json),
        Commands::Filter(args) => cmd_filter(args, json),
        Commands::Check(args) => cmd_check(args, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, config_path, json),
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Rm(args) => cmd_rm(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_filter(args: &FilterArgs) -> Result<Filter, FilterError> {
    Filter::from_parts(
        args.query.as_deref(),
        args.priority,
        args.tag.as_deref(),
        args.focus,
        args.meeting,
    )
}

/// Resolve the filter for a board, clearing it when its target is gone so a
/// stale focus never renders an empty map.
fn active_filter(args: &FilterArgs, board: &Board) -> Result<Filter, Box<dyn std::error::Error>> {
    let filter = build_filter(args)?;
    if filter.is_dangling(board) {
        log::warn!("event=filter_cleared reason=dangling filter={}", filter);
        eprintln!("note: {} no longer exists; showing the full map", filter);
        return Ok(Filter::None);
    }
    Ok(filter)
}

fn load_config(explicit: Option<&Path>, board: &Path) -> Result<LayoutConfig, config_io::ConfigError> {
    config_io::resolve_config(explicit, board)
}

/// Reassemble a board from its directories and an edited forest, then save.
fn save_forest(path: &Path, mut board: Board, forest: Forest) -> CmdResult {
    board.nodes = forest.into_nodes();
    board_io::save_board(path, &board)?;
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_layout(args: ViewArgs, config_path: Option<&Path>, json: bool) -> CmdResult {
    let board = board_io::load_board(&args.board)?;
    let config = load_config(config_path, &args.board)?;
    let filter = active_filter(&args.filter, &board)?;

    let layout = compute_visible_layout(&board, &filter, &config);

    if json {
        let out = layout_to_json(&layout.nodes, &layout.summary, filter.to_string());
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_lines(&format_layout(&layout.nodes, &layout.summary));
    }
    Ok(())
}

fn cmd_outline(args: ViewArgs, json: bool) -> CmdResult {
    let board = board_io::load_board(&args.board)?;
    let filter = active_filter(&args.filter, &board)?;
    let visible = filter_visible(&board.nodes, &filter, &board.owners);

    if json {
        println!("{}", serde_json::to_string_pretty(&outline_to_json(&visible))?);
    } else {
        print_lines(&format_outline(&visible));
    }
    Ok(())
}

fn cmd_filter(args: ViewArgs, json: bool) -> CmdResult {
    let board = board_io::load_board(&args.board)?;
    let filter = active_filter(&args.filter, &board)?;
    let ids = visible_ids(&board.nodes, &filter, &board.owners);
    let visible: Vec<_> = board
        .nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| ids.contains(id))
        .collect();

    if json {
        let out = FilterJson {
            filter: filter.to_string(),
            visible,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for id in visible {
            println!("{}", id);
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, json: bool) -> CmdResult {
    let board = board_io::load_board(&args.board)?;
    let result = check_board(&board);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_lines(&format_check(&result));
    }

    if result.valid {
        Ok(())
    } else {
        Err(format!("{} error(s) found", result.errors.len()).into())
    }
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, config_path: Option<&Path>, json: bool) -> CmdResult {
    let priority = args
        .priority
        .map(Priority::try_from)
        .transpose()
        .map_err(Box::<dyn std::error::Error>::from)?;
    let config = load_config(config_path, &args.board)?;

    let _lock = BoardLock::acquire_default(&args.board)?;
    let (board, forest) = board_io::load_forest(&args.board)?;
    let mut forest = forest.with_default_width(config.default_width);

    let id = match args.parent {
        Some(parent) => forest.add_child(parent, args.text)?,
        None => forest.add_root(args.text),
    };
    if let Some(node) = forest.get_mut(id) {
        for tag in &args.tag {
            let tag = tag.trim_start_matches('#').to_string();
            if !tag.is_empty() && !node.tags.contains(&tag) {
                node.tags.push(tag);
            }
        }
        if let Some(p) = priority {
            node.priority = p;
        }
    }
    save_forest(&args.board, board, forest)?;
    log::info!("event=node_added id={} parent={:?}", id, args.parent.map(|p| p.0));

    if json {
        let out = MutationJson {
            action: "add",
            ids: vec![id],
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    let new_parent = if args.root { None } else { args.parent };

    let _lock = BoardLock::acquire_default(&args.board)?;
    let (board, mut forest) = board_io::load_forest(&args.board)?;
    forest.reparent(args.id, new_parent)?;
    save_forest(&args.board, board, forest)?;

    if json {
        let out = MutationJson {
            action: "move",
            ids: vec![args.id],
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match new_parent {
            Some(p) => println!("moved {} under {}", args.id, p),
            None => println!("moved {} to root", args.id),
        }
    }
    Ok(())
}

fn cmd_rm(args: RmArgs, json: bool) -> CmdResult {
    let _lock = BoardLock::acquire_default(&args.board)?;
    let (board, mut forest) = board_io::load_forest(&args.board)?;
    let removed = forest.remove(args.id)?;
    save_forest(&args.board, board, forest)?;

    let ids: Vec<_> = removed.iter().map(|n| n.id).collect();
    if json {
        let out = MutationJson {
            action: "remove",
            ids,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "removed {}",
            ids.iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
