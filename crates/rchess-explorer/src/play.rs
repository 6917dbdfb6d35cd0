//! Game loop against the explorer
//!
//! The explorer keeps running between moves, so the graph grows while the
//! opponent thinks. Input lines:
//!
//! - a move in coordinate notation (`e2e4`, `e7e8q`)
//! - `board`: print the current position
//! - `quit`
//!
//! Output lines: `bestmove <move>`, `illegal <text>: <reason>`,
//! `gameover <result>`.

use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use rchess_core::movegen;
use rchess_core::{Color, EngineError, Explorer, ExplorerConfig, MaterialOracle, Position};

/// Play from `root` until the game ends, input runs out or `quit`
///
/// Returns the final position.
pub fn run<R: BufRead, W: Write>(
    root: Position,
    config: ExplorerConfig,
    engine: Color,
    input: R,
    out: &mut W,
) -> Result<Position> {
    let think = config.think_time();
    let mut explorer = Explorer::new(MaterialOracle, root, config);
    explorer.start().context("starting explorer")?;
    info!("playing {engine} with {} ms per move", think.as_millis());

    let mut lines = input.lines();
    loop {
        let root = explorer.root();
        if let Some(result) = game_result(&root) {
            writeln!(out, "gameover {result}")?;
            break;
        }

        if root.side_to_move() == engine {
            thread::sleep(think);
            let reply = engine_move(&explorer, &root)?;
            writeln!(out, "bestmove {}", root.describe_move(&reply))?;
        } else {
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("reading input")?;
            match line.trim() {
                "" => continue,
                "quit" => break,
                "board" => writeln!(out, "{root}")?,
                text => match root.parse_move(text) {
                    Ok((_, child)) => {
                        explorer.commit(child).context("committing move")?;
                    }
                    Err(e) => writeln!(out, "illegal {text}: {e}")?,
                },
            }
        }
        out.flush()?;
    }
    out.flush()?;

    let report = explorer.stop();
    info!("game finished: {report}");
    Ok(explorer.root())
}

/// Commit the explorer's choice for `root` and return it
///
/// Falls back to the first legal move when nothing has been propagated to
/// the root yet.
fn engine_move(explorer: &Explorer<MaterialOracle>, root: &Position) -> Result<Position> {
    match explorer.commit_best() {
        Ok(summary) => Ok(summary.root),
        Err(EngineError::NoBestReply) => {
            let fallback = movegen::legal_children(root)
                .into_iter()
                .next()
                .context("no legal move to play")?;
            warn!("no best reply yet; playing {}", root.describe_move(&fallback));
            explorer.commit(fallback).context("committing fallback move")?;
            Ok(fallback)
        }
        Err(e) => Err(e).context("committing best move"),
    }
}

/// Final result when the side to move has no legal moves
fn game_result(pos: &Position) -> Option<String> {
    if !movegen::legal_children(pos).is_empty() {
        return None;
    }
    if movegen::is_in_check(pos) {
        Some(format!("{} wins", pos.side_to_move().opponent()))
    } else {
        Some("draw".to_string())
    }
}
