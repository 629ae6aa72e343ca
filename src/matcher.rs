//! Match detection, power-up expansion, and the clear step.
//!
//! All results are sets keyed by board position, so overlapping runs and
//! overlapping power-up areas collapse to one entry per cell.
use std::collections::BTreeSet;

use crate::board::{Board, BOARD_SIZE};
use crate::piece::{PieceKind, Pos};

/// Cells selected for clearing, deduplicated by position.
pub type MatchSet = BTreeSet<Pos>;

/// Finds every run of three or more identical ordinary pieces.
///
/// Each row is scanned left to right and each column top to bottom. A special
/// piece never extends or starts a run, so specials are never part of the
/// result. Runs from both directions are unioned; a cell that ends both a row
/// run and a column run appears once.
///
/// # Examples
/// ```
/// use chain_burst::matcher::find_matches;
/// use chain_burst::piece::{PieceGenerator, Pos};
/// use chain_burst::utils::board_from_str_array;
///
/// let mut gen = PieceGenerator::with_seed(0);
/// let board = board_from_str_array(&[
///     "RRRYPORB",
///     "GYPORBGY",
///     "PORBGYPO",
///     "RBGYPORB",
///     "GYPORBGY",
///     "PORBGYPO",
///     "RBGYPORB",
///     "GYPORBGY",
/// ], &mut gen).unwrap();
/// let matches = find_matches(&board);
/// assert_eq!(matches.len(), 3);
/// assert!(matches.contains(&Pos::new(0, 2)));
/// ```
pub fn find_matches(board: &Board) -> MatchSet {
    let mut matches = MatchSet::new();
    for r in 0..BOARD_SIZE {
        scan_line(board, (0..BOARD_SIZE).map(|c| Pos::new(r, c)), &mut matches);
    }
    for c in 0..BOARD_SIZE {
        scan_line(board, (0..BOARD_SIZE).map(|r| Pos::new(r, c)), &mut matches);
    }
    matches
}

// Scans one row or column, pushing every qualifying run into `out`.
fn scan_line(board: &Board, line: impl Iterator<Item = Pos>, out: &mut MatchSet) {
    let mut run: Vec<Pos> = Vec::with_capacity(BOARD_SIZE);
    let mut run_kind: Option<PieceKind> = None;

    for pos in line {
        let kind = board.piece(pos).kind;
        let ordinary = (!kind.is_special()).then_some(kind);
        if ordinary.is_some() && ordinary == run_kind {
            run.push(pos);
            continue;
        }
        flush_run(&run, out);
        run.clear();
        run_kind = ordinary;
        if ordinary.is_some() {
            run.push(pos);
        }
    }
    flush_run(&run, out);
}

fn flush_run(run: &[Pos], out: &mut MatchSet) {
    if run.len() >= 3 {
        out.extend(run.iter().copied());
    }
}

/// Returns the cells a special piece at `pos` clears when it detonates.
///
/// - `AreaBomb`: the 3x3 neighborhood centered on `pos`, clipped to the board.
/// - `CrossClear`: the whole row and the whole column of `pos`.
///
/// Ordinary pieces have no area and yield an empty set.
pub fn expand_power_up(board: &Board, pos: Pos) -> MatchSet {
    let mut affected = MatchSet::new();
    match board.piece(pos).kind {
        PieceKind::AreaBomb => {
            let rows = pos.row.saturating_sub(1)..=(pos.row + 1).min(BOARD_SIZE - 1);
            for r in rows {
                let cols = pos.col.saturating_sub(1)..=(pos.col + 1).min(BOARD_SIZE - 1);
                for c in cols {
                    affected.insert(Pos::new(r, c));
                }
            }
        }
        PieceKind::CrossClear => {
            affected.extend((0..BOARD_SIZE).map(|c| Pos::new(pos.row, c)));
            affected.extend((0..BOARD_SIZE).map(|r| Pos::new(r, pos.col)));
        }
        _ => {}
    }
    affected
}

/// Special pieces touched by a run: those orthogonally adjacent to any matched cell.
pub fn triggered_power_ups(board: &Board, matches: &MatchSet) -> MatchSet {
    matches
        .iter()
        .flat_map(|pos| pos.neighbors())
        .filter(|n| board.piece(*n).is_special())
        .collect()
}

/// Computes the full set of cells one clear pass removes.
///
/// Runs from [`find_matches`], plus the area of every special they touch.
/// Only those touched specials detonate, once each. A special that merely
/// lies inside another special's area is cleared without expanding.
pub fn clear_set(board: &Board) -> MatchSet {
    let mut cleared = find_matches(board);
    if cleared.is_empty() {
        return cleared;
    }

    let areas: Vec<MatchSet> = triggered_power_ups(board, &cleared)
        .into_iter()
        .map(|special| expand_power_up(board, special))
        .collect();
    for area in areas {
        cleared.extend(area);
    }
    cleared
}

/// Runs one clear step on `board`.
///
/// Marks every cell of [`clear_set`] as cleared and returns how many distinct
/// cells that was. A return of 0 means nothing matched and the board was left
/// untouched; the cascade uses that as its stop signal.
pub fn remove_matches(board: &mut Board) -> usize {
    let cleared = clear_set(board);
    if cleared.is_empty() {
        return 0;
    }
    board.mark_cleared(&cleared);
    cleared.len()
}
