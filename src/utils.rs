use thiserror::Error;

use crate::board::{Board, BOARD_SIZE};
use crate::piece::{KindSource, PieceGenerator, PieceKind};

/// Why a text board could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardParseError {
    #[error("invalid number of rows: expected {size}, found {0}", size = BOARD_SIZE)]
    RowCount(usize),
    #[error("row {row} has {len} characters (expected {size})", size = BOARD_SIZE)]
    RowLength { row: usize, len: usize },
    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnknownPiece { ch: char, row: usize, col: usize },
}

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from the top (row 0). The board has
/// no empty slots, so exactly `BOARD_SIZE` rows of exactly `BOARD_SIZE`
/// characters are required. Piece ids are allocated from `gen`, which keeps
/// them unique against pieces the same generator produces later.
///
/// Valid characters:
/// - 'R', 'B', 'G', 'Y', 'P', 'O': the ordinary colors
/// - '*': `PieceKind::AreaBomb`
/// - '+': `PieceKind::CrossClear`
///
/// # Examples
/// ```
/// use chain_burst::utils::board_from_str_array;
/// use chain_burst::piece::{PieceGenerator, PieceKind};
///
/// let mut gen = PieceGenerator::with_seed(1);
/// let rows = [
///     "RBGYPORB", "GYPORBGY", "PORBGYPO", "RBGYPORB",
///     "GYPORBGY", "PORBGYPO", "RBGYPORB", "GYP*RBG+",
/// ];
/// let board = board_from_str_array(&rows, &mut gen).unwrap();
/// assert_eq!(board.get_kind(0, 0), PieceKind::Red);
/// assert_eq!(board.get_kind(7, 3), PieceKind::AreaBomb);
/// assert_eq!(board.get_kind(7, 7), PieceKind::CrossClear);
///
/// assert!(board_from_str_array(&["RXB"], &mut gen).is_err());
/// ```
pub fn board_from_str_array<K: KindSource>(
    s: &[&str],
    gen: &mut PieceGenerator<K>,
) -> Result<Board, BoardParseError> {
    if s.len() != BOARD_SIZE {
        return Err(BoardParseError::RowCount(s.len()));
    }

    let mut kinds = [[PieceKind::Red; BOARD_SIZE]; BOARD_SIZE];
    for (r, row_str) in s.iter().enumerate() {
        let len = row_str.chars().count();
        if len != BOARD_SIZE {
            return Err(BoardParseError::RowLength { row: r, len });
        }
        for (c, ch) in row_str.chars().enumerate() {
            kinds[r][c] =
                PieceKind::from_char(ch).ok_or(BoardParseError::UnknownPiece { ch, row: r, col: c })?;
        }
    }
    Ok(Board::from_kinds(&kinds, gen))
}
