//! The game board and its gravity/refill step.
//!
//! `Board` is a fixed `BOARD_SIZE` x `BOARD_SIZE` grid of `Piece`s. Outside of
//! an in-flight clear/collapse step every slot holds a live piece; cleared
//! pieces stay in their slot with `matched` set until `collapse_columns`
//! compacts the column and refills it from the top.
use std::fmt;

use crate::piece::{KindSource, Piece, PieceGenerator, PieceKind, Pos};

/// Defines the size of the game board (width and height).
/// The board is always square: a `BOARD_SIZE` of 8 means an 8x8 grid.
pub const BOARD_SIZE: usize = 8;

/// Represents the game board as a 2D grid of `Piece`s, indexed `[row][col]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    grid: [[Piece; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Fills every slot independently with a freshly generated piece.
    ///
    /// No attempt is made to avoid pre-existing runs or to guarantee that a
    /// move exists.
    ///
    /// # Examples
    /// ```
    /// use chain_burst::board::{Board, BOARD_SIZE};
    /// use chain_burst::piece::PieceGenerator;
    ///
    /// let mut gen = PieceGenerator::with_seed(3);
    /// let board = Board::initialize(&mut gen, 1);
    /// assert!(board.is_settled());
    /// assert_eq!(gen.issued(), (BOARD_SIZE * BOARD_SIZE) as u64);
    /// ```
    pub fn initialize<K: KindSource>(gen: &mut PieceGenerator<K>, level: u32) -> Self {
        let grid = std::array::from_fn(|r| std::array::from_fn(|c| gen.generate(r, c, level)));
        Board { grid }
    }

    /// Builds a board from explicit kinds, allocating ids from `gen`.
    ///
    /// Useful for tests and fixed scenarios. See also
    /// [`crate::utils::board_from_str_array`].
    pub fn from_kinds<K: KindSource>(
        kinds: &[[PieceKind; BOARD_SIZE]; BOARD_SIZE],
        gen: &mut PieceGenerator<K>,
    ) -> Self {
        let grid = std::array::from_fn(|r| std::array::from_fn(|c| gen.spawn(r, c, kinds[r][c])));
        Board { grid }
    }

    /// Returns the piece in slot `pos`.
    ///
    /// # Panics
    /// Panics if `pos` is outside the board.
    pub fn piece(&self, pos: Pos) -> &Piece {
        &self.grid[pos.row][pos.col]
    }

    /// Returns the kind of the piece at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the board dimensions.
    pub fn get_kind(&self, r: usize, c: usize) -> PieceKind {
        self.grid[r][c].kind
    }

    /// Returns an immutable reference to the underlying 2D grid.
    pub fn get_grid(&self) -> &[[Piece; BOARD_SIZE]; BOARD_SIZE] {
        &self.grid
    }

    /// Iterates over every piece, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.grid.iter().flatten()
    }

    /// Replaces the slot at `pos` with `piece`, rewriting its position to match.
    pub fn set_piece(&mut self, pos: Pos, mut piece: Piece) {
        piece.row = pos.row;
        piece.col = pos.col;
        self.grid[pos.row][pos.col] = piece;
    }

    /// Exchanges the contents (identity, kind, flags) of two slots.
    ///
    /// Each piece's `row`/`col` is rewritten to its new slot.
    pub fn swap(&mut self, a: Pos, b: Pos) {
        let first = self.grid[a.row][a.col];
        let second = self.grid[b.row][b.col];
        self.set_piece(a, second);
        self.set_piece(b, first);
    }

    /// Flags every position in `cells` as cleared (and animating, for the renderer).
    pub fn mark_cleared<'a>(&mut self, cells: impl IntoIterator<Item = &'a Pos>) {
        for pos in cells {
            let piece = &mut self.grid[pos.row][pos.col];
            piece.matched = true;
            piece.animating = true;
        }
    }

    /// Number of slots currently flagged as cleared.
    pub fn cleared_count(&self) -> usize {
        self.pieces().filter(|p| p.matched).count()
    }

    /// `true` when no slot is flagged as cleared, i.e. the board is fully populated.
    pub fn is_settled(&self) -> bool {
        self.pieces().all(|p| !p.matched)
    }

    /// `true` when every piece's `row`/`col` equals the slot it sits in.
    pub fn positions_consistent(&self) -> bool {
        self.grid.iter().enumerate().all(|(r, row)| {
            row.iter()
                .enumerate()
                .all(|(c, piece)| piece.row == r && piece.col == c)
        })
    }

    /// Applies gravity and refill to every column.
    ///
    /// Per column, from the bottom up: surviving (non-cleared) pieces keep
    /// their relative order and are packed against the bottom; the vacated
    /// slots at the top are filled with pieces from `gen`, generated for
    /// `level`. Every piece's position is rewritten to its new slot. Pieces
    /// that were spawned or moved get `animating` set, the rest get it cleared.
    ///
    /// # Returns
    /// The number of pieces spawned to refill the board.
    pub fn collapse_columns<K: KindSource>(
        &mut self,
        gen: &mut PieceGenerator<K>,
        level: u32,
    ) -> usize {
        let mut spawned = 0;
        for c in 0..BOARD_SIZE {
            let mut write_row = BOARD_SIZE; // one past the next slot to fill, counting upwards
            for r in (0..BOARD_SIZE).rev() {
                let mut piece = self.grid[r][c];
                if piece.matched {
                    continue;
                }
                write_row -= 1;
                piece.animating = write_row != r;
                self.set_piece(Pos::new(write_row, c), piece);
            }
            // Rows 0..write_row were vacated.
            for r in (0..write_row).rev() {
                let mut fresh = gen.generate(r, c, level);
                fresh.animating = true;
                self.grid[r][c] = fresh;
                spawned += 1;
            }
        }
        spawned
    }

    /// Generates a string representation of the board with an optional highlighted position.
    ///
    /// The output includes row and column numbers and uses ANSI escape codes for piece colors.
    /// Special pieces show their symbol; the highlighted slot shows `[]`, cleared slots `..`.
    pub fn to_string_with_highlight(&self, pos: Option<Pos>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for c_idx in 0..BOARD_SIZE {
            output.push_str(&format!("{:<2}", c_idx));
        }
        output.push('\n');

        for r_idx in 0..BOARD_SIZE {
            output.push_str(&format!("{:<2}", r_idx));

            for c_idx in 0..BOARD_SIZE {
                let piece = &self.grid[r_idx][c_idx];
                let is_highlight = pos == Some(Pos::new(r_idx, c_idx));
                let content = if is_highlight {
                    "[]".to_string()
                } else if piece.matched {
                    "..".to_string()
                } else if piece.is_special() {
                    format!("{} ", piece.kind.to_char())
                } else {
                    "  ".to_string()
                };
                output.push_str(&format!(
                    "\x1b[1;{}m{}\x1b[m",
                    piece.kind.to_ansi_color_code(),
                    content
                ));
            }
            if r_idx < BOARD_SIZE - 1 {
                output.push('\n');
            }
        }

        output
    }

    /// Plain character rows, one string per row, as accepted by
    /// [`crate::utils::board_from_str_array`].
    pub fn to_rows(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| row.iter().map(|p| p.kind.to_char()).collect())
            .collect()
    }
}

impl fmt::Display for Board {
    /// Formats the board for display using `to_string_with_highlight(None)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}
