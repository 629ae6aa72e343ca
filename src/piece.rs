//! Pieces, positions, and the piece generator.
//!
//! This module defines:
//! - `PieceKind`: the six ordinary colors plus the two special kinds.
//! - `Piece`: a single occupant of a board slot, with identity and render flags.
//! - `Pos`: a (row, column) coordinate on the board.
//! - `KindSource`: where the next piece kind comes from (`RandomKinds`, `ScriptedKinds`).
//! - `PieceGenerator`: turns kinds into pieces with fresh, unique identities.
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::board::BOARD_SIZE;
use crate::config::GameConfig;

/// The type tag of a piece.
///
/// The first six variants are ordinary colors that form runs. `AreaBomb` and
/// `CrossClear` are special pieces: they never match by type, they detonate
/// when an ordinary run touches them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    /// Clears the 3x3 neighborhood around itself.
    AreaBomb,
    /// Clears its whole row and its whole column.
    CrossClear,
}

impl PieceKind {
    /// The ordinary colors, in generation order.
    pub const ORDINARY: [PieceKind; 6] = [
        PieceKind::Red,
        PieceKind::Blue,
        PieceKind::Green,
        PieceKind::Yellow,
        PieceKind::Purple,
        PieceKind::Orange,
    ];

    /// The special kinds, in generation order.
    pub const SPECIAL: [PieceKind; 2] = [PieceKind::AreaBomb, PieceKind::CrossClear];

    /// Returns `true` for `AreaBomb` and `CrossClear`.
    pub fn is_special(&self) -> bool {
        matches!(self, PieceKind::AreaBomb | PieceKind::CrossClear)
    }

    /// Converts the kind to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_burst::piece::PieceKind;
    /// assert_eq!(PieceKind::Red.to_char(), 'R');
    /// assert_eq!(PieceKind::AreaBomb.to_char(), '*');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            PieceKind::Red => 'R',
            PieceKind::Blue => 'B',
            PieceKind::Green => 'G',
            PieceKind::Yellow => 'Y',
            PieceKind::Purple => 'P',
            PieceKind::Orange => 'O',
            PieceKind::AreaBomb => '*',
            PieceKind::CrossClear => '+',
        }
    }

    /// Parses the character produced by [`PieceKind::to_char`].
    pub fn from_char(c: char) -> Option<PieceKind> {
        match c {
            'R' => Some(PieceKind::Red),
            'B' => Some(PieceKind::Blue),
            'G' => Some(PieceKind::Green),
            'Y' => Some(PieceKind::Yellow),
            'P' => Some(PieceKind::Purple),
            'O' => Some(PieceKind::Orange),
            '*' => Some(PieceKind::AreaBomb),
            '+' => Some(PieceKind::CrossClear),
            _ => None,
        }
    }

    /// Returns the ANSI background color code string for terminal output.
    pub(crate) fn to_ansi_color_code(&self) -> &'static str {
        match self {
            PieceKind::Red => "41",
            PieceKind::Green => "42",
            PieceKind::Yellow => "43",
            PieceKind::Blue => "44",
            PieceKind::Purple => "45",
            PieceKind::Orange => "46",
            PieceKind::AreaBomb => "40",
            PieceKind::CrossClear => "47",
        }
    }
}

/// Unique identity of a piece. No two live pieces share an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u64);

/// A (row, column) coordinate. Row 0 is the top of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }

    /// Returns `true` if the position lies on the board.
    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Manhattan distance between two positions.
    pub fn distance(&self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Orthogonal adjacency: exactly one step up, down, left, or right.
    pub fn is_adjacent(&self, other: Pos) -> bool {
        self.distance(other) == 1
    }

    /// The in-bounds orthogonal neighbors of this position.
    pub fn neighbors(&self) -> impl Iterator<Item = Pos> + '_ {
        const DELTAS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        DELTAS.iter().filter_map(move |&(dr, dc)| {
            let r = self.row.checked_add_signed(dr)?;
            let c = self.col.checked_add_signed(dc)?;
            let p = Pos::new(r, c);
            p.in_bounds().then_some(p)
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Pos {
    fn from((row, col): (usize, usize)) -> Self {
        Pos::new(row, col)
    }
}

/// A single board occupant.
///
/// `row`/`col` always equal the slot the piece sits in; `Board` keeps them in
/// sync on every mutation. `matched` and `animating` are transient flags for the
/// renderer: `matched` marks cells cleared in the current pass, `animating` marks
/// pieces that were just spawned or shifted down by gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub row: usize,
    pub col: usize,
    pub matched: bool,
    pub animating: bool,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, row: usize, col: usize) -> Self {
        Piece {
            id,
            kind,
            row,
            col,
            matched: false,
            animating: false,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.col)
    }

    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }
}

/// Decides which kind the next generated piece has.
pub trait KindSource {
    /// Returns the kind for a piece generated while the game is at `level`.
    fn next_kind(&mut self, level: u32) -> PieceKind;
}

/// Uniform ordinary colors, with a small chance of a special piece at higher levels.
///
/// Above `min_level`, each piece is a special with probability `chance`, split
/// evenly between the two special kinds. The color roll is discarded in that case.
#[derive(Clone, Debug)]
pub struct RandomKinds<R: Rng = SmallRng> {
    rng: R,
    min_level: u32,
    chance: f64,
}

impl RandomKinds<SmallRng> {
    /// Creates a source seeded with `seed`, using the default power-up odds.
    pub fn with_seed(seed: u64) -> Self {
        RandomKinds::new(SmallRng::seed_from_u64(seed), &GameConfig::default())
    }
}

impl<R: Rng> RandomKinds<R> {
    /// Creates a source drawing from `rng`, with power-up odds taken from `config`.
    pub fn new(rng: R, config: &GameConfig) -> Self {
        let chance = if config.power_up_chance.is_finite() {
            config.power_up_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        RandomKinds {
            rng,
            min_level: config.power_up_min_level,
            chance,
        }
    }
}

impl<R: Rng> KindSource for RandomKinds<R> {
    fn next_kind(&mut self, level: u32) -> PieceKind {
        let color = PieceKind::ORDINARY[self.rng.gen_range(0..PieceKind::ORDINARY.len())];
        if level > self.min_level && self.rng.gen_bool(self.chance) {
            return PieceKind::SPECIAL[self.rng.gen_range(0..PieceKind::SPECIAL.len())];
        }
        color
    }
}

/// Why a kind script was refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("a kind script needs at least one kind")]
    Empty,
    #[error("a script of only {0:?} refills the runs it clears and never settles")]
    SingleColor(PieceKind),
}

/// Replays a fixed sequence of kinds, cycling when it runs out. Level is ignored.
///
/// Used to drive exact refill sequences in tests and reproducible demos.
#[derive(Clone, Debug)]
pub struct ScriptedKinds {
    kinds: Vec<PieceKind>,
    cursor: usize,
}

impl ScriptedKinds {
    /// # Errors
    /// Returns `ScriptError::Empty` for an empty script and
    /// `ScriptError::SingleColor` when every kind is the same ordinary color:
    /// refilling from such a script rebuilds a run after every clear, so a
    /// cascade would never end.
    ///
    /// Other scripts can still keep a cascade going on a contrived board.
    pub fn new(kinds: Vec<PieceKind>) -> Result<Self, ScriptError> {
        let Some(&first) = kinds.first() else {
            return Err(ScriptError::Empty);
        };
        if !first.is_special() && kinds.iter().all(|&k| k == first) {
            return Err(ScriptError::SingleColor(first));
        }
        Ok(ScriptedKinds { kinds, cursor: 0 })
    }
}

impl KindSource for ScriptedKinds {
    fn next_kind(&mut self, _level: u32) -> PieceKind {
        let kind = self.kinds[self.cursor % self.kinds.len()];
        self.cursor += 1;
        kind
    }
}

/// Creates pieces with fresh identities.
///
/// Every piece that ever lands on a board comes from a generator, so the id
/// counter is the single source of identity uniqueness.
#[derive(Clone, Debug)]
pub struct PieceGenerator<K: KindSource = RandomKinds> {
    kinds: K,
    next_id: u64,
}

impl PieceGenerator<RandomKinds> {
    /// A random generator seeded with `seed`, default odds.
    pub fn with_seed(seed: u64) -> Self {
        PieceGenerator::new(RandomKinds::with_seed(seed))
    }
}

impl PieceGenerator<ScriptedKinds> {
    /// A generator replaying `kinds` in a cycle. See [`ScriptedKinds::new`].
    pub fn scripted(kinds: Vec<PieceKind>) -> Result<Self, ScriptError> {
        Ok(PieceGenerator::new(ScriptedKinds::new(kinds)?))
    }
}

impl<K: KindSource> PieceGenerator<K> {
    pub fn new(kinds: K) -> Self {
        PieceGenerator { kinds, next_id: 0 }
    }

    /// Generates a piece for slot `(row, col)` with its kind chosen by the source.
    pub fn generate(&mut self, row: usize, col: usize, level: u32) -> Piece {
        let kind = self.kinds.next_kind(level);
        self.spawn(row, col, kind)
    }

    /// Creates a piece of an explicit kind with a fresh id.
    pub fn spawn(&mut self, row: usize, col: usize, kind: PieceKind) -> Piece {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        Piece::new(id, kind, row, col)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next_id
    }
}
