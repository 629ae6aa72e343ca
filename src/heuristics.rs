use crate::board::{Board, BOARD_SIZE};
use crate::game::{Game, NullObserver};
use crate::matcher::{clear_set, find_matches};
use crate::piece::{KindSource, Pos};
use rand::Rng;

/// A swap of two orthogonally adjacent cells.
pub type Swap = (Pos, Pos);

/// Lists every adjacent swap that would produce at least one run.
///
/// Pairs are visited row by row, each cell paired with its right neighbor
/// and then with the cell below it. Swapping two pieces of the same kind
/// never changes the board and is skipped.
///
/// # Arguments
/// * `board`: A reference to the `Board` to analyze.
///
/// # Returns
/// The productive swaps in scan order. Empty if the board has no move left.
pub fn candidate_swaps(board: &Board) -> Vec<Swap> {
    let mut swaps = Vec::new();
    let mut scratch = board.clone();
    for r in 0..BOARD_SIZE {
        for c in 0..BOARD_SIZE {
            let a = Pos::new(r, c);
            for b in [Pos::new(r, c + 1), Pos::new(r + 1, c)] {
                if !b.in_bounds() || board.piece(a).kind == board.piece(b).kind {
                    continue;
                }
                scratch.swap(a, b);
                if !find_matches(&scratch).is_empty() {
                    swaps.push((a, b));
                }
                scratch.swap(a, b);
            }
        }
    }
    swaps
}

/// Number of cells the first clear pass would remove after swapping `a` and `b`.
///
/// Cascades are not simulated, since the refill is unknown.
pub fn preview_clear(board: &Board, swap: Swap) -> usize {
    let mut scratch = board.clone();
    scratch.swap(swap.0, swap.1);
    clear_set(&scratch).len()
}

/// Chooses the swap whose first clear pass removes the most cells.
///
/// Power-up areas count, so a swap that sets off a special usually wins.
/// Ties go to the swap found first in scan order.
///
/// # Returns
/// An `Option` containing a tuple:
///   - `usize`: The number of cells the first pass would clear.
///   - `Swap`: The chosen pair of cells.
/// Returns `None` if no swap produces a run.
pub fn choose_swap_greedy(board: &Board) -> Option<(usize, Swap)> {
    let mut best: Option<(usize, Swap)> = None;
    for swap in candidate_swaps(board) {
        let cleared = preview_clear(board, swap);
        if best.map_or(true, |(best_cleared, _)| cleared > best_cleared) {
            best = Some((cleared, swap));
        }
    }
    best
}

/// Chooses the first productive swap in scan order.
pub fn choose_swap_first(board: &Board) -> Option<(usize, Swap)> {
    let swap = *candidate_swaps(board).first()?;
    Some((preview_clear(board, swap), swap))
}

/// Chooses a productive swap uniformly at random.
pub fn choose_swap_random<R: Rng>(board: &Board, rng: &mut R) -> Option<(usize, Swap)> {
    let swaps = candidate_swaps(board);
    if swaps.is_empty() {
        return None;
    }
    let swap = swaps[rng.gen_range(0..swaps.len())];
    Some((preview_clear(board, swap), swap))
}

/// Plays `game` with `choose` until it ends or no productive swap is left.
///
/// A board with no productive swap is not reshuffled, so a game can stop
/// while still playing. The game is started if it is not already running.
///
/// # Returns
/// The final score.
///
/// # Warnings
/// Prints a warning to `eprintln!` if a chosen swap is rejected, which
/// indicates an inconsistency between the chooser and the game.
pub fn evaluate_with_heuristic<K, F>(game: &mut Game<K>, mut choose: F) -> u32
where
    K: KindSource,
    F: FnMut(&Board) -> Option<(usize, Swap)>,
{
    if !game.state().playing {
        game.start_game(&mut NullObserver);
    }
    while game.state().playing {
        let Some((_value, (a, b))) = choose(game.board()) else {
            break;
        };
        if let Err(rejection) = game.try_swap(a, b, &mut NullObserver) {
            eprintln!(
                "Warning: chosen swap {:?} <-> {:?} was rejected: {}. Board:\n{}",
                a,
                b,
                rejection,
                game.board()
            );
            break;
        }
    }
    game.state().score
}
