//! The cascade loop: clear, collapse, repeat until nothing matches.
//!
//! A cascade is driven one phase at a time through [`Cascade::step`], so a
//! renderer can show the board between phases and decide how long to wait.
//! [`resolve_cascade`] runs a cascade to completion for headless callers.
use crate::board::Board;
use crate::matcher::remove_matches;
use crate::piece::{KindSource, PieceGenerator};

/// A phase boundary inside a cascade, reported after the board changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadePhase {
    /// Pass `pass` (1-based) flagged `cleared` cells. The board still holds them, flagged `matched`.
    Cleared { pass: u32, cleared: usize },
    /// Pass `pass` finished gravity and refill; the board is fully populated again.
    Settled { pass: u32 },
}

/// Totals of a finished cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Distinct cells cleared, summed over all passes.
    pub total_cleared: u32,
    /// Number of passes that cleared at least one cell.
    pub depth: u32,
}

/// What a single [`Cascade::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeStep {
    Phase(CascadePhase),
    Finished(CascadeOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Next {
    Clear,
    Collapse,
    Done,
}

/// An in-flight cascade.
///
/// Passes are strictly sequential: each clear sees exactly the board the
/// previous collapse produced.
#[derive(Clone, Debug)]
pub struct Cascade {
    next: Next,
    outcome: CascadeOutcome,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    pub fn new() -> Self {
        Cascade {
            next: Next::Clear,
            outcome: CascadeOutcome::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next == Next::Done
    }

    /// Totals so far.
    pub fn outcome(&self) -> CascadeOutcome {
        self.outcome
    }

    /// Advances the cascade by one phase.
    ///
    /// Alternates between a clear step and a gravity/refill step. The first
    /// clear step that removes nothing finishes the cascade; calling `step`
    /// after that keeps returning the same `Finished` outcome without touching
    /// the board.
    pub fn step<K: KindSource>(
        &mut self,
        board: &mut Board,
        gen: &mut PieceGenerator<K>,
        level: u32,
    ) -> CascadeStep {
        match self.next {
            Next::Clear => {
                let cleared = remove_matches(board);
                if cleared == 0 {
                    self.next = Next::Done;
                    return CascadeStep::Finished(self.outcome);
                }
                self.outcome.depth += 1;
                self.outcome.total_cleared += cleared as u32;
                self.next = Next::Collapse;
                CascadeStep::Phase(CascadePhase::Cleared {
                    pass: self.outcome.depth,
                    cleared,
                })
            }
            Next::Collapse => {
                board.collapse_columns(gen, level);
                self.next = Next::Clear;
                CascadeStep::Phase(CascadePhase::Settled {
                    pass: self.outcome.depth,
                })
            }
            Next::Done => CascadeStep::Finished(self.outcome),
        }
    }
}

/// Runs a cascade on `board` to completion.
///
/// `on_phase` is called at every phase boundary with the board as it stands;
/// this is where a renderer would wait for its animations. Passing a no-op
/// closure gives the headless behavior with zero-length suspensions.
///
/// # Returns
/// The total number of cleared cells and the cascade depth. Both are 0 when
/// the board had no match to begin with.
pub fn resolve_cascade<K: KindSource>(
    board: &mut Board,
    gen: &mut PieceGenerator<K>,
    level: u32,
    mut on_phase: impl FnMut(&Board, CascadePhase),
) -> CascadeOutcome {
    let mut cascade = Cascade::new();
    loop {
        match cascade.step(board, gen, level) {
            CascadeStep::Phase(phase) => on_phase(board, phase),
            CascadeStep::Finished(outcome) => return outcome,
        }
    }
}
