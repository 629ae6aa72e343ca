//! The game session: swap validation, the click state machine, and the
//! collaborator callbacks.
//!
//! A [`Game`] owns the board, the piece generator, the counters and the
//! high score store. Everything the outside world sees goes through an
//! [`Observer`]: board snapshots as [`Frame`]s and discrete [`GameEvent`]s.
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::board::Board;
use crate::cascade::{Cascade, CascadeOutcome, CascadePhase, CascadeStep};
use crate::config::GameConfig;
use crate::highscore::HighScoreStore;
use crate::piece::{KindSource, PieceGenerator, Pos, RandomKinds};
use crate::scoring::{apply_cascade_result, check_transitions, GameState, ScoreChange, Transitions};

/// Why a click or swap was not accepted. None of these change the game.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SwapRejection {
    #[error("no game in progress")]
    NotPlaying,
    #[error("a cascade is still resolving")]
    AlreadyResolving,
    #[error("no moves left")]
    NoMovesLeft,
    #[error("cells are not orthogonally adjacent")]
    NonAdjacent,
    #[error("both cells are the same")]
    SameCell,
    #[error("cell {0} is outside the board")]
    OutOfBounds(Pos),
}

/// Informational notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    NewHighScore(u32),
    /// A cascade ran more than one pass.
    ComboAchieved { depth: u32, bonus: u32 },
    LevelUp { level: u32, target: u32 },
    GameOver { final_score: u32 },
}

/// Which step produced a [`Frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    /// The board at rest: after start, reset, a rejected click, or a finished turn.
    Idle,
    /// A first cell was selected.
    Selected,
    /// Two pieces were exchanged; the cascade has not run yet.
    Swapped,
    /// Cells flagged `matched` are about to disappear.
    Cleared { pass: u32, cleared: usize },
    /// Gravity and refill finished; moved and new pieces are flagged `animating`.
    Settled { pass: u32 },
}

impl From<CascadePhase> for FramePhase {
    fn from(phase: CascadePhase) -> Self {
        match phase {
            CascadePhase::Cleared { pass, cleared } => FramePhase::Cleared { pass, cleared },
            CascadePhase::Settled { pass } => FramePhase::Settled { pass },
        }
    }
}

/// A board snapshot handed to the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub board: &'a Board,
    pub phase: FramePhase,
    pub selection: Option<Pos>,
    /// Passes so far in the running cascade, or the last cascade's depth at rest.
    pub combo: u32,
}

/// Receives frames and events from a [`Game`]. Every method defaults to a no-op.
pub trait Observer {
    fn on_frame(&mut self, _frame: &Frame<'_>) {}

    fn on_event(&mut self, _event: &GameEvent) {}

    /// The high score store failed to save. The game carries on regardless.
    fn on_store_error(&mut self, _error: &anyhow::Error) {}
}

/// Ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}

/// Everything one accepted swap did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub swap: (Pos, Pos),
    pub cascade: CascadeOutcome,
    pub score: ScoreChange,
    pub transitions: Transitions,
}

/// The result of [`Game::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// No cascade was in flight.
    Idle,
    /// The cascade reached another phase boundary.
    Phase(CascadePhase),
    /// The cascade finished and the turn was scored.
    Finished(TurnReport),
}

/// The result of [`Game::select_cell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The cell became the pending selection.
    Selected(Pos),
    /// The click completed a swap, which was resolved.
    Swapped(TurnReport),
    Rejected(SwapRejection),
}

#[derive(Clone, Debug)]
struct InFlight {
    swap: (Pos, Pos),
    cascade: Cascade,
}

/// A game session.
pub struct Game<K: KindSource = RandomKinds> {
    config: GameConfig,
    board: Board,
    gen: PieceGenerator<K>,
    state: GameState,
    in_flight: Option<InFlight>,
    store: Box<dyn HighScoreStore>,
}

impl Game<RandomKinds> {
    /// A game with random pieces seeded by `seed`.
    pub fn with_seed(seed: u64, config: GameConfig, store: impl HighScoreStore + 'static) -> Self {
        let kinds = RandomKinds::new(SmallRng::seed_from_u64(seed), &config);
        Game::new(config, PieceGenerator::new(kinds), store)
    }
}

impl<K: KindSource> Game<K> {
    /// Creates a session that is not playing yet.
    ///
    /// The high score is read from `store` once, here.
    pub fn new(
        config: GameConfig,
        mut gen: PieceGenerator<K>,
        store: impl HighScoreStore + 'static,
    ) -> Self {
        let board = Board::initialize(&mut gen, 1);
        let state = GameState::new(&config, store.load());
        Game {
            config,
            board,
            gen,
            state,
            in_flight: None,
            store: Box::new(store),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns `true` while a swap's cascade has not finished.
    pub fn is_resolving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a new game on a freshly generated board.
    pub fn start_game(&mut self, obs: &mut dyn Observer) {
        self.board = Board::initialize(&mut self.gen, 1);
        self.begin_session(obs);
    }

    /// Starts a new game on the given board.
    ///
    /// The board's pieces should come from the same generator lineage if ids
    /// must stay unique against later refills.
    pub fn start_game_with_board(&mut self, board: Board, obs: &mut dyn Observer) {
        self.board = board;
        self.begin_session(obs);
    }

    /// Stops play and restores the starting counters. The board stays as it was.
    pub fn reset_game(&mut self, obs: &mut dyn Observer) {
        self.in_flight = None;
        self.state.reset_counters(&self.config);
        self.state.playing = false;
        self.emit_frame(obs, FramePhase::Idle);
    }

    fn begin_session(&mut self, obs: &mut dyn Observer) {
        self.in_flight = None;
        self.state.reset_counters(&self.config);
        self.state.playing = true;
        self.emit_frame(obs, FramePhase::Idle);
    }

    /// Mutable access to the piece generator, e.g. to build a fixture board
    /// whose ids do not collide with later refills.
    pub fn generator_mut(&mut self) -> &mut PieceGenerator<K> {
        &mut self.gen
    }

    /// Handles a click on a cell.
    ///
    /// Ignored (rejected without touching the selection) if the game is not
    /// accepting input. Otherwise the first click records a selection and the
    /// second click attempts a swap against it. The second click always
    /// clears the selection, whether or not the swap is accepted.
    pub fn select_cell(&mut self, pos: Pos, obs: &mut dyn Observer) -> ClickOutcome {
        if let Err(rejection) = self.check_accepting() {
            return ClickOutcome::Rejected(rejection);
        }
        if !pos.in_bounds() {
            return ClickOutcome::Rejected(SwapRejection::OutOfBounds(pos));
        }

        match self.state.selection {
            None => {
                self.state.selection = Some(pos);
                self.emit_frame(obs, FramePhase::Selected);
                ClickOutcome::Selected(pos)
            }
            Some(first) => match self.try_swap(first, pos, obs) {
                Ok(report) => ClickOutcome::Swapped(report),
                Err(rejection) => {
                    self.emit_frame(obs, FramePhase::Idle);
                    ClickOutcome::Rejected(rejection)
                }
            },
        }
    }

    fn check_accepting(&self) -> Result<(), SwapRejection> {
        if !self.state.playing {
            return Err(SwapRejection::NotPlaying);
        }
        if self.is_resolving() {
            return Err(SwapRejection::AlreadyResolving);
        }
        if self.state.moves == 0 {
            return Err(SwapRejection::NoMovesLeft);
        }
        Ok(())
    }

    /// Checks whether swapping `a` and `b` would be accepted right now.
    pub fn validate_swap(&self, a: Pos, b: Pos) -> Result<(), SwapRejection> {
        self.check_accepting()?;
        if let Some(outside) = [a, b].into_iter().find(|p| !p.in_bounds()) {
            return Err(SwapRejection::OutOfBounds(outside));
        }
        if a == b {
            return Err(SwapRejection::SameCell);
        }
        if !a.is_adjacent(b) {
            return Err(SwapRejection::NonAdjacent);
        }
        Ok(())
    }

    /// Exchanges two pieces and starts their cascade without running it.
    ///
    /// The move is spent here, even if the swap turns out to match nothing.
    /// Drive the cascade with [`Game::advance`]; until it finishes, every
    /// other swap or click is rejected with `AlreadyResolving`.
    pub fn begin_swap(&mut self, a: Pos, b: Pos, obs: &mut dyn Observer) -> Result<(), SwapRejection> {
        let checked = self.validate_swap(a, b);
        if !self.is_resolving() {
            self.state.selection = None;
        }
        checked?;

        self.board.swap(a, b);
        self.state.moves -= 1;
        self.in_flight = Some(InFlight {
            swap: (a, b),
            cascade: Cascade::new(),
        });
        self.emit_frame(obs, FramePhase::Swapped);
        Ok(())
    }

    /// Runs the in-flight cascade up to its next phase boundary.
    ///
    /// When the cascade finishes, the turn is scored, transitions are checked,
    /// events are sent and the report is returned. The renderer owns the
    /// timing between calls.
    pub fn advance(&mut self, obs: &mut dyn Observer) -> Advance {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return Advance::Idle;
        };
        match in_flight
            .cascade
            .step(&mut self.board, &mut self.gen, self.state.level)
        {
            CascadeStep::Phase(phase) => {
                self.emit_frame(obs, phase.into());
                Advance::Phase(phase)
            }
            CascadeStep::Finished(outcome) => {
                let swap = in_flight.swap;
                self.in_flight = None;
                Advance::Finished(self.finish_turn(swap, outcome, obs))
            }
        }
    }

    /// Swaps `a` and `b` and resolves the whole cascade before returning.
    ///
    /// The observer still sees every phase boundary, with no waiting in
    /// between.
    pub fn try_swap(&mut self, a: Pos, b: Pos, obs: &mut dyn Observer) -> Result<TurnReport, SwapRejection> {
        self.begin_swap(a, b, obs)?;
        loop {
            if let Advance::Finished(report) = self.advance(obs) {
                return Ok(report);
            }
        }
    }

    fn finish_turn(&mut self, swap: (Pos, Pos), outcome: CascadeOutcome, obs: &mut dyn Observer) -> TurnReport {
        let score = apply_cascade_result(&mut self.state, outcome, &self.config);
        if score.new_high_score {
            if let Err(err) = self.store.save(self.state.high_score) {
                obs.on_store_error(&err);
            }
            obs.on_event(&GameEvent::NewHighScore(self.state.high_score));
        }
        if outcome.depth > 1 {
            obs.on_event(&GameEvent::ComboAchieved {
                depth: outcome.depth,
                bonus: score.combo_bonus,
            });
        }

        let transitions = check_transitions(&mut self.state, &self.config);
        if let Some(level_up) = transitions.level_up {
            obs.on_event(&GameEvent::LevelUp {
                level: level_up.level,
                target: level_up.target,
            });
        }
        if let Some(final_score) = transitions.game_over {
            obs.on_event(&GameEvent::GameOver { final_score });
        }

        self.emit_frame(obs, FramePhase::Idle);
        TurnReport {
            swap,
            cascade: outcome,
            score,
            transitions,
        }
    }

    fn emit_frame(&self, obs: &mut dyn Observer, phase: FramePhase) {
        let combo = match &self.in_flight {
            Some(in_flight) => in_flight.cascade.outcome().depth,
            None => self.state.combo,
        };
        obs.on_frame(&Frame {
            board: &self.board,
            phase,
            selection: self.state.selection,
            combo,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::MemoryHighScoreStore;
    use crate::piece::{PieceKind, ScriptedKinds};
    use crate::scoring::LevelUp;
    use crate::utils::board_from_str_array;

    // Swapping (0, 0) and (0, 1) lines up B R R R: exactly three cleared.
    const ONE_RUN: [&str; 8] = [
        "RBRRPORB",
        "GYPORBGY",
        "PORBGYPO",
        "RBGYPORB",
        "GYPORBGY",
        "PORBGYPO",
        "RBGYPORB",
        "GYPORBGY",
    ];

    // Swapping (7, 0) and (7, 1) completes a G column run at rows 5..=7;
    // the collapse then lines up R R R in row 5.
    const TWO_PASS: [&str; 8] = [
        "RBGYPORB",
        "GYPORBGY",
        "ROBGYPOR",
        "YBGYPORB",
        "OYPORBGY",
        "GRRBGYPO",
        "GBGYPORB",
        "BGPORBGY",
    ];

    #[derive(Default)]
    struct Recorder {
        frames: Vec<FramePhase>,
        events: Vec<GameEvent>,
        store_errors: usize,
    }

    impl Observer for Recorder {
        fn on_frame(&mut self, frame: &Frame<'_>) {
            assert!(frame.board.positions_consistent());
            self.frames.push(frame.phase);
        }

        fn on_event(&mut self, event: &GameEvent) {
            self.events.push(*event);
        }

        fn on_store_error(&mut self, _error: &anyhow::Error) {
            self.store_errors += 1;
        }
    }

    fn game_on(rows: &[&str], store: MemoryHighScoreStore) -> Game<ScriptedKinds> {
        let gen = PieceGenerator::scripted(vec![PieceKind::CrossClear]).unwrap();
        let mut game = Game::new(GameConfig::default(), gen, store);
        let board = board_from_str_array(rows, game.generator_mut()).unwrap();
        game.start_game_with_board(board, &mut NullObserver);
        game
    }

    fn pos(row: usize, col: usize) -> Pos {
        Pos::new(row, col)
    }

    #[test]
    fn test_not_playing_before_start() {
        let mut game = Game::with_seed(1, GameConfig::default(), MemoryHighScoreStore::default());
        let mut rec = Recorder::default();
        assert_eq!(
            game.select_cell(pos(0, 0), &mut rec),
            ClickOutcome::Rejected(SwapRejection::NotPlaying)
        );
        assert_eq!(
            game.try_swap(pos(0, 0), pos(0, 1), &mut rec),
            Err(SwapRejection::NotPlaying)
        );
        assert!(rec.frames.is_empty());

        game.start_game(&mut rec);
        assert!(game.state().playing);
        assert_eq!(rec.frames, vec![FramePhase::Idle]);
        assert!(game.board().is_settled());
    }

    #[test]
    fn test_high_score_loaded_at_construction() {
        let game = Game::with_seed(1, GameConfig::default(), MemoryHighScoreStore::with_score(2500));
        assert_eq!(game.state().high_score, 2500);
        assert!(!game.state().playing);
    }

    #[test]
    fn test_non_adjacent_swap_changes_nothing() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        let before = game.board().clone();

        let result = game.try_swap(pos(0, 0), pos(2, 0), &mut NullObserver);

        assert_eq!(result, Err(SwapRejection::NonAdjacent));
        assert_eq!(game.board(), &before);
        assert_eq!(game.state().moves, 30);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        assert_eq!(
            game.validate_swap(pos(7, 7), pos(7, 8)),
            Err(SwapRejection::OutOfBounds(pos(7, 8)))
        );
        assert_eq!(
            game.select_cell(pos(8, 0), &mut NullObserver),
            ClickOutcome::Rejected(SwapRejection::OutOfBounds(pos(8, 0)))
        );
        assert_eq!(game.state().selection, None);
    }

    #[test]
    fn test_no_moves_left() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        game.state.moves = 0;
        assert_eq!(
            game.try_swap(pos(0, 0), pos(0, 1), &mut NullObserver),
            Err(SwapRejection::NoMovesLeft)
        );
        assert_eq!(
            game.select_cell(pos(0, 0), &mut NullObserver),
            ClickOutcome::Rejected(SwapRejection::NoMovesLeft)
        );
    }

    #[test]
    fn test_matching_swap_scores() {
        let store = MemoryHighScoreStore::default();
        let mut game = game_on(&ONE_RUN, store.clone());
        let mut rec = Recorder::default();

        let report = game.try_swap(pos(0, 0), pos(0, 1), &mut rec).unwrap();

        assert_eq!(report.cascade, CascadeOutcome { total_cleared: 3, depth: 1 });
        assert_eq!(report.score.delta, 300);
        assert_eq!(game.state().score, 300);
        assert_eq!(game.state().moves, 29);
        assert_eq!(game.state().combo, 1);
        assert_eq!(rec.events, vec![GameEvent::NewHighScore(300)]);
        assert_eq!(store.saves(), vec![300]);
        assert_eq!(
            rec.frames,
            vec![
                FramePhase::Swapped,
                FramePhase::Cleared { pass: 1, cleared: 3 },
                FramePhase::Settled { pass: 1 },
                FramePhase::Idle,
            ]
        );
        assert!(!game.is_resolving());
        assert!(game.board().is_settled());
    }

    #[test]
    fn test_wasted_swap_costs_a_move() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        game.state.combo = 4;
        let before = game.board().clone();

        let report = game.try_swap(pos(0, 1), pos(1, 1), &mut NullObserver).unwrap();

        assert_eq!(report.cascade.depth, 0);
        assert_eq!(report.score, ScoreChange::default());
        assert_eq!(game.state().moves, 29);
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().combo, 4, "combo is kept after a wasted swap");
        // The swap itself stays on the board.
        assert_eq!(game.board().piece(pos(0, 1)).id, before.piece(pos(1, 1)).id);
    }

    #[test]
    fn test_combo_event_for_two_pass_cascade() {
        let mut game = game_on(&TWO_PASS, MemoryHighScoreStore::with_score(10_000));
        let mut rec = Recorder::default();

        let report = game.try_swap(pos(7, 0), pos(7, 1), &mut rec).unwrap();

        assert_eq!(report.cascade, CascadeOutcome { total_cleared: 6, depth: 2 });
        assert_eq!(report.score.delta, 6 * 100 + 200);
        assert_eq!(rec.events, vec![GameEvent::ComboAchieved { depth: 2, bonus: 200 }]);
        assert_eq!(game.state().combo, 2);
    }

    #[test]
    fn test_level_up_after_cascade() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::with_score(5000));
        game.state.score = 900;
        let mut rec = Recorder::default();

        let report = game.try_swap(pos(0, 0), pos(0, 1), &mut rec).unwrap();

        assert_eq!(game.state().score, 1200);
        assert_eq!(report.transitions.level_up, Some(LevelUp { level: 2, target: 2000 }));
        assert_eq!(game.state().level, 2);
        assert_eq!(game.state().target, 2000);
        assert_eq!(game.state().moves, 30 - 1 + 10);
        assert_eq!(rec.events, vec![GameEvent::LevelUp { level: 2, target: 2000 }]);
    }

    #[test]
    fn test_game_over_on_last_wasted_move() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::with_score(5000));
        game.state.score = 500;
        game.state.moves = 1;
        let mut rec = Recorder::default();

        let report = game.try_swap(pos(0, 1), pos(1, 1), &mut rec).unwrap();

        assert_eq!(report.transitions.game_over, Some(500));
        assert_eq!(rec.events, vec![GameEvent::GameOver { final_score: 500 }]);
        assert!(!game.state().playing);
        assert_eq!(
            game.select_cell(pos(0, 0), &mut rec),
            ClickOutcome::Rejected(SwapRejection::NotPlaying)
        );
    }

    #[test]
    fn test_click_state_machine() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        let mut rec = Recorder::default();

        assert_eq!(game.select_cell(pos(0, 0), &mut rec), ClickOutcome::Selected(pos(0, 0)));
        assert_eq!(game.state().selection, Some(pos(0, 0)));

        // Same cell: rejected, selection cleared.
        assert_eq!(
            game.select_cell(pos(0, 0), &mut rec),
            ClickOutcome::Rejected(SwapRejection::SameCell)
        );
        assert_eq!(game.state().selection, None);

        // Non-adjacent: rejected, selection cleared, no move spent.
        game.select_cell(pos(0, 0), &mut rec);
        assert_eq!(
            game.select_cell(pos(3, 3), &mut rec),
            ClickOutcome::Rejected(SwapRejection::NonAdjacent)
        );
        assert_eq!(game.state().selection, None);
        assert_eq!(game.state().moves, 30);

        // Adjacent: swapped and resolved.
        game.select_cell(pos(0, 0), &mut rec);
        match game.select_cell(pos(0, 1), &mut rec) {
            ClickOutcome::Swapped(report) => {
                assert_eq!(report.swap, (pos(0, 0), pos(0, 1)));
                assert_eq!(report.cascade.total_cleared, 3);
            }
            other => panic!("expected a swap, got {:?}", other),
        }
        assert_eq!(game.state().selection, None);
        assert_eq!(game.state().moves, 29);
    }

    #[test]
    fn test_stepwise_cascade_blocks_input() {
        let mut game = game_on(&TWO_PASS, MemoryHighScoreStore::default());
        let mut rec = Recorder::default();

        game.begin_swap(pos(7, 0), pos(7, 1), &mut rec).unwrap();
        assert!(game.is_resolving());
        assert_eq!(game.state().moves, 29);

        assert_eq!(
            game.begin_swap(pos(0, 0), pos(0, 1), &mut rec),
            Err(SwapRejection::AlreadyResolving)
        );
        assert_eq!(
            game.try_swap(pos(0, 0), pos(0, 1), &mut rec),
            Err(SwapRejection::AlreadyResolving)
        );
        assert_eq!(
            game.select_cell(pos(0, 0), &mut rec),
            ClickOutcome::Rejected(SwapRejection::AlreadyResolving)
        );

        assert_eq!(
            game.advance(&mut rec),
            Advance::Phase(CascadePhase::Cleared { pass: 1, cleared: 3 })
        );
        assert_eq!(game.board().cleared_count(), 3);
        assert_eq!(game.advance(&mut rec), Advance::Phase(CascadePhase::Settled { pass: 1 }));
        assert_eq!(
            game.advance(&mut rec),
            Advance::Phase(CascadePhase::Cleared { pass: 2, cleared: 3 })
        );
        assert_eq!(game.advance(&mut rec), Advance::Phase(CascadePhase::Settled { pass: 2 }));
        match game.advance(&mut rec) {
            Advance::Finished(report) => assert_eq!(report.cascade.depth, 2),
            other => panic!("expected the cascade to finish, got {:?}", other),
        }
        assert!(!game.is_resolving());
        assert_eq!(game.advance(&mut rec), Advance::Idle);
        assert_eq!(game.state().moves, 29, "rejected swaps cost nothing");
        assert!(game.validate_swap(pos(0, 0), pos(0, 1)).is_ok());
    }

    #[test]
    fn test_reset_stops_play() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        game.try_swap(pos(0, 0), pos(0, 1), &mut NullObserver).unwrap();
        game.select_cell(pos(4, 4), &mut NullObserver);

        game.reset_game(&mut NullObserver);

        let state = game.state();
        assert!(!state.playing);
        assert_eq!((state.score, state.level, state.moves, state.target), (0, 1, 30, 1000));
        assert_eq!(state.combo, 0);
        assert_eq!(state.selection, None);
        assert_eq!(state.high_score, 300);
    }

    #[test]
    fn test_start_game_resets_counters() {
        let mut game = game_on(&ONE_RUN, MemoryHighScoreStore::default());
        game.try_swap(pos(0, 0), pos(0, 1), &mut NullObserver).unwrap();
        game.start_game(&mut NullObserver);
        assert!(game.state().playing);
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().moves, 30);
        assert_eq!(game.state().high_score, 300);
    }

    struct FailingStore;

    impl HighScoreStore for FailingStore {
        fn load(&self) -> u32 {
            0
        }

        fn save(&mut self, _score: u32) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let gen = PieceGenerator::scripted(vec![PieceKind::CrossClear]).unwrap();
        let mut game = Game::new(GameConfig::default(), gen, FailingStore);
        let board = board_from_str_array(&ONE_RUN, game.generator_mut()).unwrap();
        game.start_game_with_board(board, &mut NullObserver);
        let mut rec = Recorder::default();

        game.try_swap(pos(0, 0), pos(0, 1), &mut rec).unwrap();

        assert_eq!(rec.store_errors, 1);
        assert_eq!(rec.events, vec![GameEvent::NewHighScore(300)]);
        assert_eq!(game.state().high_score, 300);
    }

    fn power_up_game(level: u32) -> Game {
        let config = GameConfig {
            power_up_chance: 1.0,
            ..GameConfig::default()
        };
        let mut game = Game::with_seed(7, config, MemoryHighScoreStore::default());
        let board = board_from_str_array(&ONE_RUN, game.generator_mut()).unwrap();
        game.start_game_with_board(board, &mut NullObserver);
        game.state.level = level;
        game
    }

    #[test]
    fn test_refills_use_current_level() {
        for (level, specials) in [(3, false), (4, true)] {
            let mut game = power_up_game(level);
            game.begin_swap(pos(0, 0), pos(0, 1), &mut NullObserver).unwrap();
            assert_eq!(
                game.advance(&mut NullObserver),
                Advance::Phase(CascadePhase::Cleared { pass: 1, cleared: 3 })
            );
            assert_eq!(game.advance(&mut NullObserver), Advance::Phase(CascadePhase::Settled { pass: 1 }));

            // The cleared run was (0, 1)..=(0, 3); only the refill lands there.
            for c in 1..=3 {
                let piece = game.board().piece(pos(0, c));
                assert!(piece.animating);
                assert_eq!(piece.is_special(), specials, "level {} col {}", level, c);
            }
            while !matches!(game.advance(&mut NullObserver), Advance::Finished(_)) {}
            assert_eq!(game.state().level, level);
        }
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(SwapRejection::NonAdjacent.to_string(), "cells are not orthogonally adjacent");
        assert_eq!(
            SwapRejection::OutOfBounds(pos(9, 2)).to_string(),
            "cell (9, 2) is outside the board"
        );
    }
}
