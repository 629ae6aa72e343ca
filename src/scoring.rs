//! Score bookkeeping and the level / game-over transitions.
//!
//! Both operations mutate a [`GameState`] in place and return a small report
//! of what changed, which the game turns into notifications.
use crate::cascade::CascadeOutcome;
use crate::config::GameConfig;
use crate::piece::Pos;

/// Counters of one game session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    /// Best score seen, including earlier sessions.
    pub high_score: u32,
    pub level: u32,
    /// Score at which the next level-up happens.
    pub target: u32,
    pub moves: u32,
    /// Depth of the most recent scoring cascade. Only a new game resets it.
    pub combo: u32,
    pub playing: bool,
    /// First cell of a pending swap.
    pub selection: Option<Pos>,
}

impl GameState {
    /// A state that is not playing yet, with `high_score` as loaded from storage.
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        GameState {
            score: 0,
            high_score,
            level: 1,
            target: config.initial_target,
            moves: config.initial_moves,
            combo: 0,
            playing: false,
            selection: None,
        }
    }

    /// Restores the starting counters. The high score and `playing` are kept.
    pub fn reset_counters(&mut self, config: &GameConfig) {
        self.score = 0;
        self.level = 1;
        self.target = config.initial_target;
        self.moves = config.initial_moves;
        self.combo = 0;
        self.selection = None;
    }
}

/// What [`apply_cascade_result`] did to the score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreChange {
    /// Total points added, combo bonus included.
    pub delta: u32,
    /// The part of `delta` that came from cascade depth.
    pub combo_bonus: u32,
    /// Set when the score went past the previous high score.
    pub new_high_score: bool,
}

/// A level-up that just happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub target: u32,
}

/// The outcome of [`check_transitions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transitions {
    pub level_up: Option<LevelUp>,
    /// Final score, when the game just ended.
    pub game_over: Option<u32>,
}

/// Folds a finished cascade into the score.
///
/// `delta = total_cleared * points_per_piece + (depth - 1) * combo_bonus`, the
/// bonus applying only for depth > 1. A cascade that cleared nothing leaves
/// the state untouched, including the previous combo.
///
/// # Examples
/// ```
/// use chain_burst::cascade::CascadeOutcome;
/// use chain_burst::config::GameConfig;
/// use chain_burst::scoring::{apply_cascade_result, GameState};
///
/// let config = GameConfig::default();
/// let mut state = GameState::new(&config, 0);
/// let change = apply_cascade_result(
///     &mut state,
///     CascadeOutcome { total_cleared: 9, depth: 2 },
///     &config,
/// );
/// assert_eq!(change.delta, 1100);
/// assert_eq!(state.combo, 2);
/// ```
pub fn apply_cascade_result(
    state: &mut GameState,
    outcome: CascadeOutcome,
    config: &GameConfig,
) -> ScoreChange {
    if outcome.total_cleared == 0 {
        return ScoreChange::default();
    }

    let base = outcome.total_cleared.saturating_mul(config.points_per_piece);
    let combo_bonus = outcome
        .depth
        .saturating_sub(1)
        .saturating_mul(config.combo_bonus);
    let delta = base.saturating_add(combo_bonus);

    state.score = state.score.saturating_add(delta);
    state.combo = outcome.depth;

    let new_high_score = state.score > state.high_score;
    if new_high_score {
        state.high_score = state.score;
    }

    ScoreChange {
        delta,
        combo_bonus,
        new_high_score,
    }
}

/// Runs the level-up check, then the game-over check.
///
/// Level-up fires at most once per call, however far the score overshot the
/// target. Game-over needs no moves left and the score still short of the
/// target. Nothing happens unless the game is playing.
pub fn check_transitions(state: &mut GameState, config: &GameConfig) -> Transitions {
    let mut transitions = Transitions::default();
    if !state.playing {
        return transitions;
    }

    if state.score >= state.target {
        state.level += 1;
        state.target = state.target.saturating_mul(2);
        state.moves = state.moves.saturating_add(config.level_up_moves);
        transitions.level_up = Some(LevelUp {
            level: state.level,
            target: state.target,
        });
    }

    if state.moves == 0 && state.score < state.target {
        state.playing = false;
        state.selection = None;
        transitions.game_over = Some(state.score);
    }

    transitions
}
