//! Tunable game rules.

/// Rule constants for a game session.
///
/// `Default` gives the standard rules: 30 moves, a 1000 point first target,
/// 10 bonus moves per level, 100 points per cleared piece, 200 points per
/// extra cascade pass, and a 5% power-up chance once the level exceeds 3.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Moves granted when a game starts.
    pub initial_moves: u32,
    /// Score needed to leave level 1. Doubles on every level-up.
    pub initial_target: u32,
    /// Moves added on level-up.
    pub level_up_moves: u32,
    /// Points per distinct cleared cell.
    pub points_per_piece: u32,
    /// Points per cascade pass beyond the first.
    pub combo_bonus: u32,
    /// Special pieces are generated only while the level is strictly above this.
    pub power_up_min_level: u32,
    /// Probability that a generated piece is special, once allowed.
    pub power_up_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_moves: 30,
            initial_target: 1000,
            level_up_moves: 10,
            points_per_piece: 100,
            combo_bonus: 200,
            power_up_min_level: 3,
            power_up_chance: 0.05,
        }
    }
}
