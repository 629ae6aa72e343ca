//! # Chain Burst Library
//!
//! This library provides the match-resolution engine for Chain Burst, a
//! match-3 puzzle game played on an 8x8 board: swap two adjacent pieces to
//! line up three or more of the same color, watch them clear, let the
//! column above fall, and keep scoring while the refill cascades into new
//! runs.
//!
//! It is used by two binaries:
//! - `human_player`: Allows interactive gameplay via the command line.
//! - `autoplay`: Plays many seeded games with the move heuristics and
//!   reports average score and level per strategy.
//!
//! ## Modules
//! - `piece`: Piece kinds, positions, and the seedable piece generator.
//! - `board`: The board (`Board`) and gravity/refill.
//! - `matcher`: Run detection, power-up areas, and the clear step.
//! - `cascade`: The clear/collapse loop, driven whole or one phase at a time.
//! - `scoring`: Game counters, scoring, level-up and game-over checks.
//! - `game`: The game session, swap validation, the click state machine,
//!   and the observer interface for rendering and notifications.
//! - `highscore`: High score persistence.
//! - `config`: Tunable rule constants.
//! - `heuristics`: Strategies for choosing swaps.
//! - `utils`: Utility functions, such as parsing boards from strings.

pub mod board;
pub mod cascade;
pub mod config;
pub mod game;
pub mod heuristics;
pub mod highscore;
pub mod matcher;
pub mod piece;
pub mod scoring;
pub mod utils;
