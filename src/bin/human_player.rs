use anyhow::{Context, Result};
use chain_burst::board::{Board, BOARD_SIZE};
use chain_burst::config::GameConfig;
use chain_burst::game::{ClickOutcome, Frame, FramePhase, Game, GameEvent, Observer};
use chain_burst::highscore::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use chain_burst::piece::{KindSource, PieceGenerator, Pos};
use chain_burst::utils::board_from_str_array;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play Chain Burst in the terminal", long_about = None)]
struct Args {
    /// Seed for the piece generator (random if omitted)
    #[clap(long)]
    seed: Option<u64>,

    /// Moves at the start of a game
    #[clap(long, default_value_t = 30)]
    moves: u32,

    /// Score needed to reach level 2
    #[clap(long, default_value_t = 1000)]
    target: u32,

    /// High score file (defaults to the XDG config location)
    #[clap(long)]
    high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only
    #[clap(long)]
    no_persist: bool,

    /// Print the board after every cascade phase
    #[clap(long)]
    show_cascade: bool,

    /// Start the first game from a board file (8 lines of 8 characters)
    #[clap(long)]
    board_file: Option<PathBuf>,
}

/// Prints notifications and, optionally, every cascade phase.
struct TerminalObserver {
    show_cascade: bool,
}

impl Observer for TerminalObserver {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        if !self.show_cascade {
            return;
        }
        match frame.phase {
            FramePhase::Cleared { pass, cleared } => {
                println!("Pass {}: clearing {} pieces", pass, cleared);
                println!("{}", frame.board);
            }
            FramePhase::Settled { pass } => {
                println!("Pass {}: pieces dropped", pass);
                println!("{}", frame.board);
            }
            _ => {}
        }
    }

    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::NewHighScore(score) => println!("🎉 New High Score! You scored {} points!", score),
            GameEvent::ComboAchieved { depth, bonus } => println!("🔥 {}x Combo! Bonus: +{} points", depth, bonus),
            GameEvent::LevelUp { level, target } => println!("🎯 Level {}! New target: {} points", level, target),
            GameEvent::GameOver { final_score } => println!("Game over with {} points.", final_score),
        }
    }

    fn on_store_error(&mut self, error: &anyhow::Error) {
        eprintln!("Warning: could not save the high score: {:#}", error);
    }
}

fn read_board_file<K: KindSource>(path: &Path, gen: &mut PieceGenerator<K>) -> Result<Board> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read board file {}", path.display()))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    board_from_str_array(&lines, gen).with_context(|| format!("Invalid board in {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = GameConfig {
        initial_moves: args.moves,
        initial_target: args.target,
        ..GameConfig::default()
    };
    let store: Box<dyn HighScoreStore> = if args.no_persist {
        Box::new(MemoryHighScoreStore::default())
    } else {
        let file_store = match &args.high_score_file {
            Some(path) => FileHighScoreStore::new(path),
            None => FileHighScoreStore::at_default_path(),
        };
        println!("High score file: {}", file_store.path().display());
        Box::new(file_store)
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut game = Game::with_seed(seed, config, store);
    let mut observer = TerminalObserver {
        show_cascade: args.show_cascade,
    };
    match &args.board_file {
        Some(path) => {
            let board = read_board_file(path, game.generator_mut())?;
            println!("Loaded board from {}", path.display());
            game.start_game_with_board(board, &mut observer);
        }
        None => game.start_game(&mut observer),
    }
    println!("Welcome to Chain Burst! (seed {})", seed);

    loop {
        let state = game.state();
        println!("---------------------");
        println!(
            "Level: {}, Score: {}/{}, Moves: {}, High Score: {}",
            state.level, state.score, state.target, state.moves, state.high_score
        );
        if state.combo > 1 {
            println!("Combo: {}x", state.combo);
        }
        println!("{}", game.board().to_string_with_highlight(state.selection));

        if !state.playing {
            println!();
            println!("---------------------");
            println!("GAME OVER!");
            println!("Final Score: {}", state.score);
            println!("Level Reached: {}", state.level);
            println!("---------------------");
            print!("Enter 'n' for a new game or anything else to quit: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if input.trim() == "n" {
                game.start_game(&mut observer);
                continue;
            }
            break;
        }

        print!("Select a cell (row col), 'n' for a new game, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let trimmed_input = input.trim();

        if trimmed_input == "q" {
            println!("Thanks for playing!");
            break;
        }

        if trimmed_input == "n" {
            game.start_game(&mut observer);
            continue;
        }

        let parts: Vec<&str> = trimmed_input.split_whitespace().collect();
        if parts.len() != 2 {
            println!("Invalid input format. Use 'row col', 'n', or 'q'.");
            continue;
        }
        let (Ok(r), Ok(c)) = (parts[0].parse::<usize>(), parts[1].parse::<usize>()) else {
            println!("Invalid input: Please enter numbers for row and column (e.g., '3 4'), 'n', or 'q'.");
            continue;
        };

        match game.select_cell(Pos::new(r, c), &mut observer) {
            ClickOutcome::Selected(pos) => {
                println!("Selected {}. Pick an adjacent cell to swap with.", pos)
            }
            ClickOutcome::Swapped(report) if report.cascade.total_cleared == 0 => {
                println!("No match. The move is spent.")
            }
            ClickOutcome::Swapped(report) => println!(
                "Cleared {} pieces in {} pass(es): +{} points.",
                report.cascade.total_cleared, report.cascade.depth, report.score.delta
            ),
            ClickOutcome::Rejected(rejection) => {
                println!("Rejected: {}.", rejection);
                if r >= BOARD_SIZE || c >= BOARD_SIZE {
                    println!("Row and column must be between 0 and {}.", BOARD_SIZE - 1);
                }
            }
        }
    }

    Ok(())
}
