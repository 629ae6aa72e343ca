use anyhow::Result;
use chain_burst::config::GameConfig;
use chain_burst::game::Game;
use chain_burst::heuristics::{
    choose_swap_first, choose_swap_greedy, choose_swap_random, evaluate_with_heuristic,
};
use chain_burst::highscore::MemoryHighScoreStore;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Greedy,
    First,
    Random,
    All,
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Greedy => "GREEDY",
            Strategy::First => "FIRST",
            Strategy::Random => "RANDOM",
            Strategy::All => "ALL",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about = "Evaluate swap strategies over seeded games", long_about = None)]
struct Args {
    /// Number of games per strategy
    #[clap(long, default_value_t = 20)]
    games: u64,

    /// Seed of the first game; game i uses seed + i
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Strategy to evaluate
    #[clap(long, value_enum, default_value_t = Strategy::All)]
    strategy: Strategy,

    /// Moves at the start of a game
    #[clap(long, default_value_t = 30)]
    moves: u32,

    /// Score needed to reach level 2
    #[clap(long, default_value_t = 1000)]
    target: u32,
}

struct GameResult {
    score: u32,
    level: u32,
}

fn play(strategy: Strategy, seed: u64, config: &GameConfig) -> GameResult {
    let mut game = Game::with_seed(seed, config.clone(), MemoryHighScoreStore::default());
    let score = match strategy {
        Strategy::Greedy | Strategy::All => evaluate_with_heuristic(&mut game, choose_swap_greedy),
        Strategy::First => evaluate_with_heuristic(&mut game, choose_swap_first),
        Strategy::Random => {
            let mut rng = SmallRng::seed_from_u64(seed);
            evaluate_with_heuristic(&mut game, |board| choose_swap_random(board, &mut rng))
        }
    };
    GameResult {
        score,
        level: game.state().level,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = GameConfig {
        initial_moves: args.moves,
        initial_target: args.target,
        ..GameConfig::default()
    };
    let strategies = match args.strategy {
        Strategy::All => vec![Strategy::Greedy, Strategy::First, Strategy::Random],
        single => vec![single],
    };

    println!("Starting strategy evaluation for {} games...", args.games);

    let mut averages: Vec<(&str, f64, f64)> = Vec::new();
    for strategy in &strategies {
        let mut results = Vec::new();
        for game_idx in 0..args.games {
            let current_seed = args.seed + game_idx;
            let result = play(*strategy, current_seed, &config);
            println!(
                "  Strategy: {:<8}, Seed: {:<6}, Score: {:<7}, Level: {}",
                strategy.name(),
                current_seed,
                result.score,
                result.level
            );
            results.push(result);
        }
        if results.is_empty() {
            println!("Strategy {}: No games played.", strategy.name());
            continue;
        }
        let n = results.len() as f64;
        let avg_score = results.iter().map(|r| r.score as f64).sum::<f64>() / n;
        let avg_level = results.iter().map(|r| r.level as f64).sum::<f64>() / n;
        averages.push((strategy.name(), avg_score, avg_level));
    }

    println!("\n--- Evaluation Complete ---");
    println!("Games per strategy: {}", args.games);
    println!("\n--- Average Scores ---");

    // Sort by average score descending
    averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (name, avg_score, avg_level) in averages {
        println!(
            "Strategy {:<8}: Average Score = {:.2}, Average Level = {:.2}",
            name, avg_score, avg_level
        );
    }

    Ok(())
}
