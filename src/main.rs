#![deny(rust_2018_idioms, unused_import_braces, unused_lifetimes, unused_qualifications)]
#![forbid(unsafe_code)]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use grimoire::puzzle::{CompromiseConfig, PuzzleBuilder, SolverOptions};
use grimoire::render::{probability_table, WorldView};
use grimoire::roles::RoleKind;
use grimoire::solver::{solve_with_config, SolveConfig};

/// Built-in demo puzzles, standing in for the puzzle-description file format
/// spec.md §1 lists as an external collaborator this crate does not parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Demo {
    /// Two seats, one plain Demon, no claims to check beyond roles.
    Minimal,
    /// Five seats with a Knight/Steward/Investigator/Noble/Savant script and
    /// a hidden Demon + Trickster pool, mirroring spec.md §8's S1.
    FiveSeatTownsfolk,
}

#[derive(Debug, Parser)]
#[command(name = "grimoire-cli", version, about = "Solves hidden-role social-deduction logic puzzles")]
struct Cli {
    /// Which built-in demo puzzle to solve.
    #[arg(long, value_enum, default_value_t = Demo::Minimal)]
    demo: Demo,

    /// Number of worker threads for the parallel solver; 1 runs sequentially.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Print the per-seat probability table instead of every raw world.
    #[arg(long)]
    table: bool,
}

fn minimal_puzzle() -> grimoire::Puzzle {
    PuzzleBuilder::new()
        .player("Alice", RoleKind::Savant)
        .player("Bob", RoleKind::Demon)
        .category_counts([(1, 1), (0, 0), (0, 0), (1, 1), (0, 0)])
        .build()
        .expect("minimal demo puzzle is internally consistent")
}

fn five_seat_townsfolk_puzzle() -> grimoire::Puzzle {
    PuzzleBuilder::new()
        .player("Alice", RoleKind::Knight)
        .player("Bob", RoleKind::Steward)
        .player("Carol", RoleKind::Investigator)
        .player("Dave", RoleKind::Noble)
        .player("Erin", RoleKind::Savant)
        .hidden_pool(vec![RoleKind::Demon, RoleKind::Trickster, RoleKind::Drunk])
        .category_counts([(3, 3), (0, 1), (1, 1), (1, 1), (0, 0)])
        .options(SolverOptions {
            deduplicate_initial_characters: true,
            ..Default::default()
        })
        .compromises(CompromiseConfig::default())
        .build()
        .expect("five-seat demo puzzle is internally consistent")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let puzzle = match cli.demo {
        Demo::Minimal => minimal_puzzle(),
        Demo::FiveSeatTownsfolk => five_seat_townsfolk_puzzle(),
    };
    let puzzle = std::sync::Arc::new(puzzle);

    let solutions = solve_with_config(&puzzle, SolveConfig { workers: cli.workers })
        .context("solving puzzle")?;

    if solutions.is_empty() {
        println!("no solutions found");
        return Ok(());
    }

    if cli.table {
        print!("{}", probability_table(&solutions));
    } else {
        for (i, solution) in solutions.iter().enumerate() {
            println!("--- solution {i} ---");
            print!("{}", WorldView(&solution.world));
        }
    }
    println!("{} solution(s) found", solutions.len());

    Ok(())
}
