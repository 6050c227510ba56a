//! A world-branching simulation engine for hidden-role social-deduction
//! logic puzzles (the Blood on the Clocktower "trouble brewing" family):
//! given a script, a set of players' claims, and the deaths/events the
//! storyteller recorded, enumerate every assignment of hidden roles and
//! alignments consistent with every claim actually being checked against
//! the simulated world.
//!
//! Grounded on `examples/original_source/clockchecker` (see `DESIGN.md` for
//! the full module-by-module ledger); the fork-and-filter shape of
//! [`world::World`] generalizes the teacher's `game::types::Universe`/
//! `Multiverse`.

#![warn(trivial_casts)]
#![forbid(unused_extern_crates, unused_import_braces)]

pub mod error;
pub mod events;
pub mod info;
pub mod logic;
pub mod pipeline;
pub mod placement;
pub mod puzzle;
pub mod render;
pub mod roles;
pub mod solver;
pub mod world;

pub use error::{Result, SolveError, ValidationError};
pub use puzzle::{Puzzle, PuzzleBuilder};
pub use solver::{solve, solve_with_config, SolveConfig, Solution};
