//! The top-level driver: enumerate starting configurations, run each through
//! the pipeline, deduplicate, and fall back to the no-evil-required
//! ("Nihilist"/atheist) case when nothing else survives. Grounded on
//! `examples/original_source/clockchecker/solve.py::solve`/
//! `_filter_solutions`/`_world_checking_worker`/`_starting_config_worker`/
//! `_solution_collecting_worker`, generalized from the teacher's
//! `Multiverse`-of-`Universe`s shape in `game/types.rs`.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::error::{Result, SolveError};
use crate::placement::{self, StartingConfiguration};
use crate::pipeline;
use crate::puzzle::Puzzle;
use crate::roles::RoleKind;
use crate::world::World;

/// How many OS threads to spread starting-configuration work across. `1`
/// keeps everything on the caller's thread, matching the teacher's default
/// of running `Game::run` synchronously unless asked otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub workers: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig { workers: 1 }
    }
}

/// One surviving hypothesis about the whole game, returned by [`solve`].
#[derive(Debug, Clone)]
pub struct Solution {
    pub initial_roles: Vec<RoleKind>,
    pub world: World,
}

/// Deduplication key: a solution is considered the "same" as another if
/// every seat's starting role matches, regardless of which branch of
/// mid-game forking produced it. Mirrors `solve.py::_filter_solutions`'s
/// `frozenset`-of-initial-characters comparison.
fn dedup_key(roles: &[RoleKind]) -> Vec<RoleKind> {
    roles.to_vec()
}

fn solve_one_configuration(puzzle: &Arc<Puzzle>, config: &StartingConfiguration) -> Result<Vec<World>> {
    pipeline::run(puzzle, config)
}

/// Runs every starting configuration single-threaded on the calling thread.
fn solve_sequential(puzzle: &Arc<Puzzle>, configs: Vec<StartingConfiguration>) -> Result<Vec<Solution>> {
    let mut solutions = Vec::new();
    for config in configs {
        let worlds = solve_one_configuration(puzzle, &config)?;
        for world in worlds {
            solutions.push(Solution {
                initial_roles: config.roles.clone(),
                world,
            });
        }
    }
    Ok(solutions)
}

enum WorkItem {
    Config(StartingConfiguration),
}

/// Runs starting configurations across a bounded-queue worker pool: one
/// producer feeding `WorkItem`s, `N` workers pulling from a shared receiver
/// and pushing results to a shared collector channel. Substitutes for
/// `solve.py`'s `multiprocessing.Queue`/`Process` pair — since `Puzzle` is
/// immutable and shared via `Arc`, OS threads need no pickling boundary.
fn solve_parallel(
    puzzle: &Arc<Puzzle>,
    configs: Vec<StartingConfiguration>,
    workers: usize,
) -> Result<Vec<Solution>> {
    let (work_tx, work_rx): (Sender<WorkItem>, Receiver<WorkItem>) = bounded(configs.len().max(1));
    let (result_tx, result_rx): (
        Sender<Result<Vec<Solution>>>,
        Receiver<Result<Vec<Solution>>>,
    ) = bounded(workers.max(1));

    for config in configs {
        // capacity was sized to configs.len(), so this never blocks.
        work_tx.send(WorkItem::Config(config)).ok();
    }
    drop(work_tx);

    let mut handles = Vec::new();
    for worker_id in 0..workers {
        let puzzle = puzzle.clone();
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        handles.push(
            thread::Builder::new()
                .name(format!("grimoire-solver-{worker_id}"))
                .spawn(move || {
                    let mut local = Vec::new();
                    while let Ok(WorkItem::Config(config)) = work_rx.recv() {
                        let outcome = solve_one_configuration(&puzzle, &config).map(|worlds| {
                            worlds
                                .into_iter()
                                .map(|world| Solution {
                                    initial_roles: config.roles.clone(),
                                    world,
                                })
                                .collect::<Vec<_>>()
                        });
                        match outcome {
                            Ok(batch) => local.extend(batch),
                            Err(e) => {
                                result_tx.send(Err(e)).ok();
                                return;
                            }
                        }
                    }
                    result_tx.send(Ok(local)).ok();
                })
                .expect("failed to spawn solver worker thread"),
        );
    }
    drop(result_tx);

    let mut solutions = Vec::new();
    for received in result_rx {
        solutions.extend(received?);
    }
    for handle in handles {
        if handle.join().is_err() {
            return Err(SolveError::Worker("solver worker thread panicked".to_string()));
        }
    }
    Ok(solutions)
}

/// Deduplicates by initial-role-tuple when `puzzle.options
/// .deduplicate_initial_characters` is set, keeping the first world found
/// for each unique starting configuration (mirrors
/// `solve.py::_filter_solutions`).
fn deduplicate(puzzle: &Puzzle, solutions: Vec<Solution>) -> Vec<Solution> {
    if !puzzle.options.deduplicate_initial_characters {
        return solutions;
    }
    let mut seen = HashSet::new();
    solutions
        .into_iter()
        .filter(|s| seen.insert(dedup_key(&s.initial_roles)))
        .collect()
}

/// Enumerates starting configurations, runs each through the pipeline, and
/// returns every world consistent with the puzzle. If no solution requires
/// evil players at all, synthesizes the "everyone good, Nihilist/atheist"
/// case as a fallback the way `solve.py::solve` does when `_place_hidden_
/// characters` finds nothing and the puzzle's bounds permit zero evil.
pub fn solve(puzzle: &Arc<Puzzle>) -> Result<Vec<Solution>> {
    solve_with_config(puzzle, SolveConfig::default())
}

pub fn solve_with_config(puzzle: &Arc<Puzzle>, config: SolveConfig) -> Result<Vec<Solution>> {
    let configs = placement::enumerate(puzzle)?;
    info!(configurations = configs.len(), "enumerated starting configurations");

    let solutions = if config.workers <= 1 || configs.len() <= 1 {
        solve_sequential(puzzle, configs)?
    } else {
        solve_parallel(puzzle, configs, config.workers)?
    };

    let deduped = deduplicate(puzzle, solutions);
    debug!(solutions = deduped.len(), "solutions after deduplication");

    if !deduped.is_empty() {
        return Ok(deduped);
    }

    let (d_min, _) = puzzle.category_counts[3];
    if d_min > 0 {
        warn!("no solutions found and the puzzle requires a demon; returning empty");
        return Ok(deduped);
    }

    info!("no solutions with evil players found; trying the no-evil-required fallback");
    let all_good_config = StartingConfiguration {
        roles: puzzle.players.iter().map(|p| p.claim).collect(),
        evil: vec![false; puzzle.num_players()],
        lineage: vec![0],
    };
    let worlds = solve_one_configuration(puzzle, &all_good_config)?;
    Ok(worlds
        .into_iter()
        .map(|world| Solution {
            initial_roles: all_good_config.roles.clone(),
            world,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;

    #[test]
    fn solves_a_minimal_two_player_puzzle() {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Demon)
                .category_counts([(1, 1), (0, 0), (0, 0), (1, 1), (0, 0)])
                .build()
                .unwrap(),
        );
        let solutions = solve(&puzzle).unwrap();
        assert!(!solutions.is_empty());
    }

    #[test]
    fn falls_back_to_all_good_when_demons_are_not_required() {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Knight)
                .category_counts([(2, 2), (0, 0), (0, 0), (0, 0), (0, 0)])
                .build()
                .unwrap(),
        );
        let solutions = solve(&puzzle).unwrap();
        assert!(!solutions.is_empty());
        assert!(solutions.iter().all(|s| s.world.players.iter().all(|p| !p.is_evil)));
    }
}
