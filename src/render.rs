//! Human-readable display of a solved puzzle: a per-seat probability table
//! across every surviving world, plus a one-line summary of a single world.
//! Grounded on `game/types.rs::Multiverse::probability_table` (percentage
//! breakdown per seat across a set of universes) and
//! `examples/original_source/clockchecker/core.py::State.__str__`/
//! `Puzzle.__str__` (per-seat role/alive listing).

use std::fmt;

use crate::roles::{Category, RoleKind};
use crate::solver::Solution;
use crate::world::World;

/// Renders one world as `seat: Role (dead)` lines, the Rust-idiomatic
/// counterpart of `core.py::State.__str__`.
pub struct WorldView<'a>(pub &'a World);

impl fmt::Display for WorldView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (seat, player) in self.0.players.iter().enumerate() {
            let status = if player.is_dead { " (dead)" } else { "" };
            let evil = if player.is_evil { " [evil]" } else { "" };
            writeln!(
                f,
                "{seat}: {} is {}{evil}{status}",
                player.name,
                player.role_kind()
            )?;
        }
        Ok(())
    }
}

/// Per-seat breakdown of how often each category appears across a solution
/// set, the Rust/role-category analogue of `Multiverse::probability_table`'s
/// per-seat village/werewolf/dead ratios.
pub struct ProbabilityTable {
    pub rows: Vec<SeatProbabilities>,
}

pub struct SeatProbabilities {
    pub seat: usize,
    pub name: String,
    /// `(category, fraction of solutions)`, covering every category that
    /// appeared at least once for this seat.
    pub by_category: Vec<(Category, f64)>,
    pub dead_fraction: f64,
}

/// Builds a [`ProbabilityTable`] from a full solution set. Empty input
/// yields an empty table rather than dividing by zero.
pub fn probability_table(solutions: &[Solution]) -> ProbabilityTable {
    if solutions.is_empty() {
        return ProbabilityTable { rows: Vec::new() };
    }
    let num_players = solutions[0].world.num_players();
    let total = solutions.len() as f64;

    let mut rows = Vec::with_capacity(num_players);
    for seat in 0..num_players {
        let mut counts: Vec<(Category, usize)> = Vec::new();
        let mut dead = 0usize;
        for solution in solutions {
            let player = &solution.world.players[seat];
            if player.is_dead {
                dead += 1;
            }
            let category = player.role_kind().category();
            match counts.iter_mut().find(|(c, _)| *c == category) {
                Some((_, n)) => *n += 1,
                None => counts.push((category, 1)),
            }
        }
        let by_category = counts
            .into_iter()
            .map(|(c, n)| (c, n as f64 / total))
            .collect();
        rows.push(SeatProbabilities {
            seat,
            name: solutions[0].world.players[seat].name.clone(),
            by_category,
            dead_fraction: dead as f64 / total,
        });
    }
    ProbabilityTable { rows }
}

impl fmt::Display for ProbabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            write!(f, "{}: {}", row.seat, row.name)?;
            for (category, fraction) in &row.by_category {
                write!(f, ", {category:?} {:.0}%", fraction * 100.0)?;
            }
            if row.dead_fraction > 0.0 {
                write!(f, ", dead {:.0}%", row.dead_fraction * 100.0)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The unambiguous role for a seat, if every surviving world agrees on it.
/// Mirrors `game/types.rs::Multiverse::role`.
pub fn unambiguous_role(solutions: &[Solution], seat: usize) -> Option<RoleKind> {
    let first = solutions.first()?.world.players.get(seat)?.role_kind();
    solutions
        .iter()
        .all(|s| s.world.players[seat].role_kind() == first)
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;
    use std::sync::Arc;

    fn world_with(roles: &[RoleKind], evil: &[bool]) -> World {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", roles[0])
                .player("B", roles[1])
                .build_unchecked(),
        );
        let players = roles
            .iter()
            .zip(evil.iter())
            .enumerate()
            .map(|(i, (&r, &e))| {
                crate::world::Player::new(if i == 0 { "A" } else { "B" }, roles[i], r, e)
            })
            .collect();
        World::new(puzzle, players)
    }

    #[test]
    fn probability_table_reports_full_agreement_as_one_hundred_percent() {
        let world = world_with(&[RoleKind::Savant, RoleKind::Demon], &[false, true]);
        let solutions = vec![
            Solution {
                initial_roles: vec![RoleKind::Savant, RoleKind::Demon],
                world: world.clone(),
            },
            Solution {
                initial_roles: vec![RoleKind::Savant, RoleKind::Demon],
                world,
            },
        ];
        let table = probability_table(&solutions);
        assert_eq!(table.rows[0].by_category, vec![(Category::Townsfolk, 1.0)]);
        assert_eq!(unambiguous_role(&solutions, 1), Some(RoleKind::Demon));
    }
}
