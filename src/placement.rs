//! The starting-configuration enumerator (spec.md §4.4). Grounded on
//! `examples/original_source/clockchecker/solve.py::_place_hidden_characters`/
//! `_check_token_counts`, enriched by the teacher's permutation-generation
//! style in `game/types.rs::Multiverse::new` and the brute-force permutation
//! pattern in
//! `examples/other_examples/6975f52c_ITR13-Demon_Deduce__src-solver.rs.rs`.

use itertools::Itertools;

use crate::error::{Result, ValidationError};
use crate::puzzle::Puzzle;
use crate::roles::{Category, CategoryBounds, RoleKind};
use crate::world::PlayerId;

/// One fully-specified hypothesis about which seat holds which actual role,
/// prior to any world being built from it. `lineage` is the tuple of index
/// choices spec.md §4.4 requires for deterministic enumeration.
#[derive(Debug, Clone)]
pub struct StartingConfiguration {
    pub roles: Vec<RoleKind>,
    pub evil: Vec<bool>,
    pub lineage: Vec<usize>,
}

fn cat_idx(c: Category) -> usize {
    match c {
        Category::Townsfolk => 0,
        Category::Outsider => 1,
        Category::Minion => 2,
        Category::Demon => 3,
        Category::Traveller => 4,
    }
}

fn count_by_category(roles: &[RoleKind]) -> [u8; 5] {
    let mut counts = [0u8; 5];
    for r in roles {
        counts[cat_idx(r.category())] += 1;
    }
    counts
}

fn within_bounds(counts: &[u8; 5], bounds: &CategoryBounds) -> bool {
    (0..5).all(|i| counts[i] >= bounds[i].0 && counts[i] <= bounds[i].1)
}

/// Applies every chosen role's `modify_category_bounds`, starting from the
/// puzzle's base `(T,T),(O,O),(M,M),(D,D)` counts (spec.md §4.4 step 3).
fn modified_bounds(base: CategoryBounds, chosen: &[RoleKind]) -> CategoryBounds {
    chosen
        .iter()
        .fold(base, |bounds, role| role.modify_category_bounds(bounds))
}

/// Enumerates every starting configuration consistent with the puzzle's
/// category bounds, hidden-role pool, and seating constraints. Deterministic
/// given identical inputs — the candidate combinations/permutations are
/// walked in a fixed order and `lineage` records the path taken.
pub fn enumerate(puzzle: &Puzzle) -> Result<Vec<StartingConfiguration>> {
    let n = puzzle.num_players();
    let claims: Vec<RoleKind> = puzzle.players.iter().map(|p| p.claim).collect();

    let demons: Vec<RoleKind> = puzzle
        .hidden_pool
        .iter()
        .copied()
        .filter(|r| r.category() == Category::Demon)
        .collect();
    let minions: Vec<RoleKind> = puzzle
        .hidden_pool
        .iter()
        .copied()
        .filter(|r| r.category() == Category::Minion)
        .collect();
    let good_pool: Vec<RoleKind> = puzzle
        .hidden_pool
        .iter()
        .copied()
        .filter(|r| matches!(r.category(), Category::Townsfolk | Category::Outsider | Category::Traveller))
        .collect();

    let (_, d_max) = puzzle.category_counts[cat_idx(Category::Demon)];
    let (m_min, _) = puzzle.category_counts[cat_idx(Category::Minion)];

    let mut configs = Vec::new();
    let mut lineage_counter = 0usize;

    // Step 2: choose exactly `d_max` demons, at least `m_min` minions (extra
    // minions are how Usurper-style bound-wideners get represented), and any
    // subset of the hidden-good pool.
    let demon_choices: Vec<Vec<RoleKind>> = if demons.len() < d_max as usize {
        Vec::new()
    } else {
        demons
            .iter()
            .copied()
            .combinations(d_max as usize)
            .collect()
    };

    for demon_set in &demon_choices {
        for minion_count in m_min as usize..=minions.len() {
            for minion_set in minions.iter().copied().combinations(minion_count) {
                for good_count in 0..=good_pool.len() {
                    for good_set in good_pool.iter().copied().combinations(good_count) {
                        let mut chosen: Vec<RoleKind> = Vec::new();
                        chosen.extend(demon_set.iter().copied());
                        chosen.extend(minion_set.iter().copied());
                        chosen.extend(good_set.iter().copied());

                        if chosen.len() > n {
                            continue;
                        }

                        let bounds = modified_bounds(puzzle.category_counts, &chosen);

                        // Step 3: permute the chosen liars into seats.
                        for seats in (0..n).permutations(chosen.len()) {
                            if puzzle.options.player_zero_is_you {
                                if let Some(pos) = seats.iter().position(|&s| s == 0) {
                                    let assigned = chosen[pos];
                                    if assigned != claims[0] && !puzzle.hidden_self.contains(&assigned) {
                                        continue;
                                    }
                                }
                            }

                            let mut roles = claims.clone();
                            let mut evil = vec![false; n];
                            for (role, &seat) in chosen.iter().zip(seats.iter()) {
                                roles[seat] = *role;
                                evil[seat] = matches!(role.category(), Category::Minion | Category::Demon);
                            }

                            let counts = count_by_category(&roles);
                            if !within_bounds(&counts, &bounds) {
                                continue;
                            }

                            if !puzzle.options.allow_duplicate_tokens_in_bag {
                                let mut seen = std::collections::HashSet::new();
                                if !roles.iter().all(|r| seen.insert(*r)) {
                                    continue;
                                }
                            }

                            lineage_counter += 1;
                            configs.push(StartingConfiguration {
                                roles,
                                evil,
                                lineage: vec![lineage_counter],
                            });
                        }
                    }
                }
            }
        }
    }

    if configs.is_empty() && !demon_choices.is_empty() {
        // every candidate was pruned by seating/bound/duplicate checks; this
        // is a legitimate "no solutions" outcome, not an error.
    }
    if demons.len() < d_max as usize && d_max > 0 {
        return Err(ValidationError::RoleCountsImpossible(puzzle.category_counts, n).into());
    }

    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;

    #[test]
    fn enumerates_at_least_one_configuration_for_a_minimal_puzzle() {
        let puzzle = PuzzleBuilder::new()
            .player("A", RoleKind::Savant)
            .player("B", RoleKind::Knight)
            .player("C", RoleKind::Steward)
            .player("D", RoleKind::Investigator)
            .player("E", RoleKind::Noble)
            .hidden_pool(vec![RoleKind::Demon, RoleKind::Trickster])
            .category_counts([(3, 3), (0, 0), (1, 1), (1, 1), (0, 0)])
            .build_unchecked();
        let configs = enumerate(&puzzle).unwrap();
        assert!(!configs.is_empty());
        for config in &configs {
            let counts = count_by_category(&config.roles);
            assert_eq!(counts[cat_idx(Category::Demon)], 1);
            assert_eq!(counts[cat_idx(Category::Minion)], 1);
        }
    }

    #[test]
    fn duplicate_claims_are_allowed_when_the_puzzle_permits_it() {
        let puzzle = PuzzleBuilder::new()
            .player("A", RoleKind::Savant)
            .player("B", RoleKind::Savant)
            .player("C", RoleKind::Savant)
            .hidden_pool(vec![RoleKind::Demon])
            .category_counts([(2, 2), (0, 0), (0, 0), (1, 1), (0, 0)])
            .options(crate::puzzle::SolverOptions {
                allow_duplicate_tokens_in_bag: true,
                ..Default::default()
            })
            .build_unchecked();
        let configs = enumerate(&puzzle).unwrap();
        assert!(!configs.is_empty());
    }
}
