//! The phase-by-phase simulation scheduler (spec.md §4.5). Grounded on
//! `examples/original_source/clockchecker/core.py::State.run_next_character`/
//! `run_all_players_with_currently_acting_character`/`end_setup`/`end_night`/
//! `end_day`/`check_game_over` and `solve.py::_world_check`/`_round_robin`,
//! generalized from the teacher's `Multiverse`-filtering shape in
//! `game/state.rs`.

use tracing::debug;

use crate::error::Result;
use crate::placement::StartingConfiguration;
use crate::puzzle::Puzzle;
use crate::roles::{RoleAbility, RoleKind, WakePattern};
use crate::world::{ClaimedExternal, Player, PlayerId, World};

/// Builds the initial `World` for one starting configuration: one `Player`
/// per seat, with claims configured from `Puzzle::claims` (mirrors
/// `core.py::Player.__post_init__`'s reorganization of raw puzzle input).
fn build_initial_world(puzzle: &std::sync::Arc<Puzzle>, config: &StartingConfiguration) -> World {
    let players: Vec<Player> = (0..puzzle.num_players())
        .map(|i| {
            let mut p = Player::new(
                puzzle.players[i].name.clone(),
                puzzle.players[i].claim,
                config.roles[i],
                config.evil[i],
            );
            let params = crate::roles::RoleParams::from(&puzzle.claims[i]);
            p.role.configure(&params);
            p.external_night_info = puzzle.claims[i]
                .external_claims
                .iter()
                .map(|(turn, role, predicate)| ClaimedExternal {
                    turn: *turn,
                    role: *role,
                    predicate: predicate.clone(),
                })
                .collect();
            p
        })
        .collect();
    World::new(puzzle.clone(), players)
}

/// Dispatches a `World -> WorldIter`-shaped hook to every player currently
/// holding `role_kind`, threading forks through sequentially so a role held
/// by more than one player (duplicate tokens) still gets a turn per holder.
fn dispatch<F>(worlds: Vec<World>, role_kind: RoleKind, mut call: F) -> Result<Vec<World>>
where
    F: FnMut(&mut Box<dyn RoleAbility>, World, PlayerId) -> Result<crate::roles::WorldIter>,
{
    let mut out = Vec::new();
    for world in worlds {
        let holders: Vec<PlayerId> = (0..world.num_players())
            .filter(|&p| world.players[p].role.kind() == role_kind)
            .collect();
        if holders.is_empty() {
            out.push(world);
            continue;
        }
        let mut current = vec![world];
        for holder in holders {
            let mut next = Vec::new();
            for w in current {
                let mut role = w.players[holder].role.clone();
                for forked in call(&mut role, w.clone(), holder)? {
                    next.push(forked);
                }
            }
            current = next;
        }
        out.extend(current);
    }
    Ok(out)
}

fn wakes_on_night(pattern: WakePattern, night: u32) -> bool {
    match pattern {
        WakePattern::Never | WakePattern::Manual => false,
        WakePattern::FirstNight => night == 1,
        WakePattern::EachNight | WakePattern::EachNightStar | WakePattern::EachNightUntilSpent => true,
    }
}

/// Rejects worlds where a non-liar's seated role doesn't match their claim.
/// Mirrors `core.py::State.end_setup`.
fn end_setup(worlds: Vec<World>) -> Vec<World> {
    worlds
        .into_iter()
        .filter(|w| {
            (0..w.num_players()).all(|p| {
                let player = &w.players[p];
                player.behaves_evil() || player.role_kind().may_lie() || player.role_kind() == player.claim
            })
        })
        .collect()
}

/// Processes every external-info claim pinned to `night`, pruning worlds
/// where the claim is impossible given the acting player's state (spec.md
/// §4.1/§4.5 step 3a). A claim names the *role* that acted, not a seat, so a
/// world with no living holder of that role can never satisfy the claim; a
/// world with more than one holder (duplicate tokens) is satisfied if any
/// holder's `run_night_external` accepts it, since the claim only asserts
/// that the notification happened, not which holder triggered it.
///
/// Run once per night across every claimant rather than interleaved with
/// `dispatch` for each role in `puzzle.night_order`, because a claim's acting
/// role need not itself wake at night (e.g. `Rival`'s `wake_pattern` is
/// `Never` and it isn't in `GLOBAL_NIGHT_ORDER` at all — its pairing is fixed
/// at setup). Every `ExternalInfo` impl in this catalog only reads state
/// already settled on `World` by the time night reconciliation runs, so
/// dispatch-order placement doesn't matter here.
fn reconcile_external_info(world: &World, night: u32) -> bool {
    for player in &world.players {
        for claim in &player.external_night_info {
            if claim.turn != night {
                continue;
            }
            let holders: Vec<PlayerId> = (0..world.num_players())
                .filter(|&p| world.players[p].role.kind() == claim.role)
                .collect();
            let satisfied = holders
                .iter()
                .any(|&holder| world.players[holder].role.run_night_external(world, claim.predicate.as_ref(), holder));
            if !satisfied {
                return false;
            }
        }
    }
    true
}

/// Reconciles the simulated alive-vector against the puzzle's recorded
/// deaths/resurrections for a given night. Mirrors `core.py::State._end_night`.
fn reconcile_night_deaths(world: &World, night: u32) -> bool {
    for &(n, who) in &world.puzzle.night_deaths {
        if n == night && !world.players[who].is_dead {
            return false;
        }
    }
    for &(n, who) in &world.puzzle.night_resurrections {
        if n == night && world.players[who].is_dead {
            return false;
        }
    }
    // conversely, nobody may die on a night the puzzle didn't record a death
    // for, unless the puzzle explicitly allows killing already-dead players
    let expected_deaths: std::collections::HashSet<PlayerId> = world
        .puzzle
        .night_deaths
        .iter()
        .filter(|&&(n, _)| n == night)
        .map(|&(_, who)| who)
        .collect();
    for p in 0..world.num_players() {
        if world.players[p].is_dead && !expected_deaths.contains(&p) {
            // only a problem if this death happened *this* night; deaths
            // carried over from a prior night are fine. We approximate "this
            // night" by checking night == world.night at call time, which
            // the caller guarantees.
            if !world.puzzle.night_deaths.iter().any(|&(n, who)| who == p && n <= night) {
                return false;
            }
        }
    }
    true
}

/// Applies every role's `end_day` hook, pruning worlds where any veto.
/// Mirrors `core.py::State._end_day`.
fn end_day(mut world: World, day: u32) -> Option<World> {
    for p in 0..world.num_players() {
        let mut role = world.players[p].role.clone();
        let ok = role.end_day(&mut world, day, p);
        world.players[p].role = role;
        if !ok {
            return None;
        }
    }
    Some(world)
}

/// Advances one initial world through setup, every recorded night/day, and
/// the final round-robin speculative-good re-simulation pass (spec.md §4.5
/// items 1-4). Returns every surviving leaf world.
pub fn run(puzzle: &std::sync::Arc<Puzzle>, config: &StartingConfiguration) -> Result<Vec<World>> {
    let initial = build_initial_world(puzzle, config);
    run_from(puzzle, vec![initial], false)
}

fn run_from(
    puzzle: &std::sync::Arc<Puzzle>,
    mut worlds: Vec<World>,
    is_round_robin: bool,
) -> Result<Vec<World>> {
    for &role_kind in &puzzle.setup_order {
        worlds = dispatch(worlds, role_kind, |role, world, me| role.run_setup(world, me))?;
    }
    worlds = end_setup(worlds);
    debug!(count = worlds.len(), "worlds surviving end_setup");

    for night in 1..=puzzle.max_night {
        for w in worlds.iter_mut() {
            w.night = night;
        }
        for &role_kind in &puzzle.night_order {
            if !wakes_on_night(role_kind.wake_pattern(), night) {
                continue;
            }
            worlds = dispatch(worlds, role_kind, |role, world, me| role.run_night(world, night, me))?;
            for w in worlds.iter_mut() {
                for p in 0..w.num_players() {
                    if w.players[p].role.kind() == role_kind && !w.players[p].is_dead {
                        w.players[p].woke_tonight = true;
                    }
                }
            }
        }

        worlds.retain(|w| reconcile_external_info(w, night));
        worlds.retain(|w| reconcile_night_deaths(w, night));
        // Pruning rule (iv) (spec.md §4.5): a game-over predicate firing before
        // the puzzle's final recorded round contradicts the puzzle's
        // assumption that the game continued. This is independent of
        // `allow_killing_dead_players`, which only governs whether a kill
        // ability may target an already-dead player (`core.py:746`), not
        // whether the game-over state itself is accepted.
        worlds.retain(|w| {
            !w.check_game_over() || (night >= puzzle.max_night && night >= puzzle.max_day)
        });
        debug!(night, count = worlds.len(), "worlds surviving night reconciliation");

        if night <= puzzle.max_day {
            for w in worlds.iter_mut() {
                w.day = night;
                w.executed_today = false;
            }
            for &role_kind in &puzzle.day_order {
                worlds = dispatch(worlds, role_kind, |role, world, me| role.run_day(world, night, me))?;
            }
            let mut with_events = Vec::new();
            for world in worlds {
                let mut current = vec![world];
                for (event_day, event) in &puzzle.day_events {
                    if *event_day != night {
                        continue;
                    }
                    let mut next = Vec::new();
                    for w in current {
                        next.extend(event.apply(w)?);
                    }
                    current = next;
                }
                with_events.extend(current);
            }
            worlds = with_events
                .into_iter()
                .filter_map(|w| end_day(w, night))
                .collect();
            debug!(day = night, count = worlds.len(), "worlds surviving end_day");
        }
    }

    if is_round_robin {
        return Ok(worlds);
    }

    // Round-robin re-simulation (spec.md §4.5 item 4): any player who could
    // have lied (is not evil, and their role may_lie) but never exercised
    // that opportunity gets re-run with the constraint made explicit, to
    // avoid double-counting a world that's identical whether or not the
    // storyteller "could have" made them lie.
    let mut final_worlds = Vec::new();
    for world in worlds {
        let needs_round_robin = (0..world.num_players()).any(|p| {
            !world.players[p].speculative_good
                && !world.players[p].is_evil
                && world.players[p].role_kind().may_lie()
        });
        if !needs_round_robin {
            final_worlds.push(world);
            continue;
        }
        let mut marked = world.clone();
        for p in 0..marked.num_players() {
            if !marked.players[p].is_evil && marked.players[p].role_kind().may_lie() {
                marked.players[p].speculative_good = true;
            }
        }
        final_worlds.extend(run_from(puzzle, vec![marked], true)?);
    }

    Ok(final_worlds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;
    use std::sync::Arc;

    #[test]
    fn minimal_two_player_puzzle_solves_to_at_least_one_world() {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Demon)
                .category_counts([(1, 1), (0, 0), (0, 0), (1, 1), (0, 0)])
                .build_unchecked(),
        );
        let config = StartingConfiguration {
            roles: vec![RoleKind::Savant, RoleKind::Demon],
            evil: vec![false, true],
            lineage: vec![0],
        };
        let worlds = run(&puzzle, &config).unwrap();
        assert!(!worlds.is_empty());
    }

    #[test]
    fn external_info_claim_prunes_worlds_where_the_named_twin_is_wrong() {
        use crate::info::EvilTwinNotification;
        use crate::puzzle::ClaimSpec;
        use std::sync::Arc as StdArc;

        // B claims the Evil Twin notification named A as the paired good
        // twin; only the branch where Rival's setup actually chose A survives.
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Rival)
                .claim(ClaimSpec::default())
                .external_claim(1, RoleKind::Rival, StdArc::new(EvilTwinNotification(0)))
                .category_counts([(1, 1), (0, 0), (1, 1), (0, 0), (0, 0)])
                .build_unchecked(),
        );
        let config = StartingConfiguration {
            roles: vec![RoleKind::Savant, RoleKind::Rival],
            evil: vec![false, true],
            lineage: vec![0],
        };
        let worlds = run(&puzzle, &config).unwrap();
        assert!(!worlds.is_empty());
        assert!(worlds.iter().all(|w| w.rival_twin == Some(0)));
    }

    #[test]
    fn end_setup_rejects_a_non_liar_whose_role_differs_from_claim() {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Demon)
                .build_unchecked(),
        );
        let config = StartingConfiguration {
            // seat 0 claims Savant but actually holds Knight, and is not evil
            roles: vec![RoleKind::Knight, RoleKind::Demon],
            evil: vec![false, true],
            lineage: vec![0],
        };
        let worlds = run(&puzzle, &config).unwrap();
        assert!(worlds.is_empty());
    }
}
