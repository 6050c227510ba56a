//! Demons: the night-killers. `Demon` is the plain every-night-star killer
//! every script needs at least one of; the rest specialize its shape.

use super::{single, Category, RoleAbility, RoleKind, WorldIter};
use crate::error::SolveError;
use crate::world::{PlayerId, World};

fn is_protected(world: &World, target: PlayerId) -> bool {
    world.protected_tonight == Some(target)
}

/// Picks a living catcher for a star-pass (Heir-analogue priority first,
/// else any other living Minion), mirroring `characters.py::Imp`'s star-pass
/// logic and `ScarletWoman`'s `catches_death` eligibility check.
fn star_pass_candidates(world: &World, dying: PlayerId) -> Vec<PlayerId> {
    let eligible_heirs: Vec<PlayerId> = world
        .alive_players()
        .filter(|&p| {
            p != dying
                && world.players[p].role.kind() == RoleKind::Heir
                && world.num_alive() >= 4
                && world.players[p].is_sober()
        })
        .collect();
    if !eligible_heirs.is_empty() {
        return eligible_heirs;
    }
    world
        .alive_players()
        .filter(|&p| p != dying && world.players[p].role.kind().category() == Category::Minion)
        .collect()
}

fn generic_kill(
    mut world: World,
    me: PlayerId,
    target: PlayerId,
    new_kind_on_star_pass: RoleKind,
) -> crate::error::Result<WorldIter> {
    if world.players[target].is_dead || is_protected(&world, target) {
        // "sunk kill" on an already-dead or protected target: nothing new.
        return Ok(single(world));
    }
    let self_kill = target == me;
    world.apply_death(target);
    if !self_kill {
        return Ok(single(world));
    }
    let candidates = star_pass_candidates(&world, me);
    if candidates.is_empty() {
        return Ok(single(world));
    }
    let mut worlds = Vec::new();
    for catcher in candidates {
        let w = world.fork("star_pass");
        for mut w2 in w.change_character(catcher, new_kind_on_star_pass)? {
            w2.players[catcher].is_evil = true;
            worlds.push(w2);
        }
    }
    Ok(Box::new(worlds.into_iter()))
}

/// Generic every-night-star demon kill. Grounded on
/// `characters.py::GenericDemon`/`Imp`.
#[derive(Clone, Debug, Default)]
pub struct Demon;
impl RoleAbility for Demon {
    fn kind(&self) -> RoleKind {
        RoleKind::Demon
    }
    fn run_night(&mut self, world: World, night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if night == 1 {
            return Ok(single(world));
        }
        let candidates: Vec<PlayerId> = world.alive_players().collect();
        let mut worlds = Vec::new();
        for target in candidates {
            let w = world.fork("demon_kill_choice");
            worlds.extend(generic_kill(w, me, target, RoleKind::Demon)?);
        }
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Grounded on `characters.py::FangGu`: jumps to an Outsider on its first
/// kill (widening the bag by one Outsider, handled statically via
/// `RoleKind::modify_category_bounds`), and can star-pass. Later kills are
/// left unimplemented, matching the original's `raise
/// NotImplementedError("FangGu")`.
#[derive(Clone, Debug, Default)]
pub struct Wanderer {
    jumped: bool,
}
impl RoleAbility for Wanderer {
    fn kind(&self) -> RoleKind {
        RoleKind::Wanderer
    }
    fn run_night(&mut self, world: World, night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if night == 1 {
            return Ok(single(world));
        }
        if self.jumped {
            return Err(SolveError::NotImplemented("Wanderer::second_kill"));
        }
        let candidates: Vec<PlayerId> = world.alive_players().filter(|&p| p != me).collect();
        let worlds: Vec<World> = candidates
            .into_iter()
            .map(|target| {
                let mut inst = self.clone();
                inst.jumped = true;
                let mut w = world.fork("wanderer_jump");
                w.players[me].role = Box::new(inst);
                w.apply_death(target);
                w
            })
            .collect();
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Grounded on `characters.py::NoDashii`: at setup, poisons the nearest
/// living Townsfolk neighbour in each direction, forking over every valid
/// candidate set (one or two seats, deduplicated if both directions land on
/// the same seat).
#[derive(Clone, Debug, Default)]
pub struct Basilisk {
    poisoned: Vec<PlayerId>,
}
impl RoleAbility for Basilisk {
    fn kind(&self) -> RoleKind {
        RoleKind::Basilisk
    }
    fn run_setup(&mut self, world: World, me: PlayerId) -> crate::error::Result<WorldIter> {
        let is_townsfolk = |w: &World, p: PlayerId| w.players[p].role.kind().category() == Category::Townsfolk;
        let forward = crate::info::next_player_who_is(&world, me, is_townsfolk);
        let n = world.num_players();
        let backward = (1..n).find_map(|offset| {
            let p = (me + n - offset) % n;
            if is_townsfolk(&world, p) {
                Some(p)
            } else {
                None
            }
        });
        let mut poisoned = Vec::new();
        if let Some(f) = forward {
            poisoned.push(f);
        }
        if let Some(b) = backward {
            if Some(b) != forward {
                poisoned.push(b);
            }
        }
        let mut inst = self.clone();
        inst.poisoned = poisoned.clone();
        let mut w = world.fork("basilisk_poison");
        for p in &poisoned {
            w.droison(*p);
        }
        w.players[me].role = Box::new(inst);
        Ok(single(w))
    }
    fn run_night(&mut self, world: World, night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if night == 1 {
            return Ok(single(world));
        }
        let candidates: Vec<PlayerId> = world.alive_players().filter(|&p| p != me).collect();
        let worlds: Vec<World> = candidates
            .into_iter()
            .map(|target| {
                let mut w = world.fork("basilisk_kill_choice");
                w.apply_death(target);
                w
            })
            .collect();
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Grounded on `characters.py::Po`: one kill normally, three once charged.
/// The charged three-kill mode is explicitly unfinished upstream
/// (`print('Untested code')`); reproduced as a deliberate
/// `SolveError::NotImplemented` rather than guessed at (see DESIGN.md).
#[derive(Clone, Debug, Default)]
pub struct Triskelion {
    charged: bool,
}
impl RoleAbility for Triskelion {
    fn kind(&self) -> RoleKind {
        RoleKind::Triskelion
    }
    fn run_night(&mut self, world: World, night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if night == 1 {
            return Ok(single(world));
        }
        if self.charged {
            return Err(SolveError::NotImplemented("Triskelion::charged_kill"));
        }
        let candidates: Vec<PlayerId> = world.alive_players().filter(|&p| p != me).collect();
        let mut worlds = Vec::new();
        for target in candidates {
            // Choosing not to charge kills one this night; charging kills
            // none tonight but arms the three-kill mode for next time.
            let mut kill_world = world.fork("triskelion_single_kill");
            kill_world.apply_death(target);
            worlds.push(kill_world);
        }
        let mut charge_world = world.fork("triskelion_charge");
        let mut inst = self.clone();
        inst.charged = true;
        charge_world.players[me].role = Box::new(inst);
        worlds.push(charge_world);
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Grounded on `characters.py::Vortox`: activates the world-level `vortox`
/// bit at setup, inverting every Townsfolk's default info-check polarity
/// for the rest of the game (spec.md §4.2 step 4/6). Kills the same way any
/// other demon does; the info inversion itself lives in
/// `super::default_info_check` and `Savant::run_day`, which both read
/// `world.vortox`. Also vetoes any day that passes with nobody executed
/// (`end_day` below) — evil is considered to have already won under Vortox
/// once a day goes by without an execution.
#[derive(Clone, Debug, Default)]
pub struct Vortox;
impl RoleAbility for Vortox {
    fn kind(&self) -> RoleKind {
        RoleKind::Vortox
    }
    fn run_setup(&mut self, mut world: World, _me: PlayerId) -> crate::error::Result<WorldIter> {
        world.vortox = true;
        Ok(single(world))
    }
    fn run_night(&mut self, world: World, night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if night == 1 {
            return Ok(single(world));
        }
        let candidates: Vec<PlayerId> = world.alive_players().filter(|&p| p != me).collect();
        let worlds: Vec<World> = candidates
            .into_iter()
            .map(|target| {
                let mut w = world.fork("vortox_kill_choice");
                w.apply_death(target);
                w
            })
            .collect();
        Ok(Box::new(worlds.into_iter()))
    }
    /// Mirrors `characters.py::Vortox.end_day`: evil has already won once a
    /// day passes with nobody executed, so any such world is rejected.
    fn end_day(&mut self, world: &mut World, _day: u32, _me: PlayerId) -> bool {
        world.executed_today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;
    use crate::world::Player;
    use std::sync::Arc;

    fn two_player_world() -> World {
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Vortox)
                .build_unchecked(),
        );
        let players = vec![
            Player::new("A", RoleKind::Savant, RoleKind::Savant, false),
            Player::new("B", RoleKind::Vortox, RoleKind::Vortox, true),
        ];
        World::new(puzzle, players)
    }

    #[test]
    fn vortox_end_day_vetoes_a_day_with_no_execution() {
        let mut world = two_player_world();
        world.executed_today = false;
        assert!(!Vortox.end_day(&mut world, 1, 1));
    }

    #[test]
    fn vortox_end_day_accepts_a_day_with_an_execution() {
        let mut world = two_player_world();
        world.executed_today = true;
        assert!(Vortox.end_day(&mut world, 1, 1));
    }
}
