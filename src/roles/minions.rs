//! Minions: evil support roles. Several fork over candidate targets at
//! setup or nightly, matching `characters.py`'s per-minion `run_setup`/
//! `run_night` patterns.

use super::{single, Category, RoleAbility, RoleAttrValue, RoleKind, WorldIter};
use crate::world::{PlayerId, World};

/// Grounded on `characters.py::Poisoner`: nightly droisons one chosen
/// player (possibly itself), forking one world per candidate target.
#[derive(Clone, Debug, Default)]
pub struct Witch {
    target: Option<PlayerId>,
    target_history: Vec<PlayerId>,
}
impl RoleAbility for Witch {
    fn kind(&self) -> RoleKind {
        RoleKind::Witch
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let candidates: Vec<PlayerId> = world.alive_players().collect();
        let instances: Vec<Box<dyn RoleAbility>> = candidates
            .iter()
            .map(|&c| {
                let mut inst = self.clone();
                inst.target = Some(c);
                inst.target_history.push(c);
                Box::new(inst) as Box<dyn RoleAbility>
            })
            .collect();
        let mut worlds: Vec<World> = Vec::new();
        for (candidate, inst) in candidates.into_iter().zip(instances.into_iter()) {
            let mut w = world.fork("witch_target");
            w.players[me].role = inst;
            w.droison(candidate);
            worlds.push(w);
        }
        Ok(Box::new(worlds.into_iter()))
    }
    fn end_day(&mut self, world: &mut World, _day: u32, me: PlayerId) -> bool {
        if let Some(t) = self.target.take() {
            world.undroison(t);
        }
        let _ = me;
        true
    }
    /// Exposes tonight's chosen target under key `"target"`, the Rust
    /// analogue of `info.py::CharAttrEq` reading `character.target` off a
    /// live `Poisoner` instance.
    fn role_attr(&self, key: &str) -> Option<RoleAttrValue> {
        match key {
            "target" => self.target.map(RoleAttrValue::Player),
            _ => None,
        }
    }
}

/// Grounded on `characters.py::Spy`: misregisters as Townsfolk or Outsider
/// while alive and sober.
#[derive(Clone, Debug, Default)]
pub struct Infiltrator;
impl RoleAbility for Infiltrator {
    fn kind(&self) -> RoleKind {
        RoleKind::Infiltrator
    }
}

/// Grounded on `characters.py::Baron`: adds two to the Outsider bounds,
/// handled statically by `RoleKind::modify_category_bounds`.
#[derive(Clone, Debug, Default)]
pub struct Usurper;
impl RoleAbility for Usurper {
    fn kind(&self) -> RoleKind {
        RoleKind::Usurper
    }
}

/// Grounded on `characters.py::ScarletWoman`: if the Demon dies with four or
/// more players alive and this player is alive and sober, it catches the
/// Demon's role.
#[derive(Clone, Debug, Default)]
pub struct Heir;
impl Heir {
    pub fn catches_death(&self, world: &World, me: PlayerId) -> bool {
        world.num_alive() >= 4 && !world.players[me].is_dead && world.players[me].is_sober()
    }
}
impl RoleAbility for Heir {
    fn kind(&self) -> RoleKind {
        RoleKind::Heir
    }
}

/// Grounded on `characters.py::EvilTwin`: paired at setup with a good twin;
/// `check_game_over` treats a living, sober Rival as blocking a good win
/// the same way a living Demon does (`World::check_game_over`).
#[derive(Clone, Debug, Default)]
pub struct Rival {
    twin: Option<PlayerId>,
}
impl RoleAbility for Rival {
    fn kind(&self) -> RoleKind {
        RoleKind::Rival
    }
    fn run_setup(&mut self, world: World, me: PlayerId) -> crate::error::Result<WorldIter> {
        let candidates: Vec<PlayerId> = (0..world.num_players())
            .filter(|&p| p != me && !world.players[p].is_evil)
            .collect();
        let mut worlds = Vec::new();
        for c in candidates {
            let mut inst = self.clone();
            inst.twin = Some(c);
            let mut w = world.fork("rival_twin");
            w.players[me].role = Box::new(inst);
            // Settled here rather than derived from role state at query time
            // so `info::EvilTwinNotification` can read it off `World` without
            // knowing which seat, if any, holds a live `Rival`.
            w.rival_twin = Some(c);
            worlds.push(w);
        }
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Grounded on `characters.py::PitHag`/`SnakeCharmer`: swaps its own role
/// with a chosen Demon's, forking one world per candidate Demon, and then
/// self-poisons. Exercises the role-change operation (spec.md §4.3).
#[derive(Clone, Debug, Default)]
pub struct Shapeshifter;
impl RoleAbility for Shapeshifter {
    fn kind(&self) -> RoleKind {
        RoleKind::Shapeshifter
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let demons: Vec<PlayerId> = world
            .alive_players()
            .filter(|&p| p != me && world.players[p].role.kind().category() == Category::Demon)
            .collect();
        let mut worlds = Vec::new();
        for target in demons {
            let w = world.fork("shapeshifter_swap");
            let target_kind = w.players[target].role.kind();
            for w1 in w.change_character(target, RoleKind::Shapeshifter)? {
                for w2 in w1.change_character(me, target_kind)? {
                    let mut w2 = w2;
                    w2.players[me].is_evil = true;
                    w2.droison(me);
                    worlds.push(w2);
                }
            }
        }
        Ok(Box::new(worlds.into_iter()))
    }
}

/// Generic hidden evil Minion with no distinguishing mechanic beyond hiding
/// under a Townsfolk claim; the S1-style `trickster_minion` hidden-pool
/// slot spec.md names directly.
#[derive(Clone, Debug, Default)]
pub struct Trickster;
impl RoleAbility for Trickster {
    fn kind(&self) -> RoleKind {
        RoleKind::Trickster
    }
}
