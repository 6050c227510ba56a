//! Outsiders: roles good-aligned but working against the town in some way
//! (misregistration, unreliable info, an exploitable failure condition).

use super::{none, single, RoleAbility, RoleKind, RoleParams, WorldIter};
use crate::world::{PlayerId, World};

/// Grounded on `characters.py::Drunk`: believes itself to be whatever
/// Townsfolk it claims, but its ability always misfires — it is permanently,
/// invisibly droisoned. `lies_about_character` is false (the claim itself is
/// honest) but `lies_about_info` is true (what it reports is unreliable).
#[derive(Clone, Debug, Default)]
pub struct Drunk {
    believed_role: Option<RoleKind>,
}
impl RoleAbility for Drunk {
    fn kind(&self) -> RoleKind {
        RoleKind::Drunk
    }
    fn configure(&mut self, p: &RoleParams) {
        self.believed_role = p.claimed_role;
    }
    fn run_setup(&mut self, mut world: World, me: PlayerId) -> crate::error::Result<WorldIter> {
        world.players[me].droison_count += 1;
        world.players[me].effects_active = true;
        Ok(single(world))
    }
    fn acts_like(&self, claimed: RoleKind) -> bool {
        self.believed_role == Some(claimed)
    }
}

/// Grounded on `characters.py::Recluse`: always-on misregistration as Minion
/// or Demon to category-counting info.
#[derive(Clone, Debug, Default)]
pub struct Changeling;
impl RoleAbility for Changeling {
    fn kind(&self) -> RoleKind {
        RoleKind::Changeling
    }
}

/// Grounded on `characters.py::Mutant`: may be executed for madness about
/// claiming Outsider; otherwise a plain Outsider with no ability.
#[derive(Clone, Debug, Default)]
pub struct Heretic;
impl RoleAbility for Heretic {
    fn kind(&self) -> RoleKind {
        RoleKind::Heretic
    }
}

/// Grounded on `characters.py::Saint`: an execution that would otherwise
/// kill this player is only legal while droisoned (or didn't result in
/// death) — worlds where a sober Martyr is executed and dies are pruned.
#[derive(Clone, Debug, Default)]
pub struct Martyr;
impl RoleAbility for Martyr {
    fn kind(&self) -> RoleKind {
        RoleKind::Martyr
    }
    fn executed(
        &mut self,
        mut world: World,
        me: PlayerId,
        died: bool,
    ) -> crate::error::Result<WorldIter> {
        if died && world.players[me].is_sober() {
            return Ok(none());
        }
        if died {
            world.apply_death(me);
        }
        Ok(single(world))
    }
}

/// Grounded on `characters.py::Klutz`: on death, publicly chooses a player;
/// if evil, the game ends in an evil win, modeled via
/// `crate::events::ScapegoatChoice` pruning the world.
#[derive(Clone, Debug, Default)]
pub struct Scapegoat;
impl RoleAbility for Scapegoat {
    fn kind(&self) -> RoleKind {
        RoleKind::Scapegoat
    }
}
