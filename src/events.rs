//! Publicly-visible events used to describe a puzzle's day phase: executions,
//! slayer shots, juggles, public statements. Night deaths are not public and
//! so are not modeled as events (they live on `Puzzle::night_deaths`
//! instead). Grounded on `examples/original_source/clockchecker/events.py`.

use std::fmt;

use crate::roles::{single, WorldIter};
use crate::world::{PlayerId, World};

/// Mirrors `events.py::Event`: `apply` produces the worlds consistent with
/// the event having happened, `deaths` reports who it killed so the pipeline
/// can reconcile against `Puzzle::night_deaths`/living-player bookkeeping.
pub trait Event: fmt::Debug + Send + Sync {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter>;
    fn deaths(&self, _world: &World) -> Vec<PlayerId> {
        Vec::new()
    }
}

/// A player executed by popular vote; `died` is whatever the puzzle states
/// actually happened, so the role's `executed` hook can veto worlds where
/// that outcome is impossible (e.g. a Martyr-style role that can't die from
/// execution unprotected).
#[derive(Debug, Clone)]
pub struct Execution {
    pub player: PlayerId,
    pub died: bool,
}

impl Event for Execution {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        let mut world = world;
        world.executed_today = true;
        let mut role = world.players[self.player].role.clone();
        role.executed(world, self.player, self.died)
    }

    fn deaths(&self, _world: &World) -> Vec<PlayerId> {
        if self.died {
            vec![self.player]
        } else {
            Vec::new()
        }
    }
}

/// Harbinger's public once-per-game call (grounded on `Doomsayer.Call`): if
/// the caller and the target are not opposite-aligned, the target dies.
#[derive(Debug, Clone)]
pub struct HarbingerCall {
    pub caller: PlayerId,
    pub target: PlayerId,
}

impl Event for HarbingerCall {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        use crate::info::{IsEvil, Predicate};
        use crate::logic::Tri;
        let a = IsEvil(self.caller).eval(&world, self.caller);
        let b = IsEvil(self.target).eval(&world, self.caller);
        if (a ^ b) != Tri::True_ {
            let mut world = world;
            world.apply_death(self.target);
            Ok(single(world))
        } else {
            Ok(single(world))
        }
    }

    fn deaths(&self, world: &World) -> Vec<PlayerId> {
        use crate::info::{IsEvil, Predicate};
        use crate::logic::Tri;
        let a = IsEvil(self.caller).eval(world, self.caller);
        let b = IsEvil(self.target).eval(world, self.caller);
        if (a ^ b) != Tri::True_ {
            vec![self.target]
        } else {
            Vec::new()
        }
    }
}

/// Slayer's once-per-game public shot.
#[derive(Debug, Clone)]
pub struct SlayerShot {
    pub shooter: PlayerId,
    pub target: PlayerId,
    pub died: bool,
}

impl Event for SlayerShot {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        use crate::info::{IsCategory, Predicate};
        use crate::logic::Tri;
        use crate::roles::Category;
        let is_demon = IsCategory(self.target, Category::Demon).eval(&world, self.shooter);
        let mut world = world;
        let consistent = match (is_demon, self.died) {
            (Tri::False_, true) => false,
            (Tri::True_, false) => world.players[self.target].is_sober(),
            _ => true,
        };
        if !consistent {
            return Ok(Box::new(std::iter::empty()));
        }
        if self.died {
            world.apply_death(self.target);
        }
        Ok(single(world))
    }

    fn deaths(&self, _world: &World) -> Vec<PlayerId> {
        if self.died {
            vec![self.target]
        } else {
            Vec::new()
        }
    }
}

/// Diviner's public day guess ("this seat's role is X"), scored the
/// following night. Grounded on `characters.py::Juggler`.
#[derive(Debug, Clone)]
pub struct DivinerJuggle {
    pub juggler: PlayerId,
    pub guesses: Vec<(PlayerId, crate::roles::RoleKind)>,
}

impl Event for DivinerJuggle {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        // Recorded for the following night's count; no immediate effect.
        Ok(single(world))
    }
}

/// Town Crier's public statement, acted on the following night if true.
/// Grounded on `characters.py::Gossip`.
#[derive(Debug, Clone)]
pub struct TownCrierStatement {
    pub speaker: PlayerId,
    pub statement: std::sync::Arc<dyn crate::info::Predicate>,
}

impl Event for TownCrierStatement {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        Ok(single(world))
    }
}

/// Scapegoat's on-death public choice: if the chosen player is evil and no
/// demon has died yet, good loses immediately. Modeled here as pruning
/// worlds where the puzzle's stated outcome (the game continuing) would be
/// contradicted. Grounded on `characters.py::Klutz`.
#[derive(Debug, Clone)]
pub struct ScapegoatChoice {
    pub scapegoat: PlayerId,
    pub chosen: PlayerId,
}

impl Event for ScapegoatChoice {
    fn apply(&self, world: World) -> crate::error::Result<WorldIter> {
        use crate::info::{IsEvil, Predicate};
        use crate::logic::Tri;
        if IsEvil(self.chosen).eval(&world, self.scapegoat) == Tri::True_ {
            return Ok(Box::new(std::iter::empty()));
        }
        Ok(single(world))
    }
}
