//! The per-world simulation state: `Player` records and the `World` they
//! live in. Generalizes the teacher's flat `game/types.rs::Universe`
//! (`alive: Vec<bool>`, `roles: Vec<Role>`) into the fuller per-player record
//! of spec.md §3, grounded on `core.py::Player`/`core.py::State`.

use std::fmt;
use std::sync::Arc;

use crate::info::{ExternalInfo, Predicate};
use crate::puzzle::Puzzle;
use crate::roles::{Reason, RoleAbility, RoleKind};

pub type PlayerId = usize;

/// A claim or observation pinned to the night/day it was made, paired with
/// the predicate it must satisfy for a world to survive. Grounded on
/// `core.py::Player.__post_init__`'s `(round, role)`-keyed reorganization of
/// `night_info`/`day_info`, simplified to a flat `(turn, predicate)` list.
#[derive(Clone)]
pub struct ClaimedInfo {
    pub turn: u32,
    pub role: RoleKind,
    pub predicate: Arc<dyn Predicate>,
}

impl fmt::Debug for ClaimedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimedInfo(turn={}, role={})", self.turn, self.role)
    }
}

#[derive(Clone)]
pub struct ClaimedExternal {
    pub turn: u32,
    pub role: RoleKind,
    pub predicate: Arc<dyn ExternalInfo>,
}

impl fmt::Debug for ClaimedExternal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimedExternal(turn={}, role={})", self.turn, self.role)
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    /// The role this player claims to be, fixed for the whole puzzle.
    pub claim: RoleKind,
    /// The actual role instance in this world; can change mid-game
    /// (Shapeshifter-style role-change).
    pub role: Box<dyn RoleAbility>,
    pub is_evil: bool,
    pub is_dead: bool,
    pub droison_count: u32,
    /// Guards `maybe_activate_effects`/`maybe_deactivate_effects` idempotency,
    /// mirroring `core.py::Player.droison`'s `effects_active` bookkeeping.
    pub effects_active: bool,
    pub woke_tonight: bool,
    pub role_history: Vec<(RoleKind, Reason)>,
    pub ever_behaved_evil: bool,
    pub claimed_night_info: Vec<ClaimedInfo>,
    pub claimed_day_info: Vec<ClaimedInfo>,
    pub external_night_info: Vec<ClaimedExternal>,
    /// Set once this player has been marked a speculative-good placement
    /// during a round-robin re-simulation pass (spec.md §4.5 item 4); guards
    /// against re-triggering another round indefinitely.
    pub speculative_good: bool,
}

impl Player {
    pub fn new(name: impl Into<String>, claim: RoleKind, actual: RoleKind, is_evil: bool) -> Self {
        Player {
            name: name.into(),
            claim,
            role: actual.instantiate(),
            is_evil,
            is_dead: false,
            droison_count: 0,
            effects_active: false,
            woke_tonight: false,
            role_history: vec![(actual, Reason::Setup)],
            ever_behaved_evil: false,
            claimed_night_info: Vec::new(),
            claimed_day_info: Vec::new(),
            external_night_info: Vec::new(),
            speculative_good: false,
        }
    }

    pub fn role_kind(&self) -> RoleKind {
        self.role.kind()
    }

    pub fn is_sober(&self) -> bool {
        self.droison_count == 0
    }

    /// Whether this player appears to behave like an evil player to the
    /// storyteller's narrative logic, following `info.py::behaves_evil`:
    /// some roles hardcode this regardless of true alignment.
    pub fn behaves_evil(&self) -> bool {
        self.role.behaves_evil_override().unwrap_or(self.is_evil)
    }
}

/// The forkable simulation unit: one fully-specified hypothesis about every
/// player's hidden identity and the game's progress so far. Generalizes
/// `game/types.rs::Universe`.
#[derive(Clone, Debug)]
pub struct World {
    pub puzzle: Arc<Puzzle>,
    pub players: Vec<Player>,
    pub night: u32,
    pub day: u32,
    /// World-level bit flipped by a Vortox-kind demon, inverting the
    /// polarity of every Townsfolk's default info check (spec.md §4.2).
    pub vortox: bool,
    /// Debug-only breadcrumb trail of fork causes, replacing Python's
    /// `_DEBUG`-gated lineage string; surfaced through `tracing` spans
    /// instead of being required for correctness.
    pub lineage: Vec<&'static str>,
    /// Set by a Protector-kind role's `run_night` each night; consulted by
    /// demon kills so "who protects whom" doesn't require downcasting a
    /// role trait object back to a concrete type.
    pub protected_tonight: Option<PlayerId>,
    /// Set when an `Execution` event is applied on the current day; reset at
    /// the start of each day phase. Consulted by `Vortox::end_day`, which
    /// mirrors `characters.py::Vortox.end_day`'s "evil already won if no one
    /// was executed today" veto.
    pub executed_today: bool,
    /// Set by `Rival::run_setup` to the good player it was paired with;
    /// queried by `info::EvilTwinNotification` without needing to downcast
    /// back to the concrete `Rival` role instance.
    pub rival_twin: Option<PlayerId>,
}

impl World {
    pub fn new(puzzle: Arc<Puzzle>, players: Vec<Player>) -> Self {
        World {
            puzzle,
            players,
            night: 0,
            day: 0,
            vortox: false,
            lineage: Vec::new(),
            protected_tonight: None,
            executed_today: false,
            rival_twin: None,
        }
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        (0..self.players.len()).filter(|&i| !self.players[i].is_dead)
    }

    pub fn num_alive(&self) -> usize {
        self.alive_players().count()
    }

    /// Clones the world to explore an alternative branch, tagging the
    /// lineage with `why` for `tracing` to report. The `Puzzle` itself is
    /// shared via `Arc`, never deep-cloned, matching `core.py::State.fork`'s
    /// puzzle-swap-before-deepcopy trick.
    pub fn fork(&self, why: &'static str) -> World {
        let mut next = self.clone();
        next.lineage.push(why);
        next
    }

    pub fn apply_death(&mut self, who: PlayerId) {
        self.players[who].is_dead = true;
    }

    pub fn resurrect(&mut self, who: PlayerId) {
        self.players[who].is_dead = false;
    }

    /// Droisons `who`, calling the activation hook at most once until a
    /// matching `undroison`. Mirrors `core.py::Player.droison`.
    pub fn droison(&mut self, who: PlayerId) {
        self.players[who].droison_count += 1;
        self.activate_effects_if_needed(who);
    }

    pub fn undroison(&mut self, who: PlayerId) {
        let p = &mut self.players[who];
        p.droison_count = p.droison_count.saturating_sub(1);
        if p.droison_count == 0 {
            self.deactivate_effects_if_needed(who);
        }
    }

    fn activate_effects_if_needed(&mut self, who: PlayerId) {
        if self.players[who].effects_active {
            return;
        }
        self.players[who].effects_active = true;
        let mut role = self.players[who].role.clone();
        role.maybe_activate_effects(self, who);
        self.players[who].role = role;
    }

    fn deactivate_effects_if_needed(&mut self, who: PlayerId) {
        if !self.players[who].effects_active {
            return;
        }
        self.players[who].effects_active = false;
        let mut role = self.players[who].role.clone();
        role.maybe_deactivate_effects(self, who);
        self.players[who].role = role;
    }

    /// Swaps `who`'s role instance, tearing down the old role's active
    /// effects first, re-running `run_setup` on the new one, and dropping any
    /// resulting world where the change ends the game (e.g. the new role's
    /// setup kills the last living demon). Mirrors
    /// `core.py::State.change_character`, whose generator only yields
    /// `substate`s with `not substate.check_game_over()`.
    pub fn change_character(
        mut self,
        who: PlayerId,
        new_kind: RoleKind,
    ) -> crate::error::Result<crate::roles::WorldIter> {
        self.deactivate_effects_if_needed(who);
        self.players[who].role = new_kind.instantiate();
        self.players[who]
            .role_history
            .push((new_kind, Reason::CharacterChange));
        if self.players[who].droison_count > 0 {
            self.players[who].effects_active = false;
            self.activate_effects_if_needed(who);
        }
        let mut role = self.players[who].role.clone();
        let worlds: Vec<World> = role
            .run_setup(self, who)?
            .filter(|w| !w.check_game_over())
            .collect();
        Ok(Box::new(worlds.into_iter()))
    }

    pub fn check_game_over(&self) -> bool {
        let any_demon_alive = self
            .alive_players()
            .any(|p| self.players[p].role.kind().category() == crate::roles::Category::Demon);
        let any_rival_undroisoned_alive = self.alive_players().any(|p| {
            self.players[p].role.kind() == RoleKind::Rival && self.players[p].is_sober()
        });
        !any_demon_alive && !any_rival_undroisoned_alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;

    fn tiny_puzzle() -> Arc<Puzzle> {
        Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Demon)
                .build_unchecked(),
        )
    }

    #[test]
    fn droison_is_idempotent_on_repeat_calls() {
        let puzzle = tiny_puzzle();
        let players = vec![
            Player::new("A", RoleKind::Savant, RoleKind::Savant, false),
            Player::new("B", RoleKind::Demon, RoleKind::Demon, true),
        ];
        let mut world = World::new(puzzle, players);
        world.droison(0);
        world.droison(0);
        assert_eq!(world.players[0].droison_count, 2);
        world.undroison(0);
        assert_eq!(world.players[0].droison_count, 1);
        assert!(world.players[0].effects_active);
    }

    #[test]
    fn game_over_requires_no_living_demon() {
        let puzzle = tiny_puzzle();
        let mut players = vec![
            Player::new("A", RoleKind::Savant, RoleKind::Savant, false),
            Player::new("B", RoleKind::Demon, RoleKind::Demon, true),
        ];
        players[1].is_dead = true;
        let world = World::new(puzzle, players);
        assert!(world.check_game_over());
    }

    #[test]
    fn change_character_reruns_the_new_roles_setup_and_forks_over_it() {
        // Rival::run_setup forks one world per living good player other than
        // itself; with one eligible twin candidate, swapping seat C into
        // Rival must re-run that setup and yield exactly one forked world.
        let puzzle = Arc::new(
            PuzzleBuilder::new()
                .player("A", RoleKind::Savant)
                .player("B", RoleKind::Demon)
                .player("C", RoleKind::Savant)
                .build_unchecked(),
        );
        let players = vec![
            Player::new("A", RoleKind::Savant, RoleKind::Savant, false),
            Player::new("B", RoleKind::Demon, RoleKind::Demon, true),
            Player::new("C", RoleKind::Savant, RoleKind::Savant, false),
        ];
        let world = World::new(puzzle, players);
        let worlds: Vec<World> = world.change_character(2, RoleKind::Rival).unwrap().collect();
        assert_eq!(worlds.len(), 1);
        assert_eq!(worlds[0].players[2].role.kind(), RoleKind::Rival);
    }
}
