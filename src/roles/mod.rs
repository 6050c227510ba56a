//! The role catalog: a closed identity/metadata enum (`RoleKind`, in the
//! spirit of the teacher's closed `game/types.rs::Role`) paired with an open,
//! dynamically-dispatched behavior trait (`RoleAbility`) so that new roles can
//! be added by implementing the trait without touching every match arm that
//! only cares about identity (name, category, wake pattern, misregistration).
//!
//! Grounded on `examples/original_source/clockchecker/characters.py`; see
//! `DESIGN.md` for the name mapping from this catalog back to the original
//! character classes.

pub mod demons;
pub mod minions;
pub mod outsiders;
pub mod townsfolk;
pub mod travellers;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SolveError;
use crate::info::ExternalInfo;
use crate::world::{PlayerId, World};

/// The four standard categories plus Traveller, per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Townsfolk,
    Outsider,
    Minion,
    Demon,
    Traveller,
}

/// `(min, max)` bounds for each category, in `Category` order.
pub type CategoryBounds = [(u8, u8); 5];

/// Governs when `maybe_activate_effects`/night hooks run and how
/// `woke_tonight` bookkeeping is updated. Mirrors `characters.py::WakePattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakePattern {
    Never,
    FirstNight,
    EachNight,
    /// Wakes every night the role is the active demon-equivalent ("star").
    EachNightStar,
    EachNightUntilSpent,
    /// Wakes on a schedule internal to the role (e.g. once chosen at setup).
    Manual,
}

/// Why a droison/undroison or character-change is happening, mirrors
/// `characters.py::Reason`; used so role hooks can tell a setup-time droison
/// apart from a mid-game one when that distinction matters (e.g. Drunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Setup,
    Droison,
    Undroison,
    Death,
    Resurrection,
    CharacterChange,
}

/// Lazily-produced alternate worlds, the idiomatic substitute for Python
/// generators (see SPEC_FULL.md §6 / spec.md §9). Every role hook that can
/// branch returns one of these instead of yielding.
pub type WorldIter = Box<dyn Iterator<Item = World>>;

pub fn single(world: World) -> WorldIter {
    Box::new(std::iter::once(world))
}

pub fn none() -> WorldIter {
    Box::new(std::iter::empty())
}

/// Generic claim parameters a puzzle hands to a role instance once, during
/// placement, so that one struct per role can store exactly the bits of
/// puzzle input relevant to it (which seats it pinged, what it claimed to
/// learn) without every role needing a bespoke construction path. Grounded
/// on `core.py::Player.__post_init__`'s reorganization of raw puzzle input
/// into per-character fields.
#[derive(Clone, Debug, Default)]
pub struct RoleParams {
    pub targets: Vec<PlayerId>,
    pub claimed_role: Option<RoleKind>,
    pub claimed_count: Option<usize>,
    pub claimed_bool: Option<bool>,
}

/// The shared default-info-check algorithm every ordinary info Townsfolk
/// delegates to (spec.md §4.2 steps 4-6): a droisoned player's info is never
/// checked against the truth *unless* the world is under Vortox, since Vortox
/// inverts good info regardless of sobriety — a droisoned Townsfolk's claim
/// can misfire on its own, but Vortox still requires the claim to actually be
/// false. Grounded on `characters.py`'s `if player.droison_count and not
/// is_vortox: return True` followed by `if is_vortox: return ping(...) is not
/// TRUE`. A sober player's claim is checked against `predicate`, with Vortox
/// flipping the expected polarity for Townsfolk; `Maybe` always keeps the
/// world, since an unresolved misregistration is consistent with either claim.
pub fn default_info_check(
    world: World,
    me: PlayerId,
    predicate: &dyn crate::info::Predicate,
    claimed_true: bool,
) -> crate::error::Result<WorldIter> {
    use crate::logic::Tri;

    let is_townsfolk = world.players[me].role.kind().category() == Category::Townsfolk;
    let is_vortox = world.vortox && is_townsfolk;
    if !world.players[me].is_sober() && !is_vortox {
        return Ok(single(world));
    }
    let want = if is_vortox { !claimed_true } else { claimed_true };
    let matches = match predicate.eval(&world, me) {
        Tri::True_ => want,
        Tri::False_ => !want,
        Tri::Maybe => true,
    };
    if matches {
        Ok(single(world))
    } else {
        Ok(none())
    }
}

/// Forks one world per candidate role instance, installing each instance as
/// `me`'s role in its own branch. The standard idiom for setup-time choices
/// (red herrings, twin pairings, charmed swaps): the chosen candidate lives
/// in the forked instance's own state rather than in a side table, so it
/// travels naturally with whichever branch survives pruning.
pub fn fork_with_roles(
    world: &World,
    me: PlayerId,
    why: &'static str,
    instances: Vec<Box<dyn RoleAbility>>,
) -> WorldIter {
    let worlds: Vec<World> = instances
        .into_iter()
        .map(|inst| {
            let mut w = world.fork(why);
            w.players[me].role = inst;
            w
        })
        .collect();
    Box::new(worlds.into_iter())
}

/// Closed catalog of every role this crate knows about. Adding a role means
/// adding a variant here (for identity/metadata) and a `RoleAbility` impl
/// under `roles::{townsfolk,outsiders,minions,demons,travellers}` (for
/// behavior) — the behavior side is the one meant to grow without the rest
/// of the pipeline needing to match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    // Townsfolk
    Savant,
    Knight,
    Steward,
    Investigator,
    Noble,
    Seamstress,
    Slayer,
    FortuneTeller,
    Sentinel,
    Augur,
    Herald,
    Archivist,
    Protector,
    Wayfarer,
    Arithmetician,
    Harbinger,
    Diviner,
    TownCrier,
    Nihilist,
    // Outsiders
    Drunk,
    Changeling,
    Heretic,
    Martyr,
    Scapegoat,
    // Minions
    Witch,
    Infiltrator,
    Usurper,
    Heir,
    Rival,
    Shapeshifter,
    Trickster,
    // Demons
    Demon,
    Wanderer,
    Basilisk,
    Triskelion,
    Vortox,
    // Traveller
    Vagrant,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::Savant => "Savant",
            RoleKind::Knight => "Knight",
            RoleKind::Steward => "Steward",
            RoleKind::Investigator => "Investigator",
            RoleKind::Noble => "Noble",
            RoleKind::Seamstress => "Seamstress",
            RoleKind::Slayer => "Slayer",
            RoleKind::FortuneTeller => "Fortune Teller",
            RoleKind::Sentinel => "Sentinel",
            RoleKind::Augur => "Augur",
            RoleKind::Herald => "Herald",
            RoleKind::Archivist => "Archivist",
            RoleKind::Protector => "Protector",
            RoleKind::Wayfarer => "Wayfarer",
            RoleKind::Arithmetician => "Arithmetician",
            RoleKind::Harbinger => "Harbinger",
            RoleKind::Diviner => "Diviner",
            RoleKind::TownCrier => "Town Crier",
            RoleKind::Nihilist => "Nihilist",
            RoleKind::Drunk => "Drunk",
            RoleKind::Changeling => "Changeling",
            RoleKind::Heretic => "Heretic",
            RoleKind::Martyr => "Martyr",
            RoleKind::Scapegoat => "Scapegoat",
            RoleKind::Witch => "Witch",
            RoleKind::Infiltrator => "Infiltrator",
            RoleKind::Usurper => "Usurper",
            RoleKind::Heir => "Heir",
            RoleKind::Rival => "Rival",
            RoleKind::Shapeshifter => "Shapeshifter",
            RoleKind::Trickster => "Trickster",
            RoleKind::Demon => "Demon",
            RoleKind::Wanderer => "Wanderer",
            RoleKind::Basilisk => "Basilisk",
            RoleKind::Triskelion => "Triskelion",
            RoleKind::Vortox => "Vortox",
            RoleKind::Vagrant => "Vagrant",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for RoleKind {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use RoleKind::*;
        Ok(match s {
            "Savant" => Savant,
            "Knight" => Knight,
            "Steward" => Steward,
            "Investigator" => Investigator,
            "Noble" => Noble,
            "Seamstress" => Seamstress,
            "Slayer" => Slayer,
            "Fortune Teller" | "FortuneTeller" => FortuneTeller,
            "Sentinel" => Sentinel,
            "Augur" => Augur,
            "Herald" => Herald,
            "Archivist" => Archivist,
            "Protector" => Protector,
            "Wayfarer" => Wayfarer,
            "Arithmetician" => Arithmetician,
            "Harbinger" => Harbinger,
            "Diviner" => Diviner,
            "Town Crier" | "TownCrier" => TownCrier,
            "Nihilist" => Nihilist,
            "Drunk" => Drunk,
            "Changeling" => Changeling,
            "Heretic" => Heretic,
            "Martyr" => Martyr,
            "Scapegoat" => Scapegoat,
            "Witch" => Witch,
            "Infiltrator" => Infiltrator,
            "Usurper" => Usurper,
            "Heir" => Heir,
            "Rival" => Rival,
            "Shapeshifter" => Shapeshifter,
            "Trickster" => Trickster,
            "Demon" => Demon,
            "Wanderer" => Wanderer,
            "Basilisk" => Basilisk,
            "Triskelion" => Triskelion,
            "Vortox" => Vortox,
            "Vagrant" => Vagrant,
            other => {
                return Err(SolveError::Validation(
                    crate::error::ValidationError::UnregisteredRole(other.to_string()),
                ))
            }
        })
    }
}

fn idx(c: Category) -> usize {
    match c {
        Category::Townsfolk => 0,
        Category::Outsider => 1,
        Category::Minion => 2,
        Category::Demon => 3,
        Category::Traveller => 4,
    }
}

impl RoleKind {
    pub fn category(self) -> Category {
        use Category::*;
        use RoleKind::*;
        match self {
            Savant | Knight | Steward | Investigator | Noble | Seamstress | Slayer
            | FortuneTeller | Sentinel | Augur | Herald | Archivist | Protector | Wayfarer
            | Arithmetician | Harbinger | Diviner | TownCrier | Nihilist => Townsfolk,
            Drunk | Changeling | Heretic | Martyr | Scapegoat => Outsider,
            Witch | Infiltrator | Usurper | Heir | Rival | Shapeshifter | Trickster => Minion,
            Demon | Wanderer | Basilisk | Triskelion | Vortox => Category::Demon,
            Vagrant => Traveller,
        }
    }

    /// Whether this role's claimed character and/or claimed info can differ
    /// from the truth. Mirrors `characters.py::Character.is_liar` /
    /// `lies_about_character` / `lies_about_info`.
    pub fn may_lie(self) -> bool {
        use RoleKind::*;
        matches!(
            self,
            Drunk | Changeling
                | Heretic
                | Witch
                | Infiltrator
                | Usurper
                | Heir
                | Rival
                | Shapeshifter
                | Trickster
                | Demon
                | Wanderer
                | Basilisk
                | Triskelion
                | Vortox
        )
    }

    /// Categories this role may be misregistered as to category-counting
    /// info, while sober (droisoning suppresses misregistration per spec.md
    /// §4.1). Mirrors `info.py::IsCategory`'s `misregister_categories` check.
    pub fn misregister_categories(self) -> &'static [Category] {
        use Category::*;
        match self {
            RoleKind::Changeling => &[Minion, Category::Demon],
            RoleKind::Infiltrator => &[Townsfolk, Outsider],
            _ => &[],
        }
    }

    pub fn wake_pattern(self) -> WakePattern {
        use RoleKind::*;
        use WakePattern::*;
        match self {
            Savant | Diviner | TownCrier => Manual,
            Knight | Steward | Investigator | Noble | Herald | Archivist | Augur => FirstNight,
            Seamstress => EachNightUntilSpent,
            FortuneTeller | Sentinel | Wayfarer | Witch | Infiltrator => EachNight,
            Demon | Wanderer | Basilisk | Triskelion => EachNightStar,
            Arithmetician => EachNight,
            Vortox => FirstNight,
            Usurper | Harbinger | Nihilist | Heir | Rival | Scapegoat | Martyr | Heretic
            | Changeling | Vagrant | Drunk | Shapeshifter | Trickster | Slayer => Never,
        }
    }

    /// Mirrors `characters.py::Character.modify_category_counts`, applied
    /// once per hidden-role placement when this role is in the hidden pool.
    pub fn modify_category_bounds(self, mut bounds: CategoryBounds) -> CategoryBounds {
        match self {
            RoleKind::Usurper => {
                bounds[idx(Category::Outsider)].0 += 2;
                bounds[idx(Category::Outsider)].1 += 2;
            }
            RoleKind::Wanderer => {
                bounds[idx(Category::Outsider)].0 += 1;
                bounds[idx(Category::Outsider)].1 += 1;
                bounds[idx(Category::Townsfolk)].0 =
                    bounds[idx(Category::Townsfolk)].0.saturating_sub(1);
                bounds[idx(Category::Townsfolk)].1 =
                    bounds[idx(Category::Townsfolk)].1.saturating_sub(1);
            }
            _ => {}
        }
        bounds
    }

    /// Builds the stateful behavior instance for this role.
    pub fn instantiate(self) -> Box<dyn RoleAbility> {
        use RoleKind::*;
        match self {
            Savant => Box::new(townsfolk::Savant::default()),
            Knight => Box::new(townsfolk::Knight::default()),
            Steward => Box::new(townsfolk::Steward::default()),
            Investigator => Box::new(townsfolk::Investigator::default()),
            Noble => Box::new(townsfolk::Noble::default()),
            Seamstress => Box::new(townsfolk::Seamstress::default()),
            Slayer => Box::new(townsfolk::Slayer::default()),
            FortuneTeller => Box::new(townsfolk::FortuneTeller::default()),
            Sentinel => Box::new(townsfolk::Sentinel::default()),
            Augur => Box::new(townsfolk::Augur::default()),
            Herald => Box::new(townsfolk::Herald::default()),
            Archivist => Box::new(townsfolk::Archivist::default()),
            Protector => Box::new(townsfolk::Protector::default()),
            Wayfarer => Box::new(townsfolk::Wayfarer::default()),
            Arithmetician => Box::new(townsfolk::Arithmetician::default()),
            Harbinger => Box::new(townsfolk::Harbinger::default()),
            Diviner => Box::new(townsfolk::Diviner::default()),
            TownCrier => Box::new(townsfolk::TownCrier::default()),
            Nihilist => Box::new(townsfolk::Nihilist::default()),
            Drunk => Box::new(outsiders::Drunk::default()),
            Changeling => Box::new(outsiders::Changeling::default()),
            Heretic => Box::new(outsiders::Heretic::default()),
            Martyr => Box::new(outsiders::Martyr::default()),
            Scapegoat => Box::new(outsiders::Scapegoat::default()),
            Witch => Box::new(minions::Witch::default()),
            Infiltrator => Box::new(minions::Infiltrator::default()),
            Usurper => Box::new(minions::Usurper::default()),
            Heir => Box::new(minions::Heir::default()),
            Rival => Box::new(minions::Rival::default()),
            Shapeshifter => Box::new(minions::Shapeshifter::default()),
            Trickster => Box::new(minions::Trickster::default()),
            Demon => Box::new(demons::Demon::default()),
            Wanderer => Box::new(demons::Wanderer::default()),
            Basilisk => Box::new(demons::Basilisk::default()),
            Triskelion => Box::new(demons::Triskelion::default()),
            Vortox => Box::new(demons::Vortox::default()),
            Vagrant => Box::new(travellers::Vagrant::default()),
        }
    }
}

/// The open, dynamically-dispatched half of the catalog: per-instance
/// behavior. Every method has a no-op default so a role only overrides the
/// hooks it actually uses, mirroring `characters.py::Character`'s base-class
/// defaults (spec.md §4.2/§4.3).
pub trait RoleAbility: RoleClone + fmt::Debug + Send + Sync {
    fn kind(&self) -> RoleKind;

    /// Applies the puzzle's claim parameters for this player (which seats it
    /// claims to have checked, what it claims it learned). Called once,
    /// before `run_setup`, while the puzzle is being built.
    fn configure(&mut self, _params: &RoleParams) {}

    /// Runs once, in setup order, when this role is placed. May fork (e.g.
    /// Fortune-Teller-style red herring selection, or Evil-Twin pairing).
    fn run_setup(&mut self, world: World, _me: PlayerId) -> crate::error::Result<WorldIter> {
        Ok(single(world))
    }

    /// Runs on a night this role wakes, per its `wake_pattern`.
    fn run_night(
        &mut self,
        world: World,
        _night: u32,
        _me: PlayerId,
    ) -> crate::error::Result<WorldIter> {
        Ok(single(world))
    }

    /// Runs on a day this role acts (most roles don't; info roles with a
    /// public day ability, like Savant, override this).
    fn run_day(&mut self, world: World, _day: u32, _me: PlayerId) -> crate::error::Result<WorldIter> {
        Ok(single(world))
    }

    /// Called once per day at dusk for every living player; returning
    /// `false` vetoes the world (mirrors `Character.end_day`'s bool return
    /// used by `Vortox`/`Courtier`-style bookkeeping).
    fn end_day(&mut self, _world: &mut World, _day: u32, _me: PlayerId) -> bool {
        true
    }

    fn attacked_at_night(
        &mut self,
        world: World,
        me: PlayerId,
        _attacker: PlayerId,
    ) -> crate::error::Result<WorldIter> {
        let mut world = world;
        world.apply_death(me);
        Ok(single(world))
    }

    fn executed(
        &mut self,
        world: World,
        me: PlayerId,
        died: bool,
    ) -> crate::error::Result<WorldIter> {
        let mut world = world;
        if died {
            world.apply_death(me);
        }
        Ok(single(world))
    }

    fn maybe_activate_effects(&mut self, _world: &mut World, _me: PlayerId) {}
    fn maybe_deactivate_effects(&mut self, _world: &mut World, _me: PlayerId) {}

    /// External-info hook: evaluated against the *acting* player (`me`), not
    /// the claimant, per spec.md §4.1's external-info predicate contract.
    /// Defaults to delegating straight to `external`'s own `eval`, which is
    /// enough for any claim that only needs state already exposed on `World`
    /// (e.g. `Rival`'s setup-chosen twin); a role overrides this only when
    /// verifying the claim needs state private to the role instance itself.
    fn run_night_external(&self, world: &World, external: &dyn ExternalInfo, me: PlayerId) -> bool {
        external.eval(world, me)
    }

    /// `None` means "follow `is_evil`"; `Some(b)` hardcodes `behaves_evil`
    /// the way Lunatic/Marionette do in `info.py::behaves_evil`.
    fn behaves_evil_override(&self) -> Option<bool> {
        None
    }

    /// Whether this role, when droisoned/drunk on a claimed role, "believes"
    /// it acts like `claimed`. Mirrors `info.py::acts_like`.
    fn acts_like(&self, _claimed: RoleKind) -> bool {
        false
    }

    /// Generic named-attribute accessor backing `info::HasRoleAttr`, mirroring
    /// `info.py::CharAttrEq`'s `getattr(state.players[self.player].character,
    /// self.attr, missing)`: Python reads an arbitrary attribute off the
    /// character instance by name; Rust has no runtime reflection, so each
    /// role opts in by matching the keys it wants queryable. `None` means the
    /// key doesn't exist on this role, the same as Python's `missing` sentinel.
    fn role_attr(&self, _key: &str) -> Option<RoleAttrValue> {
        None
    }

    fn world_str(&self, _world: &World, _me: PlayerId) -> String {
        self.kind().to_string()
    }
}

/// The value side of [`RoleAbility::role_attr`]/`info::HasRoleAttr`: the
/// handful of types a role's queryable per-instance state can take. Mirrors
/// `info.py::CharAttrEq`'s `Any`-typed `value` field, narrowed to what this
/// catalog's roles actually expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAttrValue {
    Bool(bool),
    Count(usize),
    Role(RoleKind),
    Player(PlayerId),
}

/// `Box<dyn RoleAbility>` needs `Clone` because `World` (which owns one per
/// player) is forked constantly; object-safe cloning needs this helper trait,
/// the standard `dyn-clone` pattern.
pub trait RoleClone {
    fn clone_box(&self) -> Box<dyn RoleAbility>;
}

impl<T> RoleClone for T
where
    T: 'static + RoleAbility + Clone,
{
    fn clone_box(&self) -> Box<dyn RoleAbility> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn RoleAbility> {
    fn clone(&self) -> Box<dyn RoleAbility> {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_from_str_round_trip() {
        for kind in [
            RoleKind::Savant,
            RoleKind::FortuneTeller,
            RoleKind::Vortox,
            RoleKind::Trickster,
            RoleKind::Demon,
        ] {
            let s = kind.to_string();
            let parsed: RoleKind = s.parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn usurper_widens_outsider_bounds() {
        let base: CategoryBounds = [(3, 3), (0, 0), (1, 1), (1, 1), (0, 0)];
        let widened = RoleKind::Usurper.modify_category_bounds(base);
        assert_eq!(widened[1], (2, 2));
    }
}
