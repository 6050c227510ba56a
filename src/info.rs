//! Info predicates: `(world, observer) -> Tri` objects that model what a
//! claimed ping actually checks, plus external-info predicates evaluated
//! against the acting player rather than the claimant. Grounded on
//! `examples/original_source/clockchecker/info.py` in full.

use std::fmt;
use std::sync::Arc;

use crate::logic::Tri;
use crate::roles::{Category, RoleAttrValue, RoleKind};
use crate::world::{PlayerId, World};

/// `(world, observer) -> Tri`. Implementors must be `Send + Sync` so a
/// `World` carrying claimed predicates can cross a worker-thread boundary in
/// the parallel solver (spec.md §5/§7).
pub trait Predicate: Send + Sync + fmt::Debug {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri;
}

/// `(world, acting_player) -> bool`, verified against the player who acted,
/// not the one who reported the info. Mirrors spec.md §4.1's
/// external-info contract (e.g. "does player X's claimed character match
/// what Y actually is").
pub trait ExternalInfo: Send + Sync + fmt::Debug {
    fn eval(&self, world: &World, actor: PlayerId) -> bool;
}

// ---------------------------------------------------------------------
// Compound predicates
// ---------------------------------------------------------------------

#[derive(Debug)]
struct And(Vec<Arc<dyn Predicate>>);
#[derive(Debug)]
struct Or(Vec<Arc<dyn Predicate>>);
#[derive(Debug)]
struct XorP(Arc<dyn Predicate>, Arc<dyn Predicate>);
#[derive(Debug)]
struct EqP(Arc<dyn Predicate>, Arc<dyn Predicate>);
#[derive(Debug)]
struct NotP(Arc<dyn Predicate>);

impl Predicate for And {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        self.0
            .iter()
            .map(|p| p.eval(world, observer))
            .fold(Tri::True_, |a, b| a & b)
    }
}

impl Predicate for Or {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        self.0
            .iter()
            .map(|p| p.eval(world, observer))
            .fold(Tri::False_, |a, b| a | b)
    }
}

impl Predicate for XorP {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        self.0.eval(world, observer) ^ self.1.eval(world, observer)
    }
}

impl Predicate for EqP {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        self.0.eval(world, observer).eq(self.1.eval(world, observer))
    }
}

impl Predicate for NotP {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        !self.0.eval(world, observer)
    }
}

pub fn and(ps: Vec<Arc<dyn Predicate>>) -> Arc<dyn Predicate> {
    Arc::new(And(ps))
}
pub fn or(ps: Vec<Arc<dyn Predicate>>) -> Arc<dyn Predicate> {
    Arc::new(Or(ps))
}
pub fn xor(a: Arc<dyn Predicate>, b: Arc<dyn Predicate>) -> Arc<dyn Predicate> {
    Arc::new(XorP(a, b))
}
pub fn eq(a: Arc<dyn Predicate>, b: Arc<dyn Predicate>) -> Arc<dyn Predicate> {
    Arc::new(EqP(a, b))
}
pub fn not(a: Arc<dyn Predicate>) -> Arc<dyn Predicate> {
    Arc::new(NotP(a))
}

// ---------------------------------------------------------------------
// Leaf predicates
// ---------------------------------------------------------------------

/// True if `who` is evil, MAYBE if `who`'s role misregisters given the
/// observer's perspective — regardless of which way the misregistration
/// actually points, since a sober misregisterer's alignment reads as
/// unresolved either way (a good Recluse-style role can show evil, an evil
/// Spy-style role can show good). Mirrors `info.py::IsEvil`, where e.g.
/// `Spy.eval` always returns `MAYBE` despite `Spy` always being evil.
#[derive(Debug)]
pub struct IsEvil(pub PlayerId);

impl Predicate for IsEvil {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        let p = &world.players[self.0];
        let misregisters = !p.role.kind().misregister_categories().is_empty() && p.is_sober();
        if misregisters {
            return Tri::Maybe;
        }
        Tri::from_bool(p.is_evil)
    }
}

#[derive(Debug)]
pub struct IsDroisoned(pub PlayerId);

impl Predicate for IsDroisoned {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        Tri::from_bool(!world.players[self.0].is_sober())
    }
}

#[derive(Debug)]
pub struct IsAlive(pub PlayerId);

impl Predicate for IsAlive {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        Tri::from_bool(!world.players[self.0].is_dead)
    }
}

#[derive(Debug)]
pub struct IsRole(pub PlayerId, pub RoleKind);

impl Predicate for IsRole {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        let p = &world.players[self.0];
        if p.role.kind() == self.1 {
            return Tri::True_;
        }
        if p.is_sober()
            && p.role
                .kind()
                .misregister_categories()
                .contains(&self.1.category())
        {
            return Tri::Maybe;
        }
        Tri::False_
    }
}

/// True if `who` is (or, while droisoned, may misregister as) `category`.
/// Mirrors `info.py::IsCategory`.
#[derive(Debug)]
pub struct IsCategory(pub PlayerId, pub Category);

impl Predicate for IsCategory {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        let p = &world.players[self.0];
        if p.role.kind().category() == self.1 {
            return Tri::True_;
        }
        if p.is_sober() && p.role.kind().misregister_categories().contains(&self.1) {
            return Tri::Maybe;
        }
        Tri::False_
    }
}

/// Counts how many of `items` are (true, maybe) and compares against `n`,
/// collapsing to MAYBE if the count could plausibly still land on `n` once
/// the MAYBEs resolve either way. Mirrors `info.py::ExactlyN`.
#[derive(Debug)]
pub struct ExactlyN {
    pub items: Vec<Arc<dyn Predicate>>,
    pub n: usize,
}

impl Predicate for ExactlyN {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        let mut true_count = 0usize;
        let mut maybe_count = 0usize;
        for item in &self.items {
            match item.eval(world, observer) {
                Tri::True_ => true_count += 1,
                Tri::Maybe => maybe_count += 1,
                Tri::False_ => {}
            }
        }
        if maybe_count == 0 {
            return Tri::from_bool(true_count == self.n);
        }
        if true_count > self.n || true_count + maybe_count < self.n {
            return Tri::False_;
        }
        Tri::Maybe
    }
}

/// True as soon as any matching player is found; MAYBE only if every
/// candidate is itself MAYBE and none are TRUE. Mirrors `info.py::IsInPlay`'s
/// early-exit-on-TRUE shortcut.
#[derive(Debug)]
pub struct IsInPlay(pub RoleKind);

impl Predicate for IsInPlay {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        let mut any_maybe = false;
        for i in 0..world.num_players() {
            match (IsRole(i, self.0)).eval(world, observer) {
                Tri::True_ => return Tri::True_,
                Tri::Maybe => any_maybe = true,
                Tri::False_ => {}
            }
        }
        if any_maybe {
            Tri::Maybe
        } else {
            Tri::False_
        }
    }
}

/// True if both players are in the same category. Note: like the original
/// this does not fully account for mutual misregistration between two
/// already-MAYBE players — reproduced faithfully rather than fixed, per
/// SPEC_FULL.md's Open Question decisions.
#[derive(Debug)]
pub struct SameCategory(pub PlayerId, pub PlayerId);

impl Predicate for SameCategory {
    fn eval(&self, world: &World, observer: PlayerId) -> Tri {
        let a = world.players[self.0].role.kind().category();
        IsCategory(self.1, a).eval(world, observer)
    }
}

/// True if `who`'s role exposes `key` as exactly `value`; FALSE if it
/// exposes `key` but with a different value; MAYBE if the role misregisters
/// sober (the attribute read could belong to the misregistered category
/// instead). Mirrors `info.py::CharAttrEq`'s `getattr(..., missing)` lookup,
/// with the "attribute absent" case folded into FALSE since a puzzle claim
/// naming a `key` the claimed role never exposes is simply an unmet claim
/// rather than an error.
#[derive(Debug)]
pub struct HasRoleAttr(pub PlayerId, pub &'static str, pub RoleAttrValue);

impl Predicate for HasRoleAttr {
    fn eval(&self, world: &World, _observer: PlayerId) -> Tri {
        let p = &world.players[self.0];
        if let Some(actual) = p.role.role_attr(self.1) {
            return Tri::from_bool(actual == self.2);
        }
        if p.is_sober() && !p.role.kind().misregister_categories().is_empty() {
            return Tri::Maybe;
        }
        Tri::False_
    }
}

/// Evil Twin's passive notification: at least one good-aligned player sees a
/// pop-up identifying the Rival/Evil-Twin pair (`RoleKind::Rival`'s claimed
/// twin) as soon as both are in play. Modeled as external info evaluated
/// against the acting `Rival`, mirroring `characters.py::EvilTwin`'s setup
/// pairing rather than a nightly ability — a world only satisfies this claim
/// if `actor` actually holds a live `Rival` and was paired with `self.0`.
#[derive(Debug)]
pub struct EvilTwinNotification(pub PlayerId);

impl ExternalInfo for EvilTwinNotification {
    fn eval(&self, world: &World, actor: PlayerId) -> bool {
        world.players[actor].role.kind() == RoleKind::Rival && world.rival_twin == Some(self.0)
    }
}

// ---------------------------------------------------------------------
// Seating helpers
// ---------------------------------------------------------------------

/// The shorter of the clockwise/counter-clockwise seat distance between
/// `a` and `b`. Mirrors `info.py::circle_distance`.
pub fn circle_distance(n: usize, a: PlayerId, b: PlayerId) -> usize {
    let forward = (b + n - a) % n;
    forward.min(n - forward)
}

/// Scans forward from `start` (exclusive), wrapping around, for the next
/// player satisfying `pred`; `start` itself is only considered last.
/// Mirrors `info.py::get_next_player_who_is`.
pub fn next_player_who_is(
    world: &World,
    start: PlayerId,
    pred: impl Fn(&World, PlayerId) -> bool,
) -> Option<PlayerId> {
    let n = world.num_players();
    for offset in 1..=n {
        let candidate = (start + offset) % n;
        if pred(world, candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;
    use crate::world::Player;
    use std::sync::Arc as StdArc;

    fn world_of(evil: &[bool]) -> World {
        let mut builder = PuzzleBuilder::new();
        for (i, _) in evil.iter().enumerate() {
            builder = builder.player(format!("p{i}"), RoleKind::Savant);
        }
        let puzzle = StdArc::new(builder.build_unchecked());
        let players = evil
            .iter()
            .enumerate()
            .map(|(i, &e)| Player::new(format!("p{i}"), RoleKind::Savant, RoleKind::Savant, e))
            .collect();
        World::new(puzzle, players)
    }

    #[test]
    fn is_evil_is_known_without_misregistration() {
        let world = world_of(&[true, false]);
        assert_eq!(IsEvil(0).eval(&world, 0), Tri::True_);
        assert_eq!(IsEvil(1).eval(&world, 0), Tri::False_);
    }

    #[test]
    fn is_evil_is_maybe_for_a_sober_evil_misregisterer() {
        // An Infiltrator is always evil but misregisters as Townsfolk/
        // Outsider while sober, so a sober Infiltrator must read as
        // MAYBE-evil, never definitely TRUE.
        let puzzle = StdArc::new(
            PuzzleBuilder::new()
                .player("p0", RoleKind::Savant)
                .build_unchecked(),
        );
        let players = vec![Player::new("p0", RoleKind::Savant, RoleKind::Infiltrator, true)];
        let world = World::new(puzzle, players);
        assert_eq!(IsEvil(0).eval(&world, 0), Tri::Maybe);
    }

    #[test]
    fn exactly_n_is_maybe_when_a_maybe_could_still_tip_the_count() {
        let world = world_of(&[false, false]);
        let items: Vec<Arc<dyn Predicate>> = vec![Arc::new(IsEvil(0)), Arc::new(IsEvil(1))];
        let pred = ExactlyN { items, n: 1 };
        assert_eq!(pred.eval(&world, 0), Tri::False_);
    }

    #[test]
    fn circle_distance_wraps_around() {
        assert_eq!(circle_distance(5, 0, 4), 1);
        assert_eq!(circle_distance(5, 0, 2), 2);
    }

    #[test]
    fn has_role_attr_reads_witch_target() {
        let puzzle = StdArc::new(
            PuzzleBuilder::new()
                .player("p0", RoleKind::Witch)
                .player("p1", RoleKind::Savant)
                .build_unchecked(),
        );
        let mut players = vec![
            Player::new("p0", RoleKind::Witch, RoleKind::Witch, true),
            Player::new("p1", RoleKind::Savant, RoleKind::Savant, false),
        ];
        players[0].role = RoleKind::Witch.instantiate();
        let world = World::new(puzzle, players);
        assert_eq!(
            HasRoleAttr(0, "target", RoleAttrValue::Player(1)).eval(&world, 0),
            Tri::False_
        );
        assert_eq!(
            HasRoleAttr(0, "nonexistent_key", RoleAttrValue::Bool(true)).eval(&world, 0),
            Tri::False_
        );
    }

    #[test]
    fn evil_twin_notification_requires_the_matching_rival_and_twin() {
        let puzzle = StdArc::new(
            PuzzleBuilder::new()
                .player("p0", RoleKind::Rival)
                .player("p1", RoleKind::Savant)
                .build_unchecked(),
        );
        let players = vec![
            Player::new("p0", RoleKind::Rival, RoleKind::Rival, true),
            Player::new("p1", RoleKind::Savant, RoleKind::Savant, false),
        ];
        let mut world = World::new(puzzle, players);
        assert!(!EvilTwinNotification(1).eval(&world, 0));
        world.rival_twin = Some(1);
        assert!(EvilTwinNotification(1).eval(&world, 0));
        assert!(!EvilTwinNotification(0).eval(&world, 0));
    }
}
