//! Townsfolk: the info roles and a handful of public-ability roles. Each
//! ordinary info role delegates the claim-vs-truth check to
//! [`super::default_info_check`]; roles with a genuinely different
//! vortox interaction (Savant) or no night ability at all (event-driven
//! roles) override the relevant hooks directly instead.

use std::sync::Arc;

use super::{default_info_check, fork_with_roles, none, single, Category, RoleAbility, RoleKind, RoleParams, WorldIter};
use crate::info::{self, Predicate};
use crate::world::{PlayerId, World};

fn not_evil(p: PlayerId) -> Arc<dyn Predicate> {
    info::not(Arc::new(info::IsEvil(p)))
}

/// Grounded on `characters.py::Knight`: learns two players, neither of whom
/// is the Demon.
#[derive(Clone, Debug, Default)]
pub struct Knight {
    targets: Vec<PlayerId>,
    claimed_true: bool,
}
impl RoleAbility for Knight {
    fn kind(&self) -> RoleKind {
        RoleKind::Knight
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_true = p.claimed_bool.unwrap_or(true);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let [a, b] = [self.targets[0], self.targets[1]];
        let pred = info::not(info::or(vec![
            Arc::new(info::IsCategory(a, Category::Demon)),
            Arc::new(info::IsCategory(b, Category::Demon)),
        ]));
        default_info_check(world, me, pred.as_ref(), self.claimed_true)
    }
}

/// Grounded on `characters.py::Steward`: learns one confirmed-good player.
#[derive(Clone, Debug, Default)]
pub struct Steward {
    target: PlayerId,
    claimed_true: bool,
}
impl RoleAbility for Steward {
    fn kind(&self) -> RoleKind {
        RoleKind::Steward
    }
    fn configure(&mut self, p: &RoleParams) {
        self.target = p.targets.first().copied().unwrap_or(0);
        self.claimed_true = p.claimed_bool.unwrap_or(true);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let pred = not_evil(self.target);
        default_info_check(world, me, pred.as_ref(), self.claimed_true)
    }
}

/// Grounded on `characters.py::Investigator`: one of two players is a
/// specific Minion.
#[derive(Clone, Debug, Default)]
pub struct Investigator {
    targets: Vec<PlayerId>,
    claimed_role: Option<RoleKind>,
}
impl RoleAbility for Investigator {
    fn kind(&self) -> RoleKind {
        RoleKind::Investigator
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_role = p.claimed_role;
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let role = match self.claimed_role {
            Some(r) => r,
            None => return Ok(single(world)),
        };
        let [a, b] = [self.targets[0], self.targets[1]];
        let pred = info::or(vec![
            Arc::new(info::IsRole(a, role)),
            Arc::new(info::IsRole(b, role)),
        ]);
        default_info_check(world, me, pred.as_ref(), true)
    }
}

/// Grounded on `characters.py::Noble`: three players, exactly one evil.
#[derive(Clone, Debug, Default)]
pub struct Noble {
    targets: Vec<PlayerId>,
}
impl RoleAbility for Noble {
    fn kind(&self) -> RoleKind {
        RoleKind::Noble
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let items: Vec<Arc<dyn Predicate>> = self
            .targets
            .iter()
            .map(|&p| Arc::new(info::IsEvil(p)) as Arc<dyn Predicate>)
            .collect();
        let pred = info::ExactlyN { items, n: 1 };
        default_info_check(world, me, &pred, true)
    }
}

/// Grounded on `characters.py::Seamstress`: once per game, learns whether
/// two players share an alignment.
#[derive(Clone, Debug, Default)]
pub struct Seamstress {
    targets: Vec<PlayerId>,
    claimed_same: bool,
    spent: bool,
}
impl RoleAbility for Seamstress {
    fn kind(&self) -> RoleKind {
        RoleKind::Seamstress
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_same = p.claimed_bool.unwrap_or(true);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        if self.spent {
            return Ok(single(world));
        }
        self.spent = true;
        let [a, b] = [self.targets[0], self.targets[1]];
        let pred = info::eq(Arc::new(info::IsEvil(a)), Arc::new(info::IsEvil(b)));
        let mut world = world;
        world.players[me].role = Box::new(self.clone());
        default_info_check(world, me, pred.as_ref(), self.claimed_same)
    }
}

/// Grounded on `characters.py::FortuneTeller`: nightly demon-detection ping
/// with a red herring chosen at setup, forked one world per candidate.
#[derive(Clone, Debug, Default)]
pub struct FortuneTeller {
    targets: Vec<PlayerId>,
    claimed_true: bool,
    red_herring: Option<PlayerId>,
}
impl RoleAbility for FortuneTeller {
    fn kind(&self) -> RoleKind {
        RoleKind::FortuneTeller
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_true = p.claimed_bool.unwrap_or(true);
    }
    fn run_setup(&mut self, world: World, me: PlayerId) -> crate::error::Result<WorldIter> {
        let candidates: Vec<PlayerId> = (0..world.num_players())
            .filter(|&p| p != me && !world.players[p].is_evil)
            .collect();
        let instances: Vec<Box<dyn RoleAbility>> = candidates
            .into_iter()
            .map(|c| {
                let mut inst = self.clone();
                inst.red_herring = Some(c);
                Box::new(inst) as Box<dyn RoleAbility>
            })
            .collect();
        Ok(fork_with_roles(&world, me, "fortune_teller_red_herring", instances))
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let [a, b] = [self.targets[0], self.targets[1]];
        let mut checks: Vec<Arc<dyn Predicate>> = vec![
            Arc::new(info::IsCategory(a, Category::Demon)),
            Arc::new(info::IsCategory(b, Category::Demon)),
        ];
        if let Some(rh) = self.red_herring {
            if a == rh || b == rh {
                checks.push(Arc::new(info::IsRole(rh, RoleKind::Demon)));
            }
        }
        let pred = info::or(checks);
        default_info_check(world, me, pred.as_ref(), self.claimed_true)
    }
}

/// Grounded on `characters.py::Empath`: counts evil among the two nearest
/// living neighbours.
#[derive(Clone, Debug, Default)]
pub struct Sentinel {
    claimed_count: usize,
}
impl RoleAbility for Sentinel {
    fn kind(&self) -> RoleKind {
        RoleKind::Sentinel
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_count = p.claimed_count.unwrap_or(0);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let left = info::next_player_who_is(&world, me, |w, p| !w.players[p].is_dead);
        let right_start = left.unwrap_or(me);
        let right = info::next_player_who_is(&world, right_start, |w, p| !w.players[p].is_dead && p != me);
        let mut items: Vec<Arc<dyn Predicate>> = Vec::new();
        if let Some(l) = left {
            items.push(Arc::new(info::IsEvil(l)));
        }
        if let Some(r) = right {
            items.push(Arc::new(info::IsEvil(r)));
        }
        let pred = info::ExactlyN { items, n: self.claimed_count };
        default_info_check(world, me, &pred, true)
    }
}

/// Grounded on `characters.py::Chef`: counts adjacent evil pairs around the
/// whole circle.
#[derive(Clone, Debug, Default)]
pub struct Augur {
    claimed_count: usize,
}
impl RoleAbility for Augur {
    fn kind(&self) -> RoleKind {
        RoleKind::Augur
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_count = p.claimed_count.unwrap_or(0);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let n = world.num_players();
        let items: Vec<Arc<dyn Predicate>> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                info::and(vec![Arc::new(info::IsEvil(i)), Arc::new(info::IsEvil(j))]) as Arc<dyn Predicate>
            })
            .collect();
        let pred = info::ExactlyN { items, n: self.claimed_count };
        default_info_check(world, me, &pred, true)
    }
}

/// Grounded on `characters.py::Washerwoman`: one of two players is a
/// specific Townsfolk.
#[derive(Clone, Debug, Default)]
pub struct Herald {
    targets: Vec<PlayerId>,
    claimed_role: Option<RoleKind>,
}
impl RoleAbility for Herald {
    fn kind(&self) -> RoleKind {
        RoleKind::Herald
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_role = p.claimed_role;
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let role = match self.claimed_role {
            Some(r) => r,
            None => return Ok(single(world)),
        };
        let [a, b] = [self.targets[0], self.targets[1]];
        let pred = info::or(vec![Arc::new(info::IsRole(a, role)), Arc::new(info::IsRole(b, role))]);
        default_info_check(world, me, pred.as_ref(), true)
    }
}

/// Grounded on `characters.py::Librarian`: either "zero Outsiders in play"
/// or one of two players is a specific Outsider.
#[derive(Clone, Debug, Default)]
pub struct Archivist {
    targets: Vec<PlayerId>,
    claimed_role: Option<RoleKind>,
}
impl RoleAbility for Archivist {
    fn kind(&self) -> RoleKind {
        RoleKind::Archivist
    }
    fn configure(&mut self, p: &RoleParams) {
        self.targets = p.targets.clone();
        self.claimed_role = p.claimed_role;
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        match self.claimed_role {
            None => {
                let pred = info::ExactlyN {
                    items: (0..world.num_players())
                        .map(|p| Arc::new(info::IsCategory(p, Category::Outsider)) as Arc<dyn Predicate>)
                        .collect(),
                    n: 0,
                };
                default_info_check(world, me, &pred, true)
            }
            Some(role) => {
                let [a, b] = [self.targets[0], self.targets[1]];
                let pred = info::or(vec![Arc::new(info::IsRole(a, role)), Arc::new(info::IsRole(b, role))]);
                default_info_check(world, me, pred.as_ref(), true)
            }
        }
    }
}

/// A protection role shielding one chosen player from a Demon's night kill.
/// Grounded on the general "protection counter" shape `Soldier` uses for its
/// always-on version (`characters.py::Soldier`), specialized to a nightly
/// choice instead of a permanent one.
#[derive(Clone, Debug, Default)]
pub struct Protector {
    protected: Option<PlayerId>,
}
impl RoleAbility for Protector {
    fn kind(&self) -> RoleKind {
        RoleKind::Protector
    }
    fn configure(&mut self, p: &RoleParams) {
        self.protected = p.targets.first().copied();
    }
    fn run_night(&mut self, mut world: World, _night: u32, _me: PlayerId) -> crate::error::Result<WorldIter> {
        world.protected_tonight = self.protected;
        Ok(single(world))
    }
}

/// Grounded on `characters.py::Balloonist`: each night learns a player of a
/// category not yet learned, but only remembers the immediately preceding
/// night — the single-day-memory limitation is reproduced faithfully (see
/// DESIGN.md Open Question decisions), not corrected.
#[derive(Clone, Debug, Default)]
pub struct Wayfarer {
    claimed_category: Option<Category>,
    last_category: Option<Category>,
}
impl RoleAbility for Wayfarer {
    fn kind(&self) -> RoleKind {
        RoleKind::Wayfarer
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_category = p.claimed_count.map(|c| match c {
            0 => Category::Townsfolk,
            1 => Category::Outsider,
            2 => Category::Minion,
            _ => Category::Demon,
        });
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let claimed = match self.claimed_category {
            Some(c) => c,
            None => return Ok(single(world)),
        };
        if self.last_category == Some(claimed) {
            // cannot learn the same category on consecutive nights
            return Ok(none());
        }
        self.last_category = Some(claimed);
        let category_pred = info::ExactlyN {
            items: (0..world.num_players())
                .map(|p| Arc::new(info::IsCategory(p, claimed)) as Arc<dyn Predicate>)
                .collect(),
            n: 0,
        };
        let mut world = world;
        world.players[me].role = Box::new(self.clone());
        // At least one member of the claimed category must exist, i.e. the
        // "zero in play" check must be false.
        default_info_check(world, me, &info::not(Arc::new(category_pred)), true)
    }
}

/// Grounded on `characters.py::Mathematician` via `core.py`'s
/// `math_misregistration` bound tracking: counts misregistration events this
/// night. Known to double-count on scripts where misregistration wraps the
/// circle, reproduced rather than fixed per DESIGN.md.
#[derive(Clone, Debug, Default)]
pub struct Arithmetician {
    claimed_count: usize,
}
impl RoleAbility for Arithmetician {
    fn kind(&self) -> RoleKind {
        RoleKind::Arithmetician
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_count = p.claimed_count.unwrap_or(0);
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let count = world
            .alive_players()
            .filter(|&p| !world.players[p].role.kind().misregister_categories().is_empty())
            .count();
        if count == self.claimed_count {
            Ok(single(world))
        } else {
            Ok(none())
        }
    }
}

/// Grounded on `events.py::Doomsayer`: the call itself is a day `Event`
/// (`crate::events::HarbingerCall`); the role only needs identity/metadata.
#[derive(Clone, Debug, Default)]
pub struct Harbinger;
impl RoleAbility for Harbinger {
    fn kind(&self) -> RoleKind {
        RoleKind::Harbinger
    }
}

/// Grounded on `characters.py::Juggler`: a day claim (`DivinerJuggle` event)
/// scored the following night.
#[derive(Clone, Debug, Default)]
pub struct Diviner {
    claimed_correct: usize,
    guess_count: usize,
}
impl RoleAbility for Diviner {
    fn kind(&self) -> RoleKind {
        RoleKind::Diviner
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_correct = p.claimed_count.unwrap_or(0);
        self.guess_count = p.targets.len();
    }
    fn run_night(&mut self, world: World, _night: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        // Correctness of the prior day's guesses is asserted by the puzzle;
        // this just validates the claimed tally is plausible.
        if self.claimed_correct > self.guess_count {
            return Ok(none());
        }
        Ok(single(world))
    }
}

/// Grounded on `characters.py::Gossip`: a day statement
/// (`crate::events::TownCrierStatement`) acted on the following night.
#[derive(Clone, Debug, Default)]
pub struct TownCrier;
impl RoleAbility for TownCrier {
    fn kind(&self) -> RoleKind {
        RoleKind::TownCrier
    }
}

/// Grounded on `characters.py::Atheist`: the solver's no-evil-required
/// fallback role (spec.md §4.7). `run_setup` rejects at Setup — a solution
/// containing a Nihilist is only ever produced by the solver's synthesized
/// fallback path, never by ordinary placement, mirroring the original's
/// deliberate setup-time rejection.
#[derive(Clone, Debug, Default)]
pub struct Nihilist;
impl RoleAbility for Nihilist {
    fn kind(&self) -> RoleKind {
        RoleKind::Nihilist
    }
    fn run_setup(&mut self, _world: World, _me: PlayerId) -> crate::error::Result<WorldIter> {
        Ok(none())
    }
}

/// Grounded on `characters.py::Savant`: a day ping combining two
/// sub-predicates via XOR normally, but via `~(a|b)` under Vortox — a
/// genuinely different vortox interaction than `default_info_check`, so this
/// overrides `run_day` directly instead of delegating.
#[derive(Clone, Debug, Default)]
pub struct Savant {
    a: Option<Arc<dyn Predicate>>,
    b: Option<Arc<dyn Predicate>>,
    claimed_true: bool,
}
impl RoleAbility for Savant {
    fn kind(&self) -> RoleKind {
        RoleKind::Savant
    }
    fn configure(&mut self, p: &RoleParams) {
        self.claimed_true = p.claimed_bool.unwrap_or(true);
        if p.targets.len() >= 2 {
            self.a = Some(Arc::new(info::IsEvil(p.targets[0])));
            self.b = Some(Arc::new(info::IsEvil(p.targets[1])));
        }
    }
    fn run_day(&mut self, world: World, _day: u32, me: PlayerId) -> crate::error::Result<WorldIter> {
        let (a, b) = match (&self.a, &self.b) {
            (Some(a), Some(b)) => (a.clone(), b.clone()),
            _ => return Ok(single(world)),
        };
        if !world.players[me].is_sober() {
            return Ok(single(world));
        }
        let value = if world.vortox {
            !(a.eval(&world, me) | b.eval(&world, me))
        } else {
            a.eval(&world, me) ^ b.eval(&world, me)
        };
        use crate::logic::Tri;
        let matches = match value {
            Tri::True_ => self.claimed_true,
            Tri::False_ => !self.claimed_true,
            Tri::Maybe => true,
        };
        if matches {
            Ok(single(world))
        } else {
            Ok(none())
        }
    }
}

/// Slayer's ability fires through `crate::events::SlayerShot`; the role
/// struct itself carries no per-instance state beyond identity.
#[derive(Clone, Debug, Default)]
pub struct Slayer;
impl RoleAbility for Slayer {
    fn kind(&self) -> RoleKind {
        RoleKind::Slayer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::PuzzleBuilder;
    use crate::world::Player;
    use std::sync::Arc as StdArc;

    fn world_of(evil: &[bool]) -> World {
        let mut builder = PuzzleBuilder::new();
        for i in 0..evil.len() {
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
    fn steward_claim_of_good_player_survives_when_true() {
        let world = world_of(&[false, false, true]);
        let mut steward = Steward::default();
        steward.configure(&RoleParams {
            targets: vec![1],
            claimed_bool: Some(true),
            ..Default::default()
        });
        let result: Vec<_> = steward.run_night(world, 1, 0).unwrap().collect();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn steward_claim_of_good_player_is_pruned_when_false() {
        let world = world_of(&[false, false, true]);
        let mut steward = Steward::default();
        steward.configure(&RoleParams {
            targets: vec![2],
            claimed_bool: Some(true),
            ..Default::default()
        });
        let result: Vec<_> = steward.run_night(world, 1, 0).unwrap().collect();
        assert!(result.is_empty());
    }

    #[test]
    fn fortune_teller_setup_forks_one_world_per_good_candidate() {
        let world = world_of(&[false, false, true]);
        let mut ft = FortuneTeller::default();
        ft.configure(&RoleParams {
            targets: vec![1, 2],
            claimed_bool: Some(true),
            ..Default::default()
        });
        let forks: Vec<_> = ft.run_setup(world, 0).unwrap().collect();
        // candidates are every non-self, non-evil seat: seats 1 (since seat 0
        // is self and seat 2 is evil), so exactly one fork.
        assert_eq!(forks.len(), 1);
    }
}
