//! Puzzle construction, normalization, and validation. Grounded on
//! `examples/original_source/clockchecker/core.py::Puzzle.__post_init__`/
//! `_validate_inputs`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::info::ExternalInfo;
use crate::roles::{CategoryBounds, RoleKind, RoleParams};
use crate::world::PlayerId;

/// Mirrors `core.py::CompromiseConfig`.
#[derive(Debug, Clone, Copy)]
pub struct CompromiseConfig {
    pub max_speculation: usize,
}

impl Default for CompromiseConfig {
    fn default() -> Self {
        CompromiseConfig { max_speculation: 99 }
    }
}

/// Solver-tuning flags a puzzle can set, mirroring the
/// `# --------- SOLVER OPTIONS ---------` block of `core.py::Puzzle`.
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    pub deduplicate_initial_characters: bool,
    pub finish_final_day: bool,
    pub allow_duplicate_tokens_in_bag: bool,
    pub player_zero_is_you: bool,
    pub allow_killing_dead_players: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            deduplicate_initial_characters: true,
            finish_final_day: false,
            allow_duplicate_tokens_in_bag: false,
            player_zero_is_you: false,
            allow_killing_dead_players: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub name: String,
    pub claim: RoleKind,
}

/// Claimed night/day info passed through to a role's [`crate::roles::RoleParams`]
/// at puzzle-construction time (the normalized form of §3's per-player
/// `night_info`/`day_info` maps). Kept alongside `PlayerSpec` so
/// `PuzzleBuilder` can hand each player's role instance its configuration
/// without a separate ingestion pass.
#[derive(Clone, Default)]
pub struct ClaimSpec {
    pub targets: Vec<PlayerId>,
    pub claimed_role: Option<RoleKind>,
    pub claimed_count: Option<usize>,
    pub claimed_bool: Option<bool>,
    /// External-info claims this player attests to: "on night `u32`, the
    /// player actually holding `RoleKind` did something matching this
    /// predicate." Evaluated against whoever holds that role when the claim
    /// is reconciled, not against the claimant (spec.md §4.1/§4.5 step 3a).
    pub external_claims: Vec<(u32, RoleKind, Arc<dyn ExternalInfo>)>,
}

impl std::fmt::Debug for ClaimSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimSpec")
            .field("targets", &self.targets)
            .field("claimed_role", &self.claimed_role)
            .field("claimed_count", &self.claimed_count)
            .field("claimed_bool", &self.claimed_bool)
            .field("external_claims", &self.external_claims.len())
            .finish()
    }
}

impl From<&ClaimSpec> for RoleParams {
    fn from(spec: &ClaimSpec) -> RoleParams {
        RoleParams {
            targets: spec.targets.clone(),
            claimed_role: spec.claimed_role,
            claimed_count: spec.claimed_count,
            claimed_bool: spec.claimed_bool,
        }
    }
}

/// The three global turn-order registries, restricted per-puzzle to
/// whichever roles are actually on that puzzle's script. Grounded on
/// `characters.py`'s `GLOBAL_SETUP_ORDER`/`GLOBAL_NIGHT_ORDER`/
/// `GLOBAL_DAY_ORDER`/`INACTIVE_CHARACTERS` (see DESIGN.md for the name
/// mapping from those registries' roles to this catalog's).
pub const GLOBAL_SETUP_ORDER: &[RoleKind] = &[
    RoleKind::Nihilist,
    RoleKind::Vortox,
    RoleKind::Basilisk,
    RoleKind::FortuneTeller,
    RoleKind::Drunk,
    RoleKind::Rival,
];

pub const GLOBAL_NIGHT_ORDER: &[RoleKind] = &[
    RoleKind::Witch,
    RoleKind::Shapeshifter,
    RoleKind::Basilisk,
    RoleKind::Wanderer,
    RoleKind::Demon,
    RoleKind::Triskelion,
    RoleKind::Vortox,
    RoleKind::Herald,
    RoleKind::Archivist,
    RoleKind::Investigator,
    RoleKind::Augur,
    RoleKind::Sentinel,
    RoleKind::FortuneTeller,
    RoleKind::Arithmetician,
    RoleKind::Seamstress,
    RoleKind::Knight,
    RoleKind::Noble,
    RoleKind::Wayfarer,
    RoleKind::Steward,
    RoleKind::Protector,
];

pub const GLOBAL_DAY_ORDER: &[RoleKind] = &[RoleKind::Savant];

pub const INACTIVE_CHARACTERS: &[RoleKind] = &[
    RoleKind::Usurper,
    RoleKind::Scapegoat,
    RoleKind::Martyr,
    RoleKind::Heretic,
    RoleKind::Changeling,
    RoleKind::Infiltrator,
    RoleKind::Heir,
    RoleKind::Trickster,
    RoleKind::Slayer,
    RoleKind::Harbinger,
    RoleKind::Diviner,
    RoleKind::TownCrier,
    RoleKind::Vagrant,
];

/// `(min, max)` bounds by player count, in (Townsfolk, Outsider, Minion,
/// Demon, Traveller) order. Grounded on
/// `characters.py::DEFAULT_CATEGORY_COUNTS`.
pub fn default_category_counts(num_players: usize) -> CategoryBounds {
    let (t, o, m, d) = match num_players {
        5 => (3, 0, 1, 1),
        6 => (3, 1, 1, 1),
        7 => (5, 0, 1, 1),
        8 => (5, 1, 1, 1),
        9 => (5, 2, 1, 1),
        10 => (7, 0, 2, 1),
        11 => (7, 1, 2, 1),
        12 => (7, 2, 2, 1),
        13 => (9, 0, 3, 1),
        14 => (9, 1, 3, 1),
        15 => (9, 2, 3, 1),
        _ => (num_players as u8, 0, 0, 0),
    };
    [(t, t), (o, o), (m, m), (d, d), (0, 0)]
}

/// A fully normalized, validated puzzle. Shared across every `World` via
/// `Arc`, never deep-cloned.
#[derive(Debug)]
pub struct Puzzle {
    pub players: Vec<PlayerSpec>,
    pub claims: Vec<ClaimSpec>,
    /// Derived at construction time from every `ClaimSpec::external_claims`
    /// entry: `(night, acting role, claimant, predicate)`, in claim order.
    /// Spec.md §4.6's per-`(role, night)` external-info index, kept flat
    /// since the night loop scans it once per night anyway
    /// (`pipeline::reconcile_external_info`).
    pub external_night_info: Vec<(u32, RoleKind, PlayerId, Arc<dyn ExternalInfo>)>,
    pub hidden_pool: Vec<RoleKind>,
    pub also_on_script: Vec<RoleKind>,
    /// Roles seat 0 is allowed to actually hold when `player_zero_is_you` is
    /// set, in addition to seat 0's own claim. Mirrors spec.md §6's
    /// `hidden_self` pool.
    pub hidden_self: Vec<RoleKind>,
    pub category_counts: CategoryBounds,
    pub night_deaths: Vec<(u32, PlayerId)>,
    pub night_resurrections: Vec<(u32, PlayerId)>,
    pub day_events: Vec<(u32, Box<dyn Event>)>,
    pub compromises: CompromiseConfig,
    pub options: SolverOptions,
    pub script: Vec<RoleKind>,
    pub setup_order: Vec<RoleKind>,
    pub night_order: Vec<RoleKind>,
    pub day_order: Vec<RoleKind>,
    pub max_night: u32,
    pub max_day: u32,
}

impl Puzzle {
    pub fn num_players(&self) -> usize {
        self.players.len()
    }
}

pub struct PuzzleBuilder {
    players: Vec<PlayerSpec>,
    claims: Vec<ClaimSpec>,
    hidden_pool: Vec<RoleKind>,
    also_on_script: Vec<RoleKind>,
    hidden_self: Vec<RoleKind>,
    category_counts: Option<CategoryBounds>,
    night_deaths: Vec<(u32, PlayerId)>,
    night_resurrections: Vec<(u32, PlayerId)>,
    day_events: Vec<(u32, Box<dyn Event>)>,
    compromises: CompromiseConfig,
    options: SolverOptions,
}

impl PuzzleBuilder {
    pub fn new() -> Self {
        PuzzleBuilder {
            players: Vec::new(),
            claims: Vec::new(),
            hidden_pool: Vec::new(),
            also_on_script: Vec::new(),
            hidden_self: Vec::new(),
            category_counts: None,
            night_deaths: Vec::new(),
            night_resurrections: Vec::new(),
            day_events: Vec::new(),
            compromises: CompromiseConfig::default(),
            options: SolverOptions::default(),
        }
    }

    pub fn player(mut self, name: impl Into<String>, claim: RoleKind) -> Self {
        self.players.push(PlayerSpec {
            name: name.into(),
            claim,
        });
        self.claims.push(ClaimSpec::default());
        self
    }

    /// Attaches the claimed night/day info for the most recently added
    /// player (seats-and-targets, a claimed role, count, or boolean).
    pub fn claim(mut self, spec: ClaimSpec) -> Self {
        if let Some(last) = self.claims.last_mut() {
            *last = spec;
        }
        self
    }

    /// Attaches an external-info claim to the most recently added player:
    /// "on `night`, whoever holds `role` satisfies `predicate`."
    pub fn external_claim(mut self, night: u32, role: RoleKind, predicate: Arc<dyn ExternalInfo>) -> Self {
        if let Some(last) = self.claims.last_mut() {
            last.external_claims.push((night, role, predicate));
        }
        self
    }

    pub fn hidden_pool(mut self, roles: Vec<RoleKind>) -> Self {
        self.hidden_pool = roles;
        self
    }

    pub fn also_on_script(mut self, roles: Vec<RoleKind>) -> Self {
        self.also_on_script = roles;
        self
    }

    pub fn hidden_self(mut self, roles: Vec<RoleKind>) -> Self {
        self.hidden_self = roles;
        self
    }

    pub fn category_counts(mut self, bounds: CategoryBounds) -> Self {
        self.category_counts = Some(bounds);
        self
    }

    pub fn night_death(mut self, night: u32, player: PlayerId) -> Self {
        self.night_deaths.push((night, player));
        self
    }

    pub fn night_resurrection(mut self, night: u32, player: PlayerId) -> Self {
        self.night_resurrections.push((night, player));
        self
    }

    pub fn day_event(mut self, day: u32, event: Box<dyn Event>) -> Self {
        self.day_events.push((day, event));
        self
    }

    pub fn options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn compromises(mut self, compromises: CompromiseConfig) -> Self {
        self.compromises = compromises;
        self
    }

    fn normalize(self) -> Puzzle {
        let mut script_set: HashSet<RoleKind> = HashSet::new();
        for p in &self.players {
            script_set.insert(p.claim);
        }
        for r in &self.hidden_pool {
            script_set.insert(*r);
        }
        for r in &self.also_on_script {
            script_set.insert(*r);
        }
        let script: Vec<RoleKind> = script_set.into_iter().collect();

        let setup_order = GLOBAL_SETUP_ORDER
            .iter()
            .copied()
            .filter(|r| script.contains(r))
            .collect();
        let night_order = GLOBAL_NIGHT_ORDER
            .iter()
            .copied()
            .filter(|r| script.contains(r))
            .collect();
        let day_order = GLOBAL_DAY_ORDER
            .iter()
            .copied()
            .filter(|r| script.contains(r))
            .collect();

        let max_night_deaths = self
            .night_deaths
            .iter()
            .chain(self.night_resurrections.iter())
            .map(|(n, _)| *n)
            .max()
            .unwrap_or(0);
        let max_event_day = self.day_events.iter().map(|(d, _)| *d).max().unwrap_or(0);
        let max_night = max_night_deaths.max(1);
        let mut max_day = max_event_day.max(max_night.saturating_sub(1));
        if self.options.finish_final_day {
            max_day = max_day.max(max_night);
        }

        let category_counts = self
            .category_counts
            .unwrap_or_else(|| default_category_counts(self.players.len()));

        let external_night_info = self
            .claims
            .iter()
            .enumerate()
            .flat_map(|(claimant, spec)| {
                spec.external_claims
                    .iter()
                    .map(move |(night, role, predicate)| (*night, *role, claimant, predicate.clone()))
            })
            .collect();

        Puzzle {
            players: self.players,
            claims: self.claims,
            external_night_info,
            hidden_pool: self.hidden_pool,
            also_on_script: self.also_on_script,
            hidden_self: self.hidden_self,
            category_counts,
            night_deaths: self.night_deaths,
            night_resurrections: self.night_resurrections,
            day_events: self.day_events,
            compromises: self.compromises,
            options: self.options,
            script,
            setup_order,
            night_order,
            day_order,
            max_night,
            max_day,
        }
    }

    /// Normalizes without validating; for tests that only need a plausible
    /// `Puzzle` to hang a `World` off of.
    pub fn build_unchecked(self) -> Puzzle {
        self.normalize()
    }

    pub fn build(self) -> Result<Puzzle> {
        let puzzle = self.normalize();
        validate(&puzzle)?;
        Ok(puzzle)
    }
}

impl Default for PuzzleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors `core.py::_validate_inputs`.
fn validate(puzzle: &Puzzle) -> Result<()> {
    if puzzle.players.is_empty() {
        return Err(ValidationError::NoPlayers.into());
    }

    let registered: HashSet<RoleKind> = GLOBAL_SETUP_ORDER
        .iter()
        .chain(GLOBAL_NIGHT_ORDER.iter())
        .chain(GLOBAL_DAY_ORDER.iter())
        .chain(INACTIVE_CHARACTERS.iter())
        .copied()
        .collect();
    for role in &puzzle.script {
        if !registered.contains(role) {
            return Err(ValidationError::UnregisteredRole(role.to_string()).into());
        }
    }

    if puzzle.night_deaths.iter().any(|(n, _)| *n == 1) {
        return Err(ValidationError::NightOneDeath);
    }

    let (t_min, t_max) = puzzle.category_counts[0];
    let (o_min, o_max) = puzzle.category_counts[1];
    let (m_min, m_max) = puzzle.category_counts[2];
    let (d_min, d_max) = puzzle.category_counts[3];
    let total_min = t_min + o_min + m_min + d_min;
    let total_max = t_max + o_max + m_max + d_max;
    let n = puzzle.num_players() as u8;
    if n < total_min || n > total_max {
        return Err(ValidationError::RoleCountsImpossible(puzzle.category_counts, puzzle.num_players()).into());
    }

    if !puzzle.options.allow_duplicate_tokens_in_bag {
        let mut seen = HashSet::new();
        for role in &puzzle.hidden_pool {
            if !seen.insert(*role) {
                return Err(ValidationError::DuplicateToken(role.to_string()).into());
            }
        }
    }

    if puzzle.options.player_zero_is_you
        && puzzle.hidden_self.is_empty()
        && puzzle.players.first().is_none()
    {
        return Err(ValidationError::MissingPlayerZeroClaim(0));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_one_death_is_rejected() {
        let puzzle = PuzzleBuilder::new()
            .player("A", RoleKind::Savant)
            .player("B", RoleKind::Demon)
            .night_death(1, 0)
            .build();
        assert!(matches!(
            puzzle,
            Err(crate::error::SolveError::Validation(
                ValidationError::NightOneDeath
            ))
        ));
    }

    #[test]
    fn duplicate_tokens_rejected_by_default() {
        let puzzle = PuzzleBuilder::new()
            .player("A", RoleKind::Savant)
            .player("B", RoleKind::Savant)
            .hidden_pool(vec![RoleKind::Demon, RoleKind::Demon])
            .build();
        assert!(puzzle.is_err());
    }

    #[test]
    fn max_night_and_day_derive_from_deaths() {
        let puzzle = PuzzleBuilder::new()
            .player("A", RoleKind::Savant)
            .player("B", RoleKind::Demon)
            .night_death(2, 0)
            .build()
            .unwrap();
        assert_eq!(puzzle.max_night, 2);
        assert_eq!(puzzle.max_day, 2);
    }
}
