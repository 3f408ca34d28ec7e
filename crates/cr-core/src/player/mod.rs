//! The player aggregate and its status bookkeeping.

pub mod duration;

pub use duration::{DurationDef, DurationKind, DurationLedger};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::{BASELINE_DELAY, MAX_PIETY, MAX_SKILL_LEVEL};
use crate::world::{CloudKind, Coord, MonsterId};

/// The three tracked ability scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Stat {
    Strength,
    Intellect,
    Dexterity,
}

impl Stat {
    /// The duration armed when this stat collapses to zero.
    pub const fn zero_duration(self) -> DurationKind {
        match self {
            Stat::Strength => DurationKind::StatZeroStr,
            Stat::Intellect => DurationKind::StatZeroInt,
            Stat::Dexterity => DurationKind::StatZeroDex,
        }
    }

    pub const fn recovery_noun(self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Intellect => "intellect",
            Stat::Dexterity => "dexterity",
        }
    }
}

/// Current ability scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatSet {
    pub strength: i32,
    pub intellect: i32,
    pub dexterity: i32,
}

impl Default for StatSet {
    fn default() -> Self {
        Self {
            strength: 10,
            intellect: 10,
            dexterity: 10,
        }
    }
}

impl StatSet {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Intellect => self.intellect,
            Stat::Dexterity => self.dexterity,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Strength => &mut self.strength,
            Stat::Intellect => &mut self.intellect,
            Stat::Dexterity => &mut self.dexterity,
        }
    }
}

/// Player species, where it changes engine behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Species {
    Human,
    Skeleton,
    Ent,
    Vampire,
    Ghoul,
}

impl Species {
    /// What the player turns back into when petrification ends.
    pub const fn flesh_equivalent(self) -> &'static str {
        match self {
            Species::Skeleton => "bone",
            Species::Ent => "wood",
            Species::Human | Species::Vampire | Species::Ghoul => "flesh",
        }
    }
}

/// Active transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
pub enum Form {
    #[default]
    None,
    Spider,
    IceBeast,
    Statue,
    Dragon,
    Scorpion,
    Lich,
    Bat,
    Wisp,
}

impl Form {
    /// Spell power at which the form becomes permanent instead of
    /// expiring. None for forms that never lock in.
    pub const fn permanence_threshold(self) -> Option<i32> {
        match self {
            Form::Spider => Some(15),
            Form::IceBeast => Some(25),
            Form::Statue => Some(50),
            Form::Dragon => Some(75),
            Form::Scorpion => Some(75),
            Form::Lich => Some(100),
            Form::None | Form::Bat | Form::Wisp => None,
        }
    }

    pub const fn grants_flight(self) -> bool {
        matches!(self, Form::Dragon | Form::Bat | Form::Wisp)
    }

    pub const fn likes_water(self) -> bool {
        matches!(self, Form::IceBeast)
    }
}

/// Satiation bands derived from the hunger counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub enum HungerState {
    Starving,
    VeryHungry,
    Hungry,
    Satiated,
    Full,
    Engorged,
}

pub const HUNGER_DEFAULT: i32 = 6000;
pub const HUNGER_MAXIMUM: i32 = 12000;

impl HungerState {
    pub fn from_hunger(hunger: i32) -> Self {
        match hunger {
            h if h <= 1000 => HungerState::Starving,
            h if h <= 1533 => HungerState::VeryHungry,
            h if h <= 2600 => HungerState::Hungry,
            h if h <= 7000 => HungerState::Satiated,
            h if h <= 11000 => HungerState::Full,
            _ => HungerState::Engorged,
        }
    }
}

/// The continuous-piety-decay patron faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Patron {
    Revelry,
}

/// Mutation levels the engine consults. 0 means absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Mutations {
    pub mp_wands: i32,
    pub no_artifice: i32,
    pub cowardice: i32,
    pub mana_link: i32,
    pub demonic_guardian: i32,
    pub gourmand: i32,
    pub slow_metabolism: i32,
    pub teleportitis: i32,
}

/// Typed attribute snapshot, replacing the original's property bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Swiftness phase snapshot: >= 0 while fast, -1 while sluggish.
    pub swiftness: i32,
    /// Weighted visible-threat count backing the Horror duration.
    pub horror_penalty: i32,
    pub powered_by_death_stacks: i32,
    /// Airborne only to escape deadly terrain; drains MP while it holds.
    pub emergency_flight: bool,
    /// Icy enchantments melted by heat this turn.
    pub melt_armour: bool,
    pub icy_armoured: bool,
    pub permanent_flight: bool,
    pub flight_uncancellable: bool,
    pub form_uncancellable: bool,
    /// Power the active form's spell is castable at, if known.
    pub transform_power: Option<i32>,
    pub petrified_by: Option<MonsterId>,
    pub paralysed_by: Option<MonsterId>,
    /// Cloud type laid behind the player while CloudTrail runs.
    pub trail_cloud: Option<CloudKind>,
}

/// Trained skill levels, in tenths of a level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Skills {
    pub evocations: i32,
    pub invocations: i32,
}

impl Skills {
    pub fn practice_evocations(&mut self, amount: i32) {
        self.evocations = (self.evocations + amount).min(MAX_SKILL_LEVEL * 10);
    }

    pub fn practice_invocations(&mut self, amount: i32) {
        self.invocations = (self.invocations + amount).min(MAX_SKILL_LEVEL * 10);
    }
}

/// The player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct You {
    pub pos: Coord,
    pub species: Species,
    pub form: Form,
    pub stats: StatSet,

    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    /// Fixed-point regeneration counters; always in [0, 99] between turns.
    pub hit_points_regeneration: i32,
    pub magic_points_regeneration: i32,

    pub hunger: i32,
    pub piety: i32,
    pub patron: Option<Patron>,
    /// Lingering sickness counter, distinct from the Sick duration.
    pub disease: i32,
    pub stealth: i32,

    pub mutations: Mutations,
    pub attr: Attributes,
    pub duration: DurationLedger,
    pub skills: Skills,

    pub constricted_by: Option<MonsterId>,
    pub beholders: Vec<MonsterId>,
    pub fearmongers: Vec<MonsterId>,
}

impl Default for You {
    fn default() -> Self {
        Self {
            pos: Coord::new(1, 1),
            species: Species::Human,
            form: Form::None,
            stats: StatSet::default(),
            hp: 20,
            hp_max: 20,
            mp: 10,
            mp_max: 10,
            hit_points_regeneration: 0,
            magic_points_regeneration: 0,
            hunger: HUNGER_DEFAULT,
            piety: 0,
            patron: None,
            disease: 0,
            stealth: 10,
            mutations: Mutations::default(),
            attr: Attributes::default(),
            duration: DurationLedger::new(),
            skills: Skills::default(),
            constricted_by: None,
            beholders: Vec::new(),
            fearmongers: Vec::new(),
        }
    }
}

impl You {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a duration for `turns` normal-speed turns.
    pub fn set_duration(&mut self, kind: DurationKind, turns: i32) {
        self.duration.set(kind, turns * BASELINE_DELAY);
    }

    /// Extend a duration by `turns`, capped at `cap` turns.
    pub fn increase_duration(&mut self, kind: DurationKind, turns: i32, cap: i32) {
        let aut = (self.duration.get(kind) + turns * BASELINE_DELAY)
            .min(cap * BASELINE_DELAY);
        self.duration.set(kind, aut);
    }

    pub fn confused(&self) -> bool {
        self.duration.is_active(DurationKind::Confusion)
    }

    pub fn berserk(&self) -> bool {
        self.duration.is_active(DurationKind::Berserk)
    }

    pub fn petrified(&self) -> bool {
        self.duration.is_active(DurationKind::Petrified)
    }

    pub fn petrifying(&self) -> bool {
        self.duration.is_active(DurationKind::Petrifying)
    }

    pub fn paralysed(&self) -> bool {
        self.duration.is_active(DurationKind::Paralysis)
    }

    pub fn asleep(&self) -> bool {
        self.duration.is_active(DurationKind::Sleep)
    }

    pub fn silenced(&self) -> bool {
        self.duration.is_active(DurationKind::Silence)
    }

    pub fn cannot_move(&self) -> bool {
        self.petrified() || self.paralysed() || self.asleep()
    }

    pub fn permanent_flight(&self) -> bool {
        self.attr.permanent_flight
    }

    pub fn airborne(&self) -> bool {
        self.permanent_flight()
            || self.duration.is_active(DurationKind::Flight)
            || self.form.grants_flight()
    }

    pub fn hunger_state(&self) -> HungerState {
        HungerState::from_hunger(self.hunger)
    }

    /// Evocations skill scaled by `scale` (tenths-of-a-level storage).
    pub fn evo_skill(&self, scale: i32) -> i32 {
        self.skills.evocations * scale / 10
    }

    pub fn heal_hp(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.hp_max);
    }

    pub fn heal_mp(&mut self, amount: i32) {
        self.mp = (self.mp + amount).min(self.mp_max);
    }

    pub fn drain_mp(&mut self, amount: i32) {
        self.mp = (self.mp - amount).max(0);
    }

    pub fn gain_piety(&mut self, amount: i32) {
        self.piety = (self.piety + amount).min(MAX_PIETY);
    }

    pub fn lose_piety(&mut self, amount: i32) {
        self.piety = (self.piety - amount).max(0);
    }

    pub fn make_hungry(&mut self, amount: i32) {
        self.hunger = (self.hunger - amount).clamp(0, HUNGER_MAXIMUM);
    }

    /// Whether the active transformation has locked in permanently.
    pub fn form_is_permanent(&self) -> bool {
        if self.attr.form_uncancellable {
            return false;
        }
        match (self.form.permanence_threshold(), self.attr.transform_power) {
            (Some(threshold), Some(power)) => power >= threshold,
            _ => false,
        }
    }
}
