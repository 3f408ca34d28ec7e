//! Monster records, as seen by the player-reaction and evocation code.
//!
//! This is deliberately the minimum the engine needs: AI and full combat
//! live elsewhere.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::Coord;

/// Unique monster identifier within a level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MonsterId(pub u32);

/// Monster species relevant to this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MonsterKind {
    HellBeast,
    MutantBeast,
    Redback,
    WolfSpider,
    JumpingSpider,
    Tarantella,
    OrbSpider,
    WaterElemental,
    FlayedGhost,
    DoomHound,
    DemonicGuardian,
    Mimic,
    /// Anything else; the engine treats it generically.
    Other,
}

impl MonsterKind {
    /// Summoning value used by the spider-sack count formula.
    pub const fn summon_value(self) -> i32 {
        match self {
            MonsterKind::Redback => 70,
            MonsterKind::WolfSpider
            | MonsterKind::JumpingSpider
            | MonsterKind::Tarantella
            | MonsterKind::OrbSpider => 140,
            _ => 70,
        }
    }
}

/// Whose side a monster is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Attitude {
    Hostile,
    Friendly,
}

/// Threat tier, used by the cowardice horror computation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
pub enum ThreatLevel {
    Trivial,
    Easy,
    Tough,
    Nasty,
}

/// A monster on the level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    pub pos: Coord,
    pub attitude: Attitude,
    pub threat: ThreatLevel,
    /// Hit dice; scales summon strength and mirror breakage.
    pub hd: i32,
    pub hp: i32,
    /// Remaining summon lifetime in turns, if summoned.
    pub summon_timer: Option<i32>,
    /// Cannot be pushed or relocated.
    pub stationary: bool,
    pub airborne: bool,
    pub asleep: bool,
    /// Disguised mimic not yet revealed to the player.
    pub hidden_mimic: bool,
    /// Phantom-mirror clones cannot themselves be cloned.
    pub illusion: bool,
}

impl Monster {
    pub fn is_threatening(&self) -> bool {
        self.threat > ThreatLevel::Trivial && !self.hidden_mimic
    }

    pub fn wont_attack(&self) -> bool {
        self.attitude == Attitude::Friendly
    }
}

/// Request handed to the spawn-placement collaborator.
#[derive(Debug, Clone)]
pub struct MonsterGen {
    pub kind: MonsterKind,
    pub attitude: Attitude,
    /// Preferred position; placement falls back to free adjacent cells.
    pub pos: Coord,
    pub hd: i32,
    pub summon_duration: Option<i32>,
}

impl MonsterGen {
    pub fn new(kind: MonsterKind, attitude: Attitude, pos: Coord) -> Self {
        Self {
            kind,
            attitude,
            pos,
            hd: 1,
            summon_duration: None,
        }
    }

    pub fn with_hd(mut self, hd: i32) -> Self {
        self.hd = hd;
        self
    }

    pub fn summoned_for(mut self, turns: i32) -> Self {
        self.summon_duration = Some(turns);
        self
    }
}
