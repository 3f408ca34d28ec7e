//! The duration ledger: named countdown timers for active status effects.
//!
//! Each kind carries static metadata describing how the generic decrement
//! path treats it. Kinds with `decrements_normally == false` are owned by
//! a bespoke hook in `turn::decrement` instead.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use crate::msg::Channel;
use crate::BASELINE_DELAY;

/// Every tracked player duration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(usize)]
pub enum DurationKind {
    Petrified,
    Petrifying,
    Paralysis,
    ParalysisImmunity,
    Sleep,
    GraspingRoots,
    Horror,
    Transformation,
    Swiftness,
    Flight,
    Tornado,
    TornadoCooldown,
    CloudTrail,
    Darkness,
    WaterHold,
    Flayed,
    ToxicRadiance,
    Recite,
    ReciteCooldown,
    StatZeroStr,
    StatZeroInt,
    StatZeroDex,
    PietyPool,
    PoweredByDeath,
    IcyArmour,
    Silence,
    Liquefying,
    SongOfSlaying,
    QuadDamage,
    Gourmand,
    LiquidFlames,
    Slow,
    Haste,
    Berserk,
    BerserkCooldown,
    DeathsDoor,
    FireShield,
    Poisoning,
    SanguineArmour,
    Vitrified,
    Sick,
    Confusion,
    Agility,
    Might,
    Brilliance,
    Invisibility,
    Resistance,
    DoomHowl,
    Ambrosia,
    ChannelEnergy,
}

/// Static per-kind decrement metadata.
#[derive(Debug, Clone, Copy)]
pub struct DurationDef {
    /// Midpoint threshold in aut; crossing it fires the mid message.
    pub expire_point: i32,
    /// Whether the generic table-driven pass owns this kind.
    pub decrements_normally: bool,
    pub end_msg: &'static str,
    pub mid_msg: &'static str,
    pub mid_channel: Channel,
    /// Escalate the midpoint message to the danger channel.
    pub expire_warning: bool,
    /// Extra normal-speed turns lost when crossing the midpoint.
    pub mid_offset: i32,
}

impl DurationDef {
    /// A kind owned by a bespoke hook.
    const fn special() -> Self {
        Self {
            expire_point: 6 * BASELINE_DELAY,
            decrements_normally: false,
            end_msg: "",
            mid_msg: "",
            mid_channel: Channel::Duration,
            expire_warning: false,
            mid_offset: 0,
        }
    }

    /// A table-driven kind with only an end message.
    const fn simple(end_msg: &'static str) -> Self {
        Self {
            expire_point: 6 * BASELINE_DELAY,
            decrements_normally: true,
            end_msg,
            mid_msg: "",
            mid_channel: Channel::Duration,
            expire_warning: false,
            mid_offset: 0,
        }
    }

    const fn with_mid(mut self, mid_msg: &'static str, mid_offset: i32) -> Self {
        self.mid_msg = mid_msg;
        self.mid_offset = mid_offset;
        self
    }

    const fn warned(mut self) -> Self {
        self.expire_warning = true;
        self
    }
}

impl DurationKind {
    /// The static decrement metadata for this kind.
    pub const fn def(self) -> DurationDef {
        use DurationKind::*;
        match self {
            // Owned by bespoke hooks in turn::decrement.
            Petrified | Petrifying | Paralysis | ParalysisImmunity | Sleep | GraspingRoots
            | Horror | Transformation | Swiftness | Flight | Tornado | CloudTrail | WaterHold
            | Flayed | Recite | StatZeroStr | StatZeroInt | StatZeroDex | PietyPool
            | PoweredByDeath | IcyArmour | Gourmand | LiquidFlames | Slow | Haste | Berserk
            | FireShield | Poisoning | DoomHowl | Ambrosia | ChannelEnergy => {
                DurationDef::special()
            }

            TornadoCooldown => DurationDef::simple("The air around you settles."),
            ReciteCooldown => DurationDef::simple("You are ready to recite again."),
            BerserkCooldown => DurationDef::simple("You recover from your exhaustion."),
            Sick => DurationDef::simple("You feel your health improve."),
            SanguineArmour => {
                DurationDef::simple("Your blood armour dries and flakes away.")
            }
            Vitrified => {
                DurationDef::simple("Your skin is no longer as fragile as glass.")
            }
            Liquefying => DurationDef::simple("The ground around you stops churning."),
            SongOfSlaying => DurationDef::simple("Your song has ended."),
            QuadDamage => DurationDef::simple("The quad damage fades away."),
            Confusion => DurationDef::simple("You feel less confused."),
            Agility => DurationDef::simple("You feel a sudden lack of agility."),
            Might => DurationDef::simple("You feel a little less mighty now."),
            Brilliance => DurationDef::simple("You feel a little less clever now."),
            Silence => {
                DurationDef::simple("Your hearing returns.")
                    .with_mid("Your hearing is almost restored.", 0)
            }
            Darkness => DurationDef::simple("The darkness around you fades away.")
                .with_mid("The darkness around you is fading.", 1)
                .warned(),
            Invisibility => DurationDef::simple("You flicker back into view.")
                .with_mid("You flicker for a moment.", 1)
                .warned(),
            Resistance => DurationDef::simple("Your resistance to elements expires.")
                .with_mid("You start to feel less resistant.", 1)
                .warned(),
            DeathsDoor => DurationDef::simple("Your life is in your own hands again!")
                .with_mid("Your time is quickly running out!", 2)
                .warned(),
            ToxicRadiance => DurationDef::simple("Your toxic aura wanes."),
        }
    }

    pub const fn expire_point(self) -> i32 {
        self.def().expire_point
    }

    pub const fn decrements_normally(self) -> bool {
        self.def().decrements_normally
    }

    /// Whether the midpoint message should be escalated to the danger
    /// channel with a "Careful!" prefix.
    pub const fn need_expiration_warning(self) -> bool {
        self.def().expire_warning
    }
}

/// Fixed-size table of countdown values, indexed by [`DurationKind`].
///
/// Invariant: every entry is non-negative; reaching exactly 0 is the only
/// expiry trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationLedger {
    remaining: Vec<i32>,
}

impl Default for DurationLedger {
    fn default() -> Self {
        Self {
            remaining: vec![0; <DurationKind as EnumCount>::COUNT],
        }
    }
}

impl DurationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DurationKind) -> i32 {
        self.remaining[kind as usize]
    }

    /// Set a countdown; negative values clamp to 0.
    pub fn set(&mut self, kind: DurationKind, value: i32) {
        self.remaining[kind as usize] = value.max(0);
    }

    pub fn is_active(&self, kind: DurationKind) -> bool {
        self.get(kind) > 0
    }

    pub fn clear(&mut self, kind: DurationKind) {
        self.set(kind, 0);
    }

    /// Direct mutable access for the decrement engine. All other code
    /// must go through [`set`](Self::set) or the engine itself.
    pub(crate) fn value_mut(&mut self, kind: DurationKind) -> &mut i32 {
        &mut self.remaining[kind as usize]
    }
}
