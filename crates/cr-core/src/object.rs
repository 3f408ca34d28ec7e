//! Evokable item model.
//!
//! The resolver only reads and writes charge state and dispatch fields;
//! full inventory management belongs to the surrounding application.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Spells bound to wands (and the lightning rod).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Spell {
    Flame,
    Frost,
    Slowing,
    Paralysis,
    Acid,
    Thunderbolt,
}

/// Wand subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum WandKind {
    Flame,
    Frost,
    Slowing,
    Paralysis,
    Acid,
}

impl WandKind {
    /// The spell a wand of this kind casts when zapped.
    pub const fn spell(self) -> Spell {
        match self {
            WandKind::Flame => Spell::Flame,
            WandKind::Frost => Spell::Frost,
            WandKind::Slowing => Spell::Slowing,
            WandKind::Paralysis => Spell::Paralysis,
            WandKind::Acid => Spell::Acid,
        }
    }
}

/// Staff subtypes; only the channeling staff is evokable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum StaffKind {
    Channeling,
    Other,
}

/// Miscellaneous device subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum MiscDevice {
    BoxOfBeasts,
    SackOfSpiders,
    HellishHorn,
    FireLamp,
    WindFan,
    FloodPhial,
    LightningRod,
    QuadDamage,
    PhantomMirror,
    ZigguratFigurine,
}

impl MiscDevice {
    /// XP debt incurred by one use, for devices recharged by experience.
    /// None means the device is not charge-gated.
    pub const fn recharge_debt(self) -> Option<i32> {
        match self {
            MiscDevice::SackOfSpiders => Some(40),
            MiscDevice::HellishHorn => Some(60),
            MiscDevice::FireLamp => Some(40),
            MiscDevice::WindFan => Some(40),
            MiscDevice::FloodPhial => Some(50),
            MiscDevice::LightningRod => Some(10),
            MiscDevice::BoxOfBeasts
            | MiscDevice::QuadDamage
            | MiscDevice::PhantomMirror
            | MiscDevice::ZigguratFigurine => None,
        }
    }

    /// Evocations practice awarded on a successful use.
    pub const fn practice(self) -> i32 {
        match self {
            MiscDevice::BoxOfBeasts
            | MiscDevice::LightningRod
            | MiscDevice::PhantomMirror => 1,
            MiscDevice::SackOfSpiders
            | MiscDevice::HellishHorn
            | MiscDevice::FireLamp
            | MiscDevice::WindFan
            | MiscDevice::FloodPhial => 3,
            MiscDevice::QuadDamage | MiscDevice::ZigguratFigurine => 0,
        }
    }
}

/// What an item is, for evocation dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Wand { kind: WandKind, charges: i32 },
    /// A melee weapon; `reaching` weapons can attack at range two.
    Weapon { reaching: bool },
    Staff(StaffKind),
    Misc(MiscDevice),
}

/// An inventory item as the resolver sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub quantity: i32,
    /// Accumulated XP debt for experience-recharged devices; the device
    /// is inert while this is positive.
    pub evoker_debt: i32,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            quantity: 1,
            evoker_debt: 0,
        }
    }

    pub fn wand(kind: WandKind, charges: i32) -> Self {
        Self::new(ItemKind::Wand { kind, charges })
    }

    pub fn misc(device: MiscDevice) -> Self {
        Self::new(ItemKind::Misc(device))
    }

    /// Whether an XP-recharged device currently has a charge.
    pub fn evoker_charges(&self) -> bool {
        self.evoker_debt <= 0
    }

    /// Record one use of an XP-recharged device.
    pub fn expend_xp_evoker(&mut self) {
        if let ItemKind::Misc(device) = self.kind {
            if let Some(debt) = device.recharge_debt() {
                self.evoker_debt += debt;
            }
        }
    }

    /// Pay down evoker debt from gained experience.
    pub fn recharge(&mut self, xp: i32) {
        self.evoker_debt = (self.evoker_debt - xp).max(0);
    }
}

/// Item lookup failures at the resolver boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("no item in slot {0}")]
    NoSuchSlot(usize),
    #[error("item cannot be evoked")]
    NotEvokable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_evoker_inert_until_recharged() {
        let mut fan = Item::misc(MiscDevice::WindFan);
        assert!(fan.evoker_charges());
        fan.expend_xp_evoker();
        assert!(!fan.evoker_charges());
        fan.recharge(10);
        assert!(!fan.evoker_charges());
        fan.recharge(100);
        assert!(fan.evoker_charges());
    }

    #[test]
    fn test_ungated_devices_never_accrue_debt() {
        let mut boxb = Item::misc(MiscDevice::BoxOfBeasts);
        boxb.expend_xp_evoker();
        assert!(boxb.evoker_charges());
    }
}
