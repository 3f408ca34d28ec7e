//! Top-level mutable game state threaded through the turn and evocation
//! entry points.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::msg::{Channel, MessageLog};
use crate::object::{Item, MiscDevice, WandKind};
use crate::player::You;
use crate::rng::GameRng;
use crate::world::{Level, MonsterGen, MonsterId};

/// Telemetry key for one evocation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Wand(WandKind),
    ReachingWeapon,
    ChannelingStaff,
    Misc(MiscDevice),
}

/// Per-action-kind use counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionCounts {
    counts: HashMap<ActionKind, u32>,
}

impl ActionCounts {
    pub fn count(&mut self, kind: ActionKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    pub fn get(&self, kind: ActionKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: You,
    pub inventory: Vec<Item>,
    pub level: Level,
    pub rng: GameRng,
    #[serde(skip)]
    pub log: MessageLog,
    pub action_counts: ActionCounts,
    /// Set by an action that consumed the player's turn.
    pub turn_is_over: bool,
    /// Administrative switch suppressing both regeneration channels.
    pub regen_disabled: bool,
    /// True while a decrement pass is running; guards against re-entry.
    #[serde(skip)]
    pub(crate) decrement_pass_active: bool,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        let level = Level::new(40, 20);
        let mut player = You::new();
        player.pos = level.clamp_in_bounds(player.pos);
        Self {
            player,
            inventory: Vec::new(),
            level,
            rng: GameRng::new(seed),
            log: MessageLog::default(),
            action_counts: ActionCounts::default(),
            turn_is_over: false,
            regen_disabled: false,
            decrement_pass_active: false,
        }
    }

    pub fn msg(&mut self, channel: Channel, text: impl Into<String>) {
        self.log.msg(channel, text);
    }

    pub fn plain(&mut self, text: impl Into<String>) {
        self.log.msg(Channel::Plain, text);
    }

    /// Add an item, returning its slot.
    pub fn add_item(&mut self, item: Item) -> usize {
        self.inventory.push(item);
        self.inventory.len() - 1
    }

    /// Place a summoned monster near the player, never on their own cell.
    pub fn place_summon(&mut self, mut mgen: MonsterGen) -> Option<MonsterId> {
        if mgen.pos == self.player.pos {
            mgen.pos = mgen.pos.adjacent().find(|c| {
                self.level.in_bounds(*c)
                    && !self.level.cell_is_solid(*c)
                    && self.level.monster_at(*c).is_none()
            })?;
        }
        self.level.place_monster(mgen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_counts_accumulate() {
        let mut counts = ActionCounts::default();
        counts.count(ActionKind::Misc(MiscDevice::WindFan));
        counts.count(ActionKind::Misc(MiscDevice::WindFan));
        counts.count(ActionKind::ChannelingStaff);
        assert_eq!(counts.get(ActionKind::Misc(MiscDevice::WindFan)), 2);
        assert_eq!(counts.get(ActionKind::ChannelingStaff), 1);
        assert_eq!(counts.get(ActionKind::ReachingWeapon), 0);
    }
}
