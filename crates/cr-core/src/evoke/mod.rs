//! Item evocation: wands, reach weapons, the channeling staff and the
//! miscellaneous devices.
//!
//! Every entry point resolves to a tri-state [`EvokeOutcome`]: an
//! unevokable attempt is free, anything else costs the turn, and only a
//! genuine success counts the action and awards practice.

pub mod devices;
pub mod flame;

pub use flame::{fill_flame_trails, get_jitter_path, lamp_of_fire};

use crate::beam::Bolt;
use crate::consts::LOS_RADIUS;
use crate::msg::Channel;
use crate::object::{ItemError, ItemKind, MiscDevice, Spell, StaffKind};
use crate::player::HungerState;
use crate::state::{ActionKind, GameState};
use crate::world::{Attitude, Coord, MonsterId};

/// How an evocation attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvokeOutcome {
    /// The item could not be evoked at all; the turn is free.
    Unevokable,
    /// The attempt fizzled or was wasted; the turn is still spent.
    DidNothing,
    /// The evocation worked.
    Succeeded,
}

impl EvokeOutcome {
    pub fn costs_turn(self) -> bool {
        !matches!(self, EvokeOutcome::Unevokable)
    }
}

/// Evoke the item in `slot`, aimed at `target` where one is needed.
///
/// Returns whether the turn was spent. Targeting is pre-resolved by the
/// caller; `None` where a target would be required aborts for free.
/// Items with no evokable use at all are a typed error for the command
/// layer to message.
pub fn evoke_item(
    state: &mut GameState,
    slot: usize,
    target: Option<Coord>,
) -> Result<bool, ItemError> {
    let item = state
        .inventory
        .get(slot)
        .ok_or(ItemError::NoSuchSlot(slot))?;
    let kind = item.kind;

    if let Some(outcome) = evoke_check(state, &kind) {
        state.turn_is_over = outcome.costs_turn();
        return Ok(outcome.costs_turn());
    }

    let outcome = match kind {
        ItemKind::Wand { .. } => {
            let out = zap_wand(state, slot, target);
            if out == EvokeOutcome::Succeeded {
                state.player.skills.practice_evocations(1);
            }
            out
        }
        ItemKind::Weapon { reaching: true } => {
            let out = match target {
                Some(spot) => reaching_weapon_attack(state, spot),
                None => EvokeOutcome::Unevokable,
            };
            if out == EvokeOutcome::Succeeded {
                state.action_counts.count(ActionKind::ReachingWeapon);
            }
            out
        }
        ItemKind::Weapon { reaching: false } => return Err(ItemError::NotEvokable),
        ItemKind::Staff(StaffKind::Channeling) => {
            let out = channel_magic(state);
            if out == EvokeOutcome::Succeeded {
                state.action_counts.count(ActionKind::ChannelingStaff);
            }
            out
        }
        ItemKind::Staff(StaffKind::Other) => return Err(ItemError::NotEvokable),
        ItemKind::Misc(device) => {
            let out = devices::evoke_misc(state, slot, device, target);
            if out == EvokeOutcome::Succeeded {
                state.action_counts.count(ActionKind::Misc(device));
                state
                    .player
                    .skills
                    .practice_evocations(device.practice());
            }
            out
        }
    };

    state.turn_is_over = outcome.costs_turn();
    Ok(outcome.costs_turn())
}

/// Blanket preconditions. Some(outcome) short-circuits the evocation.
fn evoke_check(state: &mut GameState, kind: &ItemKind) -> Option<EvokeOutcome> {
    let is_reach_weapon = matches!(kind, ItemKind::Weapon { reaching: true });
    if state.player.berserk() && !is_reach_weapon {
        state.plain("You are too berserk!");
        return Some(EvokeOutcome::Unevokable);
    }

    let is_ziggurat = matches!(kind, ItemKind::Misc(MiscDevice::ZigguratFigurine));
    if state.player.mutations.no_artifice > 0 && !is_ziggurat {
        state.plain("You cannot evoke magical items.");
        return Some(EvokeOutcome::Unevokable);
    }

    let confusable = matches!(
        kind,
        ItemKind::Wand { .. }
            | ItemKind::Staff(_)
            | ItemKind::Weapon { reaching: true }
            | ItemKind::Misc(MiscDevice::FireLamp)
            | ItemKind::Misc(MiscDevice::LightningRod)
    );
    if state.player.confused() && confusable {
        state.plain("You are too confused.");
        return Some(EvokeOutcome::Unevokable);
    }
    None
}

/// MP spent empowering a wand zap, from the MP-powered-wands mutation.
fn wand_mp_cost(state: &GameState) -> i32 {
    state.player.mp.min(3 * state.player.mutations.mp_wands)
}

/// Zap the wand in `slot` at `target`.
pub fn zap_wand(state: &mut GameState, slot: usize, target: Option<Coord>) -> EvokeOutcome {
    let Some(item) = state.inventory.get(slot) else {
        return EvokeOutcome::Unevokable;
    };
    let ItemKind::Wand { kind, charges } = item.kind else {
        return EvokeOutcome::Unevokable;
    };
    let Some(target) = target else {
        return EvokeOutcome::Unevokable;
    };

    if charges <= 0 {
        state.plain("Nothing happens.");
        return EvokeOutcome::DidNothing;
    }

    let mp_cost = wand_mp_cost(state);
    state.player.drain_mp(mp_cost);
    let power = (15 + state.player.evo_skill(7) / 2) * (mp_cost + 6) / 6;

    cast_bolt_spell(state, kind.spell(), power, target);

    let mut now_empty = false;
    if let Some(item) = state.inventory.get_mut(slot) {
        if let ItemKind::Wand { charges, .. } = &mut item.kind {
            *charges -= 1;
            now_empty = *charges == 0;
        }
    }
    if now_empty {
        state.plain("The now-empty wand crumbles to dust.");
        state.inventory.remove(slot);
    }
    state.action_counts.count(ActionKind::Wand(kind));
    EvokeOutcome::Succeeded
}

/// Fire a bolt carrying the given spell at `power`.
fn cast_bolt_spell(state: &mut GameState, spell: Spell, power: i32, target: Coord) {
    let (dice, pierce, name) = match spell {
        Spell::Flame => ((2, 4 + power / 6), false, "puff of flame"),
        Spell::Frost => ((2, 4 + power / 6), false, "puff of frost"),
        Spell::Slowing => ((1, 3 + power / 10), false, "ray of slowness"),
        Spell::Paralysis => ((1, 3 + power / 10), false, "ray of paralysis"),
        Spell::Acid => ((2, 5 + power / 6), true, "splash of acid"),
        Spell::Thunderbolt => ((3, 4 + power / 5), true, "crackling bolt"),
    };
    let mut bolt = Bolt {
        source: state.player.pos,
        target,
        range: LOS_RADIUS,
        aimed_at_spot: false,
        pierce,
        damage: dice,
        name: name.to_string(),
        path_taken: Vec::new(),
    };
    state.plain(format!("A {name} shoots out!"));
    bolt.fire(&state.level);
    bolt.apply_damage(&mut state.level, &mut state.log, &mut state.rng);
}

/// Attack with a wielded reaching weapon at range two.
///
/// The blow passes over one of the two cells between attacker and
/// target; both solid means the attack cannot be made at all. A monster
/// standing on the chosen cell has a 50% chance of intercepting the
/// blow; a friendly interceptor wastes the attack silently but the turn
/// is still spent.
pub fn reaching_weapon_attack(state: &mut GameState, target: Coord) -> EvokeOutcome {
    let origin = state.player.pos;
    let dist = origin.distance_from(target);
    if dist > 2 {
        state.plain("Your weapon cannot reach that far!");
        return EvokeOutcome::Unevokable;
    }

    if dist == 2 {
        // The two midpoint cells, rounding the half-step both ways.
        let delta = target - origin;
        let half = Coord::new(delta.x / 2, delta.y / 2);
        let mut middles = vec![origin + half];
        if target - half != middles[0] {
            middles.push(target - half);
        }
        middles.retain(|c| !state.level.cell_is_solid(*c));
        let Some(middle) = state.rng.choose(&middles).copied() else {
            state.plain("Something is in the way.");
            return EvokeOutcome::Unevokable;
        };

        if let Some(mon) = state.level.monster_at(middle) {
            let (id, friendly) = (mon.id, mon.wont_attack());
            if state.rng.coinflip() {
                if friendly {
                    return EvokeOutcome::DidNothing;
                }
                let name = state.level.monster(id).map(|m| m.kind);
                if let Some(name) = name {
                    state.plain(format!("The {name} gets in your way!"));
                }
                melee_hit(state, id);
                return EvokeOutcome::Succeeded;
            }
        }
    }

    match state.level.monster_at(target).map(|m| m.id) {
        None => {
            state.plain("You attack empty space.");
            EvokeOutcome::DidNothing
        }
        Some(id) => {
            melee_hit(state, id);
            EvokeOutcome::Succeeded
        }
    }
}

fn melee_hit(state: &mut GameState, id: MonsterId) {
    let Some(name) = state.level.monster(id).map(|m| m.kind) else {
        return;
    };
    if !state.rng.x_chance_in_y(3, 4) {
        state.plain(format!("You miss the {name}."));
        return;
    }
    let dmg = state.rng.roll_dice(2, 6);
    let mut dead = false;
    if let Some(mon) = state.level.monster_mut(id) {
        mon.hp -= dmg;
        dead = mon.hp <= 0;
    }
    if dead {
        state.plain(format!("You kill the {name}!"));
        state.level.remove_monster(id);
    } else {
        state.plain(format!("You hit the {name}."));
    }
}

/// Draw magical energy through a staff of channeling.
fn channel_magic(state: &mut GameState) -> EvokeOutcome {
    if state.player.hunger_state() <= HungerState::Starving {
        state.plain("You are too hungry to draw on your reserves.");
        return EvokeOutcome::Unevokable;
    }
    if state.player.mp >= state.player.mp_max {
        state.plain("Your reserves of magic are already full.");
        return EvokeOutcome::Unevokable;
    }

    let chance = state.player.evo_skill(100) + 1100;
    if state.rng.x_chance_in_y(chance, 4000) {
        let gained = 1 + state.rng.random2(3);
        state.player.heal_mp(gained);
        state.player.make_hungry(50);
        state.player.skills.practice_evocations(1);
        state.plain("You channel some magical energy.");
        EvokeOutcome::Succeeded
    } else {
        state.plain("Nothing happens.");
        EvokeOutcome::DidNothing
    }
}

/// Blast a gale outwards from the player, pushing monsters and clouds
/// away. Stationary monsters hold their ground; nothing is ever pushed
/// into solid terrain.
pub fn wind_blast(state: &mut GameState, power: i32) {
    state.msg(Channel::Sound, "A mighty gale blasts forth!");
    let origin = state.player.pos;
    let push = (2 + power / 50).min(4);

    let targets: Vec<(MonsterId, Coord, bool)> = state
        .level
        .monsters
        .iter()
        .filter(|m| !m.stationary && m.pos.distance_from(origin) <= LOS_RADIUS)
        .map(|m| (m.id, m.pos, m.airborne))
        .collect();
    for (id, pos, airborne) in targets {
        let dir = (pos - origin).sgn();
        if dir == Coord::new(0, 0) {
            continue;
        }
        // Flyers catch more of the gale.
        let distance = push + airborne as i32;
        let mut cur = pos;
        for _ in 0..distance {
            let next = cur + dir;
            if !state.level.in_bounds(next)
                || state.level.cell_is_solid(next)
                || state.level.monster_at(next).is_some()
            {
                break;
            }
            cur = next;
        }
        if cur != pos {
            let mut name = None;
            if let Some(mon) = state.level.monster_mut(id) {
                mon.pos = cur;
                name = Some(mon.kind);
            }
            if let Some(name) = name {
                state.plain(format!("The {name} is blown backwards!"));
            }
        }
    }

    let cloud_cells: Vec<Coord> = state
        .level
        .clouds
        .iter()
        .map(|c| c.pos)
        .filter(|p| p.distance_from(origin) <= LOS_RADIUS && *p != origin)
        .collect();
    for pos in cloud_cells {
        let dir = (pos - origin).sgn();
        let next = pos + dir;
        if state.level.in_bounds(next) && !state.level.cell_is_solid(next) {
            state.level.move_cloud(pos, next);
        }
    }
}

/// Breathe a wild blast of lightning at the nearest visible enemy.
pub fn black_drac_breath(state: &mut GameState) -> bool {
    let origin = state.player.pos;
    let target = state
        .level
        .monsters
        .iter()
        .filter(|m| {
            m.attitude == Attitude::Hostile && state.level.cell_see_cell(origin, m.pos)
        })
        .min_by_key(|m| m.pos.distance_from(origin))
        .map(|m| m.pos);
    let Some(target) = target else {
        return false;
    };

    state.msg(Channel::Sound, "You breathe a wild blast of lightning!");
    cast_bolt_spell(state, Spell::Thunderbolt, 25, target);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Item, WandKind};
    use crate::world::MonsterGen;
    use crate::world::MonsterKind;

    fn fresh() -> GameState {
        GameState::new(17)
    }

    #[test]
    fn test_missing_slot_is_an_error() {
        let mut state = fresh();
        let err = evoke_item(&mut state, 3, None).unwrap_err();
        assert_eq!(err, ItemError::NoSuchSlot(3));
    }

    #[test]
    fn test_berserk_blocks_all_but_reach_weapons() {
        let mut state = fresh();
        state.player.set_duration(crate::player::DurationKind::Berserk, 10);
        let wand = state.add_item(Item::wand(WandKind::Flame, 5));
        let spent = evoke_item(&mut state, wand, Some(Coord::new(5, 5))).unwrap();
        assert!(!spent);
        assert!(state.log.contains("too berserk"));

        let spear = state.add_item(Item::new(ItemKind::Weapon { reaching: true }));
        let spent = evoke_item(&mut state, spear, Some(Coord::new(3, 1))).unwrap();
        assert!(spent);
    }

    #[test]
    fn test_no_artifice_exempts_the_figurine() {
        let mut state = fresh();
        state.player.mutations.no_artifice = 1;
        let wand = state.add_item(Item::wand(WandKind::Acid, 5));
        assert!(!evoke_item(&mut state, wand, Some(Coord::new(5, 5))).unwrap());
        assert!(state.log.contains("cannot evoke magical items"));

        let fig = state.add_item(Item::misc(MiscDevice::ZigguratFigurine));
        let spent = evoke_item(&mut state, fig, None).unwrap();
        assert!(spent);
    }

    #[test]
    fn test_confusion_blocks_wands() {
        let mut state = fresh();
        state.player.set_duration(crate::player::DurationKind::Confusion, 10);
        let wand = state.add_item(Item::wand(WandKind::Frost, 5));
        assert!(!evoke_item(&mut state, wand, Some(Coord::new(5, 5))).unwrap());
        assert!(state.log.contains("too confused"));
    }

    #[test]
    fn test_wand_spends_charge_and_crumbles_at_zero() {
        let mut state = fresh();
        let wand = state.add_item(Item::wand(WandKind::Flame, 1));
        let spent = evoke_item(&mut state, wand, Some(Coord::new(6, 2))).unwrap();
        assert!(spent);
        assert!(state.log.contains("crumbles to dust"));
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn test_empty_wand_wastes_the_turn() {
        let mut state = fresh();
        let wand = state.add_item(Item::wand(WandKind::Flame, 0));
        let spent = evoke_item(&mut state, wand, Some(Coord::new(6, 2))).unwrap();
        assert!(spent);
        assert!(state.log.contains("Nothing happens."));
        assert_eq!(state.inventory.len(), 1);
    }

    #[test]
    fn test_wand_without_target_aborts_free() {
        let mut state = fresh();
        let wand = state.add_item(Item::wand(WandKind::Flame, 5));
        let spent = evoke_item(&mut state, wand, None).unwrap();
        assert!(!spent);
        assert!(!state.turn_is_over);
    }

    #[test]
    fn test_mp_wands_spend_capped_mp() {
        let mut state = fresh();
        state.player.mutations.mp_wands = 2;
        state.player.mp = 4;
        let wand = state.add_item(Item::wand(WandKind::Flame, 5));
        evoke_item(&mut state, wand, Some(Coord::new(6, 2))).unwrap();
        // Cost is min(mp, 3 * level) = 4.
        assert_eq!(state.player.mp, 0);
    }

    #[test]
    fn test_reach_attack_on_empty_space_costs_turn() {
        let mut state = fresh();
        let spear = state.add_item(Item::new(ItemKind::Weapon { reaching: true }));
        let target = state.player.pos + Coord::new(2, 0);
        let spent = evoke_item(&mut state, spear, Some(target)).unwrap();
        assert!(spent);
        assert!(state.log.contains("You attack empty space."));
    }

    #[test]
    fn test_reach_attack_blocked_by_walls_is_free() {
        let mut state = fresh();
        let origin = state.player.pos;
        let target = origin + Coord::new(2, 1);
        let id = state
            .level
            .place_monster(
                MonsterGen::new(MonsterKind::Other, Attitude::Hostile, target).with_hd(3),
            )
            .unwrap();
        let hp_before = state.level.monster(id).unwrap().hp;
        // Wall off both cells the weapon could pass over.
        state
            .level
            .set_terrain(origin + Coord::new(1, 0), crate::world::Terrain::Wall);
        state
            .level
            .set_terrain(origin + Coord::new(1, 1), crate::world::Terrain::Wall);

        let spear = state.add_item(Item::new(ItemKind::Weapon { reaching: true }));
        let spent = evoke_item(&mut state, spear, Some(target)).unwrap();
        assert!(!spent);
        assert!(state.log.contains("Something is in the way."));
        assert_eq!(state.level.monster(id).unwrap().hp, hp_before);
    }

    #[test]
    fn test_confusion_blocks_reach_attacks() {
        let mut state = fresh();
        state.player.set_duration(crate::player::DurationKind::Confusion, 10);
        let spear = state.add_item(Item::new(ItemKind::Weapon { reaching: true }));
        let target = state.player.pos + Coord::new(2, 0);
        let spent = evoke_item(&mut state, spear, Some(target)).unwrap();
        assert!(!spent);
        assert!(!state.turn_is_over);
        assert!(state.log.contains("too confused"));
    }

    #[test]
    fn test_plain_weapons_are_a_typed_error() {
        let mut state = fresh();
        let club = state.add_item(Item::new(ItemKind::Weapon { reaching: false }));
        let err = evoke_item(&mut state, club, None).unwrap_err();
        assert_eq!(err, ItemError::NotEvokable);
        let rod = state.add_item(Item::new(ItemKind::Staff(StaffKind::Other)));
        let err = evoke_item(&mut state, rod, None).unwrap_err();
        assert_eq!(err, ItemError::NotEvokable);
    }

    #[test]
    fn test_reach_attack_beyond_range_is_free() {
        let mut state = fresh();
        let spear = state.add_item(Item::new(ItemKind::Weapon { reaching: true }));
        let target = state.player.pos + Coord::new(5, 0);
        let spent = evoke_item(&mut state, spear, Some(target)).unwrap();
        assert!(!spent);
        assert!(state.log.contains("cannot reach that far"));
    }

    #[test]
    fn test_channeling_gates_on_full_mp() {
        let mut state = fresh();
        let staff = state.add_item(Item::new(ItemKind::Staff(StaffKind::Channeling)));
        let spent = evoke_item(&mut state, staff, None).unwrap();
        assert!(!spent);
        assert!(state.log.contains("already full"));
    }

    #[test]
    fn test_channeling_eventually_restores_mp() {
        let mut state = fresh();
        state.player.mp = 0;
        state.player.skills.evocations = 270;
        let staff = state.add_item(Item::new(ItemKind::Staff(StaffKind::Channeling)));
        let mut gained = false;
        for _ in 0..100 {
            state.player.hunger = crate::player::HUNGER_DEFAULT;
            evoke_item(&mut state, staff, None).unwrap();
            if state.player.mp > 0 {
                gained = true;
                break;
            }
        }
        assert!(gained);
    }

    #[test]
    fn test_wind_blast_respects_walls_and_roots() {
        let mut state = fresh();
        let origin = state.player.pos;
        // A rooted monster right next to the player.
        let rooted = state
            .level
            .place_monster(
                MonsterGen::new(MonsterKind::Other, Attitude::Hostile, origin + Coord::new(0, 1))
                    .with_hd(3),
            )
            .unwrap();
        state.level.monster_mut(rooted).unwrap().stationary = true;
        let rooted_pos = state.level.monster(rooted).unwrap().pos;

        // A pushable monster with a wall right behind it.
        let cornered_at = origin + Coord::new(2, 0);
        let cornered = state
            .level
            .place_monster(MonsterGen::new(MonsterKind::Other, Attitude::Hostile, cornered_at))
            .unwrap();
        let cpos = state.level.monster(cornered).unwrap().pos;
        state
            .level
            .set_terrain(cpos + Coord::new(1, 0), crate::world::Terrain::Wall);

        wind_blast(&mut state, 100);

        assert_eq!(state.level.monster(rooted).unwrap().pos, rooted_pos);
        let after = state.level.monster(cornered).unwrap().pos;
        assert!(!state.level.cell_is_solid(after));
        assert_eq!(after, cpos);
    }

    #[test]
    fn test_wind_blast_carries_flyers_further() {
        let mut state = fresh();
        state.player.pos = Coord::new(20, 10);
        let origin = state.player.pos;
        let walker = state
            .level
            .place_monster(MonsterGen::new(
                MonsterKind::Other,
                Attitude::Hostile,
                origin + Coord::new(3, 0),
            ))
            .unwrap();
        let flyer = state
            .level
            .place_monster(MonsterGen::new(
                MonsterKind::Other,
                Attitude::Hostile,
                origin + Coord::new(-3, 0),
            ))
            .unwrap();
        state.level.monster_mut(flyer).unwrap().airborne = true;

        // Power 0 pushes grounded monsters two cells.
        wind_blast(&mut state, 0);
        assert_eq!(
            state.level.monster(walker).unwrap().pos,
            origin + Coord::new(5, 0)
        );
        assert_eq!(
            state.level.monster(flyer).unwrap().pos,
            origin + Coord::new(-6, 0)
        );
    }

    #[test]
    fn test_black_drac_breath_needs_a_target() {
        let mut state = fresh();
        assert!(!black_drac_breath(&mut state));
        let pos = state.player.pos;
        state
            .level
            .place_monster(
                MonsterGen::new(MonsterKind::Other, Attitude::Hostile, pos + Coord::new(4, 0))
                    .with_hd(3),
            )
            .unwrap();
        assert!(black_drac_breath(&mut state));
        assert!(state.log.contains("blast of lightning"));
    }
}
