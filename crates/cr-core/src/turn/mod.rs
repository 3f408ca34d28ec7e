//! Per-turn player reactions.
//!
//! `player_reacts` runs after the player's own action; the step order is
//! load-bearing (starvation is judged before the turn's hunger is
//! subtracted, the vortex damages before flight can lapse, and so on).
//! `player_reacts_to_monsters` runs after the monsters have acted.

pub mod decrement;
pub mod regen;

pub use decrement::{
    decrement_a_duration, decrement_durations, decrement_simple_duration, untransform,
};
pub use regen::regenerate;

use crate::consts::{
    BASELINE_DELAY, HORROR_LVL_EXTREME, HORROR_LVL_OVERWHELMING,
};
use crate::msg::Channel;
use crate::player::{DurationKind, Form, HungerState, Patron, Species, You};
use crate::state::GameState;
use crate::world::{Attitude, CloudKind, Coord, LevelFlags, MonsterGen, MonsterKind, Terrain, ThreatLevel};

/// Hunger units drained per `FOOD_TICK` aut at metabolism rate 1.
const FOOD_TICK: i32 = 80;
const BASE_METABOLISM: i32 = 3;

/// Everything that happens to the player after their own action.
pub fn player_reacts(state: &mut GameState, time_taken: i32) {
    let stealth = check_stealth(&state.player);

    maybe_summon_demonic_guardian(state);

    // Silence chokes off the song at once, spending the whole remainder.
    if state.player.silenced()
        && state.player.duration.is_active(DurationKind::SongOfSlaying)
    {
        let remaining = state.player.duration.get(DurationKind::SongOfSlaying);
        decrement_a_duration(
            state,
            DurationKind::SongOfSlaying,
            remaining,
            Some("Your song is strangled by the silence."),
            0,
            None,
            Channel::Duration,
        );
    } else if state.player.duration.is_active(DurationKind::SongOfSlaying) {
        state.msg(Channel::Sound, "Your song of slaying rings out.");
    }

    maybe_teleportitis(state, time_taken);
    cloud_exposure(state, time_taken);
    slime_wall_damage(state);
    lava_melts_icy_enchantments(state);
    starvation_check(state);

    decrement_durations(state, time_taken);

    release_dead_beholders(state);
    constriction_bookkeeping(state);
    hunger_accounting(state, time_taken);
    regenerate(state, time_taken);
    disease_recovery(state, time_taken);
    reveal_adjacent_mimics(state);
    seen_monsters_react(state, stealth);
    handle_patron_time(state, time_taken);
    resolve_emergency_flight(state, time_taken);
    environment_upkeep(state, time_taken);
}

/// Everything that happens to the player after the monsters have acted.
pub fn player_reacts_to_monsters(state: &mut GameState, time_taken: i32) {
    manage_fire_shield(state, time_taken);
    detect_monsters(state);

    decrement::dec_paralysis(state, time_taken);
    decrement::dec_petrification(state, time_taken);
    decrement::dec_sleep(state, time_taken);
    decrement::dec_grasping_roots(state, time_taken);

    clear_melt_armour(state);
    update_cowardice(state);
    patron_abandonment(state);
}

/// Stealth snapshot taken before anything else reacts this turn.
pub fn check_stealth(player: &You) -> i32 {
    let mut stealth = player.stealth;
    if player.berserk() {
        stealth /= 2;
    }
    if player.duration.is_active(DurationKind::Silence) {
        stealth += 5;
    }
    stealth.max(0)
}

fn maybe_summon_demonic_guardian(state: &mut GameState) {
    let level = state.player.mutations.demonic_guardian;
    if level == 0 || state.player.hp * 2 >= state.player.hp_max {
        return;
    }
    let already_present = state.level.monsters.iter().any(|m| {
        m.kind == MonsterKind::DemonicGuardian && m.attitude == Attitude::Friendly
    });
    if already_present || !state.rng.one_chance_in(3) {
        return;
    }
    let mgen = MonsterGen::new(
        MonsterKind::DemonicGuardian,
        Attitude::Friendly,
        state.player.pos,
    )
    .with_hd(2 * level + 2)
    .summoned_for(15);
    if state.place_summon(mgen).is_some() {
        state.plain("A demonic guardian appears!");
    }
}

fn maybe_teleportitis(state: &mut GameState, time_taken: i32) {
    let level = state.player.mutations.teleportitis;
    if level == 0 {
        return;
    }
    if !state.rng.x_chance_in_y(time_taken, 10 * BASELINE_DELAY) {
        return;
    }
    if !state.rng.x_chance_in_y(level, 100) {
        return;
    }
    if state.player.form == Form::Wisp {
        state.plain("You drift away uncontrollably!");
    } else {
        state.plain("Your surroundings suddenly seem different!");
    }
    random_teleport(state);
}

fn random_teleport(state: &mut GameState) {
    for _ in 0..100 {
        let pos = Coord::new(
            state.rng.random_range(1, state.level.width() - 2),
            state.rng.random_range(1, state.level.height() - 2),
        );
        if !state.level.cell_is_solid(pos)
            && !state.level.terrain(pos).is_dangerous()
            && state.level.monster_at(pos).is_none()
        {
            state.player.pos = pos;
            return;
        }
    }
}

fn cloud_exposure(state: &mut GameState, time_taken: i32) {
    let Some(cloud) = state.level.cloud_at(state.player.pos) else {
        return;
    };
    let kind = cloud.kind;
    match kind {
        CloudKind::Fire => {
            state.msg(Channel::Warn, "You are engulfed in roaring flames!");
            let dmg = state.rng.roll_dice(3, 4);
            state.player.hp -= state.rng.div_rand_round(dmg * time_taken, BASELINE_DELAY);
            if state.player.attr.icy_armoured {
                state.player.attr.melt_armour = true;
            }
        }
        CloudKind::Poison => {
            state.msg(Channel::Warn, "You are engulfed in poison gas!");
            let extra = 2 + state.rng.random2(4);
            state
                .player
                .increase_duration(DurationKind::Poisoning, extra, 10);
        }
        CloudKind::Steam => {
            state.msg(Channel::Warn, "You are engulfed in a cloud of scalding steam!");
            state.player.hp -= state.rng.roll_dice(1, 4);
        }
    }
}

fn slime_wall_damage(state: &mut GameState) {
    if !state.level.flags.contains(LevelFlags::SLIMY_WALLS) {
        return;
    }
    let pos = state.player.pos;
    let touching_wall = pos
        .adjacent()
        .any(|c| state.level.terrain(c) == Terrain::Wall);
    if touching_wall {
        state.msg(Channel::Warn, "The slime covering the walls burns you!");
        state.player.hp -= state.rng.roll_dice(2, 4);
    }
}

fn lava_melts_icy_enchantments(state: &mut GameState) {
    let over_lava = state.level.terrain(state.player.pos) == Terrain::Lava;
    if !over_lava {
        return;
    }
    if state.player.attr.icy_armoured
        || state.player.duration.is_active(DurationKind::IcyArmour)
    {
        state.player.attr.melt_armour = true;
    }
}

/// Judged on the hunger value before this turn's subtraction.
fn starvation_check(state: &mut GameState) {
    if state.player.species == Species::Skeleton {
        return;
    }
    if state.player.hunger_state() > HungerState::Starving {
        return;
    }
    if state.player.hunger <= 0 {
        if !state
            .player
            .duration
            .is_active(DurationKind::ParalysisImmunity)
        {
            state.msg(Channel::Danger, "You faint from lack of food!");
            let turns = 2 + state.rng.random2(5);
            state.player.set_duration(DurationKind::Paralysis, turns);
        }
    } else if state.rng.one_chance_in(5) {
        state.msg(Channel::Danger, "You are starving!");
    }
}

fn release_dead_beholders(state: &mut GameState) {
    let pos = state.player.pos;

    let had_beholders = !state.player.beholders.is_empty();
    let beholders: Vec<_> = state
        .player
        .beholders
        .iter()
        .copied()
        .filter(|id| {
            state
                .level
                .monster(*id)
                .is_some_and(|m| state.level.cell_see_cell(pos, m.pos))
        })
        .collect();
    state.player.beholders = beholders;
    if had_beholders && state.player.beholders.is_empty() {
        state.msg(Channel::Recovery, "You are no longer mesmerised.");
    }

    let had_fearmongers = !state.player.fearmongers.is_empty();
    let fearmongers: Vec<_> = state
        .player
        .fearmongers
        .iter()
        .copied()
        .filter(|id| {
            state
                .level
                .monster(*id)
                .is_some_and(|m| state.level.cell_see_cell(pos, m.pos))
        })
        .collect();
    state.player.fearmongers = fearmongers;
    if had_fearmongers && state.player.fearmongers.is_empty() {
        state.msg(Channel::Recovery, "You are no longer terrified.");
    }
}

fn constriction_bookkeeping(state: &mut GameState) {
    let Some(id) = state.player.constricted_by else {
        return;
    };
    let still_holding = state
        .level
        .monster(id)
        .is_some_and(|m| m.pos.distance_from(state.player.pos) <= 1);
    if !still_holding {
        state.player.constricted_by = None;
        state.plain("You are no longer being constricted.");
    }
}

fn hunger_accounting(state: &mut GameState, time_taken: i32) {
    if state.player.species == Species::Skeleton {
        return;
    }
    let mut tick = FOOD_TICK;
    if state.player.mutations.slow_metabolism > 0 {
        tick *= 2;
    }
    if state.player.form == Form::Statue {
        tick = tick * 3 / 2;
    }
    let spent = state
        .rng
        .div_rand_round(BASE_METABOLISM * time_taken, tick);
    state.player.make_hungry(spent);
}

fn disease_recovery(state: &mut GameState, time_taken: i32) {
    if state.player.disease == 0 {
        return;
    }
    let recovery = state.rng.div_rand_round(4 * time_taken, BASELINE_DELAY);
    state.player.disease = (state.player.disease - recovery).max(0);
    if state.player.disease == 0 {
        state.msg(Channel::Recovery, "You feel your disease lift.");
    }
}

fn reveal_adjacent_mimics(state: &mut GameState) {
    let pos = state.player.pos;
    let adjacent: Vec<_> = state
        .level
        .monsters
        .iter()
        .filter(|m| m.hidden_mimic && m.pos.distance_from(pos) <= 1)
        .map(|m| m.id)
        .collect();
    for id in adjacent {
        if let Some(mon) = state.level.monster_mut(id) {
            mon.hidden_mimic = false;
        }
        state.msg(Channel::Warn, "The mimic reveals itself!");
    }
}

/// Sleeping monsters in view may notice the player, stealth permitting.
fn seen_monsters_react(state: &mut GameState, stealth: i32) {
    let pos = state.player.pos;
    let sleepers: Vec<_> = state
        .level
        .monsters
        .iter()
        .filter(|m| m.asleep && state.level.cell_see_cell(pos, m.pos))
        .map(|m| m.id)
        .collect();
    for id in sleepers {
        if state.rng.x_chance_in_y(30, stealth + 30) {
            let mut woke = None;
            if let Some(mon) = state.level.monster_mut(id) {
                mon.asleep = false;
                woke = Some(mon.kind);
            }
            if let Some(name) = woke {
                state.plain(format!("The {name} wakes up."));
            }
        }
    }
}

/// Soft-capped value: growth above `point` is halved.
pub(crate) fn stepdown(value: i32, point: i32) -> i32 {
    if value <= point {
        value
    } else {
        point + (value - point) / 2
    }
}

/// Continuous piety decay for the revelry patron.
fn handle_patron_time(state: &mut GameState, time_taken: i32) {
    if state.player.patron != Some(Patron::Revelry) || state.player.piety == 0 {
        return;
    }
    let pressure = stepdown(state.player.piety, 50);
    if state
        .rng
        .x_chance_in_y(pressure * time_taken, 50 * 10 * BASELINE_DELAY)
    {
        state.player.lose_piety(1);
    }
}

/// Age transient world state: clouds thin out, summons lapse and
/// temporary terrain reverts.
fn environment_upkeep(state: &mut GameState, time_taken: i32) {
    let mut expired_clouds = Vec::new();
    for cloud in &mut state.level.clouds {
        cloud.decay -= time_taken;
        if cloud.decay <= 0 {
            expired_clouds.push(cloud.pos);
        }
    }
    for pos in expired_clouds {
        state.level.delete_cloud(pos);
    }

    let turns = state.rng.div_rand_round(time_taken, BASELINE_DELAY);
    if turns > 0 {
        let mut lapsed = Vec::new();
        for mon in &mut state.level.monsters {
            if let Some(timer) = &mut mon.summon_timer {
                *timer -= turns;
                if *timer <= 0 {
                    lapsed.push((mon.id, mon.kind));
                }
            }
        }
        for (id, kind) in lapsed {
            state.level.remove_monster(id);
            state.plain(format!("The {kind} disappears in a puff of smoke!"));
        }
    }

    state.level.tick_terrain_changes(time_taken);
}

fn resolve_emergency_flight(state: &mut GameState, time_taken: i32) {
    if !state.player.attr.emergency_flight {
        return;
    }
    let terrain = state.level.terrain(state.player.pos);
    if !terrain.is_dangerous() {
        state.player.attr.emergency_flight = false;
        state.msg(Channel::Duration, "You float back down.");
        return;
    }
    let drain = state.rng.div_rand_round(15 * time_taken, BASELINE_DELAY);
    state.player.drain_mp(drain);
    if state.player.mp == 0 {
        state.msg(Channel::Danger, "You can no longer sustain your flight!");
        state.player.attr.emergency_flight = false;
        state.player.duration.clear(DurationKind::Flight);
    }
}

/// Keep the ring of flames stocked and count its fuel down.
fn manage_fire_shield(state: &mut GameState, time_taken: i32) {
    if !state.player.duration.is_active(DurationKind::FireShield) {
        return;
    }
    let cells: Vec<_> = state.player.pos.adjacent().collect();
    for cell in cells {
        if state.level.cloud_at(cell).is_none() && state.rng.one_chance_in(3) {
            state.level.add_cloud(cell, CloudKind::Fire, 20);
        }
    }
    let midloss = state.rng.coinflip() as i32;
    decrement_a_duration(
        state,
        DurationKind::FireShield,
        time_taken,
        Some("Your ring of flames gutters out."),
        midloss,
        Some("Your ring of flames is guttering out."),
        Channel::Duration,
    );
}

fn detect_monsters(state: &mut GameState) {
    let pos = state.player.pos;
    let visible = state
        .level
        .monsters
        .iter()
        .filter(|m| !m.hidden_mimic && state.level.cell_see_cell(pos, m.pos))
        .count();
    if visible > 0 {
        state.msg(
            Channel::Diagnostics,
            format!("{visible} monsters in view."),
        );
    }
}

fn clear_melt_armour(state: &mut GameState) {
    if !state.player.attr.melt_armour {
        return;
    }
    state.player.attr.melt_armour = false;
    if state.player.attr.icy_armoured
        || state.player.duration.is_active(DurationKind::IcyArmour)
    {
        state.msg(Channel::Duration, "The heat melts your icy armour.");
        state.player.duration.clear(DurationKind::IcyArmour);
        state.player.attr.icy_armoured = false;
    }
}

/// Horror from the cowardice mutation: a weighted count of visible
/// threats, messaged only when it worsens.
fn update_cowardice(state: &mut GameState) {
    if state.player.mutations.cowardice == 0 {
        state.player.attr.horror_penalty = 0;
        state.player.duration.clear(DurationKind::Horror);
        return;
    }
    let pos = state.player.pos;
    let mut penalty = -1;
    for mon in &state.level.monsters {
        if mon.wont_attack()
            || !mon.is_threatening()
            || !state.level.cell_see_cell(pos, mon.pos)
        {
            continue;
        }
        penalty += match mon.threat {
            ThreatLevel::Nasty => 3,
            ThreatLevel::Tough => 1,
            ThreatLevel::Trivial | ThreatLevel::Easy => 0,
        };
    }
    let penalty = penalty.max(0);

    if penalty > state.player.attr.horror_penalty {
        if penalty >= HORROR_LVL_OVERWHELMING {
            state.msg(Channel::Warn, "You are overwhelmed with horror!");
        } else if penalty >= HORROR_LVL_EXTREME {
            state.msg(Channel::Warn, "You feel a thrill of horror!");
        } else {
            state.msg(Channel::Warn, "You feel horrified!");
        }
    }
    state.player.attr.horror_penalty = penalty;
    if penalty > 0 {
        state.player.set_duration(DurationKind::Horror, 1);
    } else {
        state.player.duration.clear(DurationKind::Horror);
    }
}

/// A patron whose revels have fully lapsed departs.
fn patron_abandonment(state: &mut GameState) {
    if state.player.patron == Some(Patron::Revelry) && state.player.piety == 0 {
        state.player.patron = None;
        state.msg(Channel::Warn, "The revelry fades; your patron departs.");
    }
}
