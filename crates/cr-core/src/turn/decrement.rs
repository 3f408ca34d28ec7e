//! Duration countdown: the generic decrement primitive plus the bespoke
//! per-effect hooks that run every player turn.

use strum::IntoEnumIterator;

use crate::consts::{
    BASELINE_DELAY, GOURMAND_MAX, MAX_PIETY, PETRIFY_WARNING_AUT,
};
use crate::msg::Channel;
use crate::player::{DurationKind, Form, Species, Stat};
use crate::state::GameState;
use crate::world::{Attitude, LevelFlags, MonsterKind};

/// Decrement a single duration by `delay` aut.
///
/// Crossing the kind's midpoint emits `mid_msg` (escalated to the danger
/// channel for kinds flagged with an expiration warning) and chops off a
/// further `midloss` normal-speed turns, clamped so the countdown never
/// skips from above the midpoint straight to expiry. Expiry clamps to 0,
/// emits `end_msg` and returns true.
///
/// This is the only authorized ledger mutation during a decrement pass.
pub fn decrement_a_duration(
    state: &mut GameState,
    kind: DurationKind,
    delay: i32,
    end_msg: Option<&str>,
    midloss: i32,
    mid_msg: Option<&str>,
    channel: Channel,
) -> bool {
    let old_dur = state.player.duration.get(kind);
    if old_dur < 1 {
        return false;
    }

    let midpoint = kind.expire_point();
    debug_assert!(
        midloss == 0 || midloss * BASELINE_DELAY < midpoint,
        "midloss would swallow the whole countdown for {kind}"
    );
    debug_assert!(midloss == 0 || mid_msg.is_some(), "midloss without a message");

    let mut remaining = old_dur - delay;

    // The midpoint is handled before expiry: a single large delta that
    // crosses both thresholds still warns, and the clamp holds the
    // countdown at 1 so expiry waits for the next tick.
    if remaining <= midpoint && old_dur > midpoint {
        remaining -= midloss * BASELINE_DELAY;
        if remaining <= 0 {
            remaining = 1;
        }
        if let Some(mid) = mid_msg {
            if kind.need_expiration_warning() {
                state.msg(Channel::Danger, format!("Careful! {mid}"));
            } else {
                state.msg(channel, mid);
            }
        }
    }

    if remaining <= 0 {
        *state.player.duration.value_mut(kind) = 0;
        if let Some(end) = end_msg {
            if !end.is_empty() {
                state.msg(channel, end);
            }
        }
        return true;
    }
    *state.player.duration.value_mut(kind) = remaining;

    false
}

/// Decrement a table-driven kind using its static metadata.
pub fn decrement_simple_duration(state: &mut GameState, kind: DurationKind, delay: i32) -> bool {
    let def = kind.def();
    debug_assert!(def.decrements_normally, "{kind} belongs to a bespoke hook");
    let mid = (!def.mid_msg.is_empty()).then_some(def.mid_msg);
    decrement_a_duration(
        state,
        kind,
        delay,
        Some(def.end_msg),
        def.mid_offset,
        mid,
        def.mid_channel,
    )
}

/// Run all duration countdowns for a turn of `delay` aut.
///
/// Ordering is observable: the vortex damages before flight can lapse,
/// paralysis immunity is granted before the next paralysis tick, and the
/// table-driven kinds run last so they observe bespoke writes from the
/// same tick.
pub fn decrement_durations(state: &mut GameState, delay: i32) {
    debug_assert!(!state.decrement_pass_active, "nested decrement pass");
    state.decrement_pass_active = true;

    dec_gourmand(state, delay);
    dec_icy_armour(state, delay);
    dec_liquid_flames(state, delay);
    dec_swiftness(state, delay);
    dec_tornado(state, delay);
    dec_transformation(state, delay);
    dec_recitation(state, delay);
    dec_stat_zero(state, delay);
    dec_piety_pool(state);
    dec_powered_by_death(state, delay);
    dec_flayed(state, delay);
    dec_water_hold(state, delay);
    dec_darkness_in_sunlight(state);
    dec_cloud_trail(state, delay);
    dec_haste_and_slow(state, delay);
    dec_berserk(state, delay);
    dec_poisoning(state, delay);
    dec_doom_howl(state, delay);
    dec_ambrosia(state, delay);
    dec_channel_energy(state, delay);
    dec_flight(state, delay);

    // Table-driven kinds last.
    for kind in DurationKind::iter() {
        if !kind.decrements_normally() {
            continue;
        }
        // Liquefied ground persists under an airborne caster.
        if kind == DurationKind::Liquefying && state.player.airborne() {
            if state.player.duration.is_active(kind) {
                state.player.duration.set(kind, 1);
            }
            continue;
        }
        decrement_simple_duration(state, kind, delay);
    }

    state.decrement_pass_active = false;
}

fn dec_gourmand(state: &mut GameState, delay: i32) {
    if state.player.mutations.gourmand == 0 {
        state.player.duration.clear(DurationKind::Gourmand);
        return;
    }
    if state.player.mutations.gourmand > 1 {
        // Innate gourmand is always in full effect.
        state.player.duration.set(DurationKind::Gourmand, GOURMAND_MAX);
        return;
    }
    if state.rng.coinflip() {
        let ramped = (state.player.duration.get(DurationKind::Gourmand) + delay).min(GOURMAND_MAX);
        state.player.duration.set(DurationKind::Gourmand, ramped);
    }
}

fn dec_icy_armour(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::IcyArmour) {
        return;
    }
    // Heat already melted the armour this turn; the melt message covers it.
    let (midloss, mid) = if state.player.attr.melt_armour {
        (0, None)
    } else {
        (state.rng.coinflip() as i32, Some("Your icy armour starts to melt."))
    };
    if decrement_a_duration(
        state,
        DurationKind::IcyArmour,
        delay,
        Some("Your icy armour evaporates."),
        midloss,
        mid,
        Channel::Duration,
    ) {
        state.player.attr.icy_armoured = false;
    }
}

fn dec_liquid_flames(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::LiquidFlames) {
        return;
    }
    state.msg(Channel::Warn, "You are covered in liquid flames!");
    let dmg = state.rng.roll_dice(2, 4);
    state.player.hp -= state.rng.div_rand_round(dmg * delay, BASELINE_DELAY);
    decrement_a_duration(
        state,
        DurationKind::LiquidFlames,
        delay,
        Some("You are no longer on fire."),
        0,
        None,
        Channel::Recovery,
    );
}

fn dec_swiftness(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Swiftness) {
        return;
    }
    if state.player.attr.swiftness >= 0 {
        // Fast phase; expiry flips into the sluggish antithesis.
        let midloss = state.rng.coinflip() as i32;
        if decrement_a_duration(
            state,
            DurationKind::Swiftness,
            delay,
            Some("You feel sluggish."),
            midloss,
            Some("You start to lose your swiftness."),
            Channel::Duration,
        ) {
            let sluggish = state.player.attr.swiftness.max(1);
            state.player.duration.set(DurationKind::Swiftness, sluggish);
            state.player.attr.swiftness = -1;
        }
    } else if decrement_a_duration(
        state,
        DurationKind::Swiftness,
        delay,
        Some("You no longer feel sluggish."),
        0,
        None,
        Channel::Duration,
    ) {
        state.player.attr.swiftness = 0;
    }
}

fn dec_tornado(state: &mut GameState, delay: i32) {
    let remaining = state.player.duration.get(DurationKind::Tornado);
    if remaining < 1 {
        return;
    }
    vortex_damage(state, delay.min(remaining));
    if decrement_a_duration(
        state,
        DurationKind::Tornado,
        delay,
        Some("The winds around you calm down."),
        0,
        None,
        Channel::Duration,
    ) {
        let cooldown = state.rng.random_range(55, 65);
        state.player.duration.set(DurationKind::TornadoCooldown, cooldown);
    }
}

/// Batter every monster caught in the player's vortex.
fn vortex_damage(state: &mut GameState, aut: i32) {
    if aut < 1 {
        return;
    }
    let pos = state.player.pos;
    let caught: Vec<_> = state
        .level
        .monsters
        .iter()
        .filter(|m| m.pos.distance_from(pos) <= 2 && !m.stationary)
        .map(|m| m.id)
        .collect();
    let mut killed = Vec::new();
    for id in caught {
        let dmg = state.rng.roll_dice(1 + aut / BASELINE_DELAY, 8);
        let mut died = None;
        if let Some(mon) = state.level.monster_mut(id) {
            mon.hp -= dmg;
            if mon.hp <= 0 {
                died = Some(mon.kind);
                killed.push(id);
            }
        }
        if let Some(name) = died {
            state.plain(format!("The {name} is torn apart by the winds!"));
        }
    }
    for id in killed {
        state.level.remove_monster(id);
    }
}

fn dec_transformation(state: &mut GameState, delay: i32) {
    if state.player.form == Form::None {
        return;
    }
    // A live form with a dead countdown is a bookkeeping slip; repair it
    // rather than leaving the player stuck.
    if !state.player.duration.is_active(DurationKind::Transformation) {
        state.player.duration.set(DurationKind::Transformation, 1);
    }
    if state.player.form_is_permanent() {
        return;
    }
    // Vampire bats sustain the form themselves while well fed into it.
    if state.player.species == Species::Vampire
        && state.player.form == Form::Bat
        && state.player.duration.get(DurationKind::Transformation) > 5 * BASELINE_DELAY
    {
        return;
    }
    let midloss = state.rng.random2(3);
    if decrement_a_duration(
        state,
        DurationKind::Transformation,
        delay,
        None,
        midloss,
        Some("Your transformation is almost over."),
        Channel::Duration,
    ) {
        untransform(state);
    }
}

/// Return the player to their natural shape.
pub fn untransform(state: &mut GameState) {
    let old_form = state.player.form;
    state.player.form = Form::None;
    state.player.attr.transform_power = None;
    state.player.attr.form_uncancellable = false;
    state.player.duration.clear(DurationKind::Transformation);
    state.plain("Your transformation has ended.");
    let on_water = state.level.terrain(state.player.pos).is_water();
    if old_form.grants_flight() || (old_form.likes_water() && on_water) {
        state.player.attr.emergency_flight = false;
    }
}

/// Petrified recovery and the petrifying countdown. Runs from the
/// monster-reaction phase, before sleep handling.
pub(crate) fn dec_petrification(state: &mut GameState, delay: i32) {
    if state.player.duration.is_active(DurationKind::Petrified) {
        let material = state.player.species.flesh_equivalent();
        // Still paralysed: the stone softens but the player stays put.
        let end = if state.player.paralysed() {
            format!("You turn to {material}.")
        } else {
            format!("You turn to {material} and can move again.")
        };
        if decrement_a_duration(
            state,
            DurationKind::Petrified,
            delay,
            Some(end.as_str()),
            0,
            None,
            Channel::Duration,
        ) {
            state.player.attr.petrified_by = None;
        }
    }

    let old = state.player.duration.get(DurationKind::Petrifying);
    if old < 1 {
        return;
    }
    if decrement_a_duration(
        state,
        DurationKind::Petrifying,
        delay,
        None,
        0,
        None,
        Channel::Duration,
    ) {
        state.msg(Channel::Danger, "You have turned to stone.");
        let turns = 6 + state.rng.random2(6);
        state.player.set_duration(DurationKind::Petrified, turns);
    } else {
        let new = state.player.duration.get(DurationKind::Petrifying);
        if old > PETRIFY_WARNING_AUT && new <= PETRIFY_WARNING_AUT {
            state.msg(Channel::Danger, "Your limbs are stiffening.");
        }
    }
}

/// Paralysis countdown, preceded by its immunity window.
pub(crate) fn dec_paralysis(state: &mut GameState, delay: i32) {
    decrement_a_duration(
        state,
        DurationKind::ParalysisImmunity,
        delay,
        None,
        0,
        None,
        Channel::Duration,
    );

    if !state.player.duration.is_active(DurationKind::Paralysis) {
        return;
    }
    let end = (!state.player.petrified()).then_some("You can move again.");
    if decrement_a_duration(
        state,
        DurationKind::Paralysis,
        delay,
        end,
        0,
        None,
        Channel::Duration,
    ) {
        let immunity = state.rng.roll_dice(1, 3) * BASELINE_DELAY;
        state
            .player
            .duration
            .set(DurationKind::ParalysisImmunity, immunity);
        state.player.attr.paralysed_by = None;
    }
}

/// Sleep countdown; expiry awakens the player.
pub(crate) fn dec_sleep(state: &mut GameState, delay: i32) {
    decrement_a_duration(
        state,
        DurationKind::Sleep,
        delay,
        Some("You wake up."),
        0,
        None,
        Channel::Recovery,
    );
}

/// Grasping-roots countdown; expiry releases the constriction.
pub(crate) fn dec_grasping_roots(state: &mut GameState, delay: i32) {
    if decrement_a_duration(
        state,
        DurationKind::GraspingRoots,
        delay,
        None,
        0,
        None,
        Channel::Duration,
    ) {
        state.player.constricted_by = None;
        state.plain("The grasping roots release you.");
    }
}

fn dec_recitation(state: &mut GameState, delay: i32) {
    let old = state.player.duration.get(DurationKind::Recite);
    if old < 1 {
        return;
    }
    let cannot_speak = state.player.silenced()
        || state.player.paralysed()
        || state.player.confused()
        || state.player.asleep()
        || state.player.petrified()
        || state.player.berserk();
    if cannot_speak {
        state.plain("You are no longer reciting.");
        state.player.duration.clear(DurationKind::Recite);
        arm_recite_cooldown(state);
        return;
    }

    let steps_left = |aut: i32| (aut + BASELINE_DELAY - 1) / BASELINE_DELAY;
    let old_steps = steps_left(old);
    if decrement_a_duration(
        state,
        DurationKind::Recite,
        delay,
        Some("You finish reciting."),
        0,
        None,
        Channel::Plain,
    ) {
        arm_recite_cooldown(state);
        return;
    }
    let new_steps = steps_left(state.player.duration.get(DurationKind::Recite));
    if new_steps < old_steps {
        recite_pulse(state);
    }
}

fn arm_recite_cooldown(state: &mut GameState) {
    let cooldown = 1 + state.rng.random2(10) + state.rng.random2(30);
    state.player.duration.set(DurationKind::ReciteCooldown, cooldown);
}

/// One recitation step: noise, practice, and a lash at every visible
/// hostile.
fn recite_pulse(state: &mut GameState) {
    state.msg(Channel::Sound, "You recite a passage against the wicked.");
    state.player.skills.practice_invocations(1);

    let pos = state.player.pos;
    let targets: Vec<_> = state
        .level
        .monsters
        .iter()
        .filter(|m| m.attitude == Attitude::Hostile && state.level.cell_see_cell(pos, m.pos))
        .map(|m| m.id)
        .collect();
    let mut killed = Vec::new();
    for id in targets {
        let dmg = state.rng.roll_dice(2, 4);
        let mut died = None;
        if let Some(mon) = state.level.monster_mut(id) {
            mon.asleep = false;
            mon.hp -= dmg;
            if mon.hp <= 0 {
                died = Some(mon.kind);
                killed.push(id);
            }
        }
        if let Some(name) = died {
            state.plain(format!("The {name} is shattered by the recitation!"));
        }
    }
    for id in killed {
        state.level.remove_monster(id);
    }
}

fn dec_stat_zero(state: &mut GameState, delay: i32) {
    for stat in [Stat::Strength, Stat::Intellect, Stat::Dexterity] {
        let kind = stat.zero_duration();
        if !state.player.duration.is_active(kind) {
            continue;
        }
        // The collapse holds as long as the stat itself is still zeroed.
        if state.player.stats.get(stat) <= 0 {
            continue;
        }
        let end = format!("Your {} has recovered.", stat.recovery_noun());
        if decrement_a_duration(state, kind, delay, Some(end.as_str()), 0, None, Channel::Recovery)
            && !state.player.duration.is_active(DurationKind::Slow)
        {
            state.msg(Channel::Recovery, "You feel yourself speed up.");
        }
    }
}

fn dec_piety_pool(state: &mut GameState) {
    if state.rng.one_chance_in(5)
        && state.player.piety < MAX_PIETY
        && state.player.duration.is_active(DurationKind::PietyPool)
    {
        let pool = state.player.duration.get(DurationKind::PietyPool);
        state.player.duration.set(DurationKind::PietyPool, pool - 1);
        state.player.gain_piety(1);
        state.msg(Channel::Diagnostics, "Piety increases by 1 (pool).");
    }
}

fn dec_powered_by_death(state: &mut GameState, delay: i32) {
    if decrement_a_duration(
        state,
        DurationKind::PoweredByDeath,
        delay,
        None,
        0,
        None,
        Channel::Duration,
    ) {
        let stacks = state.player.attr.powered_by_death_stacks;
        if stacks > 1 {
            state.player.attr.powered_by_death_stacks = stacks - 1;
            let turns = 2 + state.rng.random2(4);
            state.player.set_duration(DurationKind::PoweredByDeath, turns);
        } else {
            state.player.attr.powered_by_death_stacks = 0;
            state.msg(Channel::Duration, "Your regeneration returns to normal.");
        }
    }
}

fn dec_flayed(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Flayed) {
        return;
    }
    let pos = state.player.pos;
    let ghost_watching = state.level.monsters.iter().any(|m| {
        m.kind == MonsterKind::FlayedGhost
            && m.attitude == Attitude::Hostile
            && state.level.cell_see_cell(pos, m.pos)
    });
    if ghost_watching {
        // The wounds cannot close while a flayed ghost keeps them open.
        if state.player.duration.get(DurationKind::Flayed) < 80 {
            state.player.duration.set(DurationKind::Flayed, 80);
        }
        return;
    }
    if decrement_a_duration(
        state,
        DurationKind::Flayed,
        delay,
        Some("The terrible wounds on your body vanish."),
        0,
        None,
        Channel::Recovery,
    ) {
        state.player.heal_hp(state.player.hp_max / 4);
    }
}

fn dec_water_hold(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::WaterHold) {
        return;
    }
    if state.player.constricted_by.is_none() {
        state.player.duration.clear(DurationKind::WaterHold);
        state.plain("You slip free of the water engulfing you.");
        return;
    }
    state.msg(Channel::Warn, "You're being held underwater!");
    let dmg = state.rng.roll_dice(1, 6);
    state.player.hp -= state.rng.div_rand_round(dmg * delay, BASELINE_DELAY);
}

fn dec_darkness_in_sunlight(state: &mut GameState) {
    if state.player.duration.is_active(DurationKind::Darkness)
        && state.level.flags.contains(LevelFlags::SUNLIGHT)
    {
        state.plain("The light dispels your darkness!");
        state.player.duration.clear(DurationKind::Darkness);
    }
}

fn dec_cloud_trail(state: &mut GameState, delay: i32) {
    if decrement_a_duration(
        state,
        DurationKind::CloudTrail,
        delay,
        None,
        0,
        None,
        Channel::Duration,
    ) {
        state.player.attr.trail_cloud = None;
    }
}

fn dec_haste_and_slow(state: &mut GameState, delay: i32) {
    let midloss = state.rng.coinflip() as i32;
    decrement_a_duration(
        state,
        DurationKind::Haste,
        delay,
        Some("You feel yourself slow down."),
        midloss,
        Some("Your extra speed is starting to run out."),
        Channel::Duration,
    );
    decrement_a_duration(
        state,
        DurationKind::Slow,
        delay,
        Some("You feel yourself speed up."),
        0,
        None,
        Channel::Recovery,
    );
}

fn dec_berserk(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Berserk) {
        return;
    }
    if decrement_a_duration(
        state,
        DurationKind::Berserk,
        delay,
        Some("You are no longer berserk."),
        0,
        None,
        Channel::Duration,
    ) {
        state.msg(Channel::Warn, "You feel exhausted.");
        let cooldown = 10 + state.rng.random2(10);
        state.player.set_duration(DurationKind::BerserkCooldown, cooldown);
        if !state.player.duration.is_active(DurationKind::Slow) {
            state.player.set_duration(DurationKind::Slow, cooldown);
        }
    }
}

fn dec_poisoning(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Poisoning) {
        return;
    }
    let dmg = state.rng.div_rand_round(delay, BASELINE_DELAY);
    state.player.hp -= dmg;
    if dmg > 0 && state.rng.one_chance_in(3) {
        state.msg(Channel::Warn, "You feel sick.");
    }
    decrement_a_duration(
        state,
        DurationKind::Poisoning,
        delay,
        Some("You are no longer poisoned."),
        0,
        None,
        Channel::Recovery,
    );
}

fn dec_doom_howl(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::DoomHowl) {
        return;
    }
    if state.rng.one_chance_in(3) {
        let mgen = crate::world::MonsterGen::new(
            MonsterKind::DoomHound,
            Attitude::Hostile,
            state.player.pos,
        )
        .with_hd(5)
        .summoned_for(20);
        if state.place_summon(mgen).is_some() {
            state.msg(Channel::Danger, "A doom hound answers the howl!");
        }
    }
    decrement_a_duration(
        state,
        DurationKind::DoomHowl,
        delay,
        Some("The howling abates."),
        0,
        None,
        Channel::Recovery,
    );
}

fn dec_ambrosia(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Ambrosia) {
        return;
    }
    let hp_roll = 1 + state.rng.random2(3);
    let hp = state.rng.div_rand_round(hp_roll * delay, BASELINE_DELAY);
    let mp_roll = 1 + state.rng.random2(3);
    let mp = state.rng.div_rand_round(mp_roll * delay, BASELINE_DELAY);
    state.player.heal_hp(hp);
    state.player.heal_mp(mp);
    decrement_a_duration(
        state,
        DurationKind::Ambrosia,
        delay,
        Some("You feel less invigorated."),
        0,
        None,
        Channel::Duration,
    );
}

fn dec_channel_energy(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::ChannelEnergy) {
        return;
    }
    let mp = state.rng.div_rand_round(delay, BASELINE_DELAY);
    state.player.heal_mp(mp);
    decrement_a_duration(
        state,
        DurationKind::ChannelEnergy,
        delay,
        Some("You stop channelling magical energy."),
        0,
        None,
        Channel::Duration,
    );
}

fn dec_flight(state: &mut GameState, delay: i32) {
    if !state.player.duration.is_active(DurationKind::Flight) {
        return;
    }
    if state.player.permanent_flight() {
        // The countdown is vestigial under permanent flight; retire it
        // quietly along with the cancellation locks.
        if decrement_a_duration(
            state,
            DurationKind::Flight,
            delay,
            None,
            0,
            None,
            Channel::Duration,
        ) {
            state.player.attr.flight_uncancellable = false;
            state.player.attr.emergency_flight = false;
        }
        return;
    }
    let midloss = state.rng.random2(6);
    if decrement_a_duration(
        state,
        DurationKind::Flight,
        delay,
        Some("You float gracefully downwards."),
        midloss,
        Some("You are starting to lose your buoyancy."),
        Channel::Duration,
    ) {
        state.player.attr.emergency_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Coord, MonsterGen};
    use proptest::prelude::*;

    fn fresh() -> GameState {
        GameState::new(7)
    }

    #[test]
    fn test_inactive_duration_is_a_noop() {
        let mut state = fresh();
        let ended = decrement_a_duration(
            &mut state,
            DurationKind::Might,
            0,
            Some("gone"),
            0,
            None,
            Channel::Duration,
        );
        assert!(!ended);
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_expiry_clamps_and_messages_once() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Might, 5);
        let ended = decrement_a_duration(
            &mut state,
            DurationKind::Might,
            10,
            Some("You feel a little less mighty now."),
            0,
            None,
            Channel::Duration,
        );
        assert!(ended);
        assert_eq!(state.player.duration.get(DurationKind::Might), 0);
        assert_eq!(state.log.count_containing("less mighty"), 1);
    }

    #[test]
    fn test_midpoint_warning_never_skipped() {
        let mut state = fresh();
        // Just above the midpoint; a large midloss must clamp to 1, not 0.
        state.player.duration.set(DurationKind::Invisibility, 61);
        let ended = decrement_a_duration(
            &mut state,
            DurationKind::Invisibility,
            5,
            Some("You flicker back into view."),
            5,
            Some("You flicker for a moment."),
            Channel::Duration,
        );
        assert!(!ended);
        assert_eq!(state.player.duration.get(DurationKind::Invisibility), 1);
        assert!(state.log.contains("Careful! You flicker for a moment."));
    }

    #[test]
    fn test_large_delta_warns_instead_of_expiring_silently() {
        let mut state = fresh();
        // 70 aut, midpoint 60: one 80-aut swallow must still warn.
        state.player.duration.set(DurationKind::Invisibility, 70);
        let ended = decrement_a_duration(
            &mut state,
            DurationKind::Invisibility,
            80,
            Some("You flicker back into view."),
            0,
            Some("You flicker for a moment."),
            Channel::Duration,
        );
        assert!(!ended);
        assert_eq!(state.player.duration.get(DurationKind::Invisibility), 1);
        assert!(state.log.contains("Careful! You flicker for a moment."));
        assert!(!state.log.contains("You flicker back into view."));
    }

    #[test]
    fn test_midpoint_message_fires_once() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Resistance, 70);
        for _ in 0..5 {
            decrement_simple_duration(&mut state, DurationKind::Resistance, 10);
        }
        assert_eq!(state.log.count_containing("less resistant"), 1);
    }

    #[test]
    fn test_petrifying_warns_then_petrifies() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Petrifying, 20);
        dec_petrification(&mut state, 10);
        assert!(state.log.contains("Your limbs are stiffening."));
        assert!(!state.player.petrified());
        dec_petrification(&mut state, 10);
        assert!(state.log.contains("You have turned to stone."));
        assert!(state.player.petrified());
    }

    #[test]
    fn test_paralysis_grants_immunity_on_expiry() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Paralysis, 10);
        dec_paralysis(&mut state, 10);
        assert!(state.log.contains("You can move again."));
        assert!(state
            .player
            .duration
            .is_active(DurationKind::ParalysisImmunity));
    }

    #[test]
    fn test_petrified_expiry_names_species_material() {
        let mut state = fresh();
        state.player.species = Species::Ent;
        state.player.duration.set(DurationKind::Petrified, 10);
        dec_petrification(&mut state, 10);
        assert!(state.log.contains("You turn to wood and can move again."));
    }

    #[test]
    fn test_petrified_expiry_muted_while_still_paralysed() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Paralysis, 50);
        state.player.duration.set(DurationKind::Petrified, 10);
        dec_petrification(&mut state, 10);
        assert!(state.log.contains("You turn to flesh."));
        assert!(!state.log.contains("can move again"));
    }

    #[test]
    fn test_paralysis_expiry_silent_while_petrified() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Petrified, 50);
        state.player.duration.set(DurationKind::Paralysis, 10);
        dec_paralysis(&mut state, 10);
        assert!(!state.log.contains("You can move again."));
        assert!(state
            .player
            .duration
            .is_active(DurationKind::ParalysisImmunity));
    }

    #[test]
    fn test_grasping_roots_expiry_releases() {
        let mut state = fresh();
        state.player.constricted_by = Some(crate::world::MonsterId(9));
        state.player.duration.set(DurationKind::GraspingRoots, 10);
        dec_grasping_roots(&mut state, 10);
        assert!(state.player.constricted_by.is_none());
        assert!(state.log.contains("The grasping roots release you."));
    }

    #[test]
    fn test_swiftness_flips_into_sluggishness() {
        let mut state = fresh();
        state.player.attr.swiftness = 40;
        state.player.duration.set(DurationKind::Swiftness, 10);
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("You feel sluggish."));
        assert_eq!(state.player.attr.swiftness, -1);
        assert_eq!(state.player.duration.get(DurationKind::Swiftness), 40);

        state.player.duration.set(DurationKind::Swiftness, 10);
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("You no longer feel sluggish."));
        assert_eq!(state.player.attr.swiftness, 0);
    }

    #[test]
    fn test_permanent_form_does_not_expire() {
        let mut state = fresh();
        state.player.form = Form::Spider;
        state.player.attr.transform_power = Some(20);
        state.player.duration.set(DurationKind::Transformation, 1);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.form, Form::Spider);
    }

    #[test]
    fn test_transformation_expiry_untransforms() {
        let mut state = fresh();
        state.player.form = Form::Spider;
        state.player.set_duration(DurationKind::Transformation, 1);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.form, Form::None);
        assert!(state.log.contains("Your transformation has ended."));
    }

    #[test]
    fn test_tornado_expiry_arms_cooldown() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Tornado, 10);
        decrement_durations(&mut state, 10);
        let cooldown = state.player.duration.get(DurationKind::TornadoCooldown);
        assert!((55..=65).contains(&cooldown));
    }

    #[test]
    fn test_recite_interrupted_by_silence() {
        let mut state = fresh();
        state.player.set_duration(DurationKind::Recite, 4);
        state.player.set_duration(DurationKind::Silence, 5);
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("You are no longer reciting."));
        assert!(!state.player.duration.is_active(DurationKind::Recite));
        assert!(state
            .player
            .duration
            .is_active(DurationKind::ReciteCooldown));
    }

    #[test]
    fn test_recite_pulses_on_step_boundaries_only() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Recite, 25);
        decrement_durations(&mut state, 4);
        // 25 -> 21 aut: still three steps, no pulse.
        assert_eq!(state.log.count_containing("recite a passage"), 0);
        decrement_durations(&mut state, 4);
        // 21 -> 17 aut crosses a step boundary.
        assert_eq!(state.log.count_containing("recite a passage"), 1);
    }

    #[test]
    fn test_stat_zero_holds_while_stat_is_zero() {
        let mut state = fresh();
        state.player.stats.strength = 0;
        state.player.duration.set(DurationKind::StatZeroStr, 10);
        decrement_durations(&mut state, 10);
        assert!(state.player.duration.is_active(DurationKind::StatZeroStr));

        state.player.stats.strength = 4;
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("Your strength has recovered."));
        assert!(state.log.contains("You feel yourself speed up."));
    }

    #[test]
    fn test_powered_by_death_decays_stackwise() {
        let mut state = fresh();
        state.player.attr.powered_by_death_stacks = 2;
        state.player.duration.set(DurationKind::PoweredByDeath, 10);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.attr.powered_by_death_stacks, 1);
        assert!(state
            .player
            .duration
            .is_active(DurationKind::PoweredByDeath));
    }

    #[test]
    fn test_ambrosia_restores_both_pools_while_active() {
        let mut state = fresh();
        state.player.hp = 1;
        state.player.mp = 0;
        state.player.duration.set(DurationKind::Ambrosia, 30);
        decrement_durations(&mut state, 10);
        assert!(state.player.hp > 1);
        assert!(state.player.mp > 0);
    }

    #[test]
    fn test_flayed_holds_while_ghost_watches() {
        let mut state = fresh();
        let pos = state.player.pos;
        state
            .level
            .place_monster(
                MonsterGen::new(
                    MonsterKind::FlayedGhost,
                    Attitude::Hostile,
                    pos + Coord::new(3, 0),
                )
                .with_hd(7),
            )
            .unwrap();
        state.player.duration.set(DurationKind::Flayed, 40);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.duration.get(DurationKind::Flayed), 80);
    }

    #[test]
    fn test_sunlight_dispels_darkness() {
        let mut state = fresh();
        state.level.flags |= LevelFlags::SUNLIGHT;
        state.player.set_duration(DurationKind::Darkness, 10);
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("The light dispels your darkness!"));
        assert!(!state.player.duration.is_active(DurationKind::Darkness));
    }

    #[test]
    fn test_liquefying_pinned_while_airborne() {
        let mut state = fresh();
        state.player.attr.permanent_flight = true;
        state.player.duration.set(DurationKind::Liquefying, 30);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.duration.get(DurationKind::Liquefying), 1);
        decrement_durations(&mut state, 10);
        assert!(state.player.duration.is_active(DurationKind::Liquefying));
    }

    #[test]
    fn test_simple_durations_decrement_in_the_pass() {
        let mut state = fresh();
        state.player.duration.set(DurationKind::Confusion, 25);
        decrement_durations(&mut state, 10);
        assert_eq!(state.player.duration.get(DurationKind::Confusion), 15);
        decrement_durations(&mut state, 10);
        decrement_durations(&mut state, 10);
        assert!(state.log.contains("You feel less confused."));
        assert!(!state.player.confused());
    }

    proptest! {
        #[test]
        fn prop_countdown_never_negative_and_messages_once(
            seed in 0u64..500,
            start in 1i32..300,
            delays in proptest::collection::vec(1i32..40, 1..30),
        ) {
            let mut state = GameState::new(seed);
            state.player.duration.set(DurationKind::Resistance, start);
            for delay in delays {
                decrement_simple_duration(&mut state, DurationKind::Resistance, delay);
                prop_assert!(state.player.duration.get(DurationKind::Resistance) >= 0);
            }
            prop_assert!(state.log.count_containing("resistance to elements expires") <= 1);
            prop_assert!(state.log.count_containing("less resistant") <= 1);
        }
    }
}
