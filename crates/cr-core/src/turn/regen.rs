//! Hit-point and magic-point regeneration.
//!
//! Both channels run on 100-unit fixed-point counters: a rate scaled by
//! the turn's delay accumulates, and every full 100 units converts into
//! one recovered point. Counters stay in [0, 99] between turns.

use crate::consts::BASELINE_DELAY;
use crate::player::{DurationKind, You};
use crate::state::GameState;

/// HP regeneration rate in counter units per normal-speed turn.
fn hp_regen_rate(player: &You) -> i32 {
    let mut rate = 20 + player.hp_max / 3;
    rate += 100 * player.attr.powered_by_death_stacks;
    if player.disease > 0 {
        rate /= 2;
    }
    rate
}

/// MP regeneration rate in counter units per normal-speed turn.
fn mp_regen_rate(player: &You) -> i32 {
    7 + player.mp_max / 2
}

/// Run both regeneration channels for a turn of `delay` aut.
pub fn regenerate(state: &mut GameState, delay: i32) {
    if state.regen_disabled {
        return;
    }

    // Death's door freezes natural healing; the MP channel is unaffected.
    if !state.player.duration.is_active(DurationKind::DeathsDoor) {
        let rate = hp_regen_rate(&state.player);
        state.player.hit_points_regeneration +=
            state.rng.div_rand_round(rate * delay, BASELINE_DELAY);
    }
    while state.player.hit_points_regeneration >= 100 {
        state.player.hit_points_regeneration -= 100;
        let mp = state.player.mp;
        let mp_max = state.player.mp_max;
        // Mana link siphons healing into missing magic first.
        if state.player.mutations.mana_link > 0 && !state.rng.x_chance_in_y(mp, mp_max) {
            state.player.heal_mp(1);
        } else {
            state.player.heal_hp(1);
        }
    }

    let rate = mp_regen_rate(&state.player);
    state.player.magic_points_regeneration +=
        state.rng.div_rand_round(rate * delay, BASELINE_DELAY);
    while state.player.magic_points_regeneration >= 100 {
        state.player.magic_points_regeneration -= 100;
        state.player.heal_mp(1);
    }

    debug_assert!((0..100).contains(&state.player.hit_points_regeneration));
    debug_assert!((0..100).contains(&state.player.magic_points_regeneration));
}
