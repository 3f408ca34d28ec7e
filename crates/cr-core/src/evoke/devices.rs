//! The miscellaneous evokable devices.

use super::{flame, wind_blast, EvokeOutcome};
use crate::consts::MAX_SKILL_LEVEL;
use crate::msg::Channel;
use crate::object::{MiscDevice, Spell};
use crate::player::DurationKind;
use crate::state::GameState;
use crate::world::{Attitude, Coord, MonsterGen, MonsterKind, Terrain};

/// Exclusive hit-dice upper bounds for the mutant-beast tiers.
const BEAST_TIER_BOUNDS: [i32; 5] = [3, 6, 10, 15, MAX_SKILL_LEVEL + 1];
const BEAST_TIER_NAMES: [&str; 5] = ["weird", "large", "shocking", "frightening", "monstrous"];

/// Map a hit-dice roll onto its beast tier. Input is clamped to the
/// trainable skill ceiling, so the final bound always catches it.
fn beast_tier(hd: i32) -> usize {
    let hd = hd.clamp(1, MAX_SKILL_LEVEL);
    for (tier, bound) in BEAST_TIER_BOUNDS.iter().enumerate() {
        if hd < *bound {
            return tier;
        }
    }
    debug_assert!(false, "beast tier bounds must cover clamped hit dice");
    BEAST_TIER_BOUNDS.len() - 1
}

pub(crate) fn evoke_misc(
    state: &mut GameState,
    slot: usize,
    device: MiscDevice,
    target: Option<Coord>,
) -> EvokeOutcome {
    // Experience-recharged devices are inert while their debt is unpaid.
    if device.recharge_debt().is_some() && !state.inventory[slot].evoker_charges() {
        state.plain("That is presently inert.");
        return EvokeOutcome::Unevokable;
    }

    match device {
        MiscDevice::BoxOfBeasts => box_of_beasts(state, slot),
        MiscDevice::SackOfSpiders => sack_of_spiders(state, slot),
        MiscDevice::HellishHorn => hellish_horn(state, slot),
        MiscDevice::FireLamp => match target {
            Some(spot) => {
                if flame::lamp_of_fire(state, slot, spot) {
                    EvokeOutcome::Succeeded
                } else {
                    EvokeOutcome::DidNothing
                }
            }
            None => EvokeOutcome::Unevokable,
        },
        MiscDevice::WindFan => {
            state.plain("You fan a blast of air at your surroundings.");
            let power = 15 + state.player.evo_skill(5);
            wind_blast(state, power);
            state.inventory[slot].expend_xp_evoker();
            EvokeOutcome::Succeeded
        }
        MiscDevice::FloodPhial => flood_phial(state, slot),
        MiscDevice::LightningRod => match target {
            Some(spot) => lightning_rod(state, slot, spot),
            None => EvokeOutcome::Unevokable,
        },
        MiscDevice::QuadDamage => quad_damage(state, slot),
        MiscDevice::PhantomMirror => match target {
            Some(spot) => phantom_mirror(state, slot, spot),
            None => EvokeOutcome::Unevokable,
        },
        MiscDevice::ZigguratFigurine => ziggurat_figurine(state, slot),
    }
}

/// Open the box of beasts. The beast's strength rides on a two-roll
/// spread of evocations skill; the box has no inertness gate but falls
/// apart one time in three.
fn box_of_beasts(state: &mut GameState, slot: usize) -> EvokeOutcome {
    state.plain("You open the lid...");

    let skill = state.player.evo_skill(1).max(1);
    let roll_a = 1 + state.rng.random2(skill + 1);
    let roll_b = 1 + state.rng.random2(skill + 1);
    let hd = ((roll_a + roll_b) / 2).clamp(1, MAX_SKILL_LEVEL);
    let tier = beast_tier(hd);

    let mgen = MonsterGen::new(MonsterKind::MutantBeast, Attitude::Friendly, state.player.pos)
        .with_hd(hd);
    let outcome = if state.place_summon(mgen).is_some() {
        state.plain(format!(
            "...and a {} mutant beast answers your call!",
            BEAST_TIER_NAMES[tier]
        ));
        EvokeOutcome::Succeeded
    } else {
        state.plain("...but nothing answers your call.");
        EvokeOutcome::DidNothing
    };

    if state.rng.one_chance_in(3) {
        state.plain("The now-empty box falls apart.");
        state.inventory.remove(slot);
    }
    outcome
}

/// Reach into the sack of spiders.
fn sack_of_spiders(state: &mut GameState, slot: usize) -> EvokeOutcome {
    state.plain("You reach into the sack...");

    // Stacks from older saves collapse to a single sack on first use.
    if state.inventory[slot].quantity > 1 {
        state.inventory[slot].quantity = 1;
    }

    let power = state.player.evo_skill(10).max(10);
    let choices: [(i32, MonsterKind); 5] = [
        (100, MonsterKind::Redback),
        (power / 2, MonsterKind::JumpingSpider),
        (power / 2, MonsterKind::Tarantella),
        (power / 3, MonsterKind::WolfSpider),
        (power / 4, MonsterKind::OrbSpider),
    ];

    let mut placed = 0;
    let kinds: Vec<MonsterKind> = (0..4)
        .filter_map(|_| state.rng.choose_weighted(&choices).copied())
        .collect();
    for kind in kinds {
        let count = 1 + power * power / (140 * kind.summon_value());
        for _ in 0..count.min(3) {
            let mgen = MonsterGen::new(kind, Attitude::Friendly, state.player.pos)
                .with_hd(3)
                .summoned_for(3 + state.rng.random2(4));
            if state.place_summon(mgen).is_some() {
                placed += 1;
            }
        }
    }

    if placed == 0 {
        state.plain("...but nothing crawls out.");
        return EvokeOutcome::DidNothing;
    }
    state.plain("...and things crawl out!");
    state.inventory[slot].expend_xp_evoker();
    EvokeOutcome::Succeeded
}

/// Blow the hellish horn, calling up beasts of hell.
fn hellish_horn(state: &mut GameState, slot: usize) -> EvokeOutcome {
    if state.player.silenced() {
        state.plain("You can't produce a sound!");
        return EvokeOutcome::Unevokable;
    }
    state.msg(Channel::Sound, "You produce a hideous blast with the horn!");

    // Calling on hell is an evil act; a watching patron disapproves.
    if state.player.patron.is_some() {
        state.player.lose_piety(3);
        state.msg(Channel::Warn, "You feel your patron's disapproval.");
    }

    let power = 15 + state.player.evo_skill(5);
    let count = 1 + state.rng.x_chance_in_y(power, 100) as i32
        + state.rng.x_chance_in_y(power, 200) as i32;
    let mut placed = 0;
    for _ in 0..count {
        let attitude = if state.rng.x_chance_in_y(power, 200) {
            Attitude::Friendly
        } else {
            Attitude::Hostile
        };
        let mgen = MonsterGen::new(MonsterKind::HellBeast, attitude, state.player.pos)
            .with_hd(7)
            .summoned_for(5 + state.rng.random2(5));
        if state.place_summon(mgen).is_some() {
            placed += 1;
        }
    }
    if placed == 0 {
        return EvokeOutcome::DidNothing;
    }
    state.inventory[slot].expend_xp_evoker();
    EvokeOutcome::Succeeded
}

/// Uncork the phial of floods: drench the ground and call elementals
/// out of the new water.
fn flood_phial(state: &mut GameState, slot: usize) -> EvokeOutcome {
    state.plain("You open the phial and a wave of water floods out!");
    let power = 15 + state.player.evo_skill(5);
    let origin = state.player.pos;

    let mut flooded = Vec::new();
    for dy in -2..=2 {
        for dx in -2..=2 {
            let cell = origin + Coord::new(dx, dy);
            if state.level.in_bounds(cell) && state.level.terrain(cell) == Terrain::Floor {
                state
                    .level
                    .temp_change_terrain(cell, Terrain::ShallowWater, 100 + power);
                flooded.push(cell);
            }
        }
    }

    let elementals = 1 + state.rng.x_chance_in_y(power, 150) as i32;
    for _ in 0..elementals {
        if let Some(cell) = state.rng.choose(&flooded).copied() {
            let mgen = MonsterGen::new(MonsterKind::WaterElemental, Attitude::Friendly, cell)
                .with_hd(6)
                .summoned_for(10 + state.rng.random2(10));
            state.place_summon(mgen);
        }
    }

    state.inventory[slot].expend_xp_evoker();
    EvokeOutcome::Succeeded
}

/// Discharge the lightning rod at a target.
fn lightning_rod(state: &mut GameState, slot: usize, target: Coord) -> EvokeOutcome {
    let power = 15 + state.player.evo_skill(7);
    super::cast_bolt_spell(state, Spell::Thunderbolt, power, target);

    state.inventory[slot].expend_xp_evoker();
    if !state.inventory[slot].evoker_charges() {
        state.plain("The rod overheats in your hand!");
    }
    EvokeOutcome::Succeeded
}

/// Crush the quad-damage talisman.
fn quad_damage(state: &mut GameState, slot: usize) -> EvokeOutcome {
    state.msg(Channel::Danger, "You feel an otherworldly power surge through you!");
    state.player.set_duration(DurationKind::QuadDamage, 30);

    state.inventory[slot].quantity -= 1;
    if state.inventory[slot].quantity <= 0 {
        state.inventory.remove(slot);
    }
    EvokeOutcome::Succeeded
}

/// Hold the phantom mirror up to a monster.
fn phantom_mirror(state: &mut GameState, slot: usize, target: Coord) -> EvokeOutcome {
    let origin = state.player.pos;
    let Some(victim) = state.level.monster_at(target) else {
        state.plain("The mirror shows nothing there.");
        return EvokeOutcome::Unevokable;
    };
    if victim.illusion || !state.level.cell_see_cell(origin, target) {
        state.plain("The mirror clouds over uselessly.");
        return EvokeOutcome::Unevokable;
    }
    let (kind, hd, hp) = (victim.kind, victim.hd, victim.hp);

    let mgen = MonsterGen::new(kind, Attitude::Friendly, target)
        .with_hd(hd)
        .summoned_for(5 + state.rng.random2(5));
    let Some(clone_id) = state.place_summon(mgen) else {
        state.plain("The mirror flashes, but nothing appears.");
        return EvokeOutcome::DidNothing;
    };
    if let Some(clone) = state.level.monster_mut(clone_id) {
        clone.illusion = true;
        clone.hp = (hp / 2).max(1);
    }
    state.plain(format!("You reflect the {kind}!"));

    // Strong reflections strain the glass.
    if state.rng.x_chance_in_y(hd * hd, 300) {
        state.plain("The mirror shatters!");
        state.inventory.remove(slot);
    }
    EvokeOutcome::Succeeded
}

/// Set down the ziggurat figurine and let the gateway unfold.
fn ziggurat_figurine(state: &mut GameState, slot: usize) -> EvokeOutcome {
    let pos = state.player.pos;
    if state.level.terrain(pos).is_critical() {
        state.plain("The gateway cannot form here.");
        return EvokeOutcome::Unevokable;
    }
    // One gateway per level; ziggurats do not nest.
    let already_open = (0..state.level.height()).any(|y| {
        (0..state.level.width())
            .any(|x| state.level.terrain(Coord::new(x, y)) == Terrain::ZigguratPortal)
    });
    if already_open {
        state.plain("The figurine trembles, but the gateway refuses to form.");
        return EvokeOutcome::DidNothing;
    }

    state.level.set_terrain(pos, Terrain::ZigguratPortal);
    state.msg(
        Channel::Danger,
        "The figurine melts away, and a gateway to a ziggurat unfolds beneath you!",
    );
    state.inventory.remove(slot);
    EvokeOutcome::Succeeded
}
