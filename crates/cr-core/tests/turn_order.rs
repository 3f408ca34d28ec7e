//! End-to-end turn sequencing: a full round is `player_reacts` followed
//! by `player_reacts_to_monsters`, and several effects are only correct
//! because of which phase owns them.

use cr_core::evoke::evoke_item;
use cr_core::object::{Item, MiscDevice, WandKind};
use cr_core::player::DurationKind;
use cr_core::turn::{player_reacts, player_reacts_to_monsters};
use cr_core::world::{Attitude, CloudKind, Coord, MonsterGen, MonsterKind, Terrain};
use cr_core::{ActionKind, GameState};

fn full_round(state: &mut GameState) {
    player_reacts(state, 10);
    player_reacts_to_monsters(state, 10);
}

#[test]
fn test_paralysis_waits_for_the_monster_phase() {
    let mut state = GameState::new(1);
    state.player.set_duration(DurationKind::Paralysis, 1);

    player_reacts(&mut state, 10);
    assert!(state.player.paralysed());

    player_reacts_to_monsters(&mut state, 10);
    assert!(!state.player.paralysed());
    assert!(state
        .player
        .duration
        .is_active(DurationKind::ParalysisImmunity));
    assert!(state.log.contains("You can move again."));
}

#[test]
fn test_petrification_resolves_over_full_rounds() {
    let mut state = GameState::new(2);
    state.player.set_duration(DurationKind::Petrifying, 2);

    full_round(&mut state);
    assert!(state.log.contains("Your limbs are stiffening."));
    assert!(!state.player.petrified());

    full_round(&mut state);
    assert!(state.log.contains("You have turned to stone."));
    assert!(state.player.petrified());
    assert!(state.player.cannot_move());
}

#[test]
fn test_sleep_ends_with_waking() {
    let mut state = GameState::new(3);
    state.player.set_duration(DurationKind::Sleep, 1);

    player_reacts(&mut state, 10);
    assert!(state.player.asleep());

    player_reacts_to_monsters(&mut state, 10);
    assert!(!state.player.asleep());
    assert!(state.log.contains("You wake up."));
}

#[test]
fn test_simple_durations_tick_once_per_round() {
    let mut state = GameState::new(4);
    state.player.set_duration(DurationKind::Confusion, 3);

    full_round(&mut state);
    full_round(&mut state);
    assert!(state.player.confused());

    full_round(&mut state);
    assert!(!state.player.confused());
    assert!(state.log.contains("You feel less confused."));
}

#[test]
fn test_starvation_faints_only_once_food_runs_out() {
    let mut state = GameState::new(5);
    state.player.hunger = 1;

    // The first turn still has a scrap of food left.
    player_reacts(&mut state, 10);
    assert!(!state.player.paralysed());
    player_reacts_to_monsters(&mut state, 10);

    let mut fainted = false;
    for _ in 0..500 {
        player_reacts(&mut state, 10);
        if state.player.paralysed() {
            fainted = true;
            break;
        }
        player_reacts_to_monsters(&mut state, 10);
    }
    assert!(fainted);
    assert_eq!(state.player.hunger, 0);
    assert!(state.log.contains("You faint from lack of food!"));
}

#[test]
fn test_vortex_batters_before_the_winds_calm() {
    let mut state = GameState::new(6);
    let pos = state.player.pos;
    let id = state
        .level
        .place_monster(
            MonsterGen::new(MonsterKind::Other, Attitude::Hostile, pos + Coord::new(1, 1))
                .with_hd(10),
        )
        .unwrap();
    let hp_before = state.level.monster(id).unwrap().hp;
    state.player.set_duration(DurationKind::Tornado, 1);

    player_reacts(&mut state, 10);
    assert!(state.level.monster(id).unwrap().hp < hp_before);
    assert!(state.log.contains("The winds around you calm down."));
    assert!(state
        .player
        .duration
        .is_active(DurationKind::TornadoCooldown));
}

#[test]
fn test_poison_cloud_takes_effect_the_same_turn() {
    let mut state = GameState::new(7);
    state.level.add_cloud(state.player.pos, CloudKind::Poison, 100);

    player_reacts(&mut state, 10);
    assert!(state.log.contains("poison gas"));
    assert!(state.player.duration.is_active(DurationKind::Poisoning));
    assert!(state.player.hp < state.player.hp_max);
}

#[test]
fn test_wand_evocation_spends_the_turn_then_reactions_run() {
    let mut state = GameState::new(8);
    let slot = state.add_item(Item::wand(WandKind::Flame, 2));

    let spent = evoke_item(&mut state, slot, Some(Coord::new(6, 2))).unwrap();
    assert!(spent);
    assert!(state.turn_is_over);
    assert_eq!(state.action_counts.get(ActionKind::Wand(WandKind::Flame)), 1);
    assert_eq!(state.player.skills.evocations, 1);

    full_round(&mut state);
    let remaining = match state.inventory[slot].kind {
        cr_core::object::ItemKind::Wand { charges, .. } => charges,
        _ => panic!("wand vanished"),
    };
    assert_eq!(remaining, 1);
}

#[test]
fn test_blocked_evocation_leaves_the_turn_free() {
    let mut state = GameState::new(9);
    state.player.set_duration(DurationKind::Berserk, 5);
    let slot = state.add_item(Item::wand(WandKind::Acid, 3));

    let spent = evoke_item(&mut state, slot, Some(Coord::new(6, 2))).unwrap();
    assert!(!spent);
    assert!(!state.turn_is_over);
    assert_eq!(state.action_counts.get(ActionKind::Wand(WandKind::Acid)), 0);
}

#[test]
fn test_deaths_door_holds_hp_through_full_rounds() {
    let mut state = GameState::new(10);
    state.player.hp = 5;
    state.player.mp = 0;
    state.player.set_duration(DurationKind::DeathsDoor, 50);

    for _ in 0..10 {
        full_round(&mut state);
    }
    assert_eq!(state.player.hp, 5);
    assert!(state.player.mp > 0);
}

#[test]
fn test_emergency_flight_collapses_at_zero_mp() {
    let mut state = GameState::new(11);
    state.level.set_terrain(state.player.pos, Terrain::Lava);
    state.player.attr.emergency_flight = true;
    state.player.set_duration(DurationKind::Flight, 5);
    state.player.mp = 10;

    player_reacts(&mut state, 10);
    assert!(state.log.contains("You can no longer sustain your flight!"));
    assert!(!state.player.attr.emergency_flight);
    assert!(!state.player.duration.is_active(DurationKind::Flight));
}

#[test]
fn test_flooded_ground_drains_after_a_while() {
    let mut state = GameState::new(13);
    let slot = state.add_item(Item::misc(MiscDevice::FloodPhial));

    let spent = evoke_item(&mut state, slot, None).unwrap();
    assert!(spent);
    assert_eq!(state.level.terrain(state.player.pos), Terrain::ShallowWater);

    for _ in 0..30 {
        full_round(&mut state);
    }
    assert_eq!(state.level.terrain(state.player.pos), Terrain::Floor);
}

#[test]
fn test_saved_game_round_trips() {
    let mut state = GameState::new(12);
    state.player.set_duration(DurationKind::Flight, 12);
    state.player.hunger = 3333;
    state.add_item(Item::wand(WandKind::Acid, 3));
    full_round(&mut state);

    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.player.hunger, state.player.hunger);
    assert_eq!(
        back.player.duration.get(DurationKind::Flight),
        state.player.duration.get(DurationKind::Flight)
    );
    assert_eq!(back.inventory.len(), state.inventory.len());
    assert_eq!(back.level.monsters.len(), state.level.monsters.len());
}
