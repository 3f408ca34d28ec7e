//! Jittered multi-path flame generation for the lamp of fire.
//!
//! The first trail traces straight at the target (clamped at any
//! obstruction); later trails displace the endpoint, and every trail
//! bends through a jittered midpoint. Candidates veering more than 45
//! degrees off the aim, or hugging an already accepted trail for three
//! consecutive cells, are rejected. All retries are bounded; producing
//! fewer trails than requested is fine.

use crate::beam::Bolt;
use crate::consts::LOS_RADIUS;
use crate::msg::Channel;
use crate::rng::GameRng;
use crate::state::GameState;
use crate::world::{CloudKind, Coord, Level};

const JITTER_TRIES: usize = 10;

/// Whether two traced paths share three or more consecutive cells.
pub fn paths_overlap(a: &[Coord], b: &[Coord]) -> bool {
    let mut shared = 0;
    for cell in a {
        if b.contains(cell) {
            shared += 1;
            if shared >= 3 {
                return true;
            }
        } else {
            shared = 0;
        }
    }
    false
}

/// Whether two aim points leave the origin within 45 degrees of each
/// other, judged on the 8-way compass: headings are too close when
/// their component signs differ by at most one step.
pub fn headings_within_45_degrees(origin: Coord, a: Coord, b: Coord) -> bool {
    let da = (a - origin).sgn();
    let db = (b - origin).sgn();
    (da.x - db.x).abs() + (da.y - db.y).abs() <= 1
}

/// Build one jittered path from `source` towards `target`, bending
/// through a displaced midpoint. The endpoint is only displaced when
/// `jitter_start` is set (every trail after the first). None when the
/// aim is degenerate or the bent first leg cannot be traced.
pub fn get_jitter_path(
    rng: &mut GameRng,
    level: &Level,
    source: Coord,
    target: Coord,
    jitter_start: bool,
) -> Option<Vec<Coord>> {
    let aim = target;

    // A blocked trace clamps the effective target to the obstruction.
    let mut trace = Bolt::tracer(source, target, LOS_RADIUS);
    trace.aimed_at_spot = true;
    trace.fire(level);
    let mut target = trace.endpoint();
    if target == source {
        return None;
    }

    if jitter_start {
        for _ in 0..JITTER_TRIES {
            let candidate = level.clamp_in_bounds(
                target + Coord::new(rng.random_range(-2, 2), rng.random_range(-2, 2)),
            );
            if candidate == target || candidate == source || level.cell_is_solid(candidate) {
                continue;
            }
            trace.target = candidate;
            trace.fire(level);
            let reached = trace.endpoint();
            if reached == source || !headings_within_45_degrees(source, aim, reached) {
                continue;
            }
            target = reached;
            break;
        }
        trace.target = target;
        trace.fire(level);
    }
    let straight = trace.path_taken.clone();

    let mut mid = straight.get(straight.len() / 2).copied()?;
    for _ in 0..JITTER_TRIES {
        let candidate = level.clamp_in_bounds(
            mid + Coord::new(rng.random_range(-3, 3), rng.random_range(-3, 3)),
        );
        if candidate.distance_from(mid) < 2
            || candidate == source
            || level.cell_is_solid(candidate)
            || !level.cell_see_cell(source, candidate)
            || !level.cell_see_cell(target, candidate)
        {
            continue;
        }
        let mut bend = Bolt::tracer(candidate, target, LOS_RADIUS);
        bend.aimed_at_spot = true;
        bend.fire(level);
        if !headings_within_45_degrees(source, aim, candidate)
            || !headings_within_45_degrees(source, aim, bend.endpoint())
        {
            continue;
        }
        // A bend on the target's own row or column reads as a straight
        // shot, and a bend through the straight path is no bend at all.
        let delta = candidate - target;
        if delta.x == 0 || delta.y == 0 || straight.contains(&candidate) {
            continue;
        }
        mid = candidate;
        break;
    }

    let mut first = Bolt::tracer(source, mid, LOS_RADIUS);
    first.aimed_at_spot = true;
    first.fire(level);
    // The bend only counts if the first leg actually got there.
    if first.endpoint() != mid {
        return None;
    }
    let mut second = Bolt::tracer(mid, target, LOS_RADIUS);
    second.aimed_at_spot = true;
    second.fire(level);

    let mut path = first.path_taken;
    path.extend(second.path_taken.into_iter().skip(1));
    Some(path)
}

/// Collect up to `requested` mutually spread-out flame trails. Trails
/// retracing three consecutive cells of an accepted one are rejected.
pub fn fill_flame_trails(
    rng: &mut GameRng,
    level: &Level,
    source: Coord,
    target: Coord,
    requested: usize,
) -> Vec<Vec<Coord>> {
    let mut trails: Vec<Vec<Coord>> = Vec::new();
    for _ in 0..requested {
        for _ in 0..JITTER_TRIES {
            let Some(path) =
                get_jitter_path(rng, level, source, target, !trails.is_empty())
            else {
                continue;
            };
            if trails.iter().any(|accepted| paths_overlap(accepted, &path)) {
                continue;
            }
            trails.push(path);
            break;
        }
    }
    trails
}

/// Evoke the lamp of fire: fan flame trails out towards the target,
/// scorching everything along them and leaving burning clouds.
///
/// Returns false when no trail could be formed (the flame sputters).
pub fn lamp_of_fire(state: &mut GameState, slot: usize, target: Coord) -> bool {
    let source = state.player.pos;
    let power = 15 + state.player.evo_skill(5);
    let requested = 2 + state.rng.random2(3) as usize;

    let trails = fill_flame_trails(
        &mut state.rng,
        &state.level,
        source,
        target,
        requested,
    );
    if trails.is_empty() {
        state.plain("The lamp sputters, producing nothing but smoke.");
        return false;
    }

    state.plain("The lamp blazes, and shimmering flames pour forth!");
    for trail in &trails {
        let bolt = Bolt {
            source,
            target: *trail.last().unwrap_or(&target),
            range: LOS_RADIUS,
            aimed_at_spot: true,
            pierce: true,
            damage: (2, 5 + power / 10),
            name: "flame trail".to_string(),
            path_taken: trail.clone(),
        };
        bolt.apply_damage(&mut state.level, &mut state.log, &mut state.rng);
        for cell in trail.iter().skip(1) {
            if state.rng.coinflip() {
                state.level.add_cloud(*cell, CloudKind::Fire, 30 + state.rng.random2(20));
            }
        }
    }

    if let Some(item) = state.inventory.get_mut(slot) {
        item.expend_xp_evoker();
    }
    state.msg(Channel::Sound, "The flames roar!");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::MiscDevice;

    #[test]
    fn test_paths_overlap_needs_three_consecutive() {
        let a: Vec<Coord> = (0..6).map(|x| Coord::new(x, 0)).collect();
        let two_shared = vec![
            Coord::new(0, 0),
            Coord::new(1, 0),
            Coord::new(2, 5),
            Coord::new(3, 0),
        ];
        assert!(!paths_overlap(&two_shared, &a));
        let three_shared = vec![Coord::new(1, 0), Coord::new(2, 0), Coord::new(3, 0)];
        assert!(paths_overlap(&three_shared, &a));
    }

    #[test]
    fn test_heading_rule_on_the_compass() {
        let origin = Coord::new(0, 0);
        // Identical heading.
        assert!(headings_within_45_degrees(
            origin,
            Coord::new(5, 0),
            Coord::new(7, 0)
        ));
        // One compass step apart.
        assert!(headings_within_45_degrees(
            origin,
            Coord::new(5, 0),
            Coord::new(5, 5)
        ));
        // Orthogonal.
        assert!(!headings_within_45_degrees(
            origin,
            Coord::new(5, 0),
            Coord::new(0, 5)
        ));
    }

    #[test]
    fn test_jitter_path_connects_source_to_somewhere() {
        let level = Level::new(20, 20);
        let mut rng = GameRng::new(5);
        let source = Coord::new(3, 3);
        for jitter_start in [false, true] {
            for _ in 0..20 {
                if let Some(path) =
                    get_jitter_path(&mut rng, &level, source, Coord::new(12, 10), jitter_start)
                {
                    assert_eq!(path[0], source);
                    assert!(path.len() >= 2);
                    for pair in path.windows(2) {
                        assert!(pair[0].distance_from(pair[1]) <= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_first_trail_keeps_the_original_endpoint() {
        let level = Level::new(20, 20);
        let mut rng = GameRng::new(3);
        let source = Coord::new(3, 3);
        let target = Coord::new(10, 9);
        for _ in 0..20 {
            let path = get_jitter_path(&mut rng, &level, source, target, false)
                .expect("open ground always yields a path");
            assert_eq!(*path.last().unwrap(), target);
        }
    }

    #[test]
    fn test_direct_trace_clamps_at_obstructions() {
        let mut level = Level::new(20, 20);
        for y in 0..20 {
            level.set_terrain(Coord::new(8, y), crate::world::Terrain::Wall);
        }
        let mut rng = GameRng::new(7);
        let source = Coord::new(3, 3);
        for _ in 0..20 {
            if let Some(path) = get_jitter_path(&mut rng, &level, source, Coord::new(15, 3), true)
            {
                assert!(path.iter().all(|c| c.x < 8));
                assert!(path.iter().all(|c| !level.cell_is_solid(*c)));
            }
        }
    }

    #[test]
    fn test_fill_flame_trails_is_bounded() {
        let level = Level::new(20, 20);
        let mut rng = GameRng::new(9);
        let source = Coord::new(3, 3);
        let target = Coord::new(10, 10);
        let trails = fill_flame_trails(&mut rng, &level, source, target, 4);
        assert!(trails.len() <= 4);
        for pair_a in 0..trails.len() {
            for pair_b in 0..pair_a {
                assert!(!paths_overlap(&trails[pair_b], &trails[pair_a]));
            }
        }
        // Every trail fans out within the aim cone.
        for trail in &trails {
            assert_eq!(trail[0], source);
            let end = *trail.last().unwrap();
            assert!(headings_within_45_degrees(source, target, end));
        }
    }

    #[test]
    fn test_lamp_of_fire_leaves_burning_ground() {
        let mut state = GameState::new(21);
        state.player.pos = Coord::new(3, 3);
        let slot = state
            .add_item(crate::object::Item::misc(MiscDevice::FireLamp));
        let lit = lamp_of_fire(&mut state, slot, Coord::new(10, 8));
        if lit {
            assert!(state.log.contains("shimmering flames"));
            assert!(!state.inventory[slot].evoker_charges());
        }
    }
}
