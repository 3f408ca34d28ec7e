//! Beam tracing.
//!
//! A [`Bolt`] walks a straight line of cells from a source towards a
//! target, clamping at solid terrain and range. The traced `path_taken`
//! doubles as a tracer (validating line-of-effect before committing) and
//! as the cell list a damaging beam is applied along.

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;
use crate::world::{Coord, Level, MonsterId};
use crate::{Channel, MessageLog};

/// A projectile or tracer path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bolt {
    pub source: Coord,
    pub target: Coord,
    /// Maximum number of cells travelled from the source.
    pub range: i32,
    /// Stop exactly at the target instead of continuing to range.
    pub aimed_at_spot: bool,
    /// Keep going after hitting a monster.
    pub pierce: bool,
    /// Damage dice (count, sides); (0, 0) for pure tracers.
    pub damage: (i32, i32),
    pub name: String,
    /// Cells visited, starting with the source cell.
    pub path_taken: Vec<Coord>,
}

impl Bolt {
    pub fn tracer(source: Coord, target: Coord, range: i32) -> Self {
        Self {
            source,
            target,
            range,
            ..Self::default()
        }
    }

    /// Trace the path. Stops short of solid cells and at range; when
    /// `aimed_at_spot` is unset the beam continues past the target on the
    /// same heading until range is exhausted.
    pub fn fire(&mut self, level: &Level) {
        self.path_taken.clear();
        self.path_taken.push(self.source);

        let mut cur = self.source;
        let mut heading = (self.target - self.source).sgn();
        if heading.origin() {
            return;
        }

        for _ in 0..self.range {
            if cur != self.target {
                heading = (self.target - cur).sgn();
            }
            let next = cur + heading;
            if !level.in_bounds(next) || level.cell_is_solid(next) {
                break;
            }
            cur = next;
            self.path_taken.push(cur);
            if cur == self.target && self.aimed_at_spot {
                break;
            }
        }
    }

    /// The furthest cell reached.
    pub fn endpoint(&self) -> Coord {
        *self.path_taken.last().unwrap_or(&self.source)
    }

    /// Apply this beam's damage along its traced path.
    ///
    /// Returns the ids of monsters killed. Non-piercing beams stop at the
    /// first monster struck.
    pub fn apply_damage(
        &self,
        level: &mut Level,
        log: &mut MessageLog,
        rng: &mut GameRng,
    ) -> Vec<MonsterId> {
        let mut killed = Vec::new();
        for cell in self.path_taken.iter().skip(1) {
            let Some(mon) = level.monster_at_mut(*cell) else {
                continue;
            };
            let dmg = rng.roll_dice(self.damage.0, self.damage.1);
            mon.hp -= dmg;
            if mon.hp <= 0 {
                log.msg(Channel::Plain, format!("The {} is destroyed!", mon.kind));
                killed.push(mon.id);
            }
            if !self.pierce {
                break;
            }
        }
        for id in &killed {
            level.remove_monster(*id);
        }
        killed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Terrain;

    #[test]
    fn test_path_starts_at_source() {
        let level = Level::new(12, 6);
        let mut bolt = Bolt::tracer(Coord::new(2, 2), Coord::new(8, 2), 8);
        bolt.aimed_at_spot = true;
        bolt.fire(&level);
        assert_eq!(bolt.path_taken[0], Coord::new(2, 2));
        assert_eq!(bolt.endpoint(), Coord::new(8, 2));
    }

    #[test]
    fn test_clamps_at_obstruction() {
        let mut level = Level::new(12, 6);
        level.set_terrain(Coord::new(6, 2), Terrain::Wall);
        let mut bolt = Bolt::tracer(Coord::new(2, 2), Coord::new(9, 2), 8);
        bolt.fire(&level);
        assert_eq!(bolt.endpoint(), Coord::new(5, 2));
    }

    #[test]
    fn test_range_limits_travel() {
        let level = Level::new(30, 6);
        let mut bolt = Bolt::tracer(Coord::new(2, 2), Coord::new(25, 2), 5);
        bolt.fire(&level);
        assert_eq!(bolt.endpoint(), Coord::new(7, 2));
        // Source plus five travelled cells.
        assert_eq!(bolt.path_taken.len(), 6);
    }

    #[test]
    fn test_unaimed_beam_overshoots_target() {
        let level = Level::new(30, 6);
        let mut bolt = Bolt::tracer(Coord::new(2, 2), Coord::new(4, 2), 8);
        bolt.fire(&level);
        assert_eq!(bolt.endpoint(), Coord::new(10, 2));
    }

    #[test]
    fn test_zero_length_beam_is_just_source() {
        let level = Level::new(10, 10);
        let mut bolt = Bolt::tracer(Coord::new(3, 3), Coord::new(3, 3), 8);
        bolt.fire(&level);
        assert_eq!(bolt.path_taken, vec![Coord::new(3, 3)]);
    }
}
