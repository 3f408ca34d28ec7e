//! World model: coordinates, terrain, monsters.

pub mod level;
pub mod monster;

pub use level::{Cloud, CloudKind, Level, LevelFlags, Terrain, TerrainChange};
pub use monster::{Attitude, Monster, MonsterGen, MonsterId, MonsterKind, ThreatLevel};

use serde::{Deserialize, Serialize};

/// Grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sign of the vector.
    pub const fn sgn(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// Chebyshev distance (grid moves allow diagonals).
    pub const fn distance_from(self, other: Coord) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        if dx > dy { dx } else { dy }
    }

    pub const fn origin(self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The eight neighbouring cells.
    pub fn adjacent(self) -> impl Iterator<Item = Coord> {
        const DELTAS: [(i32, i32); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        DELTAS.into_iter().map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl core::ops::Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl core::ops::Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_chebyshev() {
        let a = Coord::new(0, 0);
        assert_eq!(a.distance_from(Coord::new(3, 1)), 3);
        assert_eq!(a.distance_from(Coord::new(-2, -2)), 2);
        assert_eq!(a.distance_from(a), 0);
    }

    #[test]
    fn test_sgn() {
        assert_eq!(Coord::new(5, -3).sgn(), Coord::new(1, -1));
        assert_eq!(Coord::new(0, 7).sgn(), Coord::new(0, 1));
    }

    #[test]
    fn test_adjacent_count() {
        assert_eq!(Coord::new(4, 4).adjacent().count(), 8);
    }
}
