//! Level terrain, clouds and monster placement.
//!
//! Only the queries and mutations the reaction/evocation engines need:
//! solidity checks, line of sight, timed terrain changes, cloud movement
//! and occupancy-checked monster placement.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::monster::{Monster, MonsterGen, MonsterId};
use super::Coord;

/// Dungeon terrain features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Terrain {
    Floor,
    Wall,
    Lava,
    ShallowWater,
    DeepWater,
    ZigguratPortal,
}

impl Terrain {
    pub const fn is_solid(self) -> bool {
        matches!(self, Terrain::Wall)
    }

    pub const fn is_water(self) -> bool {
        matches!(self, Terrain::ShallowWater | Terrain::DeepWater)
    }

    /// Features that must never be overwritten by portal placement.
    pub const fn is_critical(self) -> bool {
        matches!(self, Terrain::ZigguratPortal)
    }

    /// Dangerous to land on without flight.
    pub const fn is_dangerous(self) -> bool {
        matches!(self, Terrain::Lava | Terrain::DeepWater)
    }
}

bitflags! {
    /// Level-wide state flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct LevelFlags: u32 {
        /// Walls secrete corrosive slime; adjacency damages the player.
        const SLIMY_WALLS = 0x01;
        /// Ambient sunlight patches are active.
        const SUNLIGHT = 0x02;
    }
}

impl Serialize for LevelFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LevelFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(LevelFlags::from_bits_truncate(bits))
    }
}

/// Cloud flavours the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CloudKind {
    Fire,
    Poison,
    Steam,
}

/// A cloud occupying one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Coord,
    pub kind: CloudKind,
    /// Remaining lifetime in aut.
    pub decay: i32,
}

/// A reversible terrain change with a tick lifetime (flood water etc).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainChange {
    pub pos: Coord,
    pub original: Terrain,
    pub remaining: i32,
}

/// One dungeon level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    width: i32,
    height: i32,
    grid: Vec<Terrain>,
    pub flags: LevelFlags,
    pub clouds: Vec<Cloud>,
    pub monsters: Vec<Monster>,
    next_monster_id: u32,
    terrain_changes: Vec<TerrainChange>,
}

impl Level {
    /// An open floor rectangle with a wall border.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width >= 3 && height >= 3);
        let mut grid = vec![Terrain::Floor; (width * height) as usize];
        for x in 0..width {
            grid[x as usize] = Terrain::Wall;
            grid[((height - 1) * width + x) as usize] = Terrain::Wall;
        }
        for y in 0..height {
            grid[(y * width) as usize] = Terrain::Wall;
            grid[(y * width + width - 1) as usize] = Terrain::Wall;
        }
        Self {
            width,
            height,
            grid,
            flags: LevelFlags::empty(),
            clouds: Vec::new(),
            monsters: Vec::new(),
            next_monster_id: 1,
            terrain_changes: Vec::new(),
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Clamp a coordinate into the playable (non-border) area.
    pub fn clamp_in_bounds(&self, pos: Coord) -> Coord {
        Coord::new(
            pos.x.clamp(1, self.width - 2),
            pos.y.clamp(1, self.height - 2),
        )
    }

    fn idx(&self, pos: Coord) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    pub fn terrain(&self, pos: Coord) -> Terrain {
        if self.in_bounds(pos) {
            self.grid[self.idx(pos)]
        } else {
            Terrain::Wall
        }
    }

    pub fn set_terrain(&mut self, pos: Coord, terrain: Terrain) {
        if self.in_bounds(pos) {
            let i = self.idx(pos);
            self.grid[i] = terrain;
        }
    }

    pub fn cell_is_solid(&self, pos: Coord) -> bool {
        self.terrain(pos).is_solid()
    }

    /// Change terrain for a limited number of aut, reverting afterwards.
    pub fn temp_change_terrain(&mut self, pos: Coord, terrain: Terrain, duration: i32) {
        if !self.in_bounds(pos) {
            return;
        }
        let original = self.terrain(pos);
        self.set_terrain(pos, terrain);
        self.terrain_changes.push(TerrainChange {
            pos,
            original,
            remaining: duration,
        });
    }

    /// Age temporary terrain; expired changes revert.
    pub fn tick_terrain_changes(&mut self, delay: i32) {
        let mut reverts = Vec::new();
        self.terrain_changes.retain_mut(|change| {
            change.remaining -= delay;
            if change.remaining <= 0 {
                reverts.push((change.pos, change.original));
                false
            } else {
                true
            }
        });
        for (pos, original) in reverts {
            self.set_terrain(pos, original);
        }
    }

    // -- monsters ------------------------------------------------------

    pub fn monster_at(&self, pos: Coord) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.pos == pos)
    }

    pub fn monster_at_mut(&mut self, pos: Coord) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.pos == pos)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    pub fn remove_monster(&mut self, id: MonsterId) {
        self.monsters.retain(|m| m.id != id);
    }

    /// Attempt to place a monster at or adjacent to the requested cell.
    ///
    /// Fails (returns None) when every candidate cell is solid or occupied,
    /// which is how summoning devices report partial failure.
    pub fn place_monster(&mut self, mgen: MonsterGen) -> Option<MonsterId> {
        let candidates =
            std::iter::once(mgen.pos).chain(mgen.pos.adjacent().filter(|c| self.in_bounds(*c)));
        let mut spot = None;
        for c in candidates {
            if !self.cell_is_solid(c) && self.monster_at(c).is_none() {
                spot = Some(c);
                break;
            }
        }
        let pos = spot?;
        let id = MonsterId(self.next_monster_id);
        self.next_monster_id += 1;
        self.monsters.push(Monster {
            id,
            kind: mgen.kind,
            pos,
            attitude: mgen.attitude,
            threat: super::ThreatLevel::Easy,
            hd: mgen.hd,
            hp: mgen.hd * 5,
            summon_timer: mgen.summon_duration,
            stationary: false,
            airborne: false,
            asleep: false,
            hidden_mimic: false,
            illusion: false,
        });
        Some(id)
    }

    // -- visibility ----------------------------------------------------

    /// The straight path of cells from `from` (exclusive) towards `to`,
    /// stepping diagonally until aligned with the target.
    pub fn line_towards(from: Coord, to: Coord) -> Vec<Coord> {
        let mut cells = Vec::new();
        let mut cur = from;
        while cur != to {
            let step = (to - cur).sgn();
            cur = cur + step;
            cells.push(cur);
            if cells.len() > 200 {
                break; // degenerate input
            }
        }
        cells
    }

    /// Mutual visibility: no solid cell strictly between the endpoints.
    pub fn cell_see_cell(&self, a: Coord, b: Coord) -> bool {
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        Self::line_towards(a, b)
            .into_iter()
            .filter(|c| *c != b)
            .all(|c| !self.cell_is_solid(c))
    }

    // -- clouds --------------------------------------------------------

    pub fn cloud_at(&self, pos: Coord) -> Option<&Cloud> {
        self.clouds.iter().find(|c| c.pos == pos)
    }

    pub fn add_cloud(&mut self, pos: Coord, kind: CloudKind, decay: i32) {
        if self.cloud_at(pos).is_none() && !self.cell_is_solid(pos) {
            self.clouds.push(Cloud { pos, kind, decay });
        }
    }

    pub fn delete_cloud(&mut self, pos: Coord) {
        self.clouds.retain(|c| c.pos != pos);
    }

    /// Relocate the cloud at `from` to the empty cell `to`.
    pub fn move_cloud(&mut self, from: Coord, to: Coord) {
        if self.cloud_at(to).is_some() {
            return;
        }
        if let Some(cloud) = self.clouds.iter_mut().find(|c| c.pos == from) {
            cloud.pos = to;
        }
    }
}
