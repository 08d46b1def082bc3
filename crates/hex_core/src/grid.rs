//! The hex cell collection and its spatial queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::math::Fixed;
use crate::terrain::Terrain;
use crate::unit::{PlayerId, UnitId};

/// A single hex cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coord: HexCoord,
    terrain: Terrain,
    occupant: Option<UnitId>,
    /// Whether a resource node sits on this cell.
    pub resource_node: bool,
    /// Whether this cell is a player base.
    pub is_base: bool,
    /// Owning player, `None` for neutral cells.
    pub owner: Option<PlayerId>,
}

impl Cell {
    /// Create an empty neutral cell.
    #[must_use]
    pub const fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            occupant: None,
            resource_node: false,
            is_base: false,
            owner: None,
        }
    }

    /// Coordinate of this cell.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Terrain kind.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Unit standing here, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Whether a unit stands here.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Passable terrain and no occupant.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.terrain.is_passable() && !self.is_occupied()
    }

    /// Player-aware passability: a player's own base is impassable to it,
    /// enemy bases are passable so they can be captured.
    #[must_use]
    pub fn is_passable_for(&self, player: PlayerId) -> bool {
        if !self.terrain.is_passable() {
            return false;
        }
        if self.is_base && self.owner == Some(player) {
            return false;
        }
        !self.is_occupied()
    }

    /// Base movement cost of entering this cell.
    #[must_use]
    pub const fn movement_cost(&self) -> Option<Fixed> {
        self.terrain.movement_cost()
    }

    /// Defense bonus granted to the occupant.
    #[must_use]
    pub const fn defense_bonus(&self) -> u32 {
        self.terrain.defense_bonus()
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<UnitId>) {
        self.occupant = occupant;
    }
}

/// Hex grid keyed by coordinate.
///
/// Cells are stored in a `BTreeMap` so every enumeration is in
/// deterministic row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: BTreeMap<HexCoord, Cell>,
}

impl HexGrid {
    /// Build a rectangular (offset-layout) grid of Plains cells.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn rectangle(width: u32, height: u32) -> Self {
        assert!(width > 0, "HexGrid width must be positive");
        assert!(height > 0, "HexGrid height must be positive");

        let mut cells = BTreeMap::new();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let coord = HexCoord::from_offset(col, row);
                cells.insert(coord, Cell::new(coord, Terrain::Plains));
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `coord` names a cell.
    #[must_use]
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Look up a cell.
    #[must_use]
    pub fn cell(&self, coord: HexCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Look up a cell mutably.
    ///
    /// Occupancy is not reachable through this; use
    /// [`crate::world::World`] to move units.
    pub fn cell_mut(&mut self, coord: HexCoord) -> Option<&mut Cell> {
        self.cells.get_mut(&coord)
    }

    /// Change a cell's terrain. Returns `false` if the cell doesn't exist.
    pub fn set_terrain(&mut self, coord: HexCoord, terrain: Terrain) -> bool {
        match self.cells.get_mut(&coord) {
            Some(cell) => {
                cell.terrain = terrain;
                true
            }
            None => false,
        }
    }

    /// Existing neighbor cells (0 to 6; fewer at map edges).
    #[must_use]
    pub fn neighbors(&self, coord: HexCoord) -> Vec<&Cell> {
        coord
            .neighbors()
            .into_iter()
            .filter_map(|n| self.cells.get(&n))
            .collect()
    }

    /// All cells within `range` steps of `center`, including `center`.
    ///
    /// Linear scan over the whole grid.
    #[must_use]
    pub fn cells_in_range(&self, center: HexCoord, range: u32) -> Vec<&Cell> {
        self.cells
            .values()
            .filter(|cell| center.distance(cell.coord) <= range)
            .collect()
    }

    /// Every cell, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Every coordinate, in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.cells.keys().copied()
    }

    pub(crate) fn set_occupant(&mut self, coord: HexCoord, occupant: Option<UnitId>) {
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.set_occupant(occupant);
        }
    }
}
