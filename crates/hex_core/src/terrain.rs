//! Terrain kinds and their movement/combat modifiers.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, HALF};

/// Terrain assigned to a cell at map generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Open ground (cost: 1).
    #[default]
    Plains,
    /// Slower movement, defense bonus (cost: 1.5).
    Forest,
    /// Very slow movement, high defense (cost: 2).
    Mountain,
    /// Impassable.
    Water,
}

impl Terrain {
    /// Every terrain kind.
    pub const ALL: [Terrain; 4] = [
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Water,
    ];

    /// Cheapest base movement cost of any passable terrain.
    pub const MIN_MOVEMENT_COST: Fixed = Fixed::ONE;

    /// Returns the movement cost for entering this terrain.
    /// Returns `None` for impassable terrain.
    #[must_use]
    pub const fn movement_cost(self) -> Option<Fixed> {
        match self {
            Self::Plains => Some(Fixed::ONE),
            Self::Forest => Some(Fixed::from_bits(Fixed::ONE.to_bits() + HALF.to_bits())),
            Self::Mountain => Some(Fixed::const_from_int(2)),
            Self::Water => None,
        }
    }

    /// Returns true if units can stand on this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Flat defense bonus for a unit standing on this terrain.
    #[must_use]
    pub const fn defense_bonus(self) -> u32 {
        match self {
            Self::Plains => 0,
            Self::Forest => 2,
            Self::Mountain => 3,
            Self::Water => 0,
        }
    }

    /// Single-character glyph used by text renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Plains => '.',
            Self::Forest => 'f',
            Self::Mountain => '^',
            Self::Water => '~',
        }
    }
}
