//! Axial hex coordinates.
//!
//! Cells are addressed with axial `(q, r)` pairs. Cube coordinates
//! `(x, y, z) = (q, -q - r, r)` are derived on demand for distance math.
//! Neighbor offsets are fixed in axial form, so there is no row-parity
//! special casing anywhere in the grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six neighbor directions, starting east and going counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    /// (+1, 0)
    East,
    /// (+1, -1)
    NorthEast,
    /// (0, -1)
    NorthWest,
    /// (-1, 0)
    West,
    /// (-1, +1)
    SouthWest,
    /// (0, +1)
    SouthEast,
}

impl HexDirection {
    /// All directions in canonical order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    /// Axial offset for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::East => (1, 0),
            HexDirection::NorthEast => (1, -1),
            HexDirection::NorthWest => (0, -1),
            HexDirection::West => (-1, 0),
            HexDirection::SouthWest => (-1, 1),
            HexDirection::SouthEast => (0, 1),
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }
}

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column along the diagonal axis.
    pub q: i32,
    /// Row.
    pub r: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

impl HexCoord {
    /// Create a new hex coordinate.
    #[inline]
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube x component.
    #[inline]
    #[must_use]
    pub const fn x(self) -> i32 {
        self.q
    }

    /// Cube y component.
    #[inline]
    #[must_use]
    pub const fn y(self) -> i32 {
        -self.q - self.r
    }

    /// Cube z component.
    #[inline]
    #[must_use]
    pub const fn z(self) -> i32 {
        self.r
    }

    /// Cube coordinates `(x, y, z)`; always sums to zero.
    #[must_use]
    pub const fn to_cube(self) -> (i32, i32, i32) {
        (self.x(), self.y(), self.z())
    }

    /// Convert "odd-r" offset coordinates (column, row) of a rectangular
    /// map into axial form.
    #[must_use]
    pub const fn from_offset(col: i32, row: i32) -> Self {
        Self::new(col - row.div_euclid(2), row)
    }

    /// Inverse of [`HexCoord::from_offset`].
    #[must_use]
    pub const fn to_offset(self) -> (i32, i32) {
        (self.q + self.r.div_euclid(2), self.r)
    }

    /// The adjacent coordinate in `direction`.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// All six adjacent coordinates, in [`HexDirection::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|d| self.neighbor(d))
    }

    /// Hex step distance: half the cube Manhattan distance.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dx = (self.x() - other.x()).unsigned_abs();
        let dy = (self.y() - other.y()).unsigned_abs();
        let dz = (self.z() - other.z()).unsigned_abs();
        (dx + dy + dz) / 2
    }

    /// Whether `other` is one step away.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_sums_to_zero() {
        let c = HexCoord::new(3, -7);
        let (x, y, z) = c.to_cube();
        assert_eq!(x + y + z, 0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let c = HexCoord::new(-4, 9);
        assert_eq!(c.distance(c), 0);
    }

    #[test]
    fn test_distance_known_values() {
        let origin = HexCoord::new(0, 0);
        assert_eq!(origin.distance(HexCoord::new(3, 0)), 3);
        assert_eq!(origin.distance(HexCoord::new(0, -3)), 3);
        assert_eq!(origin.distance(HexCoord::new(2, -1)), 2);
        assert_eq!(origin.distance(HexCoord::new(2, 2)), 4);
    }

    #[test]
    fn test_neighbors_are_distance_one() {
        let c = HexCoord::new(5, 2);
        for n in c.neighbors() {
            assert_eq!(c.distance(n), 1);
        }
    }

    #[test]
    fn test_neighbor_offsets_are_parity_free() {
        let even = HexCoord::new(0, 0);
        let odd = HexCoord::new(0, 1);
        for dir in HexDirection::ALL {
            let (dq, dr) = dir.offset();
            assert_eq!(even.neighbor(dir), HexCoord::new(dq, dr));
            assert_eq!(odd.neighbor(dir), HexCoord::new(dq, 1 + dr));
        }
    }

    #[test]
    fn test_opposite_direction_returns_home() {
        let c = HexCoord::new(2, 3);
        for dir in HexDirection::ALL {
            assert_eq!(c.neighbor(dir).neighbor(dir.opposite()), c);
        }
    }

    #[test]
    fn test_offset_roundtrip() {
        for row in 0..6 {
            for col in 0..6 {
                let axial = HexCoord::from_offset(col, row);
                assert_eq!(axial.to_offset(), (col, row));
            }
        }
        assert_eq!(HexCoord::from_offset(0, 3), HexCoord::new(-1, 3));
    }

    #[test]
    fn test_row_major_ordering() {
        let mut coords = vec![
            HexCoord::new(1, 1),
            HexCoord::new(0, 2),
            HexCoord::new(5, 0),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![HexCoord::new(5, 0), HexCoord::new(1, 1), HexCoord::new(0, 2)]
        );
    }
}
