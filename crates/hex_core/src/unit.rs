//! Unit stat blocks and per-unit runtime state.
//!
//! A [`Unit`] only holds its own data. The occupancy link between a unit
//! and the cell it stands on is maintained by [`crate::world::World`],
//! which is the only place allowed to change either side of it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::math::{ratio, Fixed, HALF};
use crate::terrain::Terrain;

/// Unique identifier for units.
pub type UnitId = u32;

/// Player (side) identifier. Two-player matches use 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The first player.
    pub const ONE: PlayerId = PlayerId(0);
    /// The second player.
    pub const TWO: PlayerId = PlayerId(1);

    /// The other side in a two-player match.
    #[must_use]
    pub const fn opponent(self) -> Self {
        if self.0 == 0 {
            PlayerId(1)
        } else {
            PlayerId(0)
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Broad unit archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitKind {
    /// Balanced line unit, at home in forests.
    #[default]
    Infantry,
    /// Fast, fragile, strong on open plains.
    Cavalry,
    /// Long range, slow, struggles in mountains.
    Artillery,
}

impl UnitKind {
    /// Default stat block for this kind.
    #[must_use]
    pub fn stats(self) -> UnitStats {
        match self {
            UnitKind::Infantry => UnitStats::infantry(),
            UnitKind::Cavalry => UnitStats::cavalry(),
            UnitKind::Artillery => UnitStats::artillery(),
        }
    }
}

/// Terrain a unit likes or dislikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TerrainAffinity {
    /// Halves movement cost and grants an attack bonus.
    pub preferred: Option<Terrain>,
    /// Doubles movement cost.
    pub penalized: Option<Terrain>,
}

/// Attack bonus when attacking from preferred terrain.
pub const PREFERRED_TERRAIN_ATTACK_BONUS: u32 = 2;

impl TerrainAffinity {
    /// No preferences at all.
    pub const NONE: TerrainAffinity = TerrainAffinity {
        preferred: None,
        penalized: None,
    };

    /// Movement cost multiplier on `terrain`.
    #[must_use]
    pub fn movement_modifier(self, terrain: Terrain) -> Fixed {
        if self.preferred == Some(terrain) {
            HALF
        } else if self.penalized == Some(terrain) {
            Fixed::const_from_int(2)
        } else {
            Fixed::ONE
        }
    }

    /// Attack bonus when attacking from `terrain`.
    #[must_use]
    pub fn attack_bonus(self, terrain: Terrain) -> u32 {
        if self.preferred == Some(terrain) {
            PREFERRED_TERRAIN_ATTACK_BONUS
        } else {
            0
        }
    }

    /// Whether `terrain` is the one this unit dislikes.
    #[must_use]
    pub fn dislikes(self, terrain: Terrain) -> bool {
        self.penalized == Some(terrain)
    }
}

/// Movement rules used by pathfinding: terrain cost times affinity modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementProfile {
    /// Terrain preferences applied on top of base terrain cost.
    pub affinity: TerrainAffinity,
}

impl MovementProfile {
    /// Bare terrain costs, no unit preferences.
    #[must_use]
    pub const fn uniform() -> Self {
        Self {
            affinity: TerrainAffinity::NONE,
        }
    }

    /// Cost of entering a cell of `terrain`, or `None` if impassable.
    #[must_use]
    pub fn step_cost(&self, terrain: Terrain) -> Option<Fixed> {
        terrain
            .movement_cost()
            .map(|cost| cost * self.affinity.movement_modifier(terrain))
    }

    /// Cheapest possible cost of a single step under this profile.
    ///
    /// Multiplying a hex distance by this never overestimates the true cost.
    #[must_use]
    pub fn min_step_cost(&self) -> Fixed {
        Terrain::ALL
            .iter()
            .filter_map(|&t| self.step_cost(t))
            .min()
            .unwrap_or(Terrain::MIN_MOVEMENT_COST)
    }
}

/// Static stat block for a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Display name.
    pub name: String,
    /// Archetype.
    pub kind: UnitKind,
    /// Resource cost to produce.
    pub cost: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Attack power.
    pub attack: u32,
    /// Defense power.
    pub defense: u32,
    /// Attack range in hexes.
    pub attack_range: u32,
    /// Movement points per turn.
    pub movement: u32,
    /// Terrain preferences.
    #[serde(default)]
    pub affinity: TerrainAffinity,
}

impl UnitStats {
    /// Standard infantry.
    #[must_use]
    pub fn infantry() -> Self {
        Self {
            name: "Infantry".into(),
            kind: UnitKind::Infantry,
            cost: 20,
            max_health: 100,
            attack: 10,
            defense: 5,
            attack_range: 1,
            movement: 4,
            affinity: TerrainAffinity {
                preferred: Some(Terrain::Forest),
                penalized: None,
            },
        }
    }

    /// Standard cavalry.
    #[must_use]
    pub fn cavalry() -> Self {
        Self {
            name: "Cavalry".into(),
            kind: UnitKind::Cavalry,
            cost: 30,
            max_health: 80,
            attack: 12,
            defense: 3,
            attack_range: 2,
            movement: 6,
            affinity: TerrainAffinity {
                preferred: Some(Terrain::Plains),
                penalized: Some(Terrain::Forest),
            },
        }
    }

    /// Standard artillery.
    #[must_use]
    pub fn artillery() -> Self {
        Self {
            name: "Artillery".into(),
            kind: UnitKind::Artillery,
            cost: 40,
            max_health: 60,
            attack: 15,
            defense: 2,
            attack_range: 4,
            movement: 3,
            affinity: TerrainAffinity {
                preferred: None,
                penalized: Some(Terrain::Mountain),
            },
        }
    }

    /// Movement profile derived from this stat block.
    #[must_use]
    pub fn movement_profile(&self) -> MovementProfile {
        MovementProfile {
            affinity: self.affinity,
        }
    }
}

/// A unit on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub(crate) stats: UnitStats,
    pub(crate) owner: PlayerId,
    pub(crate) cell: HexCoord,
    pub(crate) health: u32,
    pub(crate) remaining_movement: u32,
    pub(crate) has_attacked: bool,
    pub(crate) has_moved: bool,
}

impl Unit {
    /// Fresh unit at full health and full movement.
    pub(crate) fn new(id: UnitId, stats: UnitStats, owner: PlayerId, cell: HexCoord) -> Self {
        let health = stats.max_health;
        let remaining_movement = stats.movement;
        Self {
            id,
            stats,
            owner,
            cell,
            health,
            remaining_movement,
            has_attacked: false,
            has_moved: false,
        }
    }

    /// Unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Stat block.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Owning player.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Cell the unit currently stands on.
    #[must_use]
    pub const fn cell(&self) -> HexCoord {
        self.cell
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Movement points left this turn.
    #[must_use]
    pub const fn remaining_movement(&self) -> u32 {
        self.remaining_movement
    }

    /// Whether the unit already attacked this turn.
    #[must_use]
    pub const fn has_attacked(&self) -> bool {
        self.has_attacked
    }

    /// Whether the unit already moved this turn.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Whether the unit is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health as a fraction of max health.
    #[must_use]
    pub fn health_fraction(&self) -> Fixed {
        ratio(self.health, self.stats.max_health)
    }

    /// True when health is strictly below `percent`% of max.
    #[must_use]
    pub const fn health_below_percent(&self, percent: u32) -> bool {
        self.health * 100 < self.stats.max_health * percent
    }

    /// Reset per-turn state at the start of the owner's turn.
    pub(crate) fn refresh_turn(&mut self) {
        self.remaining_movement = self.stats.movement;
        self.has_attacked = false;
        self.has_moved = false;
    }

    /// Apply damage; returns true if the unit died.
    pub(crate) fn take_damage(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        !self.is_alive()
    }
}
