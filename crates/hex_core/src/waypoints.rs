//! Strategic waypoints: where to attack, defend, rally and gather.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hex::HexCoord;
use crate::influence::InfluenceMap;
use crate::unit::PlayerId;
use crate::world::World;

/// Default number of rally waypoints.
pub const DEFAULT_RALLY_POINTS: usize = 3;

/// What a waypoint is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaypointCategory {
    /// Offensive objective.
    Attack,
    /// Position to hold.
    Defense,
    /// Safe regrouping point.
    Rally,
    /// Resource pickup.
    Resource,
}

impl WaypointCategory {
    /// Fixed priority assigned to waypoints of this category.
    #[must_use]
    pub const fn priority(self) -> u32 {
        match self {
            Self::Attack => 5,
            Self::Defense => 4,
            Self::Rally => 3,
            Self::Resource => 2,
        }
    }
}

/// A point of strategic interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Where.
    pub cell: HexCoord,
    /// Why.
    pub category: WaypointCategory,
    /// Higher is more important.
    pub priority: u32,
}

impl Waypoint {
    /// Waypoint with its category's default priority.
    #[must_use]
    pub const fn new(cell: HexCoord, category: WaypointCategory) -> Self {
        Self {
            cell,
            category,
            priority: category.priority(),
        }
    }
}

/// Waypoints for one player, rebuilt each AI turn.
#[derive(Debug, Clone, Default)]
pub struct WaypointSet {
    waypoints: Vec<Waypoint>,
}

impl WaypointSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the current world and `player`'s influence map.
    ///
    /// Order: enemy base, own base, resource nodes (row-major), then up
    /// to `rally_points` passable safe cells by descending net influence.
    pub fn update(
        &mut self,
        world: &World,
        influence: &InfluenceMap,
        player: PlayerId,
        rally_points: usize,
    ) {
        self.waypoints.clear();

        if let Some(enemy_base) = world.base_of(player.opponent()) {
            self.add(Waypoint::new(enemy_base, WaypointCategory::Attack));
        }
        if let Some(own_base) = world.base_of(player) {
            self.add(Waypoint::new(own_base, WaypointCategory::Defense));
        }
        for node in world.resource_nodes() {
            self.add(Waypoint::new(node, WaypointCategory::Resource));
        }

        let mut safe: Vec<_> = world
            .grid()
            .cells()
            .filter(|c| c.is_passable() && influence.is_safe_zone(c.coord()))
            .map(|c| (c.coord(), influence.net(c.coord())))
            .collect();
        // Stable: equal influence keeps row-major order.
        safe.sort_by(|a, b| b.1.cmp(&a.1));
        for (cell, _) in safe.into_iter().take(rally_points) {
            self.add(Waypoint::new(cell, WaypointCategory::Rally));
        }

        debug!(%player, count = self.waypoints.len(), "waypoints updated");
    }

    /// Append a waypoint.
    pub fn add(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    /// Waypoints of one category, in insertion order.
    pub fn by_category(&self, category: WaypointCategory) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(move |w| w.category == category)
    }

    /// Highest-priority waypoint of `category`; the earliest wins ties.
    #[must_use]
    pub fn highest_priority(&self, category: WaypointCategory) -> Option<&Waypoint> {
        self.by_category(category)
            .fold(None, |best: Option<&Waypoint>, w| match best {
                Some(b) if b.priority >= w.priority => Some(b),
                _ => Some(w),
            })
    }

    /// Every waypoint, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Waypoint] {
        &self.waypoints
    }
}
